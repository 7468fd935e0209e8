use colored::Colorize;
use domain::models::ScoredQuestion;
use std::io::{self, Write};

pub const RULE_WIDTH: usize = 60;

pub fn rule(ch: char) -> String {
    ch.to_string().repeat(RULE_WIDTH)
}

/// Print one result block: the question, then each hit with its rank and a
/// four-decimal score.
pub fn render_results<W: Write>(
    out: &mut W,
    question: &str,
    hits: &[ScoredQuestion],
) -> io::Result<()> {
    writeln!(out, "{}", format!("Question: '{}'", question).bold())?;
    writeln!(out, "{}", rule('='))?;

    if hits.is_empty() {
        writeln!(out, "{}", "No similar questions found.".yellow())?;
        return Ok(());
    }

    writeln!(out, "Found {} similar questions:", hits.len())?;
    writeln!(out)?;
    for (rank, hit) in hits.iter().enumerate() {
        writeln!(
            out,
            "{}. Score: {}",
            rank + 1,
            format!("{:.4}", hit.score).green()
        )?;
        writeln!(out, "   Question: {}", hit.display_text())?;
        writeln!(out)?;
    }
    Ok(())
}
