use crate::render::{render_results, rule};
use application::query_service::QueryService;
use clap::ValueEnum;
use colored::Colorize;
use domain::ports::QuestionSearch;
use shared::types::Result;
use shared::utils::is_exit_command;
use std::io::{self, BufRead, Write};
use tracing::warn;

pub const PROMPT: &str = "Your question: ";
pub const GOODBYE: &str = "Thanks for using Smart Q&A Finder!";
pub const UNREADABLE_INPUT: &str = "Could not read that line as text. Please try again.";

pub const DEMO_QUESTIONS: [&str; 5] = [
    "How do I learn Python programming?",
    "What is machine learning?",
    "How to start a business?",
    "What are the best books to read?",
    "How do I invest in stocks?",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Type your own questions
    Interactive,
    /// Run the built-in sample questions
    Demo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopState {
    AwaitingInput,
    Done,
}

enum OperatorLine {
    Eof,
    Text(String),
    /// Bytes that are not UTF-8; already consumed from the input.
    Unreadable,
}

fn read_operator_line<R: BufRead>(input: &mut R) -> io::Result<OperatorLine> {
    let mut buf = Vec::new();
    if input.read_until(b'\n', &mut buf)? == 0 {
        return Ok(OperatorLine::Eof);
    }
    Ok(match String::from_utf8(buf) {
        Ok(line) => OperatorLine::Text(line),
        Err(_) => OperatorLine::Unreadable,
    })
}

/// Ask the operator for a mode. End of input falls back to the demo.
pub fn choose_mode<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> io::Result<Mode> {
    writeln!(out, "Choose mode:")?;
    writeln!(out, "1. Interactive mode (type your own questions)")?;
    writeln!(out, "2. Demo mode (pre-defined sample questions)")?;
    writeln!(out)?;

    loop {
        write!(out, "Enter choice (1 or 2): ")?;
        out.flush()?;
        let line = match read_operator_line(input)? {
            OperatorLine::Eof => {
                writeln!(out)?;
                writeln!(out, "Running demo mode...")?;
                return Ok(Mode::Demo);
            }
            OperatorLine::Text(line) => line,
            OperatorLine::Unreadable => String::new(),
        };
        match line.trim() {
            "1" => return Ok(Mode::Interactive),
            "2" => return Ok(Mode::Demo),
            _ => writeln!(out, "Please enter 1 or 2")?,
        }
    }
}

/// Read questions until an exit word or end of input. A failed search is
/// reported and the loop keeps going.
pub async fn run_query_loop<S, R, W>(service: &QueryService<S>, input: &mut R, out: &mut W) -> Result<()>
where
    S: QuestionSearch,
    R: BufRead,
    W: Write,
{
    writeln!(out, "{}", "Interactive Smart Q&A Finder".bold())?;
    writeln!(out, "{}", rule('='))?;
    writeln!(out, "Ask any question and find semantically similar questions from Quora's dataset!")?;
    writeln!(out, "Type 'quit' to exit")?;
    writeln!(out)?;

    let mut state = LoopState::AwaitingInput;
    while state == LoopState::AwaitingInput {
        state = step(service, input, out).await?;
    }
    Ok(())
}

async fn step<S, R, W>(service: &QueryService<S>, input: &mut R, out: &mut W) -> Result<LoopState>
where
    S: QuestionSearch,
    R: BufRead,
    W: Write,
{
    write!(out, "{}", PROMPT)?;
    out.flush()?;

    let line = match read_operator_line(input)? {
        OperatorLine::Eof => {
            writeln!(out)?;
            writeln!(out, "{}", GOODBYE)?;
            return Ok(LoopState::Done);
        }
        OperatorLine::Text(line) => line,
        OperatorLine::Unreadable => {
            warn!("operator input was not valid UTF-8");
            writeln!(out, "{}", UNREADABLE_INPUT.yellow())?;
            return Ok(LoopState::AwaitingInput);
        }
    };

    let question = line.trim();
    if is_exit_command(question) {
        writeln!(out, "{}", GOODBYE)?;
        return Ok(LoopState::Done);
    }
    if question.is_empty() {
        return Ok(LoopState::AwaitingInput);
    }

    writeln!(out)?;
    writeln!(out, "{}", "Searching...".cyan())?;
    match service.ask(question).await {
        Ok(hits) => {
            writeln!(out)?;
            render_results(out, question, &hits)?;
            writeln!(out, "{}", rule('-'))?;
        }
        Err(err) => {
            warn!(error = %err, "search failed");
            writeln!(out, "{} {:#}", "Error searching:".red().bold(), err)?;
            writeln!(out, "Please try again.")?;
        }
    }
    writeln!(out)?;
    Ok(LoopState::AwaitingInput)
}

/// Run each canned question through the same search and rendering path.
pub async fn run_demo<S, W>(service: &QueryService<S>, questions: &[&str], out: &mut W) -> Result<()>
where
    S: QuestionSearch,
    W: Write,
{
    writeln!(out, "{}", "Smart Q&A Finder Demo".bold())?;
    writeln!(out, "{}", rule('='))?;
    writeln!(out, "Demonstrating semantic question similarity search...")?;
    writeln!(out)?;

    for (i, question) in questions.iter().enumerate() {
        writeln!(out, "Demo {}/{}", i + 1, questions.len())?;
        writeln!(out, "{}", "-".repeat(30))?;
        match service.ask(question).await {
            Ok(hits) => render_results(out, question, &hits)?,
            Err(err) => {
                warn!(error = %err, question, "demo search failed");
                writeln!(out, "{} {:#}", "Error searching:".red().bold(), err)?;
            }
        }
        writeln!(out, "{}", rule('='))?;
        writeln!(out)?;
    }
    Ok(())
}
