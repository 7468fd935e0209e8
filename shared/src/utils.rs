/// Words that end an interactive session, compared case-insensitively.
pub const EXIT_COMMANDS: [&str; 3] = ["quit", "exit", "q"];

pub fn is_exit_command(input: &str) -> bool {
    let input = input.trim();
    EXIT_COMMANDS
        .iter()
        .any(|cmd| input.eq_ignore_ascii_case(cmd))
}

/// `base` for URLs given with or without a scheme; bare hosts get https.
pub fn normalize_base_url(base: &str) -> String {
    let trimmed = base.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}
