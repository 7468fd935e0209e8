use crate::types::Result;
use dialoguer::Confirm;
use std::io::IsTerminal;

/// Yes/no prompt shared by the binaries. `assume_yes` answers on the
/// operator's behalf; without a terminal the default answer is taken.
pub fn ask_confirmation(prompt: &str, default_yes: bool, assume_yes: bool) -> Result<bool> {
    if assume_yes {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Ok(default_yes);
    }
    let choice = Confirm::new()
        .with_prompt(prompt)
        .default(default_yes)
        .show_default(true)
        .interact_opt()?;
    Ok(choice.unwrap_or(default_yes))
}
