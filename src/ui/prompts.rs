//! Interactive confirmations.

use console::{style, Term};
use dialoguer::theme::ColorfulTheme;
use dialoguer::Confirm;

use crate::error::{Result, RuntimeError};

use super::Prompt;

/// Convert dialoguer errors, treating Ctrl-C as a refusal.
fn map_dialoguer_err(e: dialoguer::Error, prompt: &Prompt) -> RuntimeError {
    interruption_or_io(e.into(), prompt)
}

fn interruption_or_io(io: std::io::Error, prompt: &Prompt) -> RuntimeError {
    if io.kind() == std::io::ErrorKind::Interrupted {
        RuntimeError::UserInterruption {
            question: prompt.question.clone(),
        }
    } else {
        RuntimeError::Io(io)
    }
}

/// Dialoguer theme without the default yellow `?` prefix.
fn prompt_theme() -> ColorfulTheme {
    ColorfulTheme {
        prompt_prefix: style("".to_string()),
        ..ColorfulTheme::default()
    }
}

/// Ask `prompt` on `term`.
///
/// Without a default the user must type `y` or `n`.
pub fn confirm_user(prompt: &Prompt, term: &Term) -> Result<bool> {
    let theme = prompt_theme();
    let mut confirm = Confirm::with_theme(&theme).with_prompt(&prompt.question);
    if let Some(default) = prompt.default {
        confirm = confirm.default(default);
    }
    confirm
        .interact_on(term)
        .map_err(|e| map_dialoguer_err(e, prompt))
}

/// Parse a textual yes/no answer.
pub fn parse_answer(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "y" | "yes" | "true" | "1" | "on" => Some(true),
        "n" | "no" | "false" | "0" | "off" => Some(false),
        _ => None,
    }
}
