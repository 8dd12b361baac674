//! Non-interactive UI for CI/headless environments.

use std::collections::HashMap;

use crate::error::{Result, RuntimeError};

use super::{parse_answer, OutputMode, Prompt, SpinnerHandle, UserInterface};

/// Prefix of environment variables answering prompts, e.g.
/// `MATLAB_RUNTIME_PROMPT_LICENSE=yes`.
pub const PROMPT_ENV_PREFIX: &str = "MATLAB_RUNTIME_PROMPT_";

/// UI implementation for non-interactive mode.
///
/// Questions are answered from `MATLAB_RUNTIME_PROMPT_<KEY>` variables, then
/// from the prompt's default. A question with neither cannot be answered and
/// fails with [`RuntimeError::UserInterruption`].
pub struct NonInteractiveUI {
    mode: OutputMode,
    env_overrides: HashMap<String, String>,
}

impl NonInteractiveUI {
    /// Create a new non-interactive UI.
    pub fn new(mode: OutputMode) -> Self {
        let env_overrides: HashMap<String, String> = std::env::vars()
            .filter(|(k, _)| k.starts_with(PROMPT_ENV_PREFIX))
            .collect();

        Self {
            mode,
            env_overrides,
        }
    }

    /// Create with explicit overrides (for testing).
    pub fn with_overrides(mode: OutputMode, overrides: HashMap<String, String>) -> Self {
        Self {
            mode,
            env_overrides: overrides,
        }
    }
}

impl UserInterface for NonInteractiveUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("{}", msg);
        }
    }

    fn success(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("✓ {}", msg);
        }
    }

    fn warning(&mut self, msg: &str) {
        if self.mode.shows_status() {
            eprintln!("⚠ {}", msg);
        }
    }

    fn error(&mut self, msg: &str) {
        eprintln!("✗ {}", msg);
    }

    fn confirm(&mut self, prompt: &Prompt) -> Result<bool> {
        let env_key = format!("{}{}", PROMPT_ENV_PREFIX, prompt.key.to_uppercase());
        if let Some(value) = self.env_overrides.get(&env_key) {
            match parse_answer(value) {
                Some(answer) => {
                    tracing::debug!("Answered '{}' from {}", prompt.question, env_key);
                    return Ok(answer);
                }
                None => tracing::warn!("Ignoring {}={}: expected yes or no", env_key, value),
            }
        }

        if let Some(default) = prompt.default {
            return Ok(default);
        }

        Err(RuntimeError::UserInterruption {
            question: format!(
                "{} (cannot ask in non-interactive mode; pass --yes or set {})",
                prompt.question, env_key
            ),
        })
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        if self.mode.shows_spinners() {
            println!("  {}", message);
        }
        Box::new(NoopSpinner {
            show: self.mode.shows_status(),
        })
    }

    fn show_header(&mut self, title: &str) {
        if self.mode.shows_status() {
            println!("\n{}\n", title);
        }
    }

    fn is_interactive(&self) -> bool {
        false
    }
}

/// Spinner that prints only its final line.
struct NoopSpinner {
    show: bool,
}

impl SpinnerHandle for NoopSpinner {
    fn set_message(&mut self, _msg: &str) {}

    fn finish_success(&mut self, msg: &str) {
        if self.show {
            println!("✓ {}", msg);
        }
    }

    fn finish_error(&mut self, msg: &str) {
        eprintln!("✗ {}", msg);
    }

    fn finish_skipped(&mut self, msg: &str) {
        if self.show {
            println!("○ {}", msg);
        }
    }
}
