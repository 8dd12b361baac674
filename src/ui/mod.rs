//! Interactive user interface components.
//!
//! This module provides:
//! - [`UserInterface`] trait for UI abstraction
//! - [`TerminalUI`] for interactive terminal usage
//! - [`NonInteractiveUI`] for CI/headless environments
//! - [`MockUI`] for tests
//!
//! # Example
//!
//! ```
//! use matlab_runtime::ui::{create_ui, OutputMode};
//!
//! // Use non-interactive mode for testability
//! let mut ui = create_ui(false, OutputMode::Quiet);
//! ui.show_header("MATLAB Runtime");
//! ui.success("Installed R2024b");
//! ```

pub mod mock;
pub mod non_interactive;
pub mod output;
pub mod prompts;
pub mod spinner;
pub mod terminal;
pub mod theme;

pub use mock::{MockSpinner, MockUI};
pub use non_interactive::NonInteractiveUI;
pub use output::OutputMode;
pub use prompts::{confirm_user, parse_answer};
pub use spinner::ProgressSpinner;
pub use terminal::{create_ui, TerminalUI};
pub use theme::{should_use_colors, RuntimeTheme};

use crate::error::Result;

/// Trait for user interface interactions.
///
/// This trait allows mocking the UI in tests.
pub trait UserInterface {
    /// Get the current output mode.
    fn output_mode(&self) -> OutputMode;

    /// Display a message to the user.
    fn message(&mut self, msg: &str);

    /// Display a success message.
    fn success(&mut self, msg: &str);

    /// Display a warning message.
    fn warning(&mut self, msg: &str);

    /// Display an error message.
    fn error(&mut self, msg: &str);

    /// Ask a yes/no question.
    ///
    /// Returns the answer; a question that cannot be answered fails with
    /// [`RuntimeError::UserInterruption`](crate::error::RuntimeError::UserInterruption).
    fn confirm(&mut self, prompt: &Prompt) -> Result<bool>;

    /// Start a spinner for an operation.
    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle>;

    /// Show a header/banner.
    fn show_header(&mut self, title: &str);

    /// Check if running in interactive mode.
    fn is_interactive(&self) -> bool;
}

/// Handle for controlling a spinner.
pub trait SpinnerHandle {
    /// Update the spinner message.
    fn set_message(&mut self, msg: &str);

    /// Mark the operation as successful.
    fn finish_success(&mut self, msg: &str);

    /// Mark the operation as failed.
    fn finish_error(&mut self, msg: &str);

    /// Mark as skipped.
    fn finish_skipped(&mut self, msg: &str);
}

/// A yes/no question to show to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    /// Unique key for the prompt (used for environment overrides).
    pub key: String,
    /// The question to display.
    pub question: String,
    /// Answer used when the user just presses enter. `None` forces an
    /// explicit answer.
    pub default: Option<bool>,
}

impl Prompt {
    /// A question answered "yes" by default.
    pub fn yes_by_default(key: &str, question: impl Into<String>) -> Self {
        Self {
            key: key.to_string(),
            question: question.into(),
            default: Some(true),
        }
    }

    /// A question without default.
    pub fn explicit(key: &str, question: impl Into<String>) -> Self {
        Self {
            key: key.to_string(),
            question: question.into(),
            default: None,
        }
    }
}
