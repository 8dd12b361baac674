//! Mock UI implementation for testing.
//!
//! `MockUI` implements the `UserInterface` trait and captures all
//! interactions for later assertion. It can be configured with
//! pre-determined answers.
//!
//! # Example
//!
//! ```
//! use matlab_runtime::ui::{MockUI, Prompt, UserInterface};
//!
//! let mut ui = MockUI::new();
//! ui.set_answer("license", true);
//!
//! let accepted = ui.confirm(&Prompt::explicit("license", "Accept?")).unwrap();
//! assert!(accepted);
//! assert_eq!(ui.prompts_shown(), ["license"]);
//! ```

use std::collections::HashMap;

use crate::error::{Result, RuntimeError};

use super::{OutputMode, Prompt, SpinnerHandle, UserInterface};

/// Mock UI implementation for testing.
///
/// Captures all UI interactions and answers prompts from `set_answer`,
/// falling back to the prompt default. Never interactive.
#[derive(Debug, Default)]
pub struct MockUI {
    mode: OutputMode,
    messages: Vec<String>,
    successes: Vec<String>,
    warnings: Vec<String>,
    errors: Vec<String>,
    headers: Vec<String>,
    spinners: Vec<String>,
    answers: HashMap<String, bool>,
    prompts_shown: Vec<String>,
}

impl MockUI {
    /// Create a new MockUI with Normal output mode.
    pub fn new() -> Self {
        Self {
            mode: OutputMode::Normal,
            ..Default::default()
        }
    }

    /// Create a new MockUI with a specific output mode.
    pub fn with_mode(mode: OutputMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    /// Set the answer for a prompt key.
    pub fn set_answer(&mut self, key: &str, answer: bool) {
        self.answers.insert(key.to_string(), answer);
    }

    /// Get all captured messages.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Get all captured success messages.
    pub fn successes(&self) -> &[String] {
        &self.successes
    }

    /// Get all captured warning messages.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Get all captured error messages.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Get all captured headers.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Get all spinner messages that were started.
    pub fn spinners(&self) -> &[String] {
        &self.spinners
    }

    /// Get all prompts that were shown (by key).
    pub fn prompts_shown(&self) -> &[String] {
        &self.prompts_shown
    }

    /// Check if a specific message was shown.
    pub fn has_message(&self, msg: &str) -> bool {
        self.messages.iter().any(|m| m.contains(msg))
    }

    /// Check if a specific success was shown.
    pub fn has_success(&self, msg: &str) -> bool {
        self.successes.iter().any(|m| m.contains(msg))
    }

    /// Check if a specific warning was shown.
    pub fn has_warning(&self, msg: &str) -> bool {
        self.warnings.iter().any(|m| m.contains(msg))
    }

    /// Check if a specific error was shown.
    pub fn has_error(&self, msg: &str) -> bool {
        self.errors.iter().any(|m| m.contains(msg))
    }
}

impl UserInterface for MockUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        self.messages.push(msg.to_string());
    }

    fn success(&mut self, msg: &str) {
        self.successes.push(msg.to_string());
    }

    fn warning(&mut self, msg: &str) {
        self.warnings.push(msg.to_string());
    }

    fn error(&mut self, msg: &str) {
        self.errors.push(msg.to_string());
    }

    fn confirm(&mut self, prompt: &Prompt) -> Result<bool> {
        self.prompts_shown.push(prompt.key.clone());

        if let Some(answer) = self.answers.get(&prompt.key) {
            return Ok(*answer);
        }

        prompt
            .default
            .ok_or_else(|| RuntimeError::UserInterruption {
                question: prompt.question.clone(),
            })
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        self.spinners.push(message.to_string());
        Box::new(MockSpinner::new())
    }

    fn show_header(&mut self, title: &str) {
        self.headers.push(title.to_string());
    }

    fn is_interactive(&self) -> bool {
        false
    }
}

/// Mock spinner that records its final state.
#[derive(Debug, Default)]
pub struct MockSpinner {
    messages: Vec<String>,
    finished: Option<(String, String)>,
}

impl MockSpinner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages set while running.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Final (status, message), if finished.
    pub fn finished(&self) -> Option<(&str, &str)> {
        self.finished
            .as_ref()
            .map(|(status, msg)| (status.as_str(), msg.as_str()))
    }
}

impl SpinnerHandle for MockSpinner {
    fn set_message(&mut self, msg: &str) {
        self.messages.push(msg.to_string());
    }

    fn finish_success(&mut self, msg: &str) {
        self.finished = Some(("success".to_string(), msg.to_string()));
    }

    fn finish_error(&mut self, msg: &str) {
        self.finished = Some(("error".to_string(), msg.to_string()));
    }

    fn finish_skipped(&mut self, msg: &str) {
        self.finished = Some(("skipped".to_string(), msg.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captures_messages() {
        let mut ui = MockUI::new();
        ui.message("hello");
        ui.success("done");
        ui.warning("careful");
        ui.error("broken");
        ui.show_header("MATLAB Runtime");

        assert!(ui.has_message("hello"));
        assert!(ui.has_success("done"));
        assert!(ui.has_warning("careful"));
        assert!(ui.has_error("broken"));
        assert_eq!(ui.headers(), ["MATLAB Runtime"]);
    }

    #[test]
    fn set_answer_overrides_default() {
        let mut ui = MockUI::new();
        ui.set_answer("download", false);
        let prompt = Prompt::yes_by_default("download", "Download?");

        assert!(!ui.confirm(&prompt).unwrap());
        assert_eq!(ui.prompts_shown(), ["download"]);
    }

    #[test]
    fn falls_back_to_default() {
        let mut ui = MockUI::new();
        let prompt = Prompt::yes_by_default("remove", "Remove?");
        assert!(ui.confirm(&prompt).unwrap());
    }

    #[test]
    fn no_answer_and_no_default_is_interruption() {
        let mut ui = MockUI::new();
        let err = ui.confirm(&Prompt::explicit("license", "Accept?")).unwrap_err();
        assert!(matches!(err, RuntimeError::UserInterruption { .. }));
    }

    #[test]
    fn spinner_records_outcome() {
        let mut spinner = MockSpinner::new();
        spinner.set_message("50%");
        spinner.finish_skipped("already installed");
        assert_eq!(spinner.messages(), ["50%"]);
        assert_eq!(spinner.finished(), Some(("skipped", "already installed")));
    }

    #[test]
    fn records_spinners_started() {
        let mut ui = MockUI::new();
        let mut spinner = ui.start_spinner("Downloading R2024b");
        spinner.finish_success("Downloaded");
        assert_eq!(ui.spinners(), ["Downloading R2024b"]);
    }
}
