//! Install command implementation.
//!
//! `install_matlab_runtime [--version V...] [--prefix P] [--yes]`

use std::path::PathBuf;

use crate::error::Result;
use crate::installer::Installer;
use crate::prefix::ResolvedPrefix;
use crate::ui::UserInterface;
use crate::version::VersionToken;

use super::dispatcher::{Command, CommandResult};

/// The install command implementation.
pub struct InstallCommand {
    tokens: Vec<VersionToken>,
    prefix: Option<PathBuf>,
    yes: bool,
}

impl InstallCommand {
    pub fn new(tokens: Vec<VersionToken>, prefix: Option<PathBuf>, yes: bool) -> Self {
        Self { tokens, prefix, yes }
    }
}

impl Command for InstallCommand {
    fn execute(&self, installer: &Installer, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let prefix = ResolvedPrefix::resolve(self.prefix.as_deref())?;
        ui.show_header("MATLAB Runtime installer");
        if ui.output_mode().shows_details() {
            ui.message(&format!("Prefix: {} (from {})", prefix.path.display(), prefix.source));
        }

        let report = installer.install(&self.tokens, &prefix.path, self.yes, ui)?;
        if report.installed.is_empty() {
            ui.message("Nothing to install");
        }
        Ok(CommandResult::success())
    }
}
