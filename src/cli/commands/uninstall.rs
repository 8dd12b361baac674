//! Uninstall command implementation.
//!
//! `install_matlab_runtime --uninstall [--version V...] [--prefix P] [--yes]`

use std::path::PathBuf;

use crate::error::Result;
use crate::installer::Installer;
use crate::prefix::ResolvedPrefix;
use crate::ui::UserInterface;
use crate::version::VersionToken;

use super::dispatcher::{Command, CommandResult};

/// The uninstall command implementation.
pub struct UninstallCommand {
    tokens: Vec<VersionToken>,
    prefix: Option<PathBuf>,
    yes: bool,
}

impl UninstallCommand {
    pub fn new(tokens: Vec<VersionToken>, prefix: Option<PathBuf>, yes: bool) -> Self {
        Self { tokens, prefix, yes }
    }
}

impl Command for UninstallCommand {
    fn execute(&self, installer: &Installer, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let prefix = ResolvedPrefix::resolve(self.prefix.as_deref())?;
        tracing::debug!("Uninstalling from {} ({})", prefix.path.display(), prefix.source);

        let report = installer.uninstall(&self.tokens, &prefix.path, self.yes, ui)?;
        if report.removed.is_empty() {
            ui.message(&format!(
                "No MATLAB Runtime to remove under {}",
                prefix.path.display()
            ));
        }
        Ok(CommandResult::success())
    }
}
