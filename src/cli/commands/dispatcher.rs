//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing the parsed flags to a command

use crate::cli::args::Cli;
use crate::error::Result;
use crate::installer::Installer;
use crate::ui::UserInterface;

use super::install::InstallCommand;
use super::list::ListCommand;
use super::uninstall::UninstallCommand;

/// Trait for command implementations.
pub trait Command {
    /// Execute the command.
    ///
    /// # Arguments
    ///
    /// * `installer` - Installer for the running platform
    /// * `ui` - User interface for displaying output and prompts
    fn execute(&self, installer: &Installer, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: u8,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: u8) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Routes the parsed command line to a command.
pub struct CommandDispatcher {
    installer: Installer,
}

impl CommandDispatcher {
    /// Dispatcher for the running platform.
    pub fn new() -> Result<Self> {
        Ok(Self::with_installer(Installer::new()?))
    }

    pub fn with_installer(installer: Installer) -> Self {
        Self { installer }
    }

    /// Pick the command selected by the flags and run it.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let tokens = cli.version_tokens();
        let prefix = cli.prefix.clone();

        if cli.list {
            ListCommand::new(prefix, cli.json).execute(&self.installer, ui)
        } else if cli.uninstall {
            UninstallCommand::new(tokens, prefix, cli.yes).execute(&self.installer, ui)
        } else {
            InstallCommand::new(tokens, prefix, cli.yes).execute(&self.installer, ui)
        }
    }
}
