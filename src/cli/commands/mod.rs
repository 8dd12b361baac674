//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results.
//!
//! # Architecture
//!
//! There are no subcommands; [`CommandDispatcher`] picks the command from
//! the flags (`--list`, `--uninstall`, else install) and hands it the
//! platform [`Installer`](crate::installer::Installer).

pub mod dispatcher;
pub mod install;
pub mod list;
pub mod uninstall;

pub use dispatcher::{Command, CommandDispatcher, CommandResult};
