//! CLI argument definitions.
//!
//! The installer has no subcommands: the default action installs, and
//! `--uninstall` / `--list` switch to the other two.

use clap::Parser;
use std::path::PathBuf;

use crate::prefix::PREFIX_ENV;
use crate::version::VersionToken;

/// Install or uninstall the MATLAB Runtime.
#[derive(Debug, Parser)]
#[command(name = "install_matlab_runtime")]
#[command(author, about, long_about = None)]
#[command(disable_version_flag = true)]
pub struct Cli {
    /// Version(s) to install or uninstall: a release (R2024b), a numeric
    /// version (24.2), `latest`, `latest_installed` or `all`
    #[arg(short = 'v', long = "version", value_name = "VERSION", num_args = 1..)]
    pub versions: Vec<String>,

    /// Installation prefix
    #[arg(short, long, env = PREFIX_ENV, value_name = "PATH")]
    pub prefix: Option<PathBuf>,

    /// Uninstall instead of installing
    #[arg(short, long, conflicts_with = "list")]
    pub uninstall: bool,

    /// Answer yes to every question, including the license agreement
    #[arg(short, long)]
    pub yes: bool,

    /// List known releases and which are installed
    #[arg(long)]
    pub list: bool,

    /// Print the listing as JSON
    #[arg(long, requires = "list")]
    pub json: bool,

    /// Show verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    /// The requested version tokens; empty means the mode default.
    pub fn version_tokens(&self) -> Vec<VersionToken> {
        VersionToken::parse_list(&self.versions)
    }
}
