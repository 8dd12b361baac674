//! `install_matlab_runtime` entry point.

use std::io::IsTerminal;
use std::process::ExitCode;

use clap::Parser;
use matlab_runtime::cli::{Cli, CommandDispatcher};
use matlab_runtime::error::RuntimeError;
use matlab_runtime::platform::{is_ci, privilege_hint};
use matlab_runtime::ui::{create_ui, OutputMode};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber for logging.
///
/// Log level is controlled by:
/// 1. `--debug` flag sets level to DEBUG
/// 2. `RUST_LOG` environment variable (if set)
/// 3. Default is WARN
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("matlab_runtime=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("matlab_runtime=warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    tracing::debug!("install_matlab_runtime starting with args: {:?}", cli);

    let output_mode = if cli.quiet {
        OutputMode::Quiet
    } else if cli.verbose {
        OutputMode::Verbose
    } else {
        OutputMode::Normal
    };

    if cli.no_color {
        std::env::set_var("NO_COLOR", "1");
    }

    let is_interactive = !is_ci() && std::io::stdin().is_terminal();
    let mut ui = create_ui(is_interactive, output_mode);

    let outcome = CommandDispatcher::new().and_then(|dispatcher| dispatcher.dispatch(&cli, ui.as_mut()));
    match outcome {
        Ok(result) => ExitCode::from(result.exit_code),
        Err(e) => {
            ui.error(&format!("Error: {}", e));
            if matches!(e, RuntimeError::PermissionDenied { .. }) {
                ui.error(&format!("Hint: {}", privilege_hint()));
            }
            ExitCode::from(e.exit_code())
        }
    }
}
