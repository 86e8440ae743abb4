//! Entry point of the `robustness` binary.
//!
//! Logging is installed before anything else so every command emits structured diagnostics on
//! stderr, while the command's report goes to stdout.

use std::{
    io::{self, BufWriter, Write},
    process::ExitCode,
};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::error;

use robustness::{
    cli::{render_report, run_cli, Cli},
    logging::{self, LoggingError},
};

fn try_main() -> Result<()> {
    let cli = Cli::parse();
    let report = run_cli(cli).context("failed to execute command")?;

    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());
    render_report(&report, &mut writer).context("failed to render report")?;
    writer.flush().context("failed to flush output")?;

    Ok(())
}

fn main() -> ExitCode {
    if let Err(err) = logging::init_logging() {
        report_logging_error(&err);
        return ExitCode::FAILURE;
    }

    if let Err(err) = try_main() {
        error!(error = format!("{err:#}"), "command failed");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

// Tracing isn't available yet, so this one goes straight to stderr.
fn report_logging_error(err: &LoggingError) {
    eprintln!("failed to initialise logging: {err}");
}
