//! CLI entry point for strata.
//!
//! Parses command-line arguments with clap, runs the selected command,
//! renders its output to stdout and maps failures to exit codes. Logging is
//! initialised first so every later step can emit structured diagnostics.

use std::io::{self, BufWriter, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use strata_cli::{
    cli::{Cli, CliError, render_summary, run_cli},
    logging::{self, LoggingError},
};
use tracing::{error, field};

/// Parse CLI arguments, execute the command, render the output, and flush the
/// output stream.
fn try_main() -> Result<()> {
    let cli = Cli::parse();
    let summary = run_cli(cli).context("failed to execute command")?;
    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());
    render_summary(&summary, &mut writer).context("failed to render output")?;
    writer.flush().context("failed to flush output")?;
    Ok(())
}

fn main() -> ExitCode {
    if let Err(err) = logging::init_logging() {
        report_logging_init_error(&err);
        return ExitCode::FAILURE;
    }

    let Err(err) = try_main() else {
        return ExitCode::SUCCESS;
    };

    let Some(cli_error) = err.downcast_ref::<CliError>() else {
        error!(error = %format!("{err:#}"), "command execution failed");
        return ExitCode::FAILURE;
    };
    let data_source_code = match cli_error {
        CliError::Core(core) => core.data_source_code(),
        _ => None,
    };
    error!(
        error = %format!("{err:#}"),
        code = cli_error.code(),
        category = %cli_error.category(),
        data_source_code = data_source_code.map(|code| field::display(code.as_str())),
        "command execution failed"
    );
    ExitCode::from(cli_error.exit_status())
}

#[expect(
    clippy::print_stderr,
    reason = "Emit one-off diagnostic before tracing is initialized"
)]
fn report_logging_init_error(err: &LoggingError) {
    eprintln!("failed to initialize logging: {err}");
}
