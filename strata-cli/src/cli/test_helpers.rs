//! Small helpers shared across CLI tests.
//!
//! Tests write requests and partitions into a temporary directory and drive
//! the commands through [`run_cli`].

use std::fs;
use std::io;
use std::path::PathBuf;

use serde_json::Value;
use tempfile::TempDir;

use super::{Cli, CliError, ClusterCommand, Command, OutputFormat, StrategyArg, run_cli};

pub(super) fn temp_dir() -> TempDir {
    match TempDir::new() {
        Ok(dir) => dir,
        Err(err) => panic!("failed to create temp dir: {err}"),
    }
}

pub(super) fn write_json(dir: &TempDir, name: &str, value: &Value) -> io::Result<PathBuf> {
    let path = dir.path().join(name);
    fs::write(&path, value.to_string())?;
    Ok(path)
}

/// A `cluster` invocation with no overrides.
pub(super) fn cluster_cli(request: PathBuf, format: OutputFormat) -> Cli {
    Cli {
        command: Command::Cluster(ClusterCommand {
            request,
            min_cluster_size: None,
            min_samples: None,
            metric: None,
            strategy: StrategyArg::Sequential,
            format,
        }),
    }
}

pub(super) fn run_cli_expecting_error(cli: Cli, panic_msg: &str) -> CliError {
    match run_cli(cli) {
        Ok(_) => panic!("{panic_msg}"),
        Err(err) => err,
    }
}
