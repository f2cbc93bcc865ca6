//! Command-line interface orchestration for strata.
//!
//! `cluster` reads a JSON request, optionally overrides its parameters and
//! prints the resulting partition. `compare` scores two partition files
//! against each other.

mod commands;

pub use commands::{
    Cli, CliError, ClusterCommand, Command, CommandOutput, CompareCommand, ExecutionSummary,
    MetricArg, OutputFormat, StrategyArg, render_summary, run_cli,
};

#[cfg(test)]
mod test_helpers;
#[cfg(test)]
mod tests;
