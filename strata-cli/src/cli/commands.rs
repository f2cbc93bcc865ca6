//! Command implementations and argument parsing for the strata CLI.

use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::de::DeserializeOwned;
use strata_core::{
    ClusterPartition, ClusterRequest, ClusteringQualityError, ClusteringQualityScore,
    ErrorCategory, ExecutionStrategy, Metric, PointId, Strata, StrataError, compare_partitions,
};
use thiserror::Error;
use tracing::{Span, field, info, instrument};

/// Path argument that selects standard input instead of a file.
const STDIN_PATH: &str = "-";

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(name = "strata", about = "Density-based hierarchical clustering.")]
pub struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported CLI commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Cluster the points of a JSON request.
    Cluster(ClusterCommand),
    /// Score the agreement of two JSON partitions.
    Compare(CompareCommand),
}

/// Options accepted by the `cluster` command.
#[derive(Debug, Args, Clone)]
pub struct ClusterCommand {
    /// JSON request file, or `-` to read standard input.
    pub request: PathBuf,

    /// Override the request's minimum cluster size.
    #[arg(long = "min-cluster-size")]
    pub min_cluster_size: Option<usize>,

    /// Override the request's neighbour rank for core distances.
    #[arg(long = "min-samples")]
    pub min_samples: Option<usize>,

    /// Override the request's distance metric.
    #[arg(long, value_enum)]
    pub metric: Option<MetricArg>,

    /// Execution strategy for the data-parallel stages.
    #[arg(long, value_enum, default_value_t = StrategyArg::Auto)]
    pub strategy: StrategyArg,

    /// Output format written to standard output.
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
}

/// Options accepted by the `compare` command.
#[derive(Debug, Args, Clone)]
pub struct CompareCommand {
    /// First partition file.
    pub left: PathBuf,

    /// Second partition file.
    pub right: PathBuf,

    /// Output format written to standard output.
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
}

/// Metric names accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MetricArg {
    /// Straight-line distance between vectors.
    Euclidean,
    /// Sum of absolute component differences.
    Manhattan,
    /// One minus the cosine similarity of vectors.
    Cosine,
    /// Rows of the request's distance matrix.
    Precomputed,
}

impl From<MetricArg> for Metric {
    fn from(value: MetricArg) -> Self {
        match value {
            MetricArg::Euclidean => Self::Euclidean,
            MetricArg::Manhattan => Self::Manhattan,
            MetricArg::Cosine => Self::Cosine,
            MetricArg::Precomputed => Self::Precomputed,
        }
    }
}

/// Execution strategies accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyArg {
    /// Parallel when compiled in, sequential otherwise.
    Auto,
    /// Single-threaded.
    Sequential,
    /// Require the parallel backend.
    Parallel,
}

impl From<StrategyArg> for ExecutionStrategy {
    fn from(value: StrategyArg) -> Self {
        match value {
            StrategyArg::Auto => Self::Auto,
            StrategyArg::Sequential => Self::Sequential,
            StrategyArg::Parallel => Self::Parallel,
        }
    }
}

/// Rendering applied to command output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Machine-readable JSON.
    Json,
    /// Plain text for terminals.
    Human,
}

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// File I/O failed while reading an input.
    #[error("failed to read `{path}`: {source}")]
    Io {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// An input was not valid JSON for the expected document.
    #[error("`{path}` is not a valid document: {source}")]
    Json {
        /// Path of the malformed input.
        path: PathBuf,
        /// Underlying parse failure.
        #[source]
        source: serde_json::Error,
    },
    /// Clustering failed.
    #[error(transparent)]
    Core(#[from] StrataError),
    /// The partitions could not be compared.
    #[error(transparent)]
    Quality(#[from] ClusteringQualityError),
}

impl CliError {
    /// Stable machine-readable code for logs.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Io { .. } => "CLI_IO",
            Self::Json { .. } => "CLI_INVALID_DOCUMENT",
            Self::Core(error) => error.code().as_str(),
            Self::Quality(_) => "CLI_PARTITION_MISMATCH",
        }
    }

    /// Whether the failure is the caller's to fix or a defect to report.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Core(error) => error.category(),
            Self::Io { .. } | Self::Json { .. } | Self::Quality(_) => ErrorCategory::InvalidInput,
        }
    }

    /// Process exit status: 2 for invalid input, 1 for internal failures.
    #[must_use]
    pub fn exit_status(&self) -> u8 {
        match self.category() {
            ErrorCategory::InvalidInput => 2,
            ErrorCategory::InternalComputation => 1,
        }
    }
}

/// Result of a CLI command, ready for rendering.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutput {
    /// Clusters and outliers produced by `cluster`.
    Partition(ClusterPartition<PointId>),
    /// Agreement scores produced by `compare`.
    Comparison(ClusteringQualityScore),
}

/// Summarises the outcome of executing a CLI command.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionSummary {
    /// Command output.
    pub output: CommandOutput,
    /// Requested rendering.
    pub format: OutputFormat,
}

/// Executes the CLI command represented by `cli`.
///
/// # Errors
/// Returns [`CliError`] when an input cannot be read or parsed, when
/// clustering fails, or when the partitions cannot be compared.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use strata_cli::cli::{Cli, ClusterCommand, Command, CommandOutput, OutputFormat, StrategyArg, run_cli};
/// # use tempfile::NamedTempFile;
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let file = NamedTempFile::new()?;
/// std::fs::write(
///     file.path(),
///     r#"{"points": [{"id": "a", "vector": [0.0]}, {"id": "b", "vector": [0.1]},
///                    {"id": "c", "vector": [9.0]}, {"id": "d", "vector": [9.1]}],
///         "minClusterSize": 2, "minSamples": 1}"#,
/// )?;
/// let cli = Cli {
///     command: Command::Cluster(ClusterCommand {
///         request: file.path().to_path_buf(),
///         min_cluster_size: None,
///         min_samples: None,
///         metric: None,
///         strategy: StrategyArg::Sequential,
///         format: OutputFormat::Json,
///     }),
/// };
/// let summary = run_cli(cli)?;
/// let CommandOutput::Partition(partition) = summary.output else { unreachable!() };
/// assert_eq!(partition.cluster_count(), 2);
/// # Ok(())
/// # }
/// ```
#[instrument(name = "cli.run", err, skip(cli), fields(command = field::Empty))]
pub fn run_cli(cli: Cli) -> Result<ExecutionSummary, CliError> {
    let span = Span::current();
    match cli.command {
        Command::Cluster(command) => {
            span.record("command", "cluster");
            run_cluster(command)
        }
        Command::Compare(command) => {
            span.record("command", "compare");
            run_compare(&command)
        }
    }
}

#[instrument(
    name = "cli.cluster",
    err,
    skip(command),
    fields(path = %command.request.display(), strategy = ?command.strategy),
)]
pub(super) fn run_cluster(command: ClusterCommand) -> Result<ExecutionSummary, CliError> {
    let request: ClusterRequest = load_json(&command.request)?;
    let request = apply_overrides(request, &command);
    let partition = Strata::cluster_with(&request, command.strategy.into())?;
    info!(
        points = request.points.len(),
        clusters = partition.cluster_count(),
        outliers = partition.outliers().len(),
        "cluster command completed"
    );
    Ok(ExecutionSummary {
        output: CommandOutput::Partition(partition),
        format: command.format,
    })
}

pub(super) fn apply_overrides(
    mut request: ClusterRequest,
    command: &ClusterCommand,
) -> ClusterRequest {
    if let Some(min_cluster_size) = command.min_cluster_size {
        request.min_cluster_size = min_cluster_size;
    }
    if let Some(min_samples) = command.min_samples {
        request.min_samples = Some(min_samples);
    }
    if let Some(metric) = command.metric {
        request.metric = metric.into();
    }
    request
}

#[instrument(
    name = "cli.compare",
    err,
    skip(command),
    fields(left = %command.left.display(), right = %command.right.display()),
)]
pub(super) fn run_compare(command: &CompareCommand) -> Result<ExecutionSummary, CliError> {
    let left: ClusterPartition<PointId> = load_json(&command.left)?;
    let right: ClusterPartition<PointId> = load_json(&command.right)?;
    let score = compare_partitions(&left, &right)?;
    info!(ari = score.ari, nmi = score.nmi, "compare command completed");
    Ok(ExecutionSummary {
        output: CommandOutput::Comparison(score),
        format: command.format,
    })
}

#[instrument(name = "cli.load_json", err, skip(path), fields(path = %path.display()))]
pub(super) fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let io_error = |source| CliError::Io {
        path: path.to_path_buf(),
        source,
    };
    let reader: Box<dyn Read> = if path.as_os_str() == STDIN_PATH {
        Box::new(io::stdin().lock())
    } else {
        Box::new(BufReader::new(File::open(path).map_err(io_error)?))
    };
    serde_json::from_reader(reader).map_err(|source| {
        if source.is_io() {
            io_error(io::Error::from(source))
        } else {
            CliError::Json {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}

/// Renders `summary` to `writer` in its requested format.
///
/// # Errors
/// Returns [`io::Error`] if writing to the supplied writer fails.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use strata_cli::cli::{CommandOutput, ExecutionSummary, OutputFormat, render_summary};
/// # use strata_core::ClusterPartition;
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let summary = ExecutionSummary {
///     output: CommandOutput::Partition(ClusterPartition::from_parts(
///         vec![vec!["a".into(), "b".into()]],
///         vec!["c".into()],
///     )),
///     format: OutputFormat::Human,
/// };
/// let mut buffer = Vec::new();
/// render_summary(&summary, &mut buffer)?;
/// assert_eq!(String::from_utf8(buffer)?, "clusters: 1\ncluster 0 (2): a, b\noutliers (1): c\n");
/// # Ok(())
/// # }
/// ```
pub fn render_summary(summary: &ExecutionSummary, mut writer: impl Write) -> io::Result<()> {
    match (&summary.output, summary.format) {
        (CommandOutput::Partition(partition), OutputFormat::Json) => {
            serde_json::to_writer_pretty(&mut writer, partition)?;
            writeln!(writer)
        }
        (CommandOutput::Partition(partition), OutputFormat::Human) => {
            writeln!(writer, "clusters: {}", partition.cluster_count())?;
            for (index, members) in partition.clusters().iter().enumerate() {
                writeln!(writer, "cluster {index} ({}): {}", members.len(), join(members))?;
            }
            let outliers = partition.outliers();
            writeln!(writer, "outliers ({}): {}", outliers.len(), join(outliers))
        }
        (CommandOutput::Comparison(score), OutputFormat::Json) => {
            let value = serde_json::json!({ "ari": score.ari, "nmi": score.nmi });
            serde_json::to_writer_pretty(&mut writer, &value)?;
            writeln!(writer)
        }
        (CommandOutput::Comparison(score), OutputFormat::Human) => {
            writeln!(writer, "ari: {:.6}", score.ari)?;
            writeln!(writer, "nmi: {:.6}", score.nmi)
        }
    }
}

fn join(ids: &[PointId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
