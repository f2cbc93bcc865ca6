//! Unit tests for the CLI commands and rendering.

use super::commands::{apply_overrides, load_json};
use super::test_helpers::{cluster_cli, run_cli_expecting_error, temp_dir, write_json};
use super::{
    Cli, CliError, ClusterCommand, Command, CommandOutput, CompareCommand, ExecutionSummary,
    MetricArg, OutputFormat, StrategyArg, render_summary, run_cli,
};

use clap::Parser;
use rstest::{fixture, rstest};
use serde_json::{Value, json};
use strata_core::{
    ClusterPartition, ClusterRequest, ClusteringQualityScore, ErrorCategory, Metric, Point,
    PointId, StrataError,
};
use strata_test_support::tracing::RecordingLayer;
use tracing::Level;

type TestResult = Result<(), Box<dyn std::error::Error>>;

#[fixture]
fn two_groups() -> Value {
    json!({
        "points": [
            { "id": "a", "vector": [0.0, 0.0] },
            { "id": "b", "vector": [0.1, 0.0] },
            { "id": "c", "vector": [0.0, 0.1] },
            { "id": "d", "vector": [9.0, 9.0] },
            { "id": "e", "vector": [9.1, 9.0] },
            { "id": "f", "vector": [9.0, 9.1] },
            { "id": "g", "vector": [60.0, -40.0] }
        ],
        "minClusterSize": 3,
        "minSamples": 2
    })
}

fn rendered(summary: &ExecutionSummary) -> Result<String, Box<dyn std::error::Error>> {
    let mut buffer = Vec::new();
    render_summary(summary, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

#[rstest]
fn cluster_prints_partition_as_json(two_groups: Value) -> TestResult {
    let dir = temp_dir();
    let path = write_json(&dir, "request.json", &two_groups)?;

    let summary = run_cli(cluster_cli(path, OutputFormat::Json))?;
    let printed: Value = serde_json::from_str(&rendered(&summary)?)?;

    assert_eq!(
        printed,
        json!({ "clusters": [["a", "b", "c"], ["d", "e", "f"]], "outliers": ["g"] })
    );
    Ok(())
}

#[rstest]
fn cluster_prints_partition_for_humans(two_groups: Value) -> TestResult {
    let dir = temp_dir();
    let path = write_json(&dir, "request.json", &two_groups)?;

    let summary = run_cli(cluster_cli(path, OutputFormat::Human))?;

    assert_eq!(
        rendered(&summary)?,
        "clusters: 2\ncluster 0 (3): a, b, c\ncluster 1 (3): d, e, f\noutliers (1): g\n"
    );
    Ok(())
}

#[rstest]
fn flags_override_request_parameters() {
    let request = ClusterRequest::new(vec![Point::vector("a", vec![0.0])], 5).with_min_samples(4);
    let command = ClusterCommand {
        request: "unused.json".into(),
        min_cluster_size: Some(3),
        min_samples: None,
        metric: Some(MetricArg::Cosine),
        strategy: StrategyArg::Auto,
        format: OutputFormat::Json,
    };

    let updated = apply_overrides(request, &command);

    assert_eq!(updated.min_cluster_size, 3);
    assert_eq!(updated.min_samples, Some(4));
    assert_eq!(updated.metric, Metric::Cosine);
}

#[rstest]
fn min_cluster_size_flag_reaches_the_engine(two_groups: Value) -> TestResult {
    let dir = temp_dir();
    let path = write_json(&dir, "request.json", &two_groups)?;
    let cli = Cli::try_parse_from([
        "strata",
        "cluster",
        path.to_str().ok_or("non-utf8 temp path")?,
        "--min-cluster-size",
        "1",
    ])?;

    let err = run_cli_expecting_error(cli, "min cluster size 1 must be rejected");

    assert!(matches!(
        err,
        CliError::Core(StrataError::InvalidMinClusterSize { got: 1 })
    ));
    assert_eq!(err.code(), "STRATA_INVALID_MIN_CLUSTER_SIZE");
    assert_eq!(err.exit_status(), 2);
    Ok(())
}

#[rstest]
fn missing_request_file_is_an_io_error() {
    let dir = temp_dir();
    let cli = cluster_cli(dir.path().join("absent.json"), OutputFormat::Json);

    let err = run_cli_expecting_error(cli, "missing file must fail");

    assert!(matches!(err, CliError::Io { .. }));
    assert_eq!(err.code(), "CLI_IO");
    assert_eq!(err.category(), ErrorCategory::InvalidInput);
}

#[rstest]
#[case::not_json("request.json", "{ points: ")]
#[case::wrong_shape("request.json", "{ \"points\": 3, \"minClusterSize\": 2 }")]
fn malformed_request_is_rejected(#[case] name: &str, #[case] contents: &str) -> TestResult {
    let dir = temp_dir();
    let path = dir.path().join(name);
    std::fs::write(&path, contents)?;

    let err = load_json::<ClusterRequest>(&path).expect_err("malformed request");

    assert!(matches!(err, CliError::Json { .. }));
    assert_eq!(err.code(), "CLI_INVALID_DOCUMENT");
    Ok(())
}

#[rstest]
fn compare_scores_relabelled_partitions() -> TestResult {
    let dir = temp_dir();
    let left = write_json(
        &dir,
        "left.json",
        &json!({ "clusters": [["a", "b"], [1, 2]], "outliers": ["z"] }),
    )?;
    let right = write_json(
        &dir,
        "right.json",
        &json!({ "clusters": [[2, 1], ["b", "a"]], "outliers": ["z"] }),
    )?;
    let cli = Cli {
        command: Command::Compare(CompareCommand {
            left,
            right,
            format: OutputFormat::Human,
        }),
    };

    let summary = run_cli(cli)?;

    let CommandOutput::Comparison(score) = &summary.output else {
        panic!("expected a comparison");
    };
    assert!((score.ari - 1.0).abs() < 1e-9, "ari {}", score.ari);
    assert!((score.nmi - 1.0).abs() < 1e-9, "nmi {}", score.nmi);
    assert_eq!(rendered(&summary)?, "ari: 1.000000\nnmi: 1.000000\n");
    Ok(())
}

#[rstest]
fn compare_rejects_different_identifier_sets() -> TestResult {
    let dir = temp_dir();
    let left = write_json(&dir, "left.json", &json!({ "clusters": [["a", "b"]], "outliers": [] }))?;
    let right = write_json(&dir, "right.json", &json!({ "clusters": [["a", "c"]], "outliers": [] }))?;
    let cli = Cli::try_parse_from([
        "strata",
        "compare",
        left.to_str().ok_or("non-utf8 temp path")?,
        right.to_str().ok_or("non-utf8 temp path")?,
    ])?;

    let err = run_cli_expecting_error(cli, "different ids must fail");

    assert!(matches!(err, CliError::Quality(_)));
    assert_eq!(err.code(), "CLI_PARTITION_MISMATCH");
    Ok(())
}

#[rstest]
fn comparison_renders_as_json() -> TestResult {
    let summary = ExecutionSummary {
        output: CommandOutput::Comparison(ClusteringQualityScore { ari: 0.5, nmi: 0.25 }),
        format: OutputFormat::Json,
    };

    let printed: Value = serde_json::from_str(&rendered(&summary)?)?;

    assert_eq!(printed, json!({ "ari": 0.5, "nmi": 0.25 }));
    Ok(())
}

#[rstest]
fn partition_without_outliers_renders_empty_list() -> TestResult {
    let summary = ExecutionSummary {
        output: CommandOutput::Partition(ClusterPartition::from_parts(
            vec![vec![PointId::Int(4), PointId::Int(2)]],
            vec![],
        )),
        format: OutputFormat::Human,
    };

    assert_eq!(rendered(&summary)?, "clusters: 1\ncluster 0 (2): 4, 2\noutliers (0): \n");
    Ok(())
}

#[rstest]
#[case::defaults(&["strata", "cluster", "req.json"], None, StrategyArg::Auto, OutputFormat::Json)]
#[case::overrides(
    &["strata", "cluster", "req.json", "--metric", "manhattan", "--strategy", "sequential", "--format", "human"],
    Some(MetricArg::Manhattan),
    StrategyArg::Sequential,
    OutputFormat::Human,
)]
fn clap_parses_cluster_flags(
    #[case] args: &[&str],
    #[case] metric: Option<MetricArg>,
    #[case] strategy: StrategyArg,
    #[case] format: OutputFormat,
) {
    let cli = Cli::try_parse_from(args).expect("arguments must parse");
    let Command::Cluster(command) = cli.command else {
        panic!("expected the cluster command");
    };
    assert_eq!(command.metric, metric);
    assert_eq!(command.strategy, strategy);
    assert_eq!(command.format, format);
}

#[rstest]
#[case::unknown_metric(&["strata", "cluster", "req.json", "--metric", "chebyshev"])]
#[case::missing_request(&["strata", "cluster"])]
#[case::missing_right(&["strata", "compare", "left.json"])]
#[case::negative_size(&["strata", "cluster", "req.json", "--min-cluster-size", "-2"])]
fn clap_rejects_invalid_arguments(#[case] args: &[&str]) {
    assert!(Cli::try_parse_from(args).is_err());
}

#[rstest]
fn cluster_records_cli_spans(two_groups: Value) -> TestResult {
    let dir = temp_dir();
    let path = write_json(&dir, "request.json", &two_groups)?;
    let cli = cluster_cli(path, OutputFormat::Json);

    let (result, layer) = RecordingLayer::capture(|| run_cli(cli));
    result?;

    let run = layer.find_span("cli.run").ok_or("cli.run span must exist")?;
    assert_eq!(run.fields.get("command").map(String::as_str), Some("cluster"));
    let cluster = layer
        .find_span("cli.cluster")
        .ok_or("cli.cluster span must exist")?;
    assert_eq!(cluster.fields.get("strategy").map(String::as_str), Some("Sequential"));
    assert!(layer.find_span("core.cluster").is_some());

    let completed = layer
        .find_event("message", "cluster command completed")
        .ok_or("completion event must exist")?;
    assert_eq!(completed.level, Level::INFO);
    assert_eq!(completed.fields.get("clusters").map(String::as_str), Some("2"));
    assert_eq!(completed.fields.get("outliers").map(String::as_str), Some("1"));
    Ok(())
}
