//! JSON shape of requests and partitions.
#![cfg(feature = "serde")]

use rstest::rstest;
use serde_json::json;
use strata_core::{ClusterPartition, ClusterRequest, Features, Metric, Point, PointId, Strata};

#[rstest]
fn request_reads_camel_case_payload() {
    let payload = json!({
        "points": [
            { "id": "a", "vector": [0.0, 1.0] },
            { "id": 7, "vector": [2.0, 3.0] }
        ],
        "minClusterSize": 2,
        "minSamples": 1,
        "distanceMetric": "manhattan"
    });

    let request: ClusterRequest = serde_json::from_value(payload).expect("valid payload");

    assert_eq!(request.min_cluster_size, 2);
    assert_eq!(request.min_samples, Some(1));
    assert_eq!(request.metric, Metric::Manhattan);
    assert_eq!(request.points[0].id, PointId::from("a"));
    assert_eq!(request.points[1].id, PointId::Int(7));
    assert_eq!(request.points[1].features, Features::Vector(vec![2.0, 3.0]));
    assert!(request.distance_matrix.is_none());
}

#[rstest]
fn min_points_is_accepted_and_metric_defaults_to_euclidean() {
    let payload = json!({
        "points": [{ "id": 1, "vector": [0.0] }],
        "minPoints": 3
    });

    let request: ClusterRequest = serde_json::from_value(payload).expect("valid payload");

    assert_eq!(request.min_cluster_size, 3);
    assert_eq!(request.min_samples, None);
    assert_eq!(request.effective_min_samples(), 3);
    assert_eq!(request.metric, Metric::Euclidean);
}

#[rstest]
fn precomputed_request_uses_rows() {
    let payload = json!({
        "points": [{ "id": "x", "row": 1 }, { "id": "y", "row": 0 }],
        "minClusterSize": 2,
        "distanceMetric": "precomputed",
        "distanceMatrix": [[0.0, 1.0], [1.0, 0.0]]
    });

    let request: ClusterRequest = serde_json::from_value(payload).expect("valid payload");

    assert_eq!(request.points[0], Point::row("x", 1));
    assert_eq!(request.distance_matrix, Some(vec![vec![0.0, 1.0], vec![1.0, 0.0]]));
}

#[rstest]
#[case::unknown_metric(json!({ "points": [], "minClusterSize": 2, "distanceMetric": "chebyshev" }))]
#[case::missing_size(json!({ "points": [] }))]
#[case::float_id(json!({ "points": [{ "id": 1.5, "vector": [0.0] }], "minClusterSize": 2 }))]
fn malformed_payloads_are_rejected(#[case] payload: serde_json::Value) {
    assert!(serde_json::from_value::<ClusterRequest>(payload).is_err());
}

#[rstest]
fn request_serializes_without_absent_options() {
    let request = ClusterRequest::new(vec![Point::vector(1_i64, vec![0.5])], 2);

    let value = serde_json::to_value(&request).expect("serializable");

    assert_eq!(
        value,
        json!({
            "points": [{ "id": 1, "vector": [0.5] }],
            "minClusterSize": 2,
            "distanceMetric": "euclidean"
        })
    );
}

#[rstest]
fn partition_round_trips_through_json() {
    let payload = json!({
        "points": [
            { "id": "a", "vector": [0.0] },
            { "id": "b", "vector": [0.1] },
            { "id": "c", "vector": [0.2] },
            { "id": "d", "vector": [40.0] }
        ],
        "minClusterSize": 3,
        "minSamples": 2
    });
    let request: ClusterRequest = serde_json::from_value(payload).expect("valid payload");

    let partition = Strata::cluster(&request).expect("request must succeed");
    let value = serde_json::to_value(&partition).expect("serializable");

    assert_eq!(value, json!({ "clusters": [["a", "b", "c"]], "outliers": ["d"] }));
    let back: ClusterPartition<PointId> = serde_json::from_value(value).expect("round trip");
    assert_eq!(back, partition);
}
