//! Integration tests for the distance kernels and providers exported by
//! `strata-core`.

use strata_core::{
    CosineNorms, DataSource, DataSourceError, DistanceError, DistanceMatrix, RowSelection,
    VectorKind, VectorMetric, VectorSource, cosine_distance, euclidean_distance,
    manhattan_distance,
};
use rstest::rstest;

#[rstest]
#[case(vec![0.0_f32, 0.0], vec![0.0_f32, 0.0], 0.0_f32)]
#[case(vec![1.0_f32, 2.0], vec![4.0_f32, 6.0], 5.0_f32)]
#[case(vec![1.0_f32, 2.0, 3.0], vec![4.0_f32, 6.0, 8.0], 50.0_f32.sqrt())]
fn euclidean_distance_returns_expected(
    #[case] left: Vec<f32>,
    #[case] right: Vec<f32>,
    #[case] expected: f32,
) {
    let distance = euclidean_distance(&left, &right).expect("distance should succeed");
    assert!((distance.value() - expected).abs() < 1e-6);
}

#[rstest]
#[case(vec![1.0_f32, 2.0], vec![4.0_f32, 6.0], 7.0_f32)]
#[case(vec![-1.0_f32], vec![1.0_f32], 2.0_f32)]
fn manhattan_distance_returns_expected(
    #[case] left: Vec<f32>,
    #[case] right: Vec<f32>,
    #[case] expected: f32,
) {
    let distance = manhattan_distance(&left, &right).expect("distance should succeed");
    assert_eq!(distance.value(), expected);
}

#[rstest]
#[case(vec![1.0_f32, 0.0], vec![1.0_f32, 0.0], 0.0_f32)]
#[case(vec![1.0_f32, 0.0], vec![-1.0_f32, 0.0], 2.0_f32)]
#[case(vec![1.0_f32, 0.0, 0.0], vec![0.0_f32, 1.0, 0.0], 1.0_f32)]
#[case(vec![2.0_f32, 2.0], vec![5.0_f32, 5.0], 0.0_f32)]
fn cosine_distance_returns_expected(
    #[case] left: Vec<f32>,
    #[case] right: Vec<f32>,
    #[case] expected: f32,
) {
    let distance = cosine_distance(&left, &right, None).expect("distance should succeed");
    assert!((distance.value() - expected).abs() < 1e-6);

    let norms = CosineNorms::from_vectors(&left, &right).expect("norms");
    let cached = cosine_distance(&left, &right, Some(norms)).expect("cached norms");
    assert_eq!(distance, cached);
}

#[test]
fn kernels_reject_dimension_mismatch() {
    let error =
        euclidean_distance(&[1.0_f32], &[1.0_f32, 2.0_f32]).expect_err("dimensions must match");
    assert_eq!(error, DistanceError::DimensionMismatch { left: 1, right: 2 });
}

#[test]
fn kernels_reject_zero_length() {
    let empty: [f32; 0] = [];
    let error = manhattan_distance(&empty, &empty).expect_err("empty input");
    assert_eq!(error, DistanceError::ZeroLength);
}

#[test]
fn kernels_reject_non_finite_values() {
    let error = cosine_distance(&[0.0_f32], &[f32::INFINITY], None).expect_err("reject inf");
    assert!(matches!(
        error,
        DistanceError::NonFinite {
            which: VectorKind::Right,
            index: 0,
            ..
        }
    ));
}

#[rstest]
#[case(VectorMetric::Euclidean, 5.0)]
#[case(VectorMetric::Manhattan, 7.0)]
fn vector_source_uses_its_metric(#[case] metric: VectorMetric, #[case] expected: f32) {
    let source = VectorSource::try_new("v", vec![vec![0.0, 0.0], vec![3.0, 4.0]], metric)
        .expect("valid vectors");
    assert_eq!(source.metric(), metric);
    assert!((source.distance(0, 1).expect("in range") - expected).abs() < 1e-6);
    assert_eq!(source.distance(1, 1).expect("in range"), 0.0);
}

#[rstest]
#[case::empty(vec![], DataSourceError::EmptyData)]
#[case::zero_dimension(vec![vec![], vec![]], DataSourceError::ZeroDimension)]
#[case::ragged(
    vec![vec![0.0, 1.0], vec![2.0]],
    DataSourceError::DimensionMismatch { index: 1, expected: 2, found: 1 },
)]
fn vector_source_rejects_malformed_rows(
    #[case] rows: Vec<Vec<f32>>,
    #[case] expected: DataSourceError,
) {
    let err = VectorSource::try_new("v", rows, VectorMetric::Euclidean).expect_err("malformed");
    assert_eq!(err, expected);
}

#[test]
fn vector_source_rejects_nan_components() {
    let err = VectorSource::try_new("v", vec![vec![0.0], vec![f32::NAN]], VectorMetric::Euclidean)
        .expect_err("nan component");
    assert!(matches!(
        err,
        DataSourceError::NonFiniteComponent {
            index: 1,
            component: 0,
            ..
        }
    ));
}

#[rstest]
#[case::not_square(
    vec![vec![0.0, 1.0], vec![1.0]],
    DataSourceError::MatrixNotSquare { row: 1, expected: 2, found: 1 },
)]
#[case::negative(
    vec![vec![0.0, -1.0], vec![-1.0, 0.0]],
    DataSourceError::NegativeEntry { row: 0, column: 1, value: -1.0 },
)]
#[case::diagonal(
    vec![vec![0.5, 1.0], vec![1.0, 0.0]],
    DataSourceError::NonZeroDiagonal { index: 0, value: 0.5 },
)]
#[case::asymmetric(
    vec![vec![0.0, 1.0], vec![1.5, 0.0]],
    DataSourceError::Asymmetric { row: 0, column: 1, upper: 1.0, lower: 1.5 },
)]
fn matrix_rejects_invalid_entries(#[case] rows: Vec<Vec<f32>>, #[case] expected: DataSourceError) {
    let err = DistanceMatrix::try_new("m", rows).expect_err("invalid matrix");
    assert_eq!(err, expected);
}

#[test]
fn matrix_tolerates_rounding_asymmetry_and_reads_upper_triangle() {
    let matrix = DistanceMatrix::try_new(
        "m",
        vec![vec![0.0, 1.0], vec![1.000_001, 0.0]],
    )
    .expect("within tolerance");
    assert_eq!(matrix.distance(0, 1).expect("in range"), 1.0);
    assert_eq!(matrix.distance(1, 0).expect("in range"), 1.0);
}

#[test]
fn cosine_matrix_matches_pairwise_kernel() {
    let rows = vec![vec![1.0, 2.0], vec![-2.0, 1.0], vec![3.0, 3.0], vec![0.0, 0.0]];
    let matrix = DistanceMatrix::from_cosine("cos", rows.clone()).expect("valid vectors");
    for (i, left) in rows.iter().enumerate() {
        for (j, right) in rows.iter().enumerate() {
            let expected = if i == j {
                0.0
            } else {
                cosine_distance(left, right, None).expect("valid").value()
            };
            let found = matrix.distance(i, j).expect("in range");
            assert!((found - expected).abs() < 1e-6, "({i}, {j}): {found} vs {expected}");
        }
    }
}

#[test]
fn row_selection_shares_the_matrix_name() {
    let matrix = DistanceMatrix::try_new("shared", vec![vec![0.0, 3.0], vec![3.0, 0.0]])
        .expect("valid");
    let selection = RowSelection::try_new(&matrix, vec![0, 1, 1]).expect("rows exist");
    assert_eq!(selection.name(), "shared");
    assert_eq!(selection.distance(1, 2).expect("in range"), 0.0);
    assert_eq!(
        selection.distance(0, 3),
        Err(DataSourceError::OutOfBounds { index: 3 })
    );
}
