//! Deterministic point layouts for clustering tests and benchmarks.
//!
//! Layouts are generated without randomness so expected labels stay stable
//! across platforms and runs.

/// Points arranged on a small spiral around each centre.
///
/// Every blob contributes `per_blob` points whose offsets from the centre
/// grow linearly up to `spread`. Blobs are emitted in centre order, so point
/// `i` belongs to blob `i / per_blob`.
///
/// # Examples
/// ```
/// use strata_test_support::fixtures::spiral_blobs;
///
/// let points = spiral_blobs(&[[0.0, 0.0], [10.0, 10.0]], 4, 0.5);
/// assert_eq!(points.len(), 8);
/// assert!(points[4][0] > 9.0);
/// ```
#[must_use]
pub fn spiral_blobs(centres: &[[f32; 2]], per_blob: usize, spread: f32) -> Vec<Vec<f32>> {
    let mut points = Vec::with_capacity(centres.len() * per_blob);
    for centre in centres {
        for step in 0..per_blob {
            let (dx, dy) = spiral_offset(step, per_blob, spread);
            points.push(vec![centre[0] + dx, centre[1] + dy]);
        }
    }
    points
}

/// Ground-truth blob index for each point produced by [`spiral_blobs`].
#[must_use]
pub fn blob_labels(blobs: usize, per_blob: usize) -> Vec<usize> {
    (0..blobs)
        .flat_map(|blob| std::iter::repeat_n(blob, per_blob))
        .collect()
}

/// Full symmetric matrix of pairwise distances under `metric`.
///
/// # Examples
/// ```
/// use strata_test_support::fixtures::{euclidean, pairwise_matrix};
///
/// let matrix = pairwise_matrix(&[vec![0.0, 0.0], vec![3.0, 4.0]], euclidean);
/// assert_eq!(matrix, vec![vec![0.0, 5.0], vec![5.0, 0.0]]);
/// ```
#[must_use]
pub fn pairwise_matrix(points: &[Vec<f32>], metric: fn(&[f32], &[f32]) -> f32) -> Vec<Vec<f32>> {
    points
        .iter()
        .map(|left| {
            points
                .iter()
                .map(|right| metric(left, right))
                .collect()
        })
        .collect()
}

/// Euclidean distance used by matrix fixtures.
#[must_use]
pub fn euclidean(left: &[f32], right: &[f32]) -> f32 {
    left.iter()
        .zip(right)
        .map(|(a, b)| (a - b) * (a - b))
        .sum::<f32>()
        .sqrt()
}

fn spiral_offset(step: usize, total: usize, spread: f32) -> (f32, f32) {
    if total <= 1 {
        return (0.0, 0.0);
    }
    #[expect(
        clippy::cast_precision_loss,
        reason = "fixture sizes stay far below f32 precision limits"
    )]
    let (step, total) = (step as f32, total as f32);
    let radius = spread * step / (total - 1.0);
    // Golden-angle turns keep neighbouring offsets apart.
    let angle = step * 2.399_963;
    (radius * angle.cos(), radius * angle.sin())
}
