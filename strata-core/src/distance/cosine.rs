use crate::distance::helpers::{dot, validated_pair};
use crate::distance::types::{CosineNorms, Distance, Norm, Result};

/// Computes the cosine distance `1 - cos(left, right)` between two vectors.
///
/// A zero-magnitude vector has similarity 0 with every vector, so its
/// distance to anything (itself included) is exactly 1. The result is
/// clamped to `[0, 2]`.
///
/// The optional [`CosineNorms`] parameter allows callers to reuse pre-computed
/// L2 norms and avoid recomputing them for every query.
///
/// # Examples
///
/// ```
/// use strata_core::{CosineNorms, DistanceError, cosine_distance};
///
/// fn main() -> Result<(), DistanceError> {
///     let a = [1.0f32, 0.0, 0.0];
///     let b = [0.0f32, 1.0, 0.0];
///
///     let orthogonal = cosine_distance(&a, &b, None)?;
///     assert!((orthogonal.value() - 1.0).abs() < 1e-6);
///
///     let norms = CosineNorms::from_vectors(&a, &b)?;
///     let again = cosine_distance(&a, &b, Some(norms))?;
///     assert!((again.value() - 1.0).abs() < 1e-6);
///
///     let zero = cosine_distance(&[0.0, 0.0], &[1.0, 0.0], None)?;
///     assert_eq!(zero.value(), 1.0);
///     Ok(())
/// }
/// ```
///
/// # Errors
///
/// Same validation as [`euclidean_distance`](crate::euclidean_distance).
pub fn cosine_distance(
    left: &[f32],
    right: &[f32],
    norms: Option<CosineNorms>,
) -> Result<Distance> {
    let (left, right) = validated_pair(left, right)?;
    let norms = norms
        .unwrap_or_else(|| CosineNorms::from_norms(Norm::of(&left), Norm::of(&right)));
    Ok(Distance::from_raw(cosine_kernel(&left, &right, norms)))
}

pub(crate) fn cosine_kernel(left: &[f32], right: &[f32], norms: CosineNorms) -> f32 {
    let (left_norm, right_norm) = (norms.left(), norms.right());
    if left_norm.is_zero() || right_norm.is_zero() {
        return 1.0;
    }
    let similarity = dot(left, right) / (left_norm.value() * right_norm.value());
    // Rounding can push the similarity slightly outside [-1, 1].
    (1.0 - similarity.clamp(-1.0, 1.0)) as f32
}
