use crate::distance::helpers::validated_pair;
use crate::distance::types::{Distance, Result};

/// Computes the Manhattan (L1) distance between two vectors.
///
/// # Examples
///
/// ```
/// use strata_core::{DistanceError, manhattan_distance};
///
/// fn main() -> Result<(), DistanceError> {
///     let distance = manhattan_distance(&[1.0, 2.0], &[4.0, -2.0])?;
///     assert_eq!(distance.value(), 7.0);
///     Ok(())
/// }
/// ```
///
/// # Errors
///
/// Same validation as [`euclidean_distance`](crate::euclidean_distance).
pub fn manhattan_distance(left: &[f32], right: &[f32]) -> Result<Distance> {
    let (left, right) = validated_pair(left, right)?;
    Ok(Distance::from_raw(manhattan_kernel(&left, &right)))
}

pub(crate) fn manhattan_kernel(left: &[f32], right: &[f32]) -> f32 {
    let sum: f64 = left
        .iter()
        .zip(right)
        .map(|(&l, &r)| (f64::from(l) - f64::from(r)).abs())
        .sum();
    sum as f32
}
