//! Distance primitives for built-in numeric metrics.
//!
//! Each kernel validates its inputs and surfaces detailed errors; the
//! providers in [`crate::provider`] validate once at construction and then
//! call the same kernels without re-checking every pair.

mod cosine;
mod euclidean;
mod helpers;
mod manhattan;
mod types;

pub use self::cosine::cosine_distance;
pub use self::euclidean::euclidean_distance;
pub use self::manhattan::manhattan_distance;
pub use self::types::{CosineNorms, Distance, DistanceError, Norm, Result, Vector, VectorKind};

pub(crate) use self::cosine::cosine_kernel;
pub(crate) use self::euclidean::euclidean_kernel;
pub(crate) use self::manhattan::manhattan_kernel;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(&[1.0_f32, 0.0], &[0.0_f32, 0.0])]
    #[case(&[0.0_f32, 0.0], &[0.0_f32, 0.0])]
    fn cosine_treats_zero_magnitude_as_orthogonal(#[case] a: &[f32], #[case] b: &[f32]) {
        let distance = cosine_distance(a, b, None).expect("zero vectors are accepted");
        assert_eq!(distance.value(), 1.0);
    }

    #[test]
    fn cosine_is_clamped_to_two() {
        let distance =
            cosine_distance(&[1.0, 1e-8], &[-1.0, -1e-8], None).expect("valid vectors");
        assert!(distance.value() <= 2.0);
        assert!((distance.value() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn cached_norms_match_fresh_norms() {
        let left = [1.0_f32, 2.0, 3.0];
        let right = [4.0_f32, 5.0, 6.0];
        let norms = CosineNorms::from_vectors(&left, &right).expect("norms");
        let fresh = cosine_distance(&left, &right, None).expect("fresh");
        let cached = cosine_distance(&left, &right, Some(norms)).expect("cached");
        assert_eq!(fresh, cached);
    }

    #[rstest]
    #[case(f32::NAN)]
    #[case(-1.0)]
    #[case(f32::INFINITY)]
    fn norms_reject_invalid_values(#[case] value: f32) {
        let err = CosineNorms::new(value, 1.0).expect_err("invalid norm must fail");
        assert!(matches!(
            err,
            DistanceError::InvalidNorm {
                which: VectorKind::Left,
                ..
            }
        ));
    }

    #[test]
    fn manhattan_sums_absolute_differences() {
        let distance = manhattan_distance(&[0.0, 0.0, 0.0], &[1.0, -2.0, 3.0]).expect("valid");
        assert_eq!(distance.value(), 6.0);
    }
}
