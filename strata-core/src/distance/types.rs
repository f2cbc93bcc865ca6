//! Value types shared by the distance kernels.

use core::{fmt, ops::Deref};

use thiserror::Error;

use super::helpers::{squared_sum, validate_dimensions};

/// Identifies whether an error was produced while inspecting the left or right
/// vector argument.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum VectorKind {
    /// Value originating from the first argument.
    Left,
    /// Value originating from the second argument.
    Right,
}

impl fmt::Display for VectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => f.write_str("left"),
            Self::Right => f.write_str("right"),
        }
    }
}

/// Errors emitted while computing distances.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum DistanceError {
    /// Either input vector had zero length.
    #[error("vectors must have positive dimension")]
    ZeroLength,
    /// Input vectors had different lengths.
    #[error("dimension mismatch: left={left}, right={right}")]
    DimensionMismatch { left: usize, right: usize },
    /// Encountered a non-finite value in one of the vectors.
    #[error("{which} vector contains a non-finite value at index {index}: {value}")]
    NonFinite {
        which: VectorKind,
        index: usize,
        value: f32,
    },
    /// Provided norms must be finite and non-negative.
    #[error("provided {which} norm must be finite and non-negative (got {value})")]
    InvalidNorm { which: VectorKind, value: f32 },
}

/// Convenient alias for distance computations.
pub type Result<T> = core::result::Result<T, DistanceError>;

/// Borrowed feature vector that has been checked for a positive dimension and
/// finite components.
#[derive(Clone, Copy, Debug)]
pub struct Vector<'a>(&'a [f32]);

impl<'a> Vector<'a> {
    /// Validates and constructs a [`Vector`].
    ///
    /// # Errors
    ///
    /// Returns [`DistanceError::ZeroLength`] when the slice is empty and
    /// [`DistanceError::NonFinite`] when a value is NaN or infinite.
    pub fn new(values: &'a [f32], which: VectorKind) -> Result<Self> {
        if values.is_empty() {
            return Err(DistanceError::ZeroLength);
        }

        if let Some((index, value)) = values
            .iter()
            .copied()
            .enumerate()
            .find(|(_, value)| !value.is_finite())
        {
            return Err(DistanceError::NonFinite {
                which,
                index,
                value,
            });
        }

        Ok(Self(values))
    }

    /// Returns the dimensionality of the vector.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.0.len()
    }
}

impl Deref for Vector<'_> {
    type Target = [f32];

    fn deref(&self) -> &Self::Target {
        self.0
    }
}

/// L2 norm of a feature vector, accumulated in `f64`.
///
/// A zero norm is valid: cosine distance treats a zero-magnitude vector as
/// orthogonal to everything.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Norm(f64);

impl Norm {
    /// Validates an explicit norm value.
    ///
    /// # Errors
    ///
    /// Returns [`DistanceError::InvalidNorm`] when the value is non-finite or
    /// negative.
    pub fn new(value: f32, which: VectorKind) -> Result<Self> {
        if !value.is_finite() || value < 0.0 {
            return Err(DistanceError::InvalidNorm { which, value });
        }
        Ok(Self(f64::from(value)))
    }

    /// Computes the L2 norm of a validated vector.
    #[must_use]
    pub fn of(vector: &Vector<'_>) -> Self {
        Self(squared_sum(vector).sqrt())
    }

    /// Returns whether the vector had zero magnitude.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == 0.0
    }

    /// Returns the norm as `f64`.
    #[must_use]
    pub fn value(&self) -> f64 {
        self.0
    }
}

/// Distance result newtype.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct Distance(f32);

impl Distance {
    pub(crate) fn from_raw(value: f32) -> Self {
        Self(value)
    }

    /// Returns the raw distance value.
    #[must_use]
    pub fn value(&self) -> f32 {
        self.0
    }
}

impl Deref for Distance {
    type Target = f32;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Pre-computed L2 norms for cosine distance calculations.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CosineNorms {
    left: Norm,
    right: Norm,
}

impl CosineNorms {
    /// Builds [`CosineNorms`] from explicit norm values.
    ///
    /// # Errors
    ///
    /// Returns [`DistanceError::InvalidNorm`] when a norm is non-finite or
    /// negative.
    pub fn new(left: f32, right: f32) -> Result<Self> {
        let left = Norm::new(left, VectorKind::Left)?;
        let right = Norm::new(right, VectorKind::Right)?;
        Ok(Self { left, right })
    }

    /// Computes norms from the provided vectors.
    ///
    /// # Errors
    ///
    /// Returns the validation errors of [`Vector::new`] and
    /// [`DistanceError::DimensionMismatch`] when the lengths differ.
    pub fn from_vectors(left: &[f32], right: &[f32]) -> Result<Self> {
        let left = Vector::new(left, VectorKind::Left)?;
        let right = Vector::new(right, VectorKind::Right)?;
        validate_dimensions(&left, &right)?;
        Ok(Self::from_norms(Norm::of(&left), Norm::of(&right)))
    }

    pub(crate) fn from_norms(left: Norm, right: Norm) -> Self {
        Self { left, right }
    }

    /// Returns the validated norm for the left vector.
    #[rustfmt::skip]
    #[must_use]
    pub fn left(&self) -> Norm { self.left }

    /// Returns the validated norm for the right vector.
    #[rustfmt::skip]
    #[must_use]
    pub fn right(&self) -> Norm { self.right }
}
