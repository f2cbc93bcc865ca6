//! Error types for the Strata core library.
//!
//! Defines error enums exposed by the public API, their stable codes, the
//! coarse [`ErrorCategory`] callers use to tell "fix your request" apart from
//! "report a bug", and a convenient result alias.

use std::{fmt, num::NonZeroUsize, sync::Arc};

use thiserror::Error;

use crate::{
    builder::ExecutionStrategy,
    request::{FeatureKind, Metric},
};

macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident $( { $($pattern:tt)* } )? => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            #[must_use]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(Self::$ErrVariant $( { $($pattern)* } )? => $CodeTy::$CodeVariant,)+
                }
            }
        }
    };
}

/// An error produced while validating input for, or reading distances from, a
/// [`crate::DataSource`].
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum DataSourceError {
    /// Requested index was outside the source's bounds.
    #[error("index {index} is out of bounds")]
    OutOfBounds {
        /// The requested item that exceeded the source bounds.
        index: usize,
    },
    /// A feature vector did not share the dimensionality of the first one.
    #[error("vector {index} has dimension {found} but {expected} was expected")]
    DimensionMismatch {
        /// Position of the offending vector.
        index: usize,
        /// Dimensionality of the first vector.
        expected: usize,
        /// Dimensionality of the offending vector.
        found: usize,
    },
    /// Data source contained no rows.
    #[error("data source contains no rows")]
    EmptyData,
    /// Feature vectors must have positive dimension.
    #[error("data source vectors must have positive dimension")]
    ZeroDimension,
    /// A feature vector contained NaN or an infinity.
    #[error("vector {index} contains a non-finite value at component {component}: {value}")]
    NonFiniteComponent {
        /// Position of the offending vector.
        index: usize,
        /// Component holding the non-finite value.
        component: usize,
        /// The offending value.
        value: f32,
    },
    /// A precomputed matrix row did not match the number of rows.
    #[error("distance matrix row {row} has {found} entries but the matrix has {expected} rows")]
    MatrixNotSquare {
        /// Row with the wrong length.
        row: usize,
        /// Number of rows in the matrix.
        expected: usize,
        /// Number of entries in the row.
        found: usize,
    },
    /// A precomputed matrix entry was NaN or infinite.
    #[error("distance matrix entry ({row}, {column}) is not finite: {value}")]
    NonFiniteEntry {
        /// Row of the entry.
        row: usize,
        /// Column of the entry.
        column: usize,
        /// The offending value.
        value: f32,
    },
    /// A precomputed matrix entry was negative.
    #[error("distance matrix entry ({row}, {column}) is negative: {value}")]
    NegativeEntry {
        /// Row of the entry.
        row: usize,
        /// Column of the entry.
        column: usize,
        /// The offending value.
        value: f32,
    },
    /// A precomputed matrix had a non-zero diagonal entry.
    #[error("distance matrix diagonal entry {index} must be zero (got {value})")]
    NonZeroDiagonal {
        /// Row and column of the diagonal entry.
        index: usize,
        /// The offending value.
        value: f32,
    },
    /// A precomputed matrix was not symmetric within tolerance.
    #[error(
        "distance matrix is not symmetric: ({row}, {column}) = {upper} but ({column}, {row}) = {lower}"
    )]
    Asymmetric {
        /// Row of the upper-triangle entry.
        row: usize,
        /// Column of the upper-triangle entry.
        column: usize,
        /// Value stored above the diagonal.
        upper: f32,
        /// Value stored below the diagonal.
        lower: f32,
    },
    /// A point referenced a matrix row that does not exist.
    #[error("point {point} references row {row} but the distance matrix has {rows} rows")]
    RowOutOfRange {
        /// Position of the point in the request.
        point: usize,
        /// Row requested by the point.
        row: usize,
        /// Number of rows in the matrix.
        rows: usize,
    },
    /// A distance evaluated by the source was negative or not finite.
    #[error("distance between {left} and {right} is invalid: {value}")]
    InvalidDistance {
        /// Left item.
        left: usize,
        /// Right item.
        right: usize,
        /// The offending value.
        value: f32,
    },
}

define_error_codes! {
    /// Stable codes describing [`DataSourceError`] variants.
    enum DataSourceErrorCode for DataSourceError {
        /// Requested index was outside the source's bounds.
        OutOfBounds => OutOfBounds { .. } => "DATA_SOURCE_OUT_OF_BOUNDS",
        /// Feature vectors had different dimensions.
        DimensionMismatch => DimensionMismatch { .. } => "DATA_SOURCE_DIMENSION_MISMATCH",
        /// Data source contained no rows.
        EmptyData => EmptyData => "DATA_SOURCE_EMPTY",
        /// Data source rows must have positive dimension.
        ZeroDimension => ZeroDimension => "DATA_SOURCE_ZERO_DIMENSION",
        /// A feature vector held a non-finite component.
        NonFiniteComponent => NonFiniteComponent { .. } => "DATA_SOURCE_NON_FINITE_COMPONENT",
        /// A distance matrix was not square.
        MatrixNotSquare => MatrixNotSquare { .. } => "DATA_SOURCE_MATRIX_NOT_SQUARE",
        /// A distance matrix held a non-finite entry.
        NonFiniteEntry => NonFiniteEntry { .. } => "DATA_SOURCE_NON_FINITE_ENTRY",
        /// A distance matrix held a negative entry.
        NegativeEntry => NegativeEntry { .. } => "DATA_SOURCE_NEGATIVE_ENTRY",
        /// A distance matrix diagonal entry was non-zero.
        NonZeroDiagonal => NonZeroDiagonal { .. } => "DATA_SOURCE_NON_ZERO_DIAGONAL",
        /// A distance matrix was asymmetric beyond tolerance.
        Asymmetric => Asymmetric { .. } => "DATA_SOURCE_ASYMMETRIC",
        /// A point referenced a missing matrix row.
        RowOutOfRange => RowOutOfRange { .. } => "DATA_SOURCE_ROW_OUT_OF_RANGE",
        /// A source produced a negative or non-finite distance.
        InvalidDistance => InvalidDistance { .. } => "DATA_SOURCE_INVALID_DISTANCE",
    }
}

/// Distinguishes caller mistakes from engine defects.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ErrorCategory {
    /// The request was malformed; the caller should fix it. Never retried.
    InvalidInput,
    /// An internal invariant was violated; this is a defect to report.
    InternalComputation,
}

impl ErrorCategory {
    /// Return the stable machine-readable representation of this category.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidInput => "INVALID_INPUT",
            Self::InternalComputation => "INTERNAL_COMPUTATION_ERROR",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type produced when constructing or running [`crate::Strata`].
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum StrataError {
    /// Minimum cluster size must be at least two.
    #[error("min_cluster_size must be at least 2 (got {got})")]
    InvalidMinClusterSize {
        /// The invalid minimum cluster size supplied by the caller.
        got: usize,
    },
    /// Minimum samples must be at least one.
    #[error("min_samples must be at least 1 (got {got})")]
    InvalidMinSamples {
        /// The invalid minimum samples value supplied by the caller.
        got: usize,
    },
    /// The supplied [`crate::DataSource`] contained no items.
    #[error("data source `{data_source}` contains no items")]
    EmptySource {
        /// Identifier for the empty data source.
        data_source: Arc<str>,
    },
    /// The [`crate::DataSource`] did not contain enough items for the configured
    /// `min_cluster_size`.
    #[error(
        "data source `{data_source}` has {items} items but min_cluster_size requires {min_cluster_size}"
    )]
    InsufficientItems {
        /// Identifier for the data source that lacked sufficient items.
        data_source: Arc<str>,
        /// Number of items available in the data source.
        items: usize,
        /// Minimum cluster size required by the algorithm.
        min_cluster_size: NonZeroUsize,
    },
    /// There is no `min_samples`-th neighbour when `min_samples >= items`.
    #[error(
        "data source `{data_source}` has {items} items so min_samples {min_samples} has no neighbour to reach (at most {} allowed)",
        items.saturating_sub(1)
    )]
    MinSamplesTooLarge {
        /// Identifier for the data source.
        data_source: Arc<str>,
        /// Number of items available in the data source.
        items: usize,
        /// The requested neighbour rank.
        min_samples: NonZeroUsize,
    },
    /// Two points in one request shared an identifier.
    #[error("point identifier `{id}` appears at positions {first} and {second}")]
    DuplicatePointId {
        /// Rendered identifier.
        id: Arc<str>,
        /// Position of the first occurrence.
        first: usize,
        /// Position of the repeated occurrence.
        second: usize,
    },
    /// A precomputed request did not carry a distance matrix.
    #[error("metric `precomputed` requires a distance matrix")]
    MissingDistanceMatrix,
    /// A distance matrix was supplied alongside a vector metric.
    #[error("a distance matrix was supplied but metric `{metric}` works on vectors")]
    UnexpectedDistanceMatrix {
        /// The vector metric requested.
        metric: Metric,
    },
    /// A point's features did not match the request's metric.
    #[error("point {index} carries {found} features but the metric requires {expected}")]
    FeatureMismatch {
        /// Position of the offending point.
        index: usize,
        /// Feature kind required by the metric.
        expected: FeatureKind,
        /// Feature kind carried by the point.
        found: FeatureKind,
    },
    /// The requested execution strategy is unavailable in the current build.
    #[error("the requested execution strategy {requested:?} is not available in this build")]
    BackendUnavailable {
        /// Strategy that could not be satisfied by the current build.
        requested: ExecutionStrategy,
    },
    /// A [`crate::DataSource`] rejected its input or failed while running.
    #[error("data source `{data_source}` failed: {error}")]
    DataSource {
        /// Identifier for the data source that produced the error.
        data_source: Arc<str>,
        #[source]
        /// Underlying data source error.
        error: DataSourceError,
    },
    /// The spanning tree stage violated one of its invariants.
    #[error("spanning tree construction failed ({code}): {message}")]
    MstFailure {
        /// Stable [`crate::MstErrorCode`] rendered as a string.
        code: Arc<str>,
        /// Rendered stage error.
        message: Arc<str>,
    },
    /// The hierarchy stage violated one of its invariants.
    #[error("hierarchy extraction failed ({code}): {message}")]
    HierarchyFailure {
        /// Stable [`crate::HierarchyErrorCode`] rendered as a string.
        code: Arc<str>,
        /// Rendered stage error.
        message: Arc<str>,
    },
    /// The flat labelling did not cover every point exactly once.
    #[error("labelling covers {found} points but {expected} were clustered")]
    LabelCoverage {
        /// Number of points that entered the pipeline.
        expected: usize,
        /// Number of labels produced.
        found: usize,
    },
}

define_error_codes! {
    /// Stable codes describing [`StrataError`] variants.
    enum StrataErrorCode for StrataError {
        /// Minimum cluster size must be at least two.
        InvalidMinClusterSize => InvalidMinClusterSize { .. } => "STRATA_INVALID_MIN_CLUSTER_SIZE",
        /// Minimum samples must be at least one.
        InvalidMinSamples => InvalidMinSamples { .. } => "STRATA_INVALID_MIN_SAMPLES",
        /// The supplied [`crate::DataSource`] contained no items.
        EmptySource => EmptySource { .. } => "STRATA_EMPTY_SOURCE",
        /// The [`crate::DataSource`] did not contain enough items for the
        /// configured minimum cluster size.
        InsufficientItems => InsufficientItems { .. } => "STRATA_INSUFFICIENT_ITEMS",
        /// `min_samples` leaves no neighbour to reach.
        MinSamplesTooLarge => MinSamplesTooLarge { .. } => "STRATA_MIN_SAMPLES_TOO_LARGE",
        /// Two points shared an identifier.
        DuplicatePointId => DuplicatePointId { .. } => "STRATA_DUPLICATE_POINT_ID",
        /// A precomputed request lacked its matrix.
        MissingDistanceMatrix => MissingDistanceMatrix => "STRATA_MISSING_DISTANCE_MATRIX",
        /// A vector request carried a matrix.
        UnexpectedDistanceMatrix => UnexpectedDistanceMatrix { .. } => "STRATA_UNEXPECTED_DISTANCE_MATRIX",
        /// A point's features did not match the metric.
        FeatureMismatch => FeatureMismatch { .. } => "STRATA_FEATURE_MISMATCH",
        /// The requested execution strategy is unavailable in the current build.
        BackendUnavailable => BackendUnavailable { .. } => "STRATA_BACKEND_UNAVAILABLE",
        /// A [`crate::DataSource`] operation failed.
        DataSourceFailure => DataSource { .. } => "STRATA_DATA_SOURCE_FAILURE",
        /// The spanning tree stage failed.
        MstFailure => MstFailure { .. } => "STRATA_MST_FAILURE",
        /// The hierarchy stage failed.
        HierarchyFailure => HierarchyFailure { .. } => "STRATA_HIERARCHY_FAILURE",
        /// The labelling did not cover every point.
        LabelCoverage => LabelCoverage { .. } => "STRATA_LABEL_COVERAGE",
    }
}

impl StrataError {
    /// Retrieve the inner [`DataSourceErrorCode`] when the error originated in a [`crate::DataSource`].
    #[must_use]
    pub const fn data_source_code(&self) -> Option<DataSourceErrorCode> {
        match self {
            Self::DataSource { error, .. } => Some(error.code()),
            _ => None,
        }
    }

    /// Classifies the error as a caller mistake or an engine defect.
    ///
    /// # Examples
    /// ```
    /// use strata_core::{ErrorCategory, StrataError};
    ///
    /// let err = StrataError::InvalidMinClusterSize { got: 1 };
    /// assert_eq!(err.category(), ErrorCategory::InvalidInput);
    /// ```
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::MstFailure { .. } | Self::HierarchyFailure { .. } | Self::LabelCoverage { .. } => {
                ErrorCategory::InternalComputation
            }
            _ => ErrorCategory::InvalidInput,
        }
    }
}

/// Convenient alias for results returned by the core API.
pub type Result<T> = core::result::Result<T, StrataError>;
