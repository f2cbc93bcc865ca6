//! In-memory feature vectors evaluated with a Minkowski-family metric.

use crate::{
    datasource::DataSource,
    distance::{DistanceError, Vector, VectorKind, euclidean_kernel, manhattan_kernel},
    error::DataSourceError,
};

/// Metrics evaluated directly from two feature vectors.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum VectorMetric {
    /// Straight-line (L2) distance.
    #[default]
    Euclidean,
    /// Sum of absolute component differences (L1).
    Manhattan,
}

/// Dense feature vectors stored row-major in one contiguous buffer.
///
/// Distances are evaluated on demand so memory stays linear in the number of
/// points; every pairwise stage over this source is quadratic in time.
///
/// # Examples
/// ```
/// use strata_core::{DataSource, VectorMetric, VectorSource};
///
/// let source = VectorSource::try_new(
///     "demo",
///     vec![vec![0.0, 0.0], vec![3.0, 4.0]],
///     VectorMetric::Euclidean,
/// )?;
/// assert_eq!(source.len(), 2);
/// assert_eq!(source.dimension(), 2);
/// assert_eq!(source.distance(0, 1)?, 5.0);
/// # Ok::<(), strata_core::DataSourceError>(())
/// ```
#[derive(Clone, Debug)]
pub struct VectorSource {
    name: String,
    data: Vec<f32>,
    dimension: usize,
    metric: VectorMetric,
}

impl VectorSource {
    /// Creates a vector source after validating the rows.
    ///
    /// # Errors
    /// Returns [`DataSourceError::EmptyData`] when `rows` is empty,
    /// [`DataSourceError::ZeroDimension`] when the first row is empty,
    /// [`DataSourceError::DimensionMismatch`] when a row's length differs from
    /// the first, and [`DataSourceError::NonFiniteComponent`] when a component
    /// is NaN or infinite.
    pub fn try_new(
        name: impl Into<String>,
        rows: Vec<Vec<f32>>,
        metric: VectorMetric,
    ) -> Result<Self, DataSourceError> {
        let dimension = validated_rows(&rows)?
            .first()
            .map_or(0, Vector::dimension);
        let data = rows.into_iter().flatten().collect();
        Ok(Self {
            name: name.into(),
            data,
            dimension,
            metric,
        })
    }

    /// Returns the shared dimensionality of the stored vectors.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Returns the metric used by [`DataSource::distance`].
    #[must_use]
    pub fn metric(&self) -> VectorMetric {
        self.metric
    }

    /// Returns the vector stored at `index`.
    ///
    /// # Errors
    /// Returns [`DataSourceError::OutOfBounds`] when `index` is past the end.
    pub fn row(&self, index: usize) -> Result<&[f32], DataSourceError> {
        let start = index
            .checked_mul(self.dimension)
            .ok_or(DataSourceError::OutOfBounds { index })?;
        self.data
            .get(start..start + self.dimension)
            .ok_or(DataSourceError::OutOfBounds { index })
    }
}

impl DataSource for VectorSource {
    fn len(&self) -> usize {
        self.data.len() / self.dimension
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn distance(&self, i: usize, j: usize) -> Result<f32, DataSourceError> {
        let a = self.row(i)?;
        let b = self.row(j)?;
        Ok(match self.metric {
            VectorMetric::Euclidean => euclidean_kernel(a, b),
            VectorMetric::Manhattan => manhattan_kernel(a, b),
        })
    }
}

/// Validates every row as a [`Vector`] of the first row's dimension.
pub(crate) fn validated_rows(rows: &[Vec<f32>]) -> Result<Vec<Vector<'_>>, DataSourceError> {
    let first = rows.first().ok_or(DataSourceError::EmptyData)?;
    let expected = first.len();
    rows.iter()
        .enumerate()
        .map(|(index, row)| {
            if row.len() != expected {
                return Err(DataSourceError::DimensionMismatch {
                    index,
                    expected,
                    found: row.len(),
                });
            }
            Vector::new(row, VectorKind::Left).map_err(|error| match error {
                DistanceError::NonFinite {
                    index: component,
                    value,
                    ..
                } => DataSourceError::NonFiniteComponent {
                    index,
                    component,
                    value,
                },
                // Lengths already match, so only an empty first row is left.
                _ => DataSourceError::ZeroDimension,
            })
        })
        .collect()
}
