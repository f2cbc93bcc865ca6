//! Data source abstractions for the Strata clustering pipeline.

use crate::error::DataSourceError;

/// Abstraction over a collection of items that can yield pairwise distances.
///
/// Every pipeline stage after the distance provider reads distances through
/// this trait, so a source only has to answer `distance(i, j)` for indices in
/// `0..len()`. Distances must be finite, non-negative and symmetric.
///
/// # Examples
/// ```
/// use strata_core::{DataSource, DataSourceError};
///
/// struct Dummy(Vec<f32>);
///
/// impl DataSource for Dummy {
///     fn len(&self) -> usize { self.0.len() }
///     fn name(&self) -> &str { "dummy" }
///     fn distance(&self, i: usize, j: usize) -> Result<f32, DataSourceError> {
///         let a = self.0.get(i).ok_or(DataSourceError::OutOfBounds { index: i })?;
///         let b = self.0.get(j).ok_or(DataSourceError::OutOfBounds { index: j })?;
///         Ok((a - b).abs())
///     }
/// }
///
/// let src = Dummy(vec![1.0, 2.0, 4.0]);
/// assert_eq!(src.len(), 3);
/// assert_eq!(src.name(), "dummy");
/// assert_eq!(src.distance(0, 2)?, 3.0);
///
/// let batched = src.batch_distances(0, &[1, 2])?;
/// assert_eq!(batched, [1.0, 3.0]);
/// # Ok::<(), DataSourceError>(())
/// ```
pub trait DataSource {
    /// Returns number of items in the source.
    fn len(&self) -> usize;

    /// Returns whether the source contains no items.
    ///
    /// # Examples
    /// ```
    /// use strata_core::{DataSource, DataSourceError};
    /// struct Empty;
    /// impl DataSource for Empty {
    ///     fn len(&self) -> usize { 0 }
    ///     fn name(&self) -> &str { "empty" }
    ///     fn distance(&self, _: usize, _: usize) -> Result<f32, DataSourceError> { Ok(0.0) }
    /// }
    /// let src = Empty;
    /// assert!(src.is_empty());
    /// ```
    #[must_use]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a human-readable name.
    fn name(&self) -> &str;

    /// Computes the distance between two items.
    ///
    /// # Errors
    /// Returns [`DataSourceError::OutOfBounds`] when either index is outside
    /// `0..len()`.
    fn distance(&self, i: usize, j: usize) -> Result<f32, DataSourceError>;

    /// Computes the distances from `query` to every entry in `candidates`.
    ///
    /// Implementations can override this method to provide faster kernels.
    /// The default implementation calls [`DataSource::distance`] repeatedly
    /// and collects the results.
    ///
    /// # Errors
    /// Returns any [`DataSourceError`] surfaced by [`DataSource::distance`].
    fn batch_distances(
        &self,
        query: usize,
        candidates: &[usize],
    ) -> Result<Vec<f32>, DataSourceError> {
        candidates
            .iter()
            .map(|&candidate| self.distance(query, candidate))
            .collect()
    }
}

/// Checks that a distance produced by a source is usable by the pipeline.
pub(crate) fn checked_distance(left: usize, right: usize, value: f32) -> Result<f32, DataSourceError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(DataSourceError::InvalidDistance { left, right, value })
    }
}
