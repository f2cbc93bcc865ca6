//! Mutual reachability over a [`DataSource`].
//!
//! `reach(i, j) = max(core[i], core[j], dist(i, j))`. The complete graph is
//! never materialised; weights are derived on demand, which keeps memory
//! linear at the cost of one distance evaluation per query.

use crate::{
    core_distance::CoreDistances,
    datasource::{DataSource, checked_distance},
    error::DataSourceError,
};

/// Implicit complete graph weighted by mutual reachability distance.
///
/// # Examples
/// ```
/// use std::num::NonZeroUsize;
/// use strata_core::{CoreDistances, DistanceMatrix, MutualReachability};
///
/// let matrix = DistanceMatrix::try_new(
///     "pair",
///     vec![vec![0.0, 1.0, 5.0], vec![1.0, 0.0, 4.0], vec![5.0, 4.0, 0.0]],
/// )?;
/// let core = CoreDistances::from_values(vec![2.0, 1.0, 4.0], NonZeroUsize::MIN);
/// let graph = MutualReachability::new(&matrix, &core);
/// assert_eq!(graph.reach(0, 1)?, 2.0);
/// assert_eq!(graph.reach(1, 2)?, 4.0);
/// assert_eq!(graph.reach(0, 2)?, 5.0);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Copy, Debug)]
pub struct MutualReachability<'a, D: ?Sized> {
    source: &'a D,
    core: &'a CoreDistances,
}

impl<'a, D: DataSource + ?Sized> MutualReachability<'a, D> {
    /// Borrows a distance source and its core distances.
    #[must_use]
    pub fn new(source: &'a D, core: &'a CoreDistances) -> Self {
        Self { source, core }
    }

    /// Returns the number of vertices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.core.len()
    }

    /// Returns whether the graph has no vertices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.core.is_empty()
    }

    /// Returns the mutual reachability distance between `i` and `j`.
    ///
    /// Symmetric whenever the underlying source is.
    ///
    /// # Errors
    /// Returns [`DataSourceError::OutOfBounds`] for indices outside the core
    /// table and [`DataSourceError::InvalidDistance`] when the source yields a
    /// negative or non-finite distance.
    pub fn reach(&self, i: usize, j: usize) -> Result<f32, DataSourceError> {
        let core_i = self.core.get(i).ok_or(DataSourceError::OutOfBounds { index: i })?;
        let core_j = self.core.get(j).ok_or(DataSourceError::OutOfBounds { index: j })?;
        let distance = checked_distance(i, j, self.source.distance(i, j)?)?;
        Ok(distance.max(core_i).max(core_j))
    }
}
