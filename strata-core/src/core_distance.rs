//! Core-distance estimation.
//!
//! The core distance of a point is the distance to its `min_samples`-th
//! nearest neighbour, excluding the point itself. Each point is computed
//! independently; the parallel path maps points onto rayon workers and
//! collects the results in input order.

use std::{num::NonZeroUsize, sync::Arc};

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::instrument;

use crate::{
    Result,
    datasource::{DataSource, checked_distance},
    error::{DataSourceError, StrataError},
};

/// One core distance per point, in input order.
///
/// # Examples
/// ```
/// use std::num::NonZeroUsize;
/// use strata_core::{CoreDistances, DistanceMatrix};
///
/// let matrix = DistanceMatrix::try_new(
///     "line",
///     vec![
///         vec![0.0, 1.0, 3.0],
///         vec![1.0, 0.0, 2.0],
///         vec![3.0, 2.0, 0.0],
///     ],
/// )?;
/// let core = CoreDistances::compute(&matrix, NonZeroUsize::MIN, false)?;
/// assert_eq!(core.as_slice(), &[1.0, 1.0, 2.0]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct CoreDistances {
    values: Vec<f32>,
    min_samples: NonZeroUsize,
}

impl CoreDistances {
    /// Computes the core distance of every item in `source`.
    ///
    /// The neighbour ordering is `(distance, index)`, so the `min_samples`-th
    /// neighbour is well defined under ties. The work is quadratic in
    /// `source.len()`. When `parallel` is set and the `parallel` feature is
    /// compiled in, points are distributed across the rayon pool.
    ///
    /// # Errors
    /// Returns [`StrataError::MinSamplesTooLarge`] when `min_samples` is not
    /// below `source.len()`, and [`StrataError::DataSource`] when a lookup
    /// fails or yields a negative or non-finite distance.
    #[instrument(
        name = "core.core_distances",
        err,
        skip(source, min_samples),
        fields(data_source = %source.name(), items = source.len(), min_samples = %min_samples),
    )]
    pub fn compute<D: DataSource + Sync>(
        source: &D,
        min_samples: NonZeroUsize,
        parallel: bool,
    ) -> Result<Self> {
        let items = source.len();
        if min_samples.get() >= items {
            return Err(StrataError::MinSamplesTooLarge {
                data_source: Arc::from(source.name()),
                items,
                min_samples,
            });
        }

        let all: Vec<usize> = (0..items).collect();
        let rank = min_samples.get();
        let estimate = |point: usize| core_distance_of(source, point, &all, rank);

        let values = if parallel {
            collect_parallel(items, &estimate)
        } else {
            (0..items).map(&estimate).collect()
        }
        .map_err(|error| StrataError::DataSource {
            data_source: Arc::from(source.name()),
            error,
        })?;

        Ok(Self {
            values,
            min_samples,
        })
    }

    /// Wraps precomputed core distances.
    ///
    /// Intended for driving later stages in isolation.
    #[must_use]
    pub fn from_values(values: Vec<f32>, min_samples: NonZeroUsize) -> Self {
        Self {
            values,
            min_samples,
        }
    }

    /// Returns the neighbour rank these distances were computed for.
    #[rustfmt::skip]
    #[must_use]
    pub fn min_samples(&self) -> NonZeroUsize { self.min_samples }

    /// Returns the core distances in input order.
    #[rustfmt::skip]
    #[must_use]
    pub fn as_slice(&self) -> &[f32] { &self.values }

    /// Returns the core distance for `point`.
    #[must_use]
    pub fn get(&self, point: usize) -> Option<f32> {
        self.values.get(point).copied()
    }

    /// Returns the number of points.
    #[rustfmt::skip]
    #[must_use]
    pub fn len(&self) -> usize { self.values.len() }

    /// Returns whether the table is empty.
    #[rustfmt::skip]
    #[must_use]
    pub fn is_empty(&self) -> bool { self.values.is_empty() }
}

fn core_distance_of<D: DataSource>(
    source: &D,
    point: usize,
    all: &[usize],
    rank: usize,
) -> core::result::Result<f32, DataSourceError> {
    let distances = source.batch_distances(point, all)?;
    let mut neighbours = distances
        .into_iter()
        .zip(all)
        .filter(|&(_, &other)| other != point)
        .map(|(distance, &other)| checked_distance(point, other, distance).map(|d| (d, other)))
        .collect::<core::result::Result<Vec<_>, _>>()?;
    let (_, nth, _) = neighbours
        .select_nth_unstable_by(rank - 1, |a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
    Ok(nth.0)
}

#[cfg(feature = "parallel")]
fn collect_parallel<F>(items: usize, estimate: &F) -> core::result::Result<Vec<f32>, DataSourceError>
where
    F: Fn(usize) -> core::result::Result<f32, DataSourceError> + Sync,
{
    (0..items).into_par_iter().map(estimate).collect()
}

#[cfg(not(feature = "parallel"))]
fn collect_parallel<F>(items: usize, estimate: &F) -> core::result::Result<Vec<f32>, DataSourceError>
where
    F: Fn(usize) -> core::result::Result<f32, DataSourceError>,
{
    (0..items).map(estimate).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{CountingSource, nz};
    use rstest::rstest;
    use std::sync::atomic::AtomicUsize;

    fn line(values: Vec<f32>) -> CountingSource {
        CountingSource::new(values, Arc::new(AtomicUsize::new(0)))
    }

    #[rstest]
    #[case(1, vec![1.0, 1.0, 2.0, 6.0])]
    #[case(2, vec![3.0, 2.0, 3.0, 8.0])]
    #[case(3, vec![9.0, 8.0, 6.0, 9.0])]
    fn selects_the_kth_neighbour(#[case] min_samples: usize, #[case] expected: Vec<f32>) {
        let source = line(vec![0.0, 1.0, 3.0, 9.0]);
        for parallel in [false, true] {
            let core = CoreDistances::compute(&source, nz(min_samples), parallel)
                .expect("min_samples is below the item count");
            assert_eq!(core.as_slice(), expected.as_slice());
        }
    }

    #[test]
    fn duplicates_yield_zero_core_distance() {
        let source = line(vec![2.0, 2.0, 2.0, 7.0]);
        let core = CoreDistances::compute(&source, nz(2), false).expect("valid");
        assert_eq!(core.as_slice(), &[0.0, 0.0, 0.0, 5.0]);
    }

    #[rstest]
    #[case(3)]
    #[case(4)]
    fn rejects_min_samples_without_enough_neighbours(#[case] min_samples: usize) {
        let source = line(vec![0.0, 1.0, 2.0]);
        let err = CoreDistances::compute(&source, nz(min_samples), false)
            .expect_err("min_samples >= n must fail");
        assert!(matches!(
            err,
            StrataError::MinSamplesTooLarge { items: 3, .. }
        ));
    }

    #[test]
    fn invalid_distances_are_reported_with_source_name() {
        let source = line(vec![0.0, f32::NAN, 1.0]);
        let err = CoreDistances::compute(&source, nz(1), false).expect_err("NaN must fail");
        match err {
            StrataError::DataSource { data_source, error } => {
                assert_eq!(&*data_source, "counting");
                assert!(matches!(error, DataSourceError::InvalidDistance { .. }));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
