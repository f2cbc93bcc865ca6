//! Result types for clustering operations.
//!
//! Provides the per-point [`Label`] assignment and validation of the cluster
//! identifier constraints.

use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Represents the output of a [`Strata::run`](crate::Strata::run) invocation.
///
/// # Examples
/// ```
/// use strata_core::{ClusterId, ClusteringResult, Label};
///
/// let result = ClusteringResult::try_from_labels(vec![
///     Label::Cluster(ClusterId::new(0)),
///     Label::Noise,
///     Label::Cluster(ClusterId::new(1)),
/// ])?;
/// assert_eq!(result.cluster_count(), 2);
/// assert_eq!(result.noise_count(), 1);
/// # Ok::<(), strata_core::NonContiguousClusterIds>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusteringResult {
    labels: Vec<Label>,
    cluster_count: usize,
}

/// Error returned when cluster identifiers are not contiguous starting at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NonContiguousClusterIds {
    /// The labels use clusters but never cluster `0`.
    #[error("cluster identifiers must include 0")]
    MissingZero,
    /// The labels skip identifiers.
    #[error("cluster identifiers must be contiguous without gaps")]
    Gap,
    /// The labels require identifiers beyond the host pointer width.
    #[error("cluster identifiers exceed or reach the host pointer-width limit")]
    Overflow,
}

impl ClusteringResult {
    /// Attempts to build a result from explicit labels.
    ///
    /// Cluster identifiers must be contiguous starting at zero. Labels that
    /// are all [`Label::Noise`], or empty, yield `cluster_count == 0`.
    ///
    /// # Errors
    /// Returns [`NonContiguousClusterIds::MissingZero`] when cluster `0` is
    /// absent, [`NonContiguousClusterIds::Gap`] when identifiers skip values
    /// and [`NonContiguousClusterIds::Overflow`] when identifiers exceed the
    /// host pointer width.
    pub fn try_from_labels(labels: Vec<Label>) -> Result<Self, NonContiguousClusterIds> {
        let mut seen = HashSet::new();
        let mut max_id = None::<u64>;
        for id in labels.iter().filter_map(|label| label.cluster()) {
            let value = id.get();
            if value >= usize::MAX as u64 {
                return Err(NonContiguousClusterIds::Overflow);
            }
            seen.insert(value);
            max_id = Some(max_id.map_or(value, |max| max.max(value)));
        }

        let Some(max_id) = max_id else {
            return Ok(Self {
                labels,
                cluster_count: 0,
            });
        };
        if !seen.contains(&0) {
            return Err(NonContiguousClusterIds::MissingZero);
        }
        if seen.len() as u64 != max_id + 1 {
            return Err(NonContiguousClusterIds::Gap);
        }

        Ok(Self {
            labels,
            cluster_count: seen.len(),
        })
    }

    /// Numbers arbitrary cluster keys by first appearance in input order.
    pub(crate) fn from_assignment(assignment: &[Option<usize>]) -> Self {
        let mut numbering: HashMap<usize, u64> = HashMap::new();
        let labels = assignment
            .iter()
            .map(|slot| match *slot {
                None => Label::Noise,
                Some(key) => {
                    let next = numbering.len() as u64;
                    Label::Cluster(ClusterId::new(*numbering.entry(key).or_insert(next)))
                }
            })
            .collect();
        Self {
            labels,
            cluster_count: numbering.len(),
        }
    }

    /// Builds a result placing every point in cluster `0`.
    pub(crate) fn single_cluster(points: usize) -> Self {
        Self {
            labels: vec![Label::Cluster(ClusterId::new(0)); points],
            cluster_count: usize::from(points > 0),
        }
    }

    /// Returns one label per input point, in input order.
    #[must_use]
    #[rustfmt::skip]
    pub fn labels(&self) -> &[Label] { &self.labels }

    /// Returns the number of distinct clusters.
    #[must_use]
    #[rustfmt::skip]
    pub fn cluster_count(&self) -> usize { self.cluster_count }

    /// Returns how many points were labelled as noise.
    #[must_use]
    pub fn noise_count(&self) -> usize {
        self.labels.iter().filter(|label| label.is_noise()).count()
    }
}

/// Flat label of a single point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    /// Member of a selected cluster.
    Cluster(ClusterId),
    /// Outlier under no selected cluster.
    Noise,
}

impl Label {
    /// Returns the cluster id, or `None` for noise.
    #[must_use]
    pub fn cluster(self) -> Option<ClusterId> {
        match self {
            Self::Cluster(id) => Some(id),
            Self::Noise => None,
        }
    }

    /// Returns whether the point is noise.
    #[must_use]
    #[rustfmt::skip]
    pub fn is_noise(self) -> bool { matches!(self, Self::Noise) }
}

/// Identifier assigned to a cluster.
///
/// # Examples
/// ```
/// use strata_core::ClusterId;
///
/// let id = ClusterId::new(4);
/// assert_eq!(id.get(), 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClusterId(u64);

impl ClusterId {
    /// Creates a new cluster identifier.
    #[rustfmt::skip]
    #[must_use]
    pub fn new(id: u64) -> Self { Self(id) }

    /// Returns the underlying numeric identifier.
    #[rustfmt::skip]
    #[must_use]
    pub fn get(self) -> u64 { self.0 }
}
