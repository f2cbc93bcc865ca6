//! Grouping of caller identifiers by flat label.

use crate::{
    error::{Result, StrataError},
    result::{ClusteringResult, Label},
};

/// Points grouped by cluster, plus the outliers.
///
/// `clusters[k]` lists the identifiers labelled `k` in input order and
/// `outliers` the noise identifiers in input order. Every identifier appears
/// exactly once.
///
/// # Examples
/// ```
/// use strata_core::{ClusterId, ClusterPartition, ClusteringResult, Label};
///
/// let result = ClusteringResult::try_from_labels(vec![
///     Label::Cluster(ClusterId::new(0)),
///     Label::Noise,
///     Label::Cluster(ClusterId::new(0)),
/// ])?;
/// let partition = ClusterPartition::from_labels(vec!["a", "b", "c"], &result)?;
/// assert_eq!(partition.clusters(), &[vec!["a", "c"]]);
/// assert_eq!(partition.outliers(), &["b"]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClusterPartition<Id> {
    clusters: Vec<Vec<Id>>,
    outliers: Vec<Id>,
}

impl<Id> ClusterPartition<Id> {
    /// Groups `ids` by the label at the same position in `result`.
    ///
    /// # Errors
    /// Returns [`StrataError::LabelCoverage`] when `ids` and the labels differ
    /// in length or a label points past the cluster count.
    pub fn from_labels(ids: Vec<Id>, result: &ClusteringResult) -> Result<Self> {
        let labels = result.labels();
        if ids.len() != labels.len() {
            return Err(StrataError::LabelCoverage {
                expected: ids.len(),
                found: labels.len(),
            });
        }

        let mut clusters: Vec<Vec<Id>> = (0..result.cluster_count()).map(|_| Vec::new()).collect();
        let mut outliers = Vec::new();
        for (id, label) in ids.into_iter().zip(labels) {
            match label {
                Label::Noise => outliers.push(id),
                Label::Cluster(cluster) => {
                    let slot = usize::try_from(cluster.get())
                        .ok()
                        .and_then(|index| clusters.get_mut(index))
                        .ok_or(StrataError::LabelCoverage {
                            expected: labels.len(),
                            found: result.cluster_count(),
                        })?;
                    slot.push(id);
                }
            }
        }

        Ok(Self { clusters, outliers })
    }

    /// Builds a partition from explicit groups without checking them.
    #[must_use]
    pub fn from_parts(clusters: Vec<Vec<Id>>, outliers: Vec<Id>) -> Self {
        Self { clusters, outliers }
    }

    /// Returns the clusters in label order.
    #[must_use]
    #[rustfmt::skip]
    pub fn clusters(&self) -> &[Vec<Id>] { &self.clusters }

    /// Returns the noise identifiers in input order.
    #[must_use]
    #[rustfmt::skip]
    pub fn outliers(&self) -> &[Id] { &self.outliers }

    /// Returns the number of clusters.
    #[must_use]
    #[rustfmt::skip]
    pub fn cluster_count(&self) -> usize { self.clusters.len() }

    /// Returns the total number of identifiers across clusters and outliers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.outliers.len() + self.clusters.iter().map(Vec::len).sum::<usize>()
    }

    /// Returns whether the partition holds no identifiers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates identifiers with their label: `Some(k)` for cluster `k`,
    /// `None` for outliers.
    pub fn memberships(&self) -> impl Iterator<Item = (&Id, Option<usize>)> {
        self.clusters
            .iter()
            .enumerate()
            .flat_map(|(index, members)| members.iter().map(move |id| (id, Some(index))))
            .chain(self.outliers.iter().map(|id| (id, None)))
    }

    /// Splits the partition into `(clusters, outliers)`.
    #[must_use]
    pub fn into_parts(self) -> (Vec<Vec<Id>>, Vec<Id>) {
        (self.clusters, self.outliers)
    }
}
