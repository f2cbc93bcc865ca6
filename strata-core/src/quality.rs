//! Agreement scores between two clusterings of the same points.
//!
//! Adjusted Rand Index (ARI) and Normalized Mutual Information (NMI) are
//! computed from one contingency table. [`compare_partitions`] aligns two
//! [`ClusterPartition`]s by identifier first; outliers on each side share a
//! single noise label.

use std::{
    collections::{HashMap, HashSet},
    hash::Hash,
};

use crate::partition::ClusterPartition;

/// ARI and NMI values computed from two labellings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClusteringQualityScore {
    /// Adjusted Rand Index in `[-1.0, 1.0]`.
    pub ari: f64,
    /// Normalized Mutual Information in `[0.0, 1.0]`.
    pub nmi: f64,
}

/// Errors raised while computing clustering-quality metrics.
#[derive(Debug, thiserror::Error, Eq, PartialEq)]
pub enum ClusteringQualityError {
    /// The two labellings had different lengths.
    #[error("label length mismatch: ground_truth={ground_truth_len}, predicted={predicted_len}")]
    LabelLengthMismatch {
        /// Number of ground-truth labels.
        ground_truth_len: usize,
        /// Number of predicted labels.
        predicted_len: usize,
    },
    /// The partitions did not cover the same identifiers.
    #[error(
        "partitions cover different identifiers: left={left}, right={right}, shared={shared}"
    )]
    IdentifierMismatch {
        /// Identifiers in the left partition.
        left: usize,
        /// Identifiers in the right partition.
        right: usize,
        /// Identifiers present in both.
        shared: usize,
    },
    /// An identifier appeared twice within one partition.
    #[error("identifier repeated within the {side} partition")]
    DuplicateIdentifier {
        /// `"left"` or `"right"`.
        side: &'static str,
    },
}

/// Marginal and joint counts of two labellings.
struct Contingency<L, R> {
    items: usize,
    left: HashMap<L, usize>,
    right: HashMap<R, usize>,
    joint: HashMap<(L, R), usize>,
}

impl<L: Copy + Eq + Hash, R: Copy + Eq + Hash> Contingency<L, R> {
    fn from_pairs(pairs: impl IntoIterator<Item = (L, R)>) -> Self {
        let mut table = Self {
            items: 0,
            left: HashMap::new(),
            right: HashMap::new(),
            joint: HashMap::new(),
        };
        for (l, r) in pairs {
            table.items += 1;
            *table.left.entry(l).or_default() += 1;
            *table.right.entry(r).or_default() += 1;
            *table.joint.entry((l, r)).or_default() += 1;
        }
        table
    }

    fn adjusted_rand_index(&self) -> f64 {
        let total = pairs_of(self.items);
        if total == 0.0 {
            return 1.0;
        }
        let joint: f64 = self.joint.values().copied().map(pairs_of).sum();
        let left: f64 = self.left.values().copied().map(pairs_of).sum();
        let right: f64 = self.right.values().copied().map(pairs_of).sum();

        let expected = left * right / total;
        let denominator = 0.5 * (left + right) - expected;
        if denominator == 0.0 {
            1.0
        } else {
            (joint - expected) / denominator
        }
    }

    fn normalized_mutual_information(&self) -> f64 {
        if self.items == 0 {
            return 1.0;
        }
        let n = self.items as f64;
        let mutual: f64 = self
            .joint
            .iter()
            .filter_map(|(&(l, r), &count)| {
                let left = *self.left.get(&l)? as f64;
                let right = *self.right.get(&r)? as f64;
                let count = count as f64;
                Some(count / n * (count * n / (left * right)).ln())
            })
            .sum();
        let left_entropy = entropy(self.left.values().copied(), n);
        let right_entropy = entropy(self.right.values().copied(), n);

        match (left_entropy == 0.0, right_entropy == 0.0) {
            (true, true) => 1.0,
            (true, false) | (false, true) => 0.0,
            (false, false) => mutual / (left_entropy * right_entropy).sqrt(),
        }
    }

    fn score(&self) -> ClusteringQualityScore {
        ClusteringQualityScore {
            ari: self.adjusted_rand_index(),
            nmi: self.normalized_mutual_information(),
        }
    }
}

fn pairs_of(count: usize) -> f64 {
    let count = count as f64;
    count * (count - 1.0) / 2.0
}

fn entropy(counts: impl Iterator<Item = usize>, n: f64) -> f64 {
    counts
        .map(|count| {
            let p = count as f64 / n;
            -p * p.ln()
        })
        .sum()
}

fn paired_labels(
    ground_truth: &[usize],
    predicted: &[usize],
) -> Result<Contingency<usize, usize>, ClusteringQualityError> {
    if ground_truth.len() != predicted.len() {
        return Err(ClusteringQualityError::LabelLengthMismatch {
            ground_truth_len: ground_truth.len(),
            predicted_len: predicted.len(),
        });
    }
    Ok(Contingency::from_pairs(
        ground_truth.iter().copied().zip(predicted.iter().copied()),
    ))
}

/// Computes Adjusted Rand Index (ARI) for two cluster labellings.
///
/// # Errors
/// Returns [`ClusteringQualityError::LabelLengthMismatch`] when label vectors
/// have different lengths.
pub fn adjusted_rand_index(
    ground_truth: &[usize],
    predicted: &[usize],
) -> Result<f64, ClusteringQualityError> {
    Ok(paired_labels(ground_truth, predicted)?.adjusted_rand_index())
}

/// Computes Normalized Mutual Information (NMI) for two cluster labellings.
///
/// # Errors
/// Returns [`ClusteringQualityError::LabelLengthMismatch`] when label vectors
/// have different lengths.
pub fn normalized_mutual_information(
    ground_truth: &[usize],
    predicted: &[usize],
) -> Result<f64, ClusteringQualityError> {
    Ok(paired_labels(ground_truth, predicted)?.normalized_mutual_information())
}

/// Computes ARI and NMI from one contingency table.
///
/// # Errors
/// Returns [`ClusteringQualityError::LabelLengthMismatch`] when label vectors
/// have different lengths.
pub fn clustering_quality_score(
    ground_truth: &[usize],
    predicted: &[usize],
) -> Result<ClusteringQualityScore, ClusteringQualityError> {
    Ok(paired_labels(ground_truth, predicted)?.score())
}

/// Scores the agreement of two partitions of the same identifiers.
///
/// Identifiers are matched across partitions regardless of order; all
/// outliers of one side count as one label.
///
/// # Errors
/// Returns [`ClusteringQualityError::DuplicateIdentifier`] when an identifier
/// repeats within a partition and
/// [`ClusteringQualityError::IdentifierMismatch`] when the identifier sets
/// differ.
///
/// # Examples
/// ```
/// use strata_core::{ClusterPartition, compare_partitions};
///
/// let left = ClusterPartition::from_parts(vec![vec![1, 2], vec![3, 4]], vec![]);
/// let right = ClusterPartition::from_parts(vec![vec![4, 3], vec![2, 1]], vec![]);
/// let score = compare_partitions(&left, &right)?;
/// assert_eq!(score.ari, 1.0);
/// # Ok::<(), strata_core::ClusteringQualityError>(())
/// ```
pub fn compare_partitions<Id: Eq + Hash>(
    left: &ClusterPartition<Id>,
    right: &ClusterPartition<Id>,
) -> Result<ClusteringQualityScore, ClusteringQualityError> {
    let right_labels = index_memberships(right, "right")?;
    let left_count = left.len();
    let mut seen: HashSet<&Id> = HashSet::with_capacity(left_count);
    let mut pairs = Vec::with_capacity(left_count);
    for (id, label) in left.memberships() {
        if !seen.insert(id) {
            return Err(ClusteringQualityError::DuplicateIdentifier { side: "left" });
        }
        if let Some(&other) = right_labels.get(id) {
            pairs.push((label, other));
        }
    }

    if pairs.len() != left_count || pairs.len() != right_labels.len() {
        return Err(ClusteringQualityError::IdentifierMismatch {
            left: left_count,
            right: right_labels.len(),
            shared: pairs.len(),
        });
    }
    Ok(Contingency::from_pairs(pairs).score())
}

fn index_memberships<'a, Id: Eq + Hash>(
    partition: &'a ClusterPartition<Id>,
    side: &'static str,
) -> Result<HashMap<&'a Id, Option<usize>>, ClusteringQualityError> {
    let mut labels = HashMap::with_capacity(partition.len());
    for (id, label) in partition.memberships() {
        if labels.insert(id, label).is_some() {
            return Err(ClusteringQualityError::DuplicateIdentifier { side });
        }
    }
    Ok(labels)
}
