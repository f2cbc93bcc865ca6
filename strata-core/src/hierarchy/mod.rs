//! Hierarchy extraction from the mutual reachability spanning tree.
//!
//! This module implements the last two stages of the pipeline:
//!
//! - Recovering the single-linkage dendrogram from the tree with a
//!   disjoint-set union over ascending edges.
//! - Condensing it with `min_cluster_size`, where a cluster continues down
//!   its large branch and small branches fall out as points.
//! - Scoring clusters by excess-of-mass stability, selecting a non-nested set
//!   and labelling points by their nearest selected ancestor.
//!
//! Selection is repeated for every size from 2 up to `min_cluster_size` on
//! the same dendrogram, and a size may never report more clusters than the
//! size below it. The stage runs sequentially; each condensation is linear
//! in the number of points.

mod condense;
mod dendrogram;
mod extract;
mod union_find;

use std::num::NonZeroUsize;

use tracing::instrument;

use crate::{mst::SpanningTree, result::ClusteringResult};

pub use self::condense::{CondensedNode, CondensedTree, Departure};

/// Upper bound on cluster lambdas; zero-weight merges map to this value.
pub const LAMBDA_CAP: f64 = 1e12;

/// A point leaving a selected root below this fraction of the median
/// departure lambda is noise.
pub const ROOT_OUTLIER_RATIO: f64 = 0.1;

/// Converts a reachability weight into a density level.
pub(crate) fn weight_to_lambda(weight: f32) -> f64 {
    if weight == 0.0 {
        LAMBDA_CAP
    } else {
        (1.0 / f64::from(weight)).min(LAMBDA_CAP)
    }
}

/// Errors returned by hierarchy extraction.
#[derive(Clone, Debug, thiserror::Error, PartialEq)]
#[non_exhaustive]
pub enum HierarchyError {
    /// The configured minimum cluster size exceeds the dataset size.
    #[error("min_cluster_size {min_cluster_size} exceeds node_count {node_count}")]
    MinClusterSizeTooLarge {
        /// Number of points in the dataset.
        node_count: usize,
        /// Minimum cluster size requested by the caller.
        min_cluster_size: usize,
    },
    /// A tree edge weight was negative or non-finite.
    #[error("invalid MST edge weight {weight} for edge ({left}, {right})")]
    InvalidEdgeWeight {
        /// Smaller endpoint id for the offending edge.
        left: usize,
        /// Larger endpoint id for the offending edge.
        right: usize,
        /// Invalid weight value observed on the edge.
        weight: f32,
    },
    /// An edge joined two points that were already connected.
    #[error("edge ({left}, {right}) closes a cycle in the spanning tree")]
    CycleDetected {
        /// Smaller endpoint id for the offending edge.
        left: usize,
        /// Larger endpoint id for the offending edge.
        right: usize,
    },
}

impl HierarchyError {
    /// Returns a stable, machine-readable error code for the variant.
    #[must_use]
    pub const fn code(&self) -> HierarchyErrorCode {
        match self {
            Self::MinClusterSizeTooLarge { .. } => HierarchyErrorCode::MinClusterSizeTooLarge,
            Self::InvalidEdgeWeight { .. } => HierarchyErrorCode::InvalidEdgeWeight,
            Self::CycleDetected { .. } => HierarchyErrorCode::CycleDetected,
        }
    }
}

/// Machine-readable error codes for [`HierarchyError`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum HierarchyErrorCode {
    /// The configured minimum cluster size exceeds the dataset size.
    MinClusterSizeTooLarge,
    /// A tree edge weight was invalid.
    InvalidEdgeWeight,
    /// The tree contained a cycle.
    CycleDetected,
}

impl HierarchyErrorCode {
    /// Returns the symbolic identifier for logging and metrics surfaces.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MinClusterSizeTooLarge => "MIN_CLUSTER_SIZE_TOO_LARGE",
            Self::InvalidEdgeWeight => "INVALID_EDGE_WEIGHT",
            Self::CycleDetected => "CYCLE_DETECTED",
        }
    }
}

/// Extracts a flat clustering from a mutual reachability spanning tree.
///
/// Every point receives either a cluster label or [`Label::Noise`]; cluster
/// ids are contiguous from zero in order of first appearance. For a fixed
/// tree, raising `min_cluster_size` never increases the cluster count.
///
/// [`Label::Noise`]: crate::Label::Noise
///
/// # Errors
/// Returns [`HierarchyError`] when `min_cluster_size` exceeds the number of
/// points, when an edge weight is negative or non-finite, or when the edges
/// contain a cycle.
///
/// # Examples
/// ```
/// use std::num::NonZeroUsize;
/// use strata_core::{MstEdge, SpanningTree, extract_clusters};
///
/// let tree = SpanningTree::try_from_edges(
///     4,
///     vec![
///         MstEdge::new(0, 1, 0.5),
///         MstEdge::new(2, 3, 0.5),
///         MstEdge::new(1, 2, 8.0),
///     ],
/// )?;
/// let result = extract_clusters(&tree, NonZeroUsize::new(2).expect("non-zero"))?;
/// assert_eq!(result.cluster_count(), 2);
/// assert_eq!(result.noise_count(), 0);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[instrument(
    name = "core.hierarchy",
    err,
    skip(tree, min_cluster_size),
    fields(nodes = tree.node_count(), min_cluster_size = min_cluster_size.get()),
)]
pub fn extract_clusters(
    tree: &SpanningTree,
    min_cluster_size: NonZeroUsize,
) -> Result<ClusteringResult, HierarchyError> {
    let dendrogram = condense::checked_dendrogram(tree, min_cluster_size)?;
    let (condensed, selected) = extract::select_without_growth(&dendrogram, min_cluster_size);
    Ok(condensed.flatten_selected(&selected))
}
