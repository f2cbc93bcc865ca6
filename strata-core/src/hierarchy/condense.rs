//! Condensation of the single-linkage dendrogram under `min_cluster_size`.
//!
//! Walking down from the root (born at lambda 0), a cluster splits into two
//! new clusters only when both branches hold at least `min_cluster_size`
//! points. When one branch is too small its points fall out of the current
//! cluster at the merge lambda and the cluster continues down the large
//! branch; when both are too small every remaining point falls out and the
//! cluster ends.

use std::num::NonZeroUsize;

use crate::mst::SpanningTree;

use super::{HierarchyError, dendrogram::Dendrogram};

/// A point leaving a condensed cluster.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Departure {
    /// Input index of the point.
    pub point: usize,
    /// Lambda at which the point left the cluster.
    pub lambda: f64,
}

/// One cluster of the condensed tree.
#[derive(Clone, Debug, PartialEq)]
pub struct CondensedNode {
    parent: Option<usize>,
    birth_lambda: f64,
    departures: Vec<Departure>,
    children: Vec<usize>,
    split_lambda: Option<f64>,
    size: usize,
    stability: f64,
}

impl CondensedNode {
    fn new(parent: Option<usize>, birth_lambda: f64, size: usize) -> Self {
        Self {
            parent,
            birth_lambda,
            departures: Vec::new(),
            children: Vec::new(),
            split_lambda: None,
            size,
            stability: 0.0,
        }
    }

    /// Returns the parent cluster, `None` for the root.
    #[must_use]
    #[rustfmt::skip]
    pub fn parent(&self) -> Option<usize> { self.parent }

    /// Returns the lambda at which the cluster was born.
    #[must_use]
    #[rustfmt::skip]
    pub fn birth_lambda(&self) -> f64 { self.birth_lambda }

    /// Returns the points that fell out of this cluster, in order of
    /// recording.
    #[must_use]
    #[rustfmt::skip]
    pub fn departures(&self) -> &[Departure] { &self.departures }

    /// Returns the child cluster ids; empty or exactly two.
    #[must_use]
    #[rustfmt::skip]
    pub fn children(&self) -> &[usize] { &self.children }

    /// Returns the lambda at which the cluster split, if it did.
    #[must_use]
    #[rustfmt::skip]
    pub fn split_lambda(&self) -> Option<f64> { self.split_lambda }

    /// Returns the number of points in the cluster at birth.
    #[must_use]
    #[rustfmt::skip]
    pub fn size(&self) -> usize { self.size }

    /// Returns the excess-of-mass stability of the cluster.
    ///
    /// The sum of `lambda - birth_lambda` over departed points, plus
    /// `(split_lambda - birth_lambda) * |points at split|` when it split.
    #[must_use]
    #[rustfmt::skip]
    pub fn stability(&self) -> f64 { self.stability }

    fn record_departure(&mut self, point: usize, lambda: f64) {
        self.departures.push(Departure { point, lambda });
        self.stability += lambda - self.birth_lambda;
    }
}

/// Condensed cluster tree. Node 0 is the root; children always have larger
/// ids than their parent.
///
/// # Examples
/// ```
/// use std::num::NonZeroUsize;
/// use strata_core::{CondensedTree, MstEdge, SpanningTree};
///
/// let tree = SpanningTree::try_from_edges(
///     4,
///     vec![
///         MstEdge::new(0, 1, 1.0),
///         MstEdge::new(2, 3, 1.0),
///         MstEdge::new(1, 2, 10.0),
///     ],
/// )?;
/// let condensed = CondensedTree::from_tree(&tree, NonZeroUsize::new(2).expect("non-zero"))?;
/// assert_eq!(condensed.nodes().len(), 3);
/// assert_eq!(condensed.nodes()[0].children(), &[1, 2]);
/// assert_eq!(condensed.nodes()[0].split_lambda(), Some(0.1));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct CondensedTree {
    nodes: Vec<CondensedNode>,
    point_count: usize,
}

impl CondensedTree {
    /// Builds the single-linkage dendrogram from `tree` and condenses it.
    ///
    /// # Errors
    /// Returns [`HierarchyError::MinClusterSizeTooLarge`] when
    /// `min_cluster_size` exceeds the number of points,
    /// [`HierarchyError::InvalidEdgeWeight`] for negative or non-finite
    /// weights and [`HierarchyError::CycleDetected`] when an edge joins two
    /// already-connected points.
    pub fn from_tree(
        tree: &SpanningTree,
        min_cluster_size: NonZeroUsize,
    ) -> Result<Self, HierarchyError> {
        let dendrogram = checked_dendrogram(tree, min_cluster_size)?;
        Ok(Self::from_dendrogram(&dendrogram, min_cluster_size))
    }

    /// Condenses an already validated dendrogram.
    pub(super) fn from_dendrogram(dendrogram: &Dendrogram, min_cluster_size: NonZeroUsize) -> Self {
        let point_count = dendrogram.point_count();
        let mut builder = CondenseBuilder {
            dendrogram,
            min_cluster_size: min_cluster_size.get(),
            nodes: vec![CondensedNode::new(None, 0.0, point_count)],
        };
        builder.condense(dendrogram.root());

        Self {
            nodes: builder.nodes,
            point_count,
        }
    }

    /// Returns every condensed cluster, root first.
    #[must_use]
    #[rustfmt::skip]
    pub fn nodes(&self) -> &[CondensedNode] { &self.nodes }

    /// Returns the number of points covered by the tree.
    #[must_use]
    #[rustfmt::skip]
    pub fn point_count(&self) -> usize { self.point_count }

    /// Returns the root cluster id.
    #[must_use]
    #[rustfmt::skip]
    pub fn root(&self) -> usize { 0 }

    /// Returns the median departure lambda over every point, the density
    /// level typical of the data set. Zero for an empty tree.
    #[must_use]
    pub fn median_departure_lambda(&self) -> f64 {
        let mut lambdas: Vec<f64> = self
            .nodes
            .iter()
            .flat_map(|node| node.departures.iter().map(|departure| departure.lambda))
            .collect();
        let middle = lambdas.len() / 2;
        if lambdas.is_empty() {
            return 0.0;
        }
        let (_, median, _) = lambdas.select_nth_unstable_by(middle, f64::total_cmp);
        *median
    }
}

/// Checks `min_cluster_size` and the edge weights, then builds the
/// single-linkage dendrogram.
pub(super) fn checked_dendrogram(
    tree: &SpanningTree,
    min_cluster_size: NonZeroUsize,
) -> Result<Dendrogram, HierarchyError> {
    let point_count = tree.node_count();
    if min_cluster_size.get() > point_count {
        return Err(HierarchyError::MinClusterSizeTooLarge {
            node_count: point_count,
            min_cluster_size: min_cluster_size.get(),
        });
    }
    validate_edges(tree)?;
    Dendrogram::from_tree(tree)
}

fn validate_edges(tree: &SpanningTree) -> Result<(), HierarchyError> {
    for edge in tree.edges() {
        let weight = edge.weight();
        if !weight.is_finite() || weight < 0.0 {
            return Err(HierarchyError::InvalidEdgeWeight {
                left: edge.source(),
                right: edge.target(),
                weight,
            });
        }
    }
    Ok(())
}

struct CondenseBuilder<'a> {
    dendrogram: &'a Dendrogram,
    min_cluster_size: usize,
    nodes: Vec<CondensedNode>,
}

impl CondenseBuilder<'_> {
    /// Walks the dendrogram with an explicit stack; chains of one-point
    /// merges can be as deep as the point count.
    fn condense(&mut self, root: usize) {
        let mut pending = vec![(root, 0_usize, 0.0_f64)];
        while let Some((node_id, cluster, entry_lambda)) = pending.pop() {
            let node = &self.dendrogram.nodes[node_id];
            let Some((left, right)) = node.children else {
                // Leaf reached while its cluster continues.
                if let Some(point) = node.point {
                    self.nodes[cluster].record_departure(point, entry_lambda);
                }
                continue;
            };

            let lambda = node.lambda;
            let left_size = self.dendrogram.nodes[left].size;
            let right_size = self.dendrogram.nodes[right].size;
            let left_big = left_size >= self.min_cluster_size;
            let right_big = right_size >= self.min_cluster_size;

            match (left_big, right_big) {
                (true, true) => {
                    let left_cluster = self.split(cluster, lambda, left_size, right_size);
                    let right_cluster = left_cluster + 1;
                    pending.push((right, right_cluster, lambda));
                    pending.push((left, left_cluster, lambda));
                }
                (true, false) => {
                    self.emit_points(right, cluster, lambda);
                    pending.push((left, cluster, lambda));
                }
                (false, true) => {
                    self.emit_points(left, cluster, lambda);
                    pending.push((right, cluster, lambda));
                }
                (false, false) => {
                    self.emit_points(left, cluster, lambda);
                    self.emit_points(right, cluster, lambda);
                }
            }
        }
    }

    /// Ends `parent` at `lambda` and creates its two children; returns the id
    /// of the left child (the right child follows it).
    fn split(&mut self, parent: usize, lambda: f64, left_size: usize, right_size: usize) -> usize {
        let left_id = self.nodes.len();
        self.nodes
            .push(CondensedNode::new(Some(parent), lambda, left_size));
        self.nodes
            .push(CondensedNode::new(Some(parent), lambda, right_size));

        let node = &mut self.nodes[parent];
        node.children.extend([left_id, left_id + 1]);
        node.split_lambda = Some(lambda);
        node.stability += (lambda - node.birth_lambda) * (left_size + right_size) as f64;
        left_id
    }

    fn emit_points(&mut self, node_id: usize, cluster: usize, lambda: f64) {
        let mut stack = vec![node_id];
        while let Some(current) = stack.pop() {
            let node = &self.dendrogram.nodes[current];
            if let Some(point) = node.point {
                self.nodes[cluster].record_departure(point, lambda);
                continue;
            }
            if let Some((left, right)) = node.children {
                stack.push(right);
                stack.push(left);
            }
        }
    }
}
