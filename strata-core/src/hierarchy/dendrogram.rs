//! Single-linkage dendrogram recovered from the spanning tree.
//!
//! The tree encodes the same single-linkage hierarchy as the full mutual
//! reachability graph. Edges are merged in ascending order; each merge creates
//! a node whose children are the current nodes of the two components.

use crate::mst::SpanningTree;

use super::{HierarchyError, union_find::DisjointSet, weight_to_lambda};

#[derive(Clone, Debug, PartialEq)]
pub(super) struct DendrogramNode {
    pub(super) children: Option<(usize, usize)>,
    pub(super) lambda: f64,
    pub(super) size: usize,
    pub(super) point: Option<usize>,
}

/// Binary merge tree over `n` points: nodes `0..n` are the points, node
/// `n + k` is the `k`-th merge, and the last node is the root.
#[derive(Clone, Debug, PartialEq)]
pub(super) struct Dendrogram {
    pub(super) nodes: Vec<DendrogramNode>,
    point_count: usize,
}

impl Dendrogram {
    pub(super) fn from_tree(tree: &SpanningTree) -> Result<Self, HierarchyError> {
        let node_count = tree.node_count();
        let mut nodes = Vec::with_capacity(node_count.saturating_mul(2).saturating_sub(1));
        nodes.extend((0..node_count).map(|point| DendrogramNode {
            children: None,
            lambda: super::LAMBDA_CAP,
            size: 1,
            point: Some(point),
        }));

        let mut dsu = DisjointSet::new(node_count);
        for edge in tree.edges() {
            let left_root = dsu.find(edge.source());
            let right_root = dsu.find(edge.target());
            let left_node = dsu.component_node[left_root];
            let right_node = dsu.component_node[right_root];
            let Some(merged) = dsu.union(left_root, right_root) else {
                return Err(HierarchyError::CycleDetected {
                    left: edge.source(),
                    right: edge.target(),
                });
            };
            let new_id = nodes.len();
            nodes.push(DendrogramNode {
                children: Some((left_node, right_node)),
                lambda: weight_to_lambda(edge.weight()),
                size: dsu.component_size(merged),
                point: None,
            });
            dsu.component_node[merged] = new_id;
        }

        Ok(Self {
            nodes,
            point_count: node_count,
        })
    }

    pub(super) fn root(&self) -> usize {
        self.nodes.len() - 1
    }

    pub(super) fn point_count(&self) -> usize {
        self.point_count
    }
}
