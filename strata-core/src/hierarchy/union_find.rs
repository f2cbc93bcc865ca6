//! Disjoint-set union used while building the single-linkage dendrogram.
//!
//! Path compression and union by size keep the single pass over the sorted
//! tree edges near linear.

#[derive(Clone, Debug)]
pub(super) struct DisjointSet {
    parent: Vec<usize>,
    size: Vec<usize>,
    /// Dendrogram node currently representing each component, indexed by
    /// component root.
    pub(super) component_node: Vec<usize>,
}

impl DisjointSet {
    pub(super) fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            size: vec![1; n],
            component_node: (0..n).collect(),
        }
    }

    pub(super) fn find(&mut self, mut node: usize) -> usize {
        let mut root = node;
        while self.parent[root] != root {
            root = self.parent[root];
        }

        while self.parent[node] != node {
            let parent = self.parent[node];
            self.parent[node] = root;
            node = parent;
        }

        root
    }

    /// Merges the components holding `left` and `right` and returns the new
    /// root, or `None` when they were already connected.
    pub(super) fn union(&mut self, left: usize, right: usize) -> Option<usize> {
        let mut left = self.find(left);
        let mut right = self.find(right);
        if left == right {
            return None;
        }
        if self.size[left] < self.size[right] {
            std::mem::swap(&mut left, &mut right);
        }
        self.parent[right] = left;
        self.size[left] += self.size[right];
        Some(left)
    }

    pub(super) fn component_size(&mut self, node: usize) -> usize {
        let root = self.find(node);
        self.size[root]
    }
}
