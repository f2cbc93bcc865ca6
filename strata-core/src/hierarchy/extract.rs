//! Stability-based selection of flat clusters from a [`CondensedTree`].

use std::num::NonZeroUsize;

use tracing::debug;

use crate::result::ClusteringResult;

use super::{ROOT_OUTLIER_RATIO, condense::CondensedTree, dendrogram::Dendrogram};

impl CondensedTree {
    /// Selects the clusters that maximise total stability.
    ///
    /// Bottom-up, a node keeps its own stability when it is at least the sum
    /// of its children's best scores and its descendants are dropped;
    /// otherwise it is replaced by them. Ties keep the parent. Returns the
    /// selected ids in ascending order; no selected id is an ancestor of
    /// another.
    #[must_use]
    pub fn select_clusters(&self) -> Vec<usize> {
        let nodes = self.nodes();
        let mut score = vec![0.0_f64; nodes.len()];
        let mut selected = vec![false; nodes.len()];

        for id in (0..nodes.len()).rev() {
            let node = &nodes[id];
            let children: f64 = node.children().iter().map(|&child| score[child]).sum();
            if node.children().is_empty() || node.stability() >= children {
                selected[id] = true;
                score[id] = node.stability();
            } else {
                score[id] = children;
            }
        }

        // Children always follow their parent, so one forward pass settles
        // coverage.
        let mut covered = vec![false; nodes.len()];
        for id in 0..nodes.len() {
            if let Some(parent) = nodes[id].parent() {
                covered[id] = covered[parent] || selected[parent];
            }
            if covered[id] {
                selected[id] = false;
            }
        }

        selected
            .iter()
            .enumerate()
            .filter_map(|(id, &keep)| keep.then_some(id))
            .collect()
    }

    /// Selects the most stable set of at most `limit` clusters.
    ///
    /// Like [`select_clusters`](Self::select_clusters), every leaf of the
    /// condensed tree has exactly one selected ancestor (or is selected
    /// itself). Among such sets with no more than `limit` members the one
    /// with the largest total stability wins; ties keep fewer clusters.
    ///
    /// # Examples
    /// ```
    /// use std::num::NonZeroUsize;
    /// use strata_core::{CondensedTree, MstEdge, SpanningTree};
    ///
    /// let tree = SpanningTree::try_from_edges(
    ///     6,
    ///     vec![
    ///         MstEdge::new(0, 1, 0.1),
    ///         MstEdge::new(1, 2, 0.1),
    ///         MstEdge::new(3, 4, 0.1),
    ///         MstEdge::new(4, 5, 0.1),
    ///         MstEdge::new(2, 3, 10.0),
    ///     ],
    /// )?;
    /// let condensed = CondensedTree::from_tree(&tree, NonZeroUsize::new(3).expect("non-zero"))?;
    /// assert_eq!(condensed.select_clusters(), vec![1, 2]);
    /// assert_eq!(condensed.select_at_most(NonZeroUsize::MIN), vec![0]);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    #[must_use]
    pub fn select_at_most(&self, limit: NonZeroUsize) -> Vec<usize> {
        let nodes = self.nodes();
        let limit = limit.get();
        // best[id][k - 1] is the top stability of a k-cluster cut below id;
        // shares[id][k - 1] records how k divides between the two children.
        let mut best: Vec<Vec<f64>> = vec![Vec::new(); nodes.len()];
        let mut shares: Vec<Vec<(usize, usize)>> = vec![Vec::new(); nodes.len()];

        for id in (0..nodes.len()).rev() {
            let mut scores = vec![nodes[id].stability()];
            let mut split = vec![(0, 0)];
            if let [left, right] = *nodes[id].children() {
                for (i, &left_score) in best[left].iter().enumerate() {
                    for (j, &right_score) in best[right].iter().enumerate() {
                        let count = i + j + 2;
                        if count > limit {
                            break;
                        }
                        if scores.len() < count {
                            scores.resize(count, f64::NEG_INFINITY);
                            split.resize(count, (0, 0));
                        }
                        let total = left_score + right_score;
                        if total > scores[count - 1] {
                            scores[count - 1] = total;
                            split[count - 1] = (i + 1, j + 1);
                        }
                    }
                }
                best[left].clear();
                best[right].clear();
            }
            best[id] = scores;
            shares[id] = split;
        }

        let root = self.root();
        let Some(root_scores) = best.get(root) else {
            return Vec::new();
        };
        let mut count = 1;
        for (index, &score) in root_scores.iter().enumerate() {
            if score > root_scores[count - 1] {
                count = index + 1;
            }
        }

        let mut chosen = Vec::with_capacity(count);
        let mut pending = vec![(root, count)];
        while let Some((id, wanted)) = pending.pop() {
            match *nodes[id].children() {
                [left, right] if wanted > 1 => {
                    let (left_count, right_count) = shares[id][wanted - 1];
                    pending.push((right, right_count));
                    pending.push((left, left_count));
                }
                _ => chosen.push(id),
            }
        }
        chosen.sort_unstable();
        chosen
    }

    /// Assigns every point the nearest selected ancestor of the cluster it
    /// fell out of, or `None` for noise.
    ///
    /// When the root itself is selected, a point that fell straight out of
    /// the root is noise if its departure lambda is below
    /// [`ROOT_OUTLIER_RATIO`] times the
    /// [median departure lambda](Self::median_departure_lambda).
    #[must_use]
    pub fn assign_points(&self, selected: &[usize]) -> Vec<Option<usize>> {
        let nodes = self.nodes();
        let mut is_selected = vec![false; nodes.len()];
        for &id in selected {
            if let Some(flag) = is_selected.get_mut(id) {
                *flag = true;
            }
        }

        let mut nearest: Vec<Option<usize>> = Vec::with_capacity(nodes.len());
        for (id, node) in nodes.iter().enumerate() {
            let inherited = node.parent().and_then(|parent| nearest[parent]);
            nearest.push(if is_selected[id] { Some(id) } else { inherited });
        }

        let root = self.root();
        let outlier_below = ROOT_OUTLIER_RATIO * self.median_departure_lambda();
        let mut assignment = vec![None; self.point_count()];
        for (id, node) in nodes.iter().enumerate() {
            for departure in node.departures() {
                let isolated = id == root && departure.lambda < outlier_below;
                assignment[departure.point] = nearest[id].filter(|_| !isolated);
            }
        }
        assignment
    }

    /// Selects clusters and labels every point, numbering clusters by first
    /// appearance in input order.
    #[must_use]
    pub fn flatten(&self) -> ClusteringResult {
        self.flatten_selected(&self.select_clusters())
    }

    pub(super) fn flatten_selected(&self, selected: &[usize]) -> ClusteringResult {
        ClusteringResult::from_assignment(&self.assign_points(selected))
    }
}

/// Condenses `dendrogram` at every size from 2 up to `min_cluster_size` and
/// returns the last tree with its selection.
///
/// Each size uses the stability-maximising selection unless that would hold
/// more clusters than the previous size ended with, in which case the best
/// selection within that count is used instead. The cluster count therefore
/// never grows as `min_cluster_size` does for a fixed spanning tree.
pub(super) fn select_without_growth(
    dendrogram: &Dendrogram,
    min_cluster_size: NonZeroUsize,
) -> (CondensedTree, Vec<usize>) {
    let first = NonZeroUsize::MIN.saturating_add(1).min(min_cluster_size);
    let mut condensed = CondensedTree::from_dendrogram(dendrogram, first);
    let mut selected = condensed.select_clusters();

    let mut size = first;
    while size < min_cluster_size {
        size = size.saturating_add(1);
        let limit = NonZeroUsize::new(selected.len()).unwrap_or(NonZeroUsize::MIN);
        condensed = CondensedTree::from_dendrogram(dendrogram, size);
        selected = condensed.select_clusters();
        if selected.len() > limit.get() {
            debug!(
                min_cluster_size = size.get(),
                unconstrained = selected.len(),
                limit = limit.get(),
                "limiting cluster count to the smaller size's result"
            );
            selected = condensed.select_at_most(limit);
        }
    }
    (condensed, selected)
}
