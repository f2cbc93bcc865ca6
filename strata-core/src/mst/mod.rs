//! Minimum spanning tree construction over the mutual reachability graph.
//!
//! The graph is complete, so this module uses dense Prim's algorithm with
//! array-based minimum tracking: `O(n²)` time, `O(n)` memory and no edge
//! list. Candidates are ordered by `(weight, min(u, v), max(u, v))` both when
//! relaxing and when picking the next vertex, which makes the tree a pure
//! function of the input even under heavy weight ties.

use std::cmp::Ordering;

use tracing::instrument;

use crate::{
    datasource::DataSource, error::DataSourceError, reachability::MutualReachability,
};

/// Errors returned while computing a minimum spanning tree.
#[derive(Clone, Debug, thiserror::Error, PartialEq)]
#[non_exhaustive]
pub enum MstError {
    /// The caller requested an MST for an empty graph.
    #[error("cannot compute an MST for an empty graph")]
    EmptyGraph,
    /// An edge referenced a node id that is not present in the graph.
    #[error("edge references node {node}, but node_count is {node_count}")]
    InvalidNodeId {
        /// The invalid node id referenced by an edge.
        node: usize,
        /// The number of nodes in the graph.
        node_count: usize,
    },
    /// An edge carried a non-finite weight.
    #[error("edge ({left}, {right}) has non-finite weight {weight}")]
    NonFiniteWeight {
        /// The left endpoint id.
        left: usize,
        /// The right endpoint id.
        right: usize,
        /// The offending weight.
        weight: f32,
    },
    /// Reading a mutual reachability weight failed.
    #[error(transparent)]
    DataSource(#[from] DataSourceError),
    /// An internal invariant was violated, indicating a logic error.
    #[error("MST invariant violated: {invariant} (expected {expected}, found {found})")]
    InvariantViolation {
        /// Name of the violated invariant to assist debugging.
        invariant: &'static str,
        /// Expected count.
        expected: usize,
        /// Observed count.
        found: usize,
    },
}

impl MstError {
    /// Returns a stable, machine-readable error code for the variant.
    #[must_use]
    pub const fn code(&self) -> MstErrorCode {
        match self {
            Self::EmptyGraph => MstErrorCode::EmptyGraph,
            Self::InvalidNodeId { .. } => MstErrorCode::InvalidNodeId,
            Self::NonFiniteWeight { .. } => MstErrorCode::NonFiniteWeight,
            Self::DataSource(_) => MstErrorCode::DataSource,
            Self::InvariantViolation { .. } => MstErrorCode::InvariantViolation,
        }
    }
}

/// Machine-readable error codes for [`MstError`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum MstErrorCode {
    /// The caller requested an MST for an empty graph.
    EmptyGraph,
    /// An edge referenced a node id that is not present in the graph.
    InvalidNodeId,
    /// An edge contained a non-finite weight.
    NonFiniteWeight,
    /// A weight lookup failed.
    DataSource,
    /// An internal invariant was violated.
    InvariantViolation,
}

impl MstErrorCode {
    /// Returns the symbolic identifier for logging and metrics surfaces.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EmptyGraph => "EMPTY_GRAPH",
            Self::InvalidNodeId => "INVALID_NODE_ID",
            Self::NonFiniteWeight => "NON_FINITE_WEIGHT",
            Self::DataSource => "DATA_SOURCE",
            Self::InvariantViolation => "INVARIANT_VIOLATION",
        }
    }
}

/// A single MST edge in canonical undirected form (`source < target`).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MstEdge {
    source: usize,
    target: usize,
    weight: f32,
}

impl MstEdge {
    /// Creates an edge, canonicalising the endpoints so `source <= target`.
    #[must_use]
    pub fn new(left: usize, right: usize, weight: f32) -> Self {
        let (source, target) = if left <= right { (left, right) } else { (right, left) };
        Self {
            source,
            target,
            weight,
        }
    }

    /// Returns the smaller endpoint id.
    #[must_use]
    #[rustfmt::skip]
    pub fn source(&self) -> usize { self.source }

    /// Returns the larger endpoint id.
    #[must_use]
    #[rustfmt::skip]
    pub fn target(&self) -> usize { self.target }

    /// Returns the edge weight.
    #[must_use]
    #[rustfmt::skip]
    pub fn weight(&self) -> f32 { self.weight }
}

impl Eq for MstEdge {}

impl Ord for MstEdge {
    fn cmp(&self, other: &Self) -> Ordering {
        self.weight
            .total_cmp(&other.weight)
            .then_with(|| self.source.cmp(&other.source))
            .then_with(|| self.target.cmp(&other.target))
    }
}

impl PartialOrd for MstEdge {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Spanning tree of `node_count` vertices: exactly `node_count - 1` edges
/// sorted ascending by `(weight, source, target)`.
#[derive(Clone, Debug, PartialEq)]
pub struct SpanningTree {
    node_count: usize,
    edges: Vec<MstEdge>,
}

impl SpanningTree {
    /// Builds a tree from explicit edges, sorting them into canonical order.
    ///
    /// Only counts, bounds and weights are checked here; cycles surface when
    /// the hierarchy is built.
    ///
    /// # Errors
    /// Returns [`MstError::EmptyGraph`] when `node_count` is zero,
    /// [`MstError::InvalidNodeId`] for out-of-range endpoints,
    /// [`MstError::NonFiniteWeight`] for NaN or infinite weights, and
    /// [`MstError::InvariantViolation`] when the edge count is not
    /// `node_count - 1`.
    pub fn try_from_edges(node_count: usize, mut edges: Vec<MstEdge>) -> Result<Self, MstError> {
        if node_count == 0 {
            return Err(MstError::EmptyGraph);
        }
        for edge in &edges {
            if edge.target >= node_count {
                return Err(MstError::InvalidNodeId {
                    node: edge.target,
                    node_count,
                });
            }
            if !edge.weight.is_finite() {
                return Err(MstError::NonFiniteWeight {
                    left: edge.source,
                    right: edge.target,
                    weight: edge.weight,
                });
            }
        }
        if edges.len() != node_count - 1 {
            return Err(MstError::InvariantViolation {
                invariant: "edge count equals node count minus one",
                expected: node_count - 1,
                found: edges.len(),
            });
        }
        edges.sort_unstable();
        Ok(Self { node_count, edges })
    }

    /// Returns the number of spanned vertices.
    #[must_use]
    #[rustfmt::skip]
    pub fn node_count(&self) -> usize { self.node_count }

    /// Returns the tree edges in ascending order.
    #[must_use]
    #[rustfmt::skip]
    pub fn edges(&self) -> &[MstEdge] { &self.edges }

    /// Sums edge weights as `f64`.
    #[must_use]
    pub fn total_weight(&self) -> f64 {
        self.edges.iter().map(|edge| f64::from(edge.weight)).sum()
    }

    /// Returns whether every edge has zero weight.
    ///
    /// A single-vertex tree has no edges and reports `true`.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.edges.iter().all(|edge| edge.weight == 0.0)
    }
}

#[derive(Clone, Copy, Debug)]
struct Candidate {
    weight: f32,
    parent: usize,
}

/// Orders the candidate edges `(a.parent, a_vertex)` and `(b.parent, b_vertex)`
/// by `(weight, min endpoint, max endpoint)`.
fn compare_candidates(a: Candidate, a_vertex: usize, b: Candidate, b_vertex: usize) -> Ordering {
    let key = |c: Candidate, v: usize| (c.parent.min(v), c.parent.max(v));
    a.weight
        .total_cmp(&b.weight)
        .then_with(|| key(a, a_vertex).cmp(&key(b, b_vertex)))
}

/// Computes the minimum spanning tree of the mutual reachability graph with
/// dense Prim's algorithm, starting from vertex 0.
///
/// Takes `O(n²)` weight evaluations and `O(n)` memory.
///
/// # Errors
/// Returns [`MstError::EmptyGraph`] for a graph without vertices,
/// [`MstError::DataSource`] when a weight lookup fails,
/// [`MstError::NonFiniteWeight`] when a weight is NaN or infinite, and
/// [`MstError::InvariantViolation`] if the tree does not reach every vertex.
///
/// # Examples
/// ```
/// use std::num::NonZeroUsize;
/// use strata_core::{CoreDistances, DistanceMatrix, MutualReachability, prim_mst};
///
/// let matrix = DistanceMatrix::try_new(
///     "triangle",
///     vec![vec![0.0, 1.0, 4.0], vec![1.0, 0.0, 2.0], vec![4.0, 2.0, 0.0]],
/// )?;
/// let core = CoreDistances::from_values(vec![0.0; 3], NonZeroUsize::MIN);
/// let tree = prim_mst(&MutualReachability::new(&matrix, &core))?;
/// assert_eq!(tree.edges().len(), 2);
/// assert_eq!(tree.total_weight(), 3.0);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[instrument(name = "core.mst", err, skip(graph), fields(nodes = graph.len()))]
pub fn prim_mst<D: DataSource + ?Sized>(
    graph: &MutualReachability<'_, D>,
) -> Result<SpanningTree, MstError> {
    let node_count = graph.len();
    if node_count == 0 {
        return Err(MstError::EmptyGraph);
    }

    let mut in_tree = vec![false; node_count];
    let mut best: Vec<Option<Candidate>> = vec![None; node_count];
    let mut edges = Vec::with_capacity(node_count - 1);
    let mut current = 0;
    in_tree[current] = true;

    for _ in 1..node_count {
        for vertex in 0..node_count {
            if in_tree[vertex] {
                continue;
            }
            let weight = graph.reach(current, vertex)?;
            if !weight.is_finite() {
                return Err(MstError::NonFiniteWeight {
                    left: current,
                    right: vertex,
                    weight,
                });
            }
            let offer = Candidate {
                weight,
                parent: current,
            };
            let improves = best[vertex].is_none_or(|held| {
                compare_candidates(offer, vertex, held, vertex) == Ordering::Less
            });
            if improves {
                best[vertex] = Some(offer);
            }
        }

        let mut next: Option<(usize, Candidate)> = None;
        for (vertex, candidate) in best.iter().enumerate() {
            let Some(candidate) = *candidate else { continue };
            if in_tree[vertex] {
                continue;
            }
            let better = next.is_none_or(|(held_vertex, held)| {
                compare_candidates(candidate, vertex, held, held_vertex) == Ordering::Less
            });
            if better {
                next = Some((vertex, candidate));
            }
        }

        let Some((vertex, candidate)) = next else {
            return Err(MstError::InvariantViolation {
                invariant: "every vertex is reachable from vertex 0",
                expected: node_count - 1,
                found: edges.len(),
            });
        };
        in_tree[vertex] = true;
        edges.push(MstEdge::new(candidate.parent, vertex, candidate.weight));
        current = vertex;
    }

    SpanningTree::try_from_edges(node_count, edges)
}

#[cfg(test)]
mod property;
