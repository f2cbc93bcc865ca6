//! Sequential Kruskal oracle over the complete mutual reachability graph.
//!
//! Sorts every pair by `(weight, source, target)`, mirroring `MstEdge::Ord`,
//! so total weights are comparable with the Prim implementation.

use crate::{DataSource, reachability::MutualReachability};

/// Result of the sequential Kruskal oracle.
#[derive(Clone, Debug)]
pub(super) struct OracleTree {
    /// Total weight, accumulated as `f64`.
    pub total_weight: f64,
    /// Number of accepted edges.
    pub edge_count: usize,
}

fn find_root(parent: &mut [usize], mut node: usize) -> usize {
    while parent[node] != node {
        parent[node] = parent[parent[node]];
        node = parent[node];
    }
    node
}

pub(super) fn sequential_kruskal<D: DataSource>(graph: &MutualReachability<'_, D>) -> OracleTree {
    let node_count = graph.len();
    let mut edges = Vec::with_capacity(node_count * node_count.saturating_sub(1) / 2);
    for source in 0..node_count {
        for target in source + 1..node_count {
            let weight = graph.reach(source, target).expect("oracle weights must resolve");
            edges.push((weight, source, target));
        }
    }
    edges.sort_unstable_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)).then(a.2.cmp(&b.2)));

    let mut parent: Vec<usize> = (0..node_count).collect();
    let mut total_weight = 0.0_f64;
    let mut edge_count = 0;
    for (weight, source, target) in edges {
        let ra = find_root(&mut parent, source);
        let rb = find_root(&mut parent, target);
        if ra != rb {
            parent[rb] = ra;
            total_weight += f64::from(weight);
            edge_count += 1;
        }
    }
    OracleTree {
        total_weight,
        edge_count,
    }
}
