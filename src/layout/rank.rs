// src/layout/rank.rs

//! Rank assignment: longest dependency chain ending at each node.

use crate::graph::TechGraph;

/// `rank[i] = 1 + max(rank[dep])`, or 0 for nodes without dependencies.
///
/// Walks the graph's topological order, so every dependency is ranked before
/// the nodes that need it. Indexed by input position.
pub fn assign_ranks(graph: &TechGraph) -> Vec<usize> {
    let mut ranks = vec![0usize; graph.len()];

    for &node in graph.topo_indices() {
        ranks[node] = graph
            .dep_indices(node)
            .iter()
            .map(|&dep| ranks[dep] + 1)
            .max()
            .unwrap_or(0);
    }

    ranks
}

/// Group node indices by rank, preserving input order inside each rank.
pub fn group_by_rank(ranks: &[usize]) -> Vec<Vec<usize>> {
    let Some(&max_rank) = ranks.iter().max() else {
        return Vec::new();
    };

    let mut layers = vec![Vec::new(); max_rank + 1];
    for (node, &rank) in ranks.iter().enumerate() {
        layers[rank].push(node);
    }
    layers
}
