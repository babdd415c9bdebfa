// src/layout/order.rs

//! Within-rank ordering: barycenter crossing reduction.

use tracing::trace;

use crate::graph::TechGraph;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sweep {
    /// Order rank `r` by its dependencies in rank `r - 1`.
    Forward,
    /// Order rank `r` by its dependents in rank `r + 1`.
    Backward,
}

/// Result of the ordering phase.
#[derive(Debug, Clone)]
pub struct Ordering {
    /// Node indices per rank, top to bottom.
    pub layers: Vec<Vec<usize>>,
    /// Crossings between adjacent ranks for `layers`.
    pub crossings: usize,
}

/// Reorder each rank to reduce edge crossings.
///
/// Runs `passes` sweeps alternating forward and backward, starting forward.
/// A node's key is the mean within-rank position of its neighbours in the
/// reference rank; a node without such neighbours keeps its current position
/// as its key. Ties go to input order. The ordering with the fewest crossings
/// seen, the initial one included, wins; on equal counts the earlier one is
/// kept.
pub fn order_layers(
    graph: &TechGraph,
    ranks: &[usize],
    mut layers: Vec<Vec<usize>>,
    passes: usize,
) -> Ordering {
    let mut positions = positions_of(graph.len(), &layers);

    let mut best_crossings = count_crossings(graph, ranks, &layers, &positions);
    let mut best_layers = layers.clone();

    for pass in 0..passes {
        if best_crossings == 0 {
            break;
        }

        let sweep = if pass % 2 == 0 {
            Sweep::Forward
        } else {
            Sweep::Backward
        };

        match sweep {
            Sweep::Forward => {
                for r in 1..layers.len() {
                    barycenter_sort(graph, ranks, &mut layers, &mut positions, r, sweep);
                }
            }
            Sweep::Backward => {
                for r in (0..layers.len().saturating_sub(1)).rev() {
                    barycenter_sort(graph, ranks, &mut layers, &mut positions, r, sweep);
                }
            }
        }

        let crossings = count_crossings(graph, ranks, &layers, &positions);
        trace!(pass, ?sweep, crossings, "barycenter sweep finished");

        if crossings < best_crossings {
            best_crossings = crossings;
            best_layers = layers.clone();
        }
    }

    Ordering {
        layers: best_layers,
        crossings: best_crossings,
    }
}

fn barycenter_sort(
    graph: &TechGraph,
    ranks: &[usize],
    layers: &mut [Vec<usize>],
    positions: &mut [usize],
    layer_idx: usize,
    sweep: Sweep,
) {
    let reference_rank = match sweep {
        Sweep::Forward => match layer_idx.checked_sub(1) {
            Some(r) => r,
            None => return,
        },
        Sweep::Backward => layer_idx + 1,
    };

    let mut keyed: Vec<(f64, usize)> = layers[layer_idx]
        .iter()
        .map(|&node| {
            let neighbours = match sweep {
                Sweep::Forward => graph.dep_indices(node),
                Sweep::Backward => graph.dependent_indices(node),
            };

            let (sum, count) = neighbours
                .iter()
                .filter(|&&n| ranks[n] == reference_rank)
                .fold((0.0, 0usize), |(sum, count), &n| {
                    (sum + positions[n] as f64, count + 1)
                });

            let key = if count == 0 {
                positions[node] as f64
            } else {
                sum / count as f64
            };
            (key, node)
        })
        .collect();

    // Node indices are input positions, so the secondary key is input order.
    keyed.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(&b.1)));

    let layer: Vec<usize> = keyed.into_iter().map(|(_, node)| node).collect();
    for (pos, &node) in layer.iter().enumerate() {
        positions[node] = pos;
    }
    layers[layer_idx] = layer;
}

fn positions_of(node_count: usize, layers: &[Vec<usize>]) -> Vec<usize> {
    let mut positions = vec![0usize; node_count];
    for layer in layers {
        for (pos, &node) in layer.iter().enumerate() {
            positions[node] = pos;
        }
    }
    positions
}

/// Count pairwise crossings among edges spanning adjacent ranks.
pub fn count_crossings(
    graph: &TechGraph,
    ranks: &[usize],
    layers: &[Vec<usize>],
    positions: &[usize],
) -> usize {
    let mut crossings = 0;

    for layer in layers.iter().skip(1) {
        let mut pairs: Vec<(usize, usize)> = Vec::new();
        for &node in layer {
            for &dep in graph.dep_indices(node) {
                if ranks[dep] + 1 == ranks[node] {
                    pairs.push((positions[dep], positions[node]));
                }
            }
        }

        for i in 0..pairs.len() {
            for j in (i + 1)..pairs.len() {
                let (a1, b1) = pairs[i];
                let (a2, b2) = pairs[j];
                if (a1 < a2 && b1 > b2) || (a1 > a2 && b1 < b2) {
                    crossings += 1;
                }
            }
        }
    }

    crossings
}
