// src/layout/place.rs

//! Coordinate assignment from (rank, order) to world units.

use crate::config::LayoutSection;
use crate::graph::TechGraph;
use crate::layout::PlacedNode;

/// Place every node; returns them in input order.
///
/// Rank maps to x and within-rank order maps to y, both with fixed pitches
/// from the config. Coordinates are the node box's top-left corner.
pub fn place_nodes(graph: &TechGraph, layers: &[Vec<usize>], config: &LayoutSection) -> Vec<PlacedNode> {
    let rank_pitch = config.node_width + config.rank_spacing;
    let order_pitch = config.node_height + config.node_spacing;
    let tallest = layers.iter().map(Vec::len).max().unwrap_or(0);

    let mut placed: Vec<Option<PlacedNode>> = vec![None; graph.len()];

    for (rank, layer) in layers.iter().enumerate() {
        let offset = if config.center_ranks {
            (tallest - layer.len()) as f64 * order_pitch / 2.0
        } else {
            0.0
        };

        for (order, &node_idx) in layer.iter().enumerate() {
            let node = &graph.nodes()[node_idx];
            placed[node_idx] = Some(PlacedNode {
                node_id: node.node_id.clone(),
                state: node.state,
                rank,
                order,
                x: rank as f64 * rank_pitch,
                y: offset + order as f64 * order_pitch,
                width: config.node_width,
                height: config.node_height,
            });
        }
    }

    // Every node sits in exactly one layer.
    placed.into_iter().flatten().collect()
}
