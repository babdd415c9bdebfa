// src/layout/route.rs

//! Edge routing between fixed node anchors. No collision avoidance.

use crate::graph::TechGraph;
use crate::layout::{EdgePath, EdgeTone, PlacedNode, Point, RoutedEdge};
use crate::types::{EdgeStyle, NodeState};

/// Route every dependency edge, in [`TechGraph::edges`] order.
///
/// `placed` must be indexed by input position.
pub fn route_edges(graph: &TechGraph, placed: &[PlacedNode], style: EdgeStyle) -> Vec<RoutedEdge> {
    let mut edges = Vec::with_capacity(graph.edge_count());

    for (node_idx, dependent) in placed.iter().enumerate() {
        for &dep_idx in graph.dep_indices(node_idx) {
            let dependency = &placed[dep_idx];
            let source = dependency.source_anchor();
            let target = dependent.target_anchor();

            edges.push(RoutedEdge {
                id: format!("e-{}-{}", dependency.node_id, dependent.node_id),
                from: dependency.node_id.clone(),
                to: dependent.node_id.clone(),
                source,
                target,
                path: path_between(source, target, style),
                tone: EdgeTone::for_target(dependent.state),
                animated: matches!(
                    dependent.state,
                    NodeState::Available | NodeState::InProgress
                ),
            });
        }
    }

    edges
}

fn path_between(source: Point, target: Point, style: EdgeStyle) -> EdgePath {
    match style {
        EdgeStyle::Straight => EdgePath::Straight,
        EdgeStyle::Smooth => {
            // Leave and enter horizontally; both handles share the midpoint x.
            let mid_x = (source.x + target.x) / 2.0;
            EdgePath::Cubic {
                c1: Point::new(mid_x, source.y),
                c2: Point::new(mid_x, target.y),
            }
        }
    }
}

impl EdgeTone {
    /// Edges take their colour from the node they lead into.
    pub fn for_target(state: NodeState) -> Self {
        match state {
            NodeState::Completed => EdgeTone::Completed,
            NodeState::Available => EdgeTone::Available,
            _ => EdgeTone::Muted,
        }
    }
}
