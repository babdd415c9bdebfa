// src/layout/mod.rs

//! Layered left-to-right layout of the technology graph.
//!
//! The engine is a pure function of the graph and the spacing config: the
//! same input always yields the same coordinates, so re-renders can be
//! diffed visually.
//!
//! # Pipeline
//! 1. [`rank`]: longest-path ranking in topological order
//! 2. [`order`]: barycenter crossing reduction, alternating sweeps
//! 3. [`place`]: fixed-pitch coordinate assignment
//! 4. [`route`]: anchor-to-anchor edge paths with render hints

pub mod order;
pub mod place;
pub mod rank;
pub mod route;

use serde::Serialize;
use tracing::debug;

use crate::config::{ConfigFile, LayoutSection};
use crate::graph::TechGraph;
use crate::types::NodeState;

/// A point in world units. `y` grows downwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A node box; `x`/`y` is its top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedNode {
    pub node_id: String,
    pub state: NodeState,
    pub rank: usize,
    /// Position within the rank, top to bottom.
    pub order: usize,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PlacedNode {
    /// Where outgoing edges start: middle of the right side.
    pub fn source_anchor(&self) -> Point {
        Point::new(self.x + self.width, self.y + self.height / 2.0)
    }

    /// Where incoming edges end: middle of the left side.
    pub fn target_anchor(&self) -> Point {
        Point::new(self.x, self.y + self.height / 2.0)
    }
}

/// Geometry of an edge between its anchors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum EdgePath {
    Straight,
    /// Cubic Bézier with control points `c1`, `c2`.
    Cubic { c1: Point, c2: Point },
}

/// Render colour class of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeTone {
    Completed,
    Available,
    Muted,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutedEdge {
    pub id: String,
    /// The dependency.
    pub from: String,
    /// The dependent.
    pub to: String,
    pub source: Point,
    pub target: Point,
    pub path: EdgePath,
    pub tone: EdgeTone,
    /// Marks edges leading into nodes that can be or are being researched.
    pub animated: bool,
}

/// Complete layout of one graph snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    /// Nodes in input order.
    pub nodes: Vec<PlacedNode>,
    pub edges: Vec<RoutedEdge>,
    /// Extent of all node boxes, measured from the origin.
    pub width: f64,
    pub height: f64,
    /// Adjacent-rank crossings left after ordering.
    pub crossings: usize,
}

impl Layout {
    pub fn empty() -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            width: 0.0,
            height: 0.0,
            crossings: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: &str) -> Option<&PlacedNode> {
        self.nodes.iter().find(|n| n.node_id == id)
    }

    /// Node ids of one rank, top to bottom.
    pub fn rank_members(&self, rank: usize) -> Vec<&str> {
        let mut members: Vec<&PlacedNode> = self.nodes.iter().filter(|n| n.rank == rank).collect();
        members.sort_by_key(|n| n.order);
        members.into_iter().map(|n| n.node_id.as_str()).collect()
    }

    pub fn rank_count(&self) -> usize {
        self.nodes.iter().map(|n| n.rank + 1).max().unwrap_or(0)
    }
}

/// Layered layout engine configured with fixed spacing constants.
#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    config: LayoutSection,
}

impl LayoutEngine {
    pub fn new(config: LayoutSection) -> Self {
        Self { config }
    }

    pub fn from_config(cfg: &ConfigFile) -> Self {
        Self::new(cfg.layout.clone())
    }

    pub fn config(&self) -> &LayoutSection {
        &self.config
    }

    /// Lay out `graph`. Identical graphs always produce identical layouts.
    pub fn layout(&self, graph: &TechGraph) -> Layout {
        if graph.is_empty() {
            return Layout::empty();
        }

        let ranks = rank::assign_ranks(graph);
        let layers = rank::group_by_rank(&ranks);
        let ordering = order::order_layers(graph, &ranks, layers, self.config.ordering_passes);

        let nodes = place::place_nodes(graph, &ordering.layers, &self.config);
        let edges = route::route_edges(graph, &nodes, self.config.edge_style);

        let width = nodes.iter().map(|n| n.x + n.width).fold(0.0, f64::max);
        let height = nodes.iter().map(|n| n.y + n.height).fold(0.0, f64::max);

        debug!(
            nodes = nodes.len(),
            edges = edges.len(),
            ranks = ordering.layers.len(),
            crossings = ordering.crossings,
            "technology graph laid out"
        );

        Layout {
            nodes,
            edges,
            width,
            height,
            crossings: ordering.crossings,
        }
    }
}
