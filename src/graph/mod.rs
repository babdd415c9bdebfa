// src/graph/mod.rs

//! Technology dependency graph.
//!
//! - [`node`] holds the backend's node records and snapshot payload.
//! - [`tech_graph`] normalizes a flat node list into a validated, immutable
//!   dependency graph with query operations.
//! - [`audit`] cross-checks reported node states against the structure.

pub mod audit;
pub mod node;
pub mod tech_graph;

pub use audit::StateViolation;
pub use node::{EffectCategory, EffectLabel, NodeId, TechNode, TechSnapshot};
pub use tech_graph::TechGraph;
