// src/allocation/pool.rs

use std::collections::BTreeMap;

use crate::graph::{NodeId, TechGraph, TechSnapshot};
use crate::types::NodeState;

/// Engineering capacity for the season and its current assignment.
///
/// Rebuilt from each snapshot; never edited locally.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllocationPool {
    total_engineers: u32,
    active_projects: BTreeMap<NodeId, u32>,
}

impl AllocationPool {
    pub fn new(total_engineers: u32, active_projects: BTreeMap<NodeId, u32>) -> Self {
        Self {
            total_engineers,
            active_projects,
        }
    }

    pub fn from_snapshot(snapshot: &TechSnapshot) -> Self {
        Self::new(snapshot.total_engineers, snapshot.active_projects.clone())
    }

    pub fn total_engineers(&self) -> u32 {
        self.total_engineers
    }

    /// Engineers currently assigned to `node_id` (0 when not listed).
    pub fn allocated(&self, node_id: &str) -> u32 {
        self.active_projects.get(node_id).copied().unwrap_or(0)
    }

    /// Sum of all assignments.
    pub fn used(&self) -> u64 {
        self.active_projects.values().map(|&n| u64::from(n)).sum()
    }

    /// Sum of all assignments except the one for `node_id`.
    pub fn used_by_others(&self, node_id: &str) -> u64 {
        self.active_projects
            .iter()
            .filter(|(id, _)| id.as_str() != node_id)
            .map(|(_, &n)| u64::from(n))
            .sum()
    }

    pub fn free(&self) -> u64 {
        u64::from(self.total_engineers).saturating_sub(self.used())
    }

    pub fn is_over_capacity(&self) -> bool {
        self.used() > u64::from(self.total_engineers)
    }

    /// Active projects in node-id order.
    pub fn projects(&self) -> impl Iterator<Item = (&str, u32)> {
        self.active_projects.iter().map(|(id, &n)| (id.as_str(), n))
    }

    /// Entries that point at unknown nodes or nodes not in progress.
    pub fn stray_entries<'a>(&'a self, graph: &TechGraph) -> Vec<&'a str> {
        self.active_projects
            .keys()
            .filter(|id| {
                graph
                    .node(id)
                    .is_none_or(|node| node.state != NodeState::InProgress)
            })
            .map(String::as_str)
            .collect()
    }
}
