// src/graph/node.rs

//! Technology node records as delivered by the backend.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::NodeState;

/// Canonical node identifier type.
pub type NodeId = String;

/// One technology in the R&D tree.
///
/// Everything here is authoritative backend data; the client never edits a
/// field in place. A new snapshot replaces the whole record set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechNode {
    pub node_id: NodeId,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Total work units required to complete the node.
    pub base_workload: f64,

    /// Work accrued so far. Only non-zero while in progress or completed.
    #[serde(default)]
    pub invested_work: f64,

    /// Resource points consumed once on activation.
    #[serde(default)]
    pub rp_cost: u64,

    /// Nodes that must be completed before this one unlocks.
    #[serde(default)]
    pub dependencies: Vec<NodeId>,

    /// Nodes locked out once this one is started.
    #[serde(default)]
    pub mutually_exclusive: Vec<NodeId>,

    /// Stat key → delta, applied by the backend once completed.
    #[serde(default)]
    pub effects: BTreeMap<String, f64>,

    pub state: NodeState,
}

impl TechNode {
    /// Fraction of the workload already invested, in `0.0..=1.0`.
    pub fn progress(&self) -> f64 {
        if self.base_workload <= 0.0 {
            return 0.0;
        }
        (self.invested_work / self.base_workload).clamp(0.0, 1.0)
    }

    /// Effects in display form, ordered by stat key.
    pub fn effect_labels(&self) -> Vec<EffectLabel> {
        self.effects
            .iter()
            .map(|(key, value)| EffectLabel::new(key, *value))
            .collect()
    }
}

/// Car subsystem an effect key belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectCategory {
    Aero,
    Powertrain,
    Chassis,
    Other,
}

impl EffectCategory {
    pub fn of(key: &str) -> Self {
        match key.split('.').next() {
            Some("aero") => EffectCategory::Aero,
            Some("powertrain") => EffectCategory::Powertrain,
            Some("chassis") => EffectCategory::Chassis,
            _ => EffectCategory::Other,
        }
    }
}

/// Display form of a single node effect, e.g. `DOWNFORCE +15`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectLabel {
    pub category: EffectCategory,
    pub label: String,
    pub value: f64,
}

impl EffectLabel {
    pub fn new(key: &str, value: f64) -> Self {
        let category = EffectCategory::of(key);
        let stat = match category {
            EffectCategory::Other => key,
            _ => key.split_once('.').map(|(_, rest)| rest).unwrap_or(key),
        };

        Self {
            category,
            label: stat.replace('_', " ").to_uppercase(),
            value,
        }
    }

    /// Positive effects are shown as buffs, everything else as a penalty.
    pub fn is_buff(&self) -> bool {
        self.value > 0.0
    }

    /// Signed value, `+` prefixed when positive.
    pub fn signed_value(&self) -> String {
        if self.value > 0.0 {
            format!("+{}", self.value)
        } else {
            format!("{}", self.value)
        }
    }
}

/// Full technology snapshot returned by the backend on every view refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechSnapshot {
    pub nodes: Vec<TechNode>,

    /// Currency available for activating nodes.
    #[serde(default)]
    pub resource_points: u64,

    #[serde(default)]
    pub total_engineers: u32,

    /// node_id → engineers currently assigned.
    #[serde(default)]
    pub active_projects: BTreeMap<NodeId, u32>,
}
