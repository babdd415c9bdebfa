// src/allocation/guard.rs

use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::allocation::AllocationPool;
use crate::errors::{PaddockError, Result};
use crate::graph::{NodeId, TechGraph};
use crate::types::NodeState;

/// Why an allocation change was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllocationReason {
    /// The resulting allocation would drop below zero.
    Negative,
    /// The pool cannot cover the resulting allocation.
    PoolExhausted,
    /// The target node is not in progress (or unknown).
    NodeNotActive,
    /// Refused by the backend with this message.
    Backend(String),
}

impl fmt::Display for AllocationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllocationReason::Negative => f.write_str("allocation cannot be negative"),
            AllocationReason::PoolExhausted => f.write_str("not enough free engineers"),
            AllocationReason::NodeNotActive => f.write_str("project is not in progress"),
            AllocationReason::Backend(msg) => f.write_str(msg),
        }
    }
}

/// Why an activation request was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivationReason {
    NotAvailable(NodeState),
    InsufficientResourcePoints { required: u64, available: u64 },
    Backend(String),
}

impl fmt::Display for ActivationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActivationReason::NotAvailable(state) => {
                write!(f, "node is {state}, not AVAILABLE")
            }
            ActivationReason::InsufficientResourcePoints {
                required,
                available,
            } => write!(
                f,
                "insufficient resource points ({available} available, {required} required)"
            ),
            ActivationReason::Backend(msg) => f.write_str(msg),
        }
    }
}

/// Outcome of a proposed allocation change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proposal {
    pub node_id: NodeId,
    pub new_amount: i64,
    pub allowed: bool,
    pub reason: Option<AllocationReason>,
}

/// Backend payload for a reallocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AllocationRequest {
    pub node_id: NodeId,
    pub new_amount: u32,
}

/// Backend payload for starting a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivateRequest {
    pub node_id: NodeId,
}

/// Which of the `-step` / `+step` triggers are usable for a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocationControls {
    pub can_decrease: bool,
    pub can_increase: bool,
}

/// Client-side pre-check of allocation and activation requests.
///
/// Mirrors the backend's rules so obviously invalid requests never leave the
/// client. It is not authoritative: the backend's answer always wins.
#[derive(Debug, Clone, Copy)]
pub struct AllocationGuard<'a> {
    graph: &'a TechGraph,
    pool: &'a AllocationPool,
}

impl<'a> AllocationGuard<'a> {
    pub fn new(graph: &'a TechGraph, pool: &'a AllocationPool) -> Self {
        Self { graph, pool }
    }

    /// Evaluate `current_allocated + delta` for `node_id`.
    ///
    /// Checks run in order: negative result, pool capacity, node state. The
    /// first failing check is reported.
    pub fn propose(&self, node_id: &str, current_allocated: u32, delta: i64) -> Proposal {
        let new_amount = i64::from(current_allocated) + delta;
        let reason = self.first_violation(node_id, new_amount);

        debug!(
            node = %node_id,
            current_allocated,
            delta,
            new_amount,
            ?reason,
            "allocation proposal evaluated"
        );

        Proposal {
            node_id: node_id.to_string(),
            new_amount,
            allowed: reason.is_none(),
            reason,
        }
    }

    fn first_violation(&self, node_id: &str, new_amount: i64) -> Option<AllocationReason> {
        if new_amount < 0 {
            return Some(AllocationReason::Negative);
        }

        // new_amount >= 0 here, so the cast is lossless.
        let demanded = self.pool.used_by_others(node_id).saturating_add(new_amount as u64);
        if demanded > u64::from(self.pool.total_engineers()) {
            return Some(AllocationReason::PoolExhausted);
        }

        let active = self
            .graph
            .node(node_id)
            .is_some_and(|node| node.state == NodeState::InProgress);
        if !active {
            return Some(AllocationReason::NodeNotActive);
        }

        None
    }

    /// Build the reallocation payload for `delta` applied to the pool's
    /// current assignment of `node_id`.
    pub fn request(&self, node_id: &str, delta: i64) -> Result<AllocationRequest> {
        let proposal = self.propose(node_id, self.pool.allocated(node_id), delta);

        match proposal.reason {
            None => {
                let new_amount = u32::try_from(proposal.new_amount)
                    .map_err(|_| PaddockError::AllocationRejected {
                        node: node_id.to_string(),
                        reason: AllocationReason::PoolExhausted,
                    })?;
                Ok(AllocationRequest {
                    node_id: proposal.node_id,
                    new_amount,
                })
            }
            Some(reason) => Err(PaddockError::AllocationRejected {
                node: node_id.to_string(),
                reason,
            }),
        }
    }

    /// Whether a `step`-sized decrease / increase would pass the guard.
    pub fn controls(&self, node_id: &str, step: u32) -> AllocationControls {
        let current = self.pool.allocated(node_id);
        let step = i64::from(step);
        AllocationControls {
            can_decrease: self.propose(node_id, current, -step).allowed,
            can_increase: self.propose(node_id, current, step).allowed,
        }
    }

    /// Pre-check starting research on `node_id`.
    pub fn check_activation(&self, node_id: &str, resource_points: u64) -> Result<ActivateRequest> {
        let node = self
            .graph
            .node(node_id)
            .ok_or_else(|| PaddockError::NodeNotFound(node_id.to_string()))?;

        let reason = if node.state != NodeState::Available {
            Some(ActivationReason::NotAvailable(node.state))
        } else if node.rp_cost > resource_points {
            Some(ActivationReason::InsufficientResourcePoints {
                required: node.rp_cost,
                available: resource_points,
            })
        } else {
            None
        };

        match reason {
            Some(reason) => {
                debug!(node = %node_id, %reason, "activation refused by guard");
                Err(PaddockError::ActivationRejected {
                    node: node_id.to_string(),
                    reason,
                })
            }
            None => Ok(ActivateRequest {
                node_id: node_id.to_string(),
            }),
        }
    }
}
