// src/graph/audit.rs

//! Cross-checks of backend-reported node states against the graph structure.
//!
//! The backend is the sole writer of node state. These checks never repair
//! anything; they only report snapshots that break the documented state
//! invariants so the caller can log them.

use std::fmt;

use crate::graph::TechGraph;
use crate::types::NodeState;

/// One violated state invariant in a snapshot.
#[derive(Debug, Clone, PartialEq)]
pub enum StateViolation {
    /// A node claims to be unlocked while a dependency is not completed.
    DependencyIncomplete {
        node: String,
        state: NodeState,
        dependency: String,
        dependency_state: NodeState,
    },
    /// A node is mutually locked but nothing in its exclusivity group is
    /// started or completed.
    UnclaimedMutualLock { node: String },
    /// Work recorded on a node that is neither in progress nor completed.
    WorkOutsideActiveState {
        node: String,
        state: NodeState,
        invested_work: f64,
    },
    /// More work recorded than the node's workload. Completion overshoots
    /// the base when the last work unit is larger than what remained.
    WorkExceedsWorkload {
        node: String,
        invested_work: f64,
        base_workload: f64,
    },
}

impl fmt::Display for StateViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateViolation::DependencyIncomplete {
                node,
                state,
                dependency,
                dependency_state,
            } => write!(
                f,
                "node '{node}' is {state} but dependency '{dependency}' is {dependency_state}"
            ),
            StateViolation::UnclaimedMutualLock { node } => write!(
                f,
                "node '{node}' is MUTUALLY_LOCKED but no exclusive peer is started"
            ),
            StateViolation::WorkOutsideActiveState {
                node,
                state,
                invested_work,
            } => write!(
                f,
                "node '{node}' is {state} but has invested_work {invested_work}"
            ),
            StateViolation::WorkExceedsWorkload {
                node,
                invested_work,
                base_workload,
            } => write!(
                f,
                "node '{node}' has invested_work {invested_work} above base_workload {base_workload}"
            ),
        }
    }
}

impl TechGraph {
    /// Report every state invariant violated by this snapshot.
    pub fn audit_states(&self) -> Vec<StateViolation> {
        let mut violations = Vec::new();

        for node in self.nodes() {
            if node.state.requires_completed_dependencies() {
                for dep in self.dependencies_of(&node.node_id) {
                    if dep.state != NodeState::Completed {
                        violations.push(StateViolation::DependencyIncomplete {
                            node: node.node_id.clone(),
                            state: node.state,
                            dependency: dep.node_id.clone(),
                            dependency_state: dep.state,
                        });
                    }
                }
            }

            if node.state == NodeState::MutuallyLocked && !self.exclusivity_claimed(&node.node_id) {
                violations.push(StateViolation::UnclaimedMutualLock {
                    node: node.node_id.clone(),
                });
            }

            if node.invested_work > 0.0 && !node.state.claims_exclusivity() {
                violations.push(StateViolation::WorkOutsideActiveState {
                    node: node.node_id.clone(),
                    state: node.state,
                    invested_work: node.invested_work,
                });
            }

            if node.invested_work > node.base_workload {
                violations.push(StateViolation::WorkExceedsWorkload {
                    node: node.node_id.clone(),
                    invested_work: node.invested_work,
                    base_workload: node.base_workload,
                });
            }
        }

        violations
    }

    /// Whether some member of `id`'s exclusivity group is started or done.
    ///
    /// Exclusivity is read in both directions: a peer listing `id` counts
    /// just like `id` listing the peer.
    fn exclusivity_claimed(&self, id: &str) -> bool {
        let Some(node) = self.node(id) else {
            return false;
        };

        let listed = node
            .mutually_exclusive
            .iter()
            .filter_map(|peer| self.node(peer))
            .any(|peer| peer.state.claims_exclusivity());

        listed
            || self.nodes().iter().any(|peer| {
                peer.state.claims_exclusivity() && peer.mutually_exclusive.iter().any(|p| p == id)
            })
    }
}
