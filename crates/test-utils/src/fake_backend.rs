use std::sync::{Arc, Mutex};

use paddock::allocation::{ActivateRequest, ActivationReason, AllocationReason, AllocationRequest};
use paddock::backend::{Backend, BackendFuture};
use paddock::errors::PaddockError;
use paddock::graph::TechSnapshot;
use paddock::race::RaceReport;
use paddock::types::NodeState;

/// A mutation the fake received.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Activate(ActivateRequest),
    Reallocate(AllocationRequest),
}

#[derive(Debug, Clone)]
enum Scripted {
    Transport(String),
    Refuse(String),
}

#[derive(Debug, Default)]
struct FakeState {
    tech: Option<TechSnapshot>,
    race: Option<RaceReport>,
    fetches: usize,
    requests: Vec<Request>,
    next_fetch: Option<Scripted>,
    next_mutation: Option<Scripted>,
}

/// A fake backend that:
/// - serves a scripted snapshot
/// - applies accepted mutations to that snapshot, like the real service would
/// - records every mutation it received
///
/// Clones share state, so a test can keep one clone for inspection after
/// handing another to a screen.
#[derive(Debug, Clone, Default)]
pub struct FakeBackend {
    state: Arc<Mutex<FakeState>>,
}

impl FakeBackend {
    pub fn new(tech: TechSnapshot) -> Self {
        let backend = Self::default();
        backend.set_snapshot(tech);
        backend
    }

    pub fn with_race(self, race: RaceReport) -> Self {
        self.state.lock().unwrap().race = Some(race);
        self
    }

    pub fn set_snapshot(&self, tech: TechSnapshot) {
        self.state.lock().unwrap().tech = Some(tech);
    }

    pub fn snapshot(&self) -> Option<TechSnapshot> {
        self.state.lock().unwrap().tech.clone()
    }

    /// The next fetch fails with `RequestFailure`.
    pub fn fail_next_fetch(&self, msg: &str) {
        self.state.lock().unwrap().next_fetch = Some(Scripted::Transport(msg.to_string()));
    }

    /// The next mutation fails with `RequestFailure`.
    pub fn fail_next_mutation(&self, msg: &str) {
        self.state.lock().unwrap().next_mutation = Some(Scripted::Transport(msg.to_string()));
    }

    /// The next mutation is refused with `reason`.
    pub fn refuse_next_mutation(&self, reason: &str) {
        self.state.lock().unwrap().next_mutation = Some(Scripted::Refuse(reason.to_string()));
    }

    pub fn requests(&self) -> Vec<Request> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn fetch_count(&self) -> usize {
        self.state.lock().unwrap().fetches
    }
}

impl Backend for FakeBackend {
    fn fetch_tech(&mut self) -> BackendFuture<'_, TechSnapshot> {
        let state = Arc::clone(&self.state);
        Box::pin(async move {
            let mut state = state.lock().unwrap();
            state.fetches += 1;
            if let Some(Scripted::Transport(msg) | Scripted::Refuse(msg)) = state.next_fetch.take() {
                return Err(PaddockError::RequestFailure(msg));
            }
            state
                .tech
                .clone()
                .ok_or_else(|| PaddockError::RequestFailure("no snapshot scripted".into()))
        })
    }

    fn activate(&mut self, request: ActivateRequest) -> BackendFuture<'_, ()> {
        let state = Arc::clone(&self.state);
        Box::pin(async move {
            let mut state = state.lock().unwrap();
            state.requests.push(Request::Activate(request.clone()));

            match state.next_mutation.take() {
                Some(Scripted::Transport(msg)) => return Err(PaddockError::RequestFailure(msg)),
                Some(Scripted::Refuse(reason)) => {
                    return Err(PaddockError::ActivationRejected {
                        node: request.node_id,
                        reason: ActivationReason::Backend(reason),
                    });
                }
                None => {}
            }

            if let Some(tech) = state.tech.as_mut() {
                let cost = tech
                    .nodes
                    .iter_mut()
                    .find(|n| n.node_id == request.node_id)
                    .map(|n| {
                        n.state = NodeState::InProgress;
                        n.rp_cost
                    })
                    .unwrap_or(0);
                tech.resource_points = tech.resource_points.saturating_sub(cost);
            }
            Ok(())
        })
    }

    fn reallocate(&mut self, request: AllocationRequest) -> BackendFuture<'_, ()> {
        let state = Arc::clone(&self.state);
        Box::pin(async move {
            let mut state = state.lock().unwrap();
            state.requests.push(Request::Reallocate(request.clone()));

            match state.next_mutation.take() {
                Some(Scripted::Transport(msg)) => return Err(PaddockError::RequestFailure(msg)),
                Some(Scripted::Refuse(reason)) => {
                    return Err(PaddockError::AllocationRejected {
                        node: request.node_id,
                        reason: AllocationReason::Backend(reason),
                    });
                }
                None => {}
            }

            if let Some(tech) = state.tech.as_mut() {
                tech.active_projects
                    .insert(request.node_id, request.new_amount);
            }
            Ok(())
        })
    }

    fn fetch_race(&mut self) -> BackendFuture<'_, RaceReport> {
        let state = Arc::clone(&self.state);
        Box::pin(async move {
            state
                .lock()
                .unwrap()
                .race
                .clone()
                .ok_or_else(|| PaddockError::RequestFailure("no race scripted".into()))
        })
    }
}
