// src/screen/tech.rs

use tracing::{debug, info, warn};

use crate::allocation::{AllocationControls, AllocationGuard, AllocationPool};
use crate::backend::Backend;
use crate::errors::{PaddockError, Result, ValidationError};
use crate::graph::{StateViolation, TechGraph, TechSnapshot};
use crate::layout::{Layout, LayoutEngine};

/// Everything derived from one confirmed technology snapshot.
#[derive(Debug, Clone)]
pub struct TechModel {
    pub graph: TechGraph,
    pub pool: AllocationPool,
    pub resource_points: u64,
    pub layout: Layout,
    /// State invariants the snapshot breaks; logged, never repaired.
    pub violations: Vec<StateViolation>,
}

impl TechModel {
    /// Derive graph, pool and layout from `snapshot`.
    pub fn derive(
        snapshot: TechSnapshot,
        engine: &LayoutEngine,
    ) -> std::result::Result<Self, ValidationError> {
        let pool = AllocationPool::from_snapshot(&snapshot);
        let resource_points = snapshot.resource_points;

        let graph = TechGraph::build(snapshot.nodes)?;
        let layout = engine.layout(&graph);
        let violations = graph.audit_states();

        Ok(Self {
            graph,
            pool,
            resource_points,
            layout,
            violations,
        })
    }

    pub fn guard(&self) -> AllocationGuard<'_> {
        AllocationGuard::new(&self.graph, &self.pool)
    }
}

/// What the tech screen currently shows.
#[derive(Debug, Clone)]
pub enum TechView {
    /// Nothing fetched yet.
    Empty,
    Ready(Box<TechModel>),
    /// The last snapshot's graph is structurally invalid; nothing is drawn.
    Blocked(ValidationError),
}

/// Coordinator for the R&D tree screen.
///
/// Every confirmed change refetches the full snapshot and rebuilds the model
/// wholesale. Failed requests leave the current view untouched.
#[derive(Debug)]
pub struct TechScreen<B: Backend> {
    backend: B,
    engine: LayoutEngine,
    step: u32,
    view: TechView,
    notice: Option<String>,
}

impl<B: Backend> TechScreen<B> {
    pub fn new(backend: B, engine: LayoutEngine, step: u32) -> Self {
        Self {
            backend,
            engine,
            step,
            view: TechView::Empty,
            notice: None,
        }
    }

    pub fn view(&self) -> &TechView {
        &self.view
    }

    pub fn model(&self) -> Option<&TechModel> {
        match &self.view {
            TechView::Ready(model) => Some(model.as_ref()),
            _ => None,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Transient message for the last rejected or failed request.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }

    /// Fetch a fresh snapshot and replace the view with it.
    ///
    /// A transport failure keeps the previous view. An invalid graph blocks
    /// the view and is returned as `Validation`.
    pub async fn refresh(&mut self) -> Result<()> {
        let snapshot = match self.backend.fetch_tech().await {
            Ok(snapshot) => snapshot,
            Err(err) => return Err(self.note_failure(err)),
        };

        match TechModel::derive(snapshot, &self.engine) {
            Ok(model) => {
                for violation in &model.violations {
                    warn!(%violation, "snapshot breaks a state invariant");
                }
                for stray in model.pool.stray_entries(&model.graph) {
                    warn!(node = %stray, "engineers assigned to a project that is not in progress");
                }
                if model.pool.is_over_capacity() {
                    warn!(
                        used = model.pool.used(),
                        total = model.pool.total_engineers(),
                        "snapshot allocates more engineers than available"
                    );
                }

                info!(
                    nodes = model.graph.len(),
                    edges = model.graph.edge_count(),
                    free_engineers = model.pool.free(),
                    resource_points = model.resource_points,
                    "tech view refreshed"
                );
                self.view = TechView::Ready(Box::new(model));
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "technology graph invalid; view blocked");
                self.view = TechView::Blocked(err.clone());
                Err(PaddockError::Validation(err))
            }
        }
    }

    /// Change the engineers on `node_id` by `delta`, then refetch.
    pub async fn allocate(&mut self, node_id: &str, delta: i64) -> Result<()> {
        let request = self.ready()?.guard().request(node_id, delta);
        let request = match request {
            Ok(request) => request,
            Err(err) => return Err(self.note_failure(err)),
        };

        debug!(node = %request.node_id, new_amount = request.new_amount, "sending reallocation");
        if let Err(err) = self.backend.reallocate(request).await {
            return Err(self.note_failure(err));
        }

        self.notice = None;
        self.refresh().await
    }

    /// Start research on `node_id`, then refetch.
    pub async fn activate(&mut self, node_id: &str) -> Result<()> {
        let request = {
            let model = self.ready()?;
            model.guard().check_activation(node_id, model.resource_points)
        };
        let request = match request {
            Ok(request) => request,
            Err(err) => return Err(self.note_failure(err)),
        };

        debug!(node = %request.node_id, "sending activation");
        if let Err(err) = self.backend.activate(request).await {
            return Err(self.note_failure(err));
        }

        self.notice = None;
        self.refresh().await
    }

    /// Which allocation triggers to enable for `node_id`.
    pub fn controls(&self, node_id: &str) -> Option<AllocationControls> {
        self.model()
            .map(|model| model.guard().controls(node_id, self.step))
    }

    fn ready(&self) -> Result<&TechModel> {
        match &self.view {
            TechView::Ready(model) => Ok(model.as_ref()),
            TechView::Blocked(err) => Err(PaddockError::Validation(err.clone())),
            TechView::Empty => Err(PaddockError::RequestFailure(
                "no technology snapshot loaded".to_string(),
            )),
        }
    }

    fn note_failure(&mut self, err: PaddockError) -> PaddockError {
        if err.is_recoverable() {
            warn!(error = %err, "request failed; keeping last confirmed view");
            self.notice = Some(err.to_string());
        }
        err
    }
}
