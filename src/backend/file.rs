// src/backend/file.rs

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::allocation::{ActivateRequest, AllocationRequest};
use crate::backend::{Backend, BackendFuture};
use crate::config::ConfigFile;
use crate::errors::{PaddockError, Result};
use crate::graph::TechSnapshot;
use crate::race::RaceReport;

/// File holding the technology snapshot inside a snapshot directory.
pub const TECH_FILE: &str = "tech.json";

/// File holding the race report inside a snapshot directory.
pub const RACE_FILE: &str = "race.json";

/// Read-only backend serving snapshots from a directory.
///
/// Mutations are refused with `RequestFailure`: there is nothing to write
/// them to.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn from_config(cfg: &ConfigFile) -> Self {
        Self::new(cfg.backend.snapshot_dir.clone())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn load_tech(&self) -> Result<TechSnapshot> {
        read_json(&self.dir.join(TECH_FILE))
    }

    pub fn load_race(&self) -> Result<RaceReport> {
        read_json(&self.dir.join(RACE_FILE))
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    debug!(path = %path.display(), "reading snapshot file");
    let text = std::fs::read_to_string(path).map_err(|err| {
        warn!(path = %path.display(), error = %err, "snapshot file unreadable");
        PaddockError::RequestFailure(format!("cannot read {}: {err}", path.display()))
    })?;
    // Undecodable payloads count as failed requests.
    serde_json::from_str(&text).map_err(|err| {
        warn!(path = %path.display(), error = %err, "snapshot file malformed");
        PaddockError::RequestFailure(format!("malformed {}: {err}", path.display()))
    })
}

impl Backend for FileBackend {
    fn fetch_tech(&mut self) -> BackendFuture<'_, TechSnapshot> {
        Box::pin(async move { self.load_tech() })
    }

    fn activate(&mut self, request: ActivateRequest) -> BackendFuture<'_, ()> {
        Box::pin(async move {
            Err(PaddockError::RequestFailure(format!(
                "file backend is read-only; cannot activate '{}'",
                request.node_id
            )))
        })
    }

    fn reallocate(&mut self, request: AllocationRequest) -> BackendFuture<'_, ()> {
        Box::pin(async move {
            Err(PaddockError::RequestFailure(format!(
                "file backend is read-only; cannot reallocate '{}' to {}",
                request.node_id, request.new_amount
            )))
        })
    }

    fn fetch_race(&mut self) -> BackendFuture<'_, RaceReport> {
        Box::pin(async move { self.load_race() })
    }
}
