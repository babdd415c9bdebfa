// src/errors.rs

//! Crate-wide error types.

use thiserror::Error;

use crate::allocation::{ActivationReason, AllocationReason};

/// Structural problems with a technology snapshot.
///
/// Any of these blocks layout of the offending graph; nothing is ever
/// silently dropped to make a graph buildable.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("duplicate node id '{0}'")]
    DuplicateNode(String),

    #[error("node '{node}' depends on unknown node '{dependency}'")]
    UnknownDependency { node: String, dependency: String },

    #[error("node '{0}' cannot depend on itself")]
    SelfDependency(String),

    #[error("dependency cycle detected: {}", .0.join(" -> "))]
    DependencyCycle(Vec<String>),

    #[error("node '{node}' has invalid workload: {detail}")]
    InvalidWorkload { node: String, detail: String },
}

#[derive(Error, Debug)]
pub enum PaddockError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid technology graph: {0}")]
    Validation(#[from] ValidationError),

    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Allocation rejected for '{node}': {reason}")]
    AllocationRejected { node: String, reason: AllocationReason },

    #[error("Activation rejected for '{node}': {reason}")]
    ActivationRejected { node: String, reason: ActivationReason },

    #[error("Request failed: {0}")]
    RequestFailure(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PaddockError {
    /// Whether the view can carry on with its last confirmed state.
    ///
    /// Validation failures are not recoverable: the offending graph must not
    /// be rendered at all.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            PaddockError::AllocationRejected { .. }
                | PaddockError::ActivationRejected { .. }
                | PaddockError::RequestFailure(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, PaddockError>;
