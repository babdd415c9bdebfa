// src/backend/mod.rs

//! Request/response boundary to the team-management service.
//!
//! The screens talk to a `Backend` instead of a concrete transport. Every
//! call returns complete authoritative data (or an acknowledgement after
//! which the caller refetches); nothing here caches.
//!
//! - [`FileBackend`] serves snapshots from JSON files on disk.
//! - Tests provide their own implementation that scripts responses and
//!   records requests.

use std::future::Future;
use std::pin::Pin;

use crate::allocation::{ActivateRequest, AllocationRequest};
use crate::errors::Result;
use crate::graph::TechSnapshot;
use crate::race::RaceReport;

pub mod file;

pub use file::FileBackend;

/// Boxed future returned by backend calls.
pub type BackendFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// The backend contract.
///
/// Refusals come back as `ActivationRejected` / `AllocationRejected` carrying
/// the backend's reason; transport problems as `RequestFailure`.
pub trait Backend: Send {
    fn fetch_tech(&mut self) -> BackendFuture<'_, TechSnapshot>;

    fn activate(&mut self, request: ActivateRequest) -> BackendFuture<'_, ()>;

    fn reallocate(&mut self, request: AllocationRequest) -> BackendFuture<'_, ()>;

    fn fetch_race(&mut self) -> BackendFuture<'_, RaceReport>;
}
