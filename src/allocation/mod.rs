// src/allocation/mod.rs

//! Engineer allocation: the season's pool and the client-side request guard.

pub mod guard;
pub mod pool;

pub use guard::{
    ActivateRequest, ActivationReason, AllocationControls, AllocationGuard, AllocationReason,
    AllocationRequest, Proposal,
};
pub use pool::AllocationPool;
