// src/screen/mod.rs

//! Thin coordinators between the backend and the core.
//!
//! Screens never edit derived state in place: a confirmed change is followed
//! by a full refetch and a wholesale rebuild. Each request takes `&mut self`,
//! so a screen cannot have two requests in flight.

pub mod race;
pub mod tech;

pub use race::RaceScreen;
pub use tech::{TechModel, TechScreen, TechView};
