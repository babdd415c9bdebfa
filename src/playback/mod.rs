// src/playback/mod.rs

//! Lap-by-lap race replay.
//!
//! The pure automaton lives in [`controller`]; [`runtime`] is the async shell
//! that owns the single tick source and feeds ticks and commands into it.
//! Frames go out through a [`FrameSink`].

use std::time::Duration;

use crate::race::RaceReport;

pub mod controller;
pub mod runtime;
pub mod sink;
pub mod ticker;

pub use controller::{Frame, PlaybackController, PlaybackEffect, PlaybackState, PlaybackStep};
pub use runtime::{PlaybackHandle, PlaybackRuntime, PlaybackStatus, spawn_playback};
pub use sink::{FrameSink, TableSink, render_frame};
pub use ticker::TickSource;

/// Commands the race screen sends to playback.
#[derive(Debug, Clone)]
pub enum PlaybackCommand {
    /// Replace the loaded race and start from lap one.
    Load(RaceReport),
    Pause,
    Resume,
    /// Play/pause button.
    Toggle,
    /// New tick period; applies from the next tick on.
    SetSpeed(Duration),
    /// Leave the race screen.
    Unload,
}
