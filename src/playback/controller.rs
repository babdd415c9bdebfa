// src/playback/controller.rs

//! Pure playback automaton.
//!
//! This module is synchronous and deterministic: it consumes transitions and
//! returns [`PlaybackEffect`]s describing what the IO shell should do next
//! (start or stop the tick source, retime it, present a frame). It has no
//! timers, channels or Tokio types, so it can be driven tick by tick in tests.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::playback::PlaybackCommand;
use crate::race::{self, Entrant, LapSnapshot, RaceLog, RaceReport};

/// Automaton states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    /// Nothing loaded.
    Stopped,
    Playing,
    Paused,
    /// Terminal for the loaded log; a fresh `load` is needed to play again.
    Finished,
}

/// Work the shell must carry out after a transition, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackEffect {
    /// Start the tick source (cancelling any previous one first).
    StartTicking,
    /// Cancel the tick source, if any.
    StopTicking,
    /// Use this period for future ticks.
    Retime(Duration),
    /// Show the current frame.
    Present,
}

/// Result of a single transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackStep {
    pub effects: Vec<PlaybackEffect>,
    /// `false` when the transition was not valid in the current state and
    /// was ignored.
    pub accepted: bool,
}

impl PlaybackStep {
    fn accepted(effects: Vec<PlaybackEffect>) -> Self {
        Self {
            effects,
            accepted: true,
        }
    }

    fn ignored() -> Self {
        Self {
            effects: Vec::new(),
            accepted: false,
        }
    }
}

/// What the race screen shows at a given moment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Frame<'a> {
    /// One snapshot of the lap log.
    Lap {
        snapshot: &'a LapSnapshot,
        /// 0-based cursor position.
        index: usize,
        /// Length of the log.
        total: usize,
    },
    /// Static final classification, shown when there is no lap log.
    Final {
        standings: &'a [Entrant],
        lap: Option<u32>,
    },
}

impl Frame<'_> {
    pub fn standings(&self) -> &[Entrant] {
        match self {
            Frame::Lap { snapshot, .. } => &snapshot.standings,
            Frame::Final { standings, .. } => standings,
        }
    }

    /// Lap number shown in the header, if known.
    pub fn lap(&self) -> Option<u32> {
        match self {
            Frame::Lap { snapshot, .. } => Some(snapshot.lap),
            Frame::Final { lap, .. } => *lap,
        }
    }

    /// Gap label for the entrant at `position` (0-based).
    pub fn gap_label(&self, position: usize) -> Option<String> {
        race::gap_label(self.standings(), position)
    }
}

#[derive(Debug, Clone)]
struct LoadedRace {
    track_name: String,
    log: RaceLog,
    results: Arc<[Entrant]>,
    laps: Option<u32>,
}

/// Playback automaton over one immutable race log.
#[derive(Debug, Clone)]
pub struct PlaybackController {
    state: PlaybackState,
    race: Option<LoadedRace>,
    cursor: usize,
    interval: Duration,
}

impl PlaybackController {
    pub fn new(interval: Duration) -> Self {
        Self {
            state: PlaybackState::Stopped,
            race: None,
            cursor: 0,
            interval,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Length of the loaded log (0 when nothing or an empty log is loaded).
    pub fn log_len(&self) -> usize {
        self.race.as_ref().map_or(0, |r| r.log.len())
    }

    pub fn track_name(&self) -> Option<&str> {
        self.race.as_ref().map(|r| r.track_name.as_str())
    }

    /// Whether the tick source should currently be running.
    pub fn is_ticking(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// Frame at the cursor; the final classification when the log is empty.
    pub fn current_frame(&self) -> Option<Frame<'_>> {
        let race = self.race.as_ref()?;
        match race.log.get(self.cursor) {
            Some(snapshot) => Some(Frame::Lap {
                snapshot,
                index: self.cursor,
                total: race.log.len(),
            }),
            None => Some(Frame::Final {
                standings: &race.results,
                lap: race.laps,
            }),
        }
    }

    /// Apply a command from the outside world.
    pub fn apply(&mut self, command: PlaybackCommand) -> PlaybackStep {
        match command {
            PlaybackCommand::Load(report) => self.load(&report),
            PlaybackCommand::Pause => self.pause(),
            PlaybackCommand::Resume => self.resume(),
            PlaybackCommand::Toggle => self.toggle(),
            PlaybackCommand::SetSpeed(interval) => self.set_speed(interval),
            PlaybackCommand::Unload => self.unload(),
        }
    }

    /// Replace whatever was loaded with `report` and start playing from the
    /// first lap. A report without laps goes straight to `Finished` and shows
    /// the final classification once.
    pub fn load(&mut self, report: &RaceReport) -> PlaybackStep {
        let log = report.log();
        let empty = log.is_empty();

        self.race = Some(LoadedRace {
            track_name: report.track_name.clone(),
            log,
            results: Arc::from(report.race_results.as_slice()),
            laps: report.laps,
        });
        self.cursor = 0;

        if empty {
            info!(
                track = %report.track_name,
                "race has no lap log; showing final classification"
            );
            self.state = PlaybackState::Finished;
            return PlaybackStep::accepted(vec![PlaybackEffect::StopTicking, PlaybackEffect::Present]);
        }

        info!(
            track = %report.track_name,
            laps = self.log_len(),
            interval_ms = self.interval.as_millis() as u64,
            "race log loaded; playing"
        );
        self.state = PlaybackState::Playing;
        PlaybackStep::accepted(vec![
            PlaybackEffect::StopTicking,
            PlaybackEffect::Present,
            PlaybackEffect::StartTicking,
        ])
    }

    /// Advance one lap. Only valid while playing.
    ///
    /// Reaching the last lap finishes playback, so a log of `n` laps finishes
    /// after `n - 1` ticks and every lap is presented exactly once.
    pub fn tick(&mut self) -> PlaybackStep {
        if self.state != PlaybackState::Playing {
            debug!(state = ?self.state, "tick outside Playing; ignoring");
            return PlaybackStep::ignored();
        }

        let last = self.log_len().saturating_sub(1);
        let mut effects = Vec::with_capacity(2);

        if self.cursor < last {
            self.cursor += 1;
            effects.push(PlaybackEffect::Present);
        }

        if self.cursor >= last {
            info!(cursor = self.cursor, "last lap reached; playback finished");
            self.state = PlaybackState::Finished;
            effects.push(PlaybackEffect::StopTicking);
        }

        PlaybackStep::accepted(effects)
    }

    pub fn pause(&mut self) -> PlaybackStep {
        if self.state != PlaybackState::Playing {
            debug!(state = ?self.state, "pause outside Playing; ignoring");
            return PlaybackStep::ignored();
        }
        debug!(cursor = self.cursor, "playback paused");
        self.state = PlaybackState::Paused;
        PlaybackStep::accepted(vec![PlaybackEffect::StopTicking])
    }

    pub fn resume(&mut self) -> PlaybackStep {
        if self.state != PlaybackState::Paused {
            debug!(state = ?self.state, "resume outside Paused; ignoring");
            return PlaybackStep::ignored();
        }
        debug!(cursor = self.cursor, "playback resumed");
        self.state = PlaybackState::Playing;
        PlaybackStep::accepted(vec![PlaybackEffect::StartTicking])
    }

    /// Play/pause button: pause when playing, resume when paused.
    pub fn toggle(&mut self) -> PlaybackStep {
        match self.state {
            PlaybackState::Playing => self.pause(),
            PlaybackState::Paused => self.resume(),
            _ => PlaybackStep::ignored(),
        }
    }

    /// Change the tick period. Valid in every state; never touches the
    /// cursor or the log.
    pub fn set_speed(&mut self, interval: Duration) -> PlaybackStep {
        let interval = interval.max(Duration::from_millis(1));
        debug!(
            from_ms = self.interval.as_millis() as u64,
            to_ms = interval.as_millis() as u64,
            "playback speed changed"
        );
        self.interval = interval;
        PlaybackStep::accepted(vec![PlaybackEffect::Retime(interval)])
    }

    /// Drop the loaded race and stop ticking.
    pub fn unload(&mut self) -> PlaybackStep {
        if self.race.is_some() {
            debug!(cursor = self.cursor, "race unloaded");
        }
        self.race = None;
        self.cursor = 0;
        self.state = PlaybackState::Stopped;
        PlaybackStep::accepted(vec![PlaybackEffect::StopTicking])
    }
}
