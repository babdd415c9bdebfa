// src/race/mod.rs

//! Race result payloads: per-lap standings and the final classification.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Tire compound fitted to a car.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TireCompound {
    Soft,
    Medium,
    Hard,
    #[serde(other)]
    Unknown,
}

impl TireCompound {
    /// Badge letter shown next to the driver.
    pub fn initial(self) -> char {
        match self {
            TireCompound::Soft => 'S',
            TireCompound::Medium => 'M',
            TireCompound::Hard => 'H',
            TireCompound::Unknown => '?',
        }
    }
}

/// One car's line in a standings table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entrant {
    pub driver: String,
    pub team: String,

    #[serde(default)]
    pub compound: Option<TireCompound>,

    /// Tire wear in percent; 100 means fully worn.
    #[serde(default)]
    pub wear: Option<f64>,

    /// Pit stops made so far.
    #[serde(default)]
    pub stops: Option<u32>,

    /// Gap to the leader in seconds.
    #[serde(default)]
    pub interval: Option<f64>,

    /// Cumulative race time in seconds; used when no interval is given.
    #[serde(default)]
    pub total_time: Option<f64>,
}

impl Entrant {
    /// Remaining tire life in percent.
    pub fn tire_life(&self) -> Option<f64> {
        self.wear.map(|w| (100.0 - w).max(0.0))
    }
}

/// Standings after one lap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LapSnapshot {
    /// 1-indexed lap number.
    pub lap: u32,
    pub standings: Vec<Entrant>,
}

impl LapSnapshot {
    /// Gap label for the entrant at `position` (0-based).
    ///
    /// The leader shows `Leader`; others show their interval, falling back
    /// to the difference in total time to the leader. `None` when neither is
    /// known.
    pub fn gap_label(&self, position: usize) -> Option<String> {
        gap_label(&self.standings, position)
    }
}

pub(crate) fn gap_label(standings: &[Entrant], position: usize) -> Option<String> {
    let entrant = standings.get(position)?;
    if position == 0 {
        return Some("Leader".to_string());
    }
    if let Some(interval) = entrant.interval {
        return Some(format!("+{interval:.3}s"));
    }
    let leader = standings.first()?.total_time?;
    let own = entrant.total_time?;
    Some(format!("+{:.3}s", own - leader))
}

/// Immutable lap-by-lap record of one race.
pub type RaceLog = Arc<[LapSnapshot]>;

/// The backend's answer to a race simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceReport {
    #[serde(alias = "track")]
    pub track_name: String,

    /// Per-lap standings; may be missing for instant results.
    #[serde(default)]
    pub race_log: Option<Vec<LapSnapshot>>,

    /// Final classification, shown when there is no log to play.
    #[serde(default)]
    pub race_results: Vec<Entrant>,

    /// Scheduled race distance, used to label the final frame.
    #[serde(default)]
    pub laps: Option<u32>,
}

impl RaceReport {
    /// The lap log as a shared immutable slice; empty when missing.
    pub fn log(&self) -> RaceLog {
        match &self.race_log {
            Some(laps) => Arc::from(laps.as_slice()),
            None => Arc::from(Vec::new()),
        }
    }
}
