use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Lifecycle state of a technology node, as reported by the backend.
///
/// The backend is the only writer; the client renders whatever it receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeState {
    Locked,
    Available,
    InProgress,
    Completed,
    MutuallyLocked,
}

impl NodeState {
    /// States that require every dependency to be completed.
    pub fn requires_completed_dependencies(self) -> bool {
        matches!(
            self,
            NodeState::Available | NodeState::InProgress | NodeState::Completed
        )
    }

    /// States that claim a node's exclusivity group.
    pub fn claims_exclusivity(self) -> bool {
        matches!(self, NodeState::InProgress | NodeState::Completed)
    }
}

impl fmt::Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NodeState::Locked => "LOCKED",
            NodeState::Available => "AVAILABLE",
            NodeState::InProgress => "IN_PROGRESS",
            NodeState::Completed => "COMPLETED",
            NodeState::MutuallyLocked => "MUTUALLY_LOCKED",
        };
        f.pad(s)
    }
}

/// Playback speed presets offered by the race screen.
///
/// Each preset divides the configured base interval: `1x` ticks once per base
/// interval, `4x` four times as often, `max` forty times as often.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackSpeed {
    #[serde(rename = "1x")]
    Normal,
    #[serde(rename = "4x")]
    Fast,
    #[serde(rename = "max")]
    Max,
}

impl Default for PlaybackSpeed {
    fn default() -> Self {
        PlaybackSpeed::Normal
    }
}

impl PlaybackSpeed {
    fn divisor(self) -> u32 {
        match self {
            PlaybackSpeed::Normal => 1,
            PlaybackSpeed::Fast => 4,
            PlaybackSpeed::Max => 40,
        }
    }

    /// Tick period for this preset given the base (1x) interval.
    ///
    /// Never returns a zero duration.
    pub fn interval(self, base: Duration) -> Duration {
        (base / self.divisor()).max(Duration::from_millis(1))
    }
}

impl FromStr for PlaybackSpeed {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1x" | "normal" => Ok(PlaybackSpeed::Normal),
            "4x" | "fast" => Ok(PlaybackSpeed::Fast),
            "max" => Ok(PlaybackSpeed::Max),
            other => Err(format!(
                "invalid playback speed: {other} (expected \"1x\", \"4x\" or \"max\")"
            )),
        }
    }
}

/// How dependency edges are drawn between node anchors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeStyle {
    /// A single straight segment.
    Straight,
    /// A cubic curve leaving and entering horizontally.
    Smooth,
}

impl Default for EdgeStyle {
    fn default() -> Self {
        EdgeStyle::Smooth
    }
}
