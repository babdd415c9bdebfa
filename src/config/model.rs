// src/config/model.rs

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::types::{EdgeStyle, PlaybackSpeed};

/// Top-level configuration as read from `Paddock.toml`.
///
/// ```toml
/// [layout]
/// rank_spacing = 100.0
/// node_spacing = 50.0
/// edge_style = "smooth"
///
/// [playback]
/// base_interval_ms = 2000
/// speed = "4x"
///
/// [allocation]
/// step = 5
///
/// [backend]
/// snapshot_dir = "snapshots"
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub layout: LayoutSection,

    #[serde(default)]
    pub playback: PlaybackSection,

    #[serde(default)]
    pub allocation: AllocationSection,

    #[serde(default)]
    pub backend: BackendSection,
}

/// Validated configuration.
///
/// Only obtainable through `TryFrom<RawConfigFile>` (or
/// [`ConfigFile::default`]), so holders can rely on every value being sane.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub layout: LayoutSection,
    pub playback: PlaybackSection,
    pub allocation: AllocationSection,
    pub backend: BackendSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(raw: RawConfigFile) -> Self {
        Self {
            layout: raw.layout,
            playback: raw.playback,
            allocation: raw.allocation,
            backend: raw.backend,
        }
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self::new_unchecked(RawConfigFile::default())
    }
}

/// `[layout]` section: fixed spacing constants for the tech-tree layout.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LayoutSection {
    /// Horizontal gap between consecutive ranks.
    pub rank_spacing: f64,
    /// Vertical gap between nodes of the same rank.
    pub node_spacing: f64,
    pub node_width: f64,
    pub node_height: f64,
    /// Barycenter sweeps, alternating forward and backward.
    pub ordering_passes: usize,
    /// Vertically center ranks shorter than the tallest one.
    pub center_ranks: bool,
    pub edge_style: EdgeStyle,
}

impl Default for LayoutSection {
    fn default() -> Self {
        Self {
            rank_spacing: 100.0,
            node_spacing: 50.0,
            node_width: 300.0,
            node_height: 160.0,
            ordering_passes: 4,
            center_ranks: true,
            edge_style: EdgeStyle::Smooth,
        }
    }
}

/// `[playback]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaybackSection {
    /// Tick period at `1x`, in milliseconds.
    pub base_interval_ms: u64,
    /// Speed preset used when a race is loaded.
    pub speed: PlaybackSpeed,
}

impl Default for PlaybackSection {
    fn default() -> Self {
        Self {
            base_interval_ms: 2000,
            speed: PlaybackSpeed::Normal,
        }
    }
}

impl PlaybackSection {
    pub fn base_interval(&self) -> Duration {
        Duration::from_millis(self.base_interval_ms)
    }

    /// Tick period of the configured preset.
    pub fn interval(&self) -> Duration {
        self.speed.interval(self.base_interval())
    }
}

/// `[allocation]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AllocationSection {
    /// Engineers added or removed per click.
    pub step: u32,
}

impl Default for AllocationSection {
    fn default() -> Self {
        Self { step: 5 }
    }
}

/// `[backend]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackendSection {
    /// Directory holding `tech.json` / `race.json` for the file backend.
    pub snapshot_dir: PathBuf,
}

impl Default for BackendSection {
    fn default() -> Self {
        Self {
            snapshot_dir: PathBuf::from("."),
        }
    }
}
