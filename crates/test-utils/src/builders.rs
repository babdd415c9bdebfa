#![allow(dead_code)]

use std::collections::BTreeMap;

use paddock::config::{ConfigFile, RawConfigFile};
use paddock::graph::{TechNode, TechSnapshot};
use paddock::race::{Entrant, LapSnapshot, RaceReport, TireCompound};
use paddock::types::{EdgeStyle, NodeState, PlaybackSpeed};

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn spacing(mut self, rank_spacing: f64, node_spacing: f64) -> Self {
        self.config.layout.rank_spacing = rank_spacing;
        self.config.layout.node_spacing = node_spacing;
        self
    }

    pub fn node_size(mut self, width: f64, height: f64) -> Self {
        self.config.layout.node_width = width;
        self.config.layout.node_height = height;
        self
    }

    pub fn center_ranks(mut self, val: bool) -> Self {
        self.config.layout.center_ranks = val;
        self
    }

    pub fn edge_style(mut self, style: EdgeStyle) -> Self {
        self.config.layout.edge_style = style;
        self
    }

    pub fn base_interval_ms(mut self, ms: u64) -> Self {
        self.config.playback.base_interval_ms = ms;
        self
    }

    pub fn speed(mut self, speed: PlaybackSpeed) -> Self {
        self.config.playback.speed = speed;
        self
    }

    pub fn step(mut self, step: u32) -> Self {
        self.config.allocation.step = step;
        self
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `TechNode`.
pub struct TechNodeBuilder {
    node: TechNode,
}

impl TechNodeBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            node: TechNode {
                node_id: id.to_string(),
                name: id.to_string(),
                description: String::new(),
                base_workload: 100.0,
                invested_work: 0.0,
                rp_cost: 0,
                dependencies: vec![],
                mutually_exclusive: vec![],
                effects: BTreeMap::new(),
                state: NodeState::Locked,
            },
        }
    }

    pub fn after(mut self, dep: &str) -> Self {
        self.node.dependencies.push(dep.to_string());
        self
    }

    pub fn exclusive_with(mut self, other: &str) -> Self {
        self.node.mutually_exclusive.push(other.to_string());
        self
    }

    pub fn state(mut self, state: NodeState) -> Self {
        self.node.state = state;
        self
    }

    pub fn workload(mut self, base: f64) -> Self {
        self.node.base_workload = base;
        self
    }

    pub fn invested(mut self, work: f64) -> Self {
        self.node.invested_work = work;
        self
    }

    pub fn rp_cost(mut self, cost: u64) -> Self {
        self.node.rp_cost = cost;
        self
    }

    pub fn effect(mut self, key: &str, value: f64) -> Self {
        self.node.effects.insert(key.to_string(), value);
        self
    }

    pub fn build(self) -> TechNode {
        self.node
    }
}

/// Shorthand for a node with a state and dependencies.
pub fn node(id: &str, state: NodeState, deps: &[&str]) -> TechNode {
    deps.iter()
        .fold(TechNodeBuilder::new(id).state(state), |b, dep| b.after(dep))
        .build()
}

/// Builder for `TechSnapshot`.
pub struct SnapshotBuilder {
    snapshot: TechSnapshot,
}

impl SnapshotBuilder {
    pub fn new() -> Self {
        Self {
            snapshot: TechSnapshot {
                nodes: vec![],
                resource_points: 0,
                total_engineers: 0,
                active_projects: BTreeMap::new(),
            },
        }
    }

    pub fn node(mut self, node: TechNode) -> Self {
        self.snapshot.nodes.push(node);
        self
    }

    pub fn engineers(mut self, total: u32) -> Self {
        self.snapshot.total_engineers = total;
        self
    }

    pub fn project(mut self, id: &str, engineers: u32) -> Self {
        self.snapshot.active_projects.insert(id.to_string(), engineers);
        self
    }

    pub fn resource_points(mut self, rp: u64) -> Self {
        self.snapshot.resource_points = rp;
        self
    }

    pub fn build(self) -> TechSnapshot {
        self.snapshot
    }
}

impl Default for SnapshotBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The small tree used across tests:
///
/// ```text
/// chassis_base (COMPLETED) -> aero_floor (IN_PROGRESS) -> aero_wing (LOCKED)
///                          -> engine_map (AVAILABLE)
/// ```
///
/// 20 engineers, 10 of them on `aero_floor`, 500 resource points.
pub fn season_snapshot() -> TechSnapshot {
    SnapshotBuilder::new()
        .node(
            TechNodeBuilder::new("chassis_base")
                .state(NodeState::Completed)
                .invested(100.0)
                .effect("chassis.weight", -2.0)
                .build(),
        )
        .node(
            TechNodeBuilder::new("aero_floor")
                .after("chassis_base")
                .state(NodeState::InProgress)
                .invested(40.0)
                .rp_cost(150)
                .effect("aero.downforce", 15.0)
                .build(),
        )
        .node(
            TechNodeBuilder::new("aero_wing")
                .after("aero_floor")
                .rp_cost(200)
                .build(),
        )
        .node(
            TechNodeBuilder::new("engine_map")
                .after("chassis_base")
                .state(NodeState::Available)
                .rp_cost(300)
                .effect("powertrain.power", 8.0)
                .build(),
        )
        .engineers(20)
        .project("aero_floor", 10)
        .resource_points(500)
        .build()
}

pub fn entrant(driver: &str, team: &str) -> Entrant {
    Entrant {
        driver: driver.to_string(),
        team: team.to_string(),
        compound: Some(TireCompound::Medium),
        wear: Some(0.0),
        stops: Some(0),
        interval: None,
        total_time: None,
    }
}

/// `laps` snapshots of a three-car field; lap numbers run `1..=laps`.
pub fn lap_log(laps: u32) -> Vec<LapSnapshot> {
    (1..=laps)
        .map(|lap| {
            let t = f64::from(lap) * 90.0;
            let mut leader = entrant("VER", "Red Bull");
            leader.total_time = Some(t);
            leader.wear = Some(f64::from(lap));
            let mut second = entrant("HAM", "Mercedes");
            second.interval = Some(1.5);
            second.total_time = Some(t + 1.5);
            let mut third = entrant("NOR", "McLaren");
            third.total_time = Some(t + 4.25);
            third.compound = Some(TireCompound::Hard);

            LapSnapshot {
                lap,
                standings: vec![leader, second, third],
            }
        })
        .collect()
}

/// Builder for `RaceReport`.
pub struct RaceReportBuilder {
    report: RaceReport,
}

impl RaceReportBuilder {
    pub fn new(track: &str) -> Self {
        Self {
            report: RaceReport {
                track_name: track.to_string(),
                race_log: None,
                race_results: vec![
                    entrant("VER", "Red Bull"),
                    entrant("HAM", "Mercedes"),
                    entrant("NOR", "McLaren"),
                ],
                laps: None,
            },
        }
    }

    /// A logged race of `laps` laps.
    pub fn laps(mut self, laps: u32) -> Self {
        self.report.race_log = Some(lap_log(laps));
        self.report.laps = Some(laps);
        self
    }

    /// Instant result: no lap log, only the final classification.
    pub fn without_log(mut self, scheduled_laps: u32) -> Self {
        self.report.race_log = None;
        self.report.laps = Some(scheduled_laps);
        self
    }

    pub fn build(self) -> RaceReport {
        self.report
    }
}
