// src/lib.rs

pub mod allocation;
pub mod backend;
pub mod cli;
pub mod config;
pub mod errors;
pub mod graph;
pub mod layout;
pub mod logging;
pub mod playback;
pub mod race;
pub mod screen;
pub mod types;

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::allocation::AllocationGuard;
use crate::backend::FileBackend;
use crate::cli::{CliArgs, Command, SnapshotArgs};
use crate::config::{ConfigFile, default_config_path, load_and_validate, load_or_default};
use crate::graph::TechGraph;
use crate::layout::{Layout, LayoutEngine};
use crate::playback::{PlaybackState, TableSink};
use crate::screen::{RaceScreen, TechModel, TechScreen};
use crate::types::PlaybackSpeed;

/// High-level entry point used by `main.rs`.
///
/// Loads the config, builds a file backend for the chosen snapshot directory
/// and dispatches to the subcommand.
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = match &args.config {
        Some(path) => load_and_validate(path)?,
        None => load_or_default(default_config_path())?,
    };
    let backend = file_backend(&cfg, args.command.source());

    match args.command {
        Command::Layout { json, .. } => run_layout(&cfg, backend, json).await,
        Command::Allocate { node, delta, .. } => run_allocate(&cfg, backend, &node, delta).await,
        Command::Replay { speed, .. } => run_replay(&cfg, backend, speed).await,
        Command::Check { .. } => run_check(&cfg, &backend),
    }
}

fn file_backend(cfg: &ConfigFile, source: &SnapshotArgs) -> FileBackend {
    match &source.snapshot_dir {
        Some(dir) => FileBackend::new(dir.clone()),
        None => FileBackend::from_config(cfg),
    }
}

async fn load_tech_screen(
    cfg: &ConfigFile,
    backend: FileBackend,
) -> Result<TechScreen<FileBackend>> {
    let mut screen = TechScreen::new(
        backend,
        LayoutEngine::from_config(cfg),
        cfg.allocation.step,
    );
    screen.refresh().await?;
    Ok(screen)
}

async fn run_layout(cfg: &ConfigFile, backend: FileBackend, json: bool) -> Result<()> {
    let screen = load_tech_screen(cfg, backend).await?;
    let Some(model) = screen.model() else {
        return Ok(());
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&model.layout)?);
    } else {
        print_layout(&model.layout);
    }
    Ok(())
}

fn print_layout(layout: &Layout) {
    println!(
        "layout: {} nodes, {} edges, {} ranks, {} crossings, {:.0} x {:.0}",
        layout.nodes.len(),
        layout.edges.len(),
        layout.rank_count(),
        layout.crossings,
        layout.width,
        layout.height
    );
    for rank in 0..layout.rank_count() {
        println!("rank {rank}:");
        for id in layout.rank_members(rank) {
            if let Some(node) = layout.node(id) {
                println!(
                    "  {:<28} {:<16} x={:>6.0} y={:>6.0}",
                    node.node_id, node.state, node.x, node.y
                );
            }
        }
    }
}

async fn run_allocate(
    cfg: &ConfigFile,
    backend: FileBackend,
    node: &str,
    delta: i64,
) -> Result<()> {
    let screen = load_tech_screen(cfg, backend).await?;
    let Some(model) = screen.model() else {
        return Ok(());
    };

    let guard = AllocationGuard::new(&model.graph, &model.pool);
    let current = model.pool.allocated(node);
    let proposal = guard.propose(node, current, delta);

    println!(
        "engineers: {} total, {} assigned, {} free",
        model.pool.total_engineers(),
        model.pool.used(),
        model.pool.free()
    );
    println!(
        "{node}: {current} -> {} ({})",
        proposal.new_amount,
        match &proposal.reason {
            None => "allowed".to_string(),
            Some(reason) => format!("rejected: {reason}"),
        }
    );

    if proposal.allowed {
        let request = guard.request(node, delta)?;
        println!("request: {}", serde_json::to_string(&request)?);
    }
    Ok(())
}

async fn run_replay(
    cfg: &ConfigFile,
    backend: FileBackend,
    speed: Option<PlaybackSpeed>,
) -> Result<()> {
    let mut playback_cfg = cfg.playback.clone();
    if let Some(speed) = speed {
        playback_cfg.speed = speed;
    }

    let mut screen = RaceScreen::new(backend, TableSink, &playback_cfg);
    screen.start().await?;

    // Ctrl-C leaves the screen early; otherwise wait for the last lap.
    tokio::select! {
        finished = screen.playback().wait_for_state(PlaybackState::Finished) => {
            let status = finished?;
            debug!(cursor = status.cursor, "replay finished");
        }
        signal = tokio::signal::ctrl_c() => {
            if let Err(e) = signal {
                warn!(error = %e, "failed to listen for Ctrl+C");
            }
            info!("replay interrupted");
        }
    }

    screen.leave().await?;
    Ok(())
}

/// Dry run: validate config and snapshots, print a summary.
fn run_check(cfg: &ConfigFile, backend: &FileBackend) -> Result<()> {
    println!("paddock check");
    println!(
        "  layout: rank_spacing={} node_spacing={} node={}x{} passes={} edge_style={:?}",
        cfg.layout.rank_spacing,
        cfg.layout.node_spacing,
        cfg.layout.node_width,
        cfg.layout.node_height,
        cfg.layout.ordering_passes,
        cfg.layout.edge_style
    );
    println!(
        "  playback: base_interval_ms={} speed={:?}",
        cfg.playback.base_interval_ms, cfg.playback.speed
    );
    println!("  allocation: step={}", cfg.allocation.step);
    println!("  snapshots: {}", backend.dir().display());
    println!();

    let snapshot = backend.load_tech()?;
    let node_count = snapshot.nodes.len();
    let model = TechModel::derive(snapshot, &LayoutEngine::from_config(cfg))?;
    print_tech_summary(&model.graph, node_count);
    println!(
        "  engineers: {} total, {} assigned, {} free",
        model.pool.total_engineers(),
        model.pool.used(),
        model.pool.free()
    );
    println!("  resource points: {}", model.resource_points);

    if model.violations.is_empty() {
        println!("  state audit: ok");
    } else {
        println!("  state audit: {} violation(s)", model.violations.len());
        for violation in &model.violations {
            println!("    - {violation}");
        }
    }
    for stray in model.pool.stray_entries(&model.graph) {
        println!("    - engineers assigned to '{stray}', which is not in progress");
    }

    match backend.load_race() {
        Ok(report) => {
            let laps = report.race_log.as_ref().map_or(0, Vec::len);
            println!(
                "race: {} ({} logged laps, {} classified)",
                report.track_name,
                laps,
                report.race_results.len()
            );
        }
        Err(err) => println!("race: unavailable ({err})"),
    }

    debug!("check complete");
    Ok(())
}

fn print_tech_summary(graph: &TechGraph, node_count: usize) {
    let roots: Vec<&str> = graph.roots().iter().map(|n| n.node_id.as_str()).collect();
    println!(
        "tech: {node_count} nodes, {} edges, roots: {roots:?}",
        graph.edge_count()
    );
}
