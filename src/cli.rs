// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::types::PlaybackSpeed;

/// Command-line arguments for `paddock`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "paddock",
    version,
    about = "Lay out the R&D tree, check engineer allocations and replay races.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Paddock.toml` in the current working directory. The default
    /// file may be missing; an explicitly given one must exist.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `PADDOCK_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Build and lay out the technology graph, then print node positions.
    Layout {
        #[command(flatten)]
        source: SnapshotArgs,

        /// Print the full layout as JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Check an allocation change against the engineer pool.
    Allocate {
        #[command(flatten)]
        source: SnapshotArgs,

        /// Node to change.
        #[arg(long, value_name = "ID")]
        node: String,

        /// Engineers to add (negative to remove).
        #[arg(long, value_name = "N", allow_hyphen_values = true)]
        delta: i64,
    },

    /// Replay the race log lap by lap.
    Replay {
        #[command(flatten)]
        source: SnapshotArgs,

        /// Speed preset: 1x, 4x or max. Overrides `[playback] speed`.
        #[arg(long, value_name = "SPEED")]
        speed: Option<PlaybackSpeed>,
    },

    /// Validate config and snapshots without doing anything else.
    Check {
        #[command(flatten)]
        source: SnapshotArgs,
    },
}

impl Command {
    pub fn source(&self) -> &SnapshotArgs {
        match self {
            Command::Layout { source, .. }
            | Command::Allocate { source, .. }
            | Command::Replay { source, .. }
            | Command::Check { source } => source,
        }
    }
}

/// Where snapshots are read from.
#[derive(Debug, Clone, Default, Args)]
pub struct SnapshotArgs {
    /// Directory containing `tech.json` and `race.json`. Overrides
    /// `[backend] snapshot_dir`.
    #[arg(long, value_name = "DIR")]
    pub snapshot_dir: Option<PathBuf>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
