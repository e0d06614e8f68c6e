// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `distwatch`.
///
/// Path and cooldown flags override the matching values from the config
/// file.
#[derive(Debug, Clone, Default, Parser)]
#[command(
    name = "distwatch",
    version,
    about = "Detect changes between two distribution snapshots and gate notifications \
             behind a cooldown.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Distwatch.toml` in the current working directory, if present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Previous snapshot directory (the baseline).
    #[arg(long, value_name = "DIR")]
    pub previous: Option<PathBuf>,

    /// Current snapshot directory.
    #[arg(long, value_name = "DIR")]
    pub current: Option<PathBuf>,

    /// Report output file.
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,

    /// Lock marker file.
    #[arg(long, value_name = "PATH")]
    pub lock: Option<PathBuf>,

    /// Cooldown before a detected change is notified (e.g. `15d`, `36h`).
    #[arg(long, value_name = "DURATION")]
    pub cooldown: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `DISTWATCH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Compare and write the report, but leave the lock and baseline alone.
    #[arg(long)]
    pub dry_run: bool,

    /// Print the notification gate state and exit.
    #[arg(long, conflicts_with = "dry_run")]
    pub status: bool,
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
