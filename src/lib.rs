// src/lib.rs

pub mod baseline;
pub mod cli;
pub mod config;
pub mod detect;
pub mod engine;
pub mod errors;
pub mod fs;
pub mod gate;
pub mod logging;
pub mod notify;
pub mod report;
pub mod snapshot;
pub mod types;

use std::sync::Arc;

use tracing::debug;

use crate::cli::CliArgs;
use crate::config::{load_for_cli, load_raw_for_cli, lock_settings};
use crate::engine::{RunOptions, Runtime};
use crate::errors::Result;
use crate::fs::{FileSystem, RealFileSystem};
use crate::gate::{FileLockStore, NotificationGate, SystemClock};
use crate::notify::{CommandNotifier, LogNotifier, Notifier};

/// High-level entry point used by `main.rs`. Returns the process exit code.
///
/// This wires together:
/// - config loading (file + CLI overrides)
/// - the real filesystem, file-backed lock and system clock
/// - the notifier (`[notify].command` or log-only)
/// - the run itself, or the `--status` report
pub async fn run(args: CliArgs) -> Result<i32> {
    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);

    if args.status {
        let raw = load_raw_for_cli(&args)?;
        let (lock_path, cooldown) = lock_settings(&raw)?;
        let gate = NotificationGate::new(
            FileLockStore::new(Arc::clone(&fs), lock_path),
            SystemClock,
            cooldown,
        );
        println!("{}", gate.state()?);
        return Ok(0);
    }

    let config = load_for_cli(&args)?;
    debug!(?config, "configuration loaded");

    let notifier: Box<dyn Notifier> = match &config.notify_command {
        Some(cmd) => Box::new(CommandNotifier::new(cmd.clone())),
        None => Box::new(LogNotifier),
    };
    let gate = NotificationGate::new(
        FileLockStore::new(Arc::clone(&fs), config.lock_path.clone()),
        SystemClock,
        config.cooldown,
    );
    let options = RunOptions {
        dry_run: args.dry_run,
    };

    let mut runtime = Runtime::new(fs, config, gate, notifier, options);
    let outcome = runtime.run().await?;

    println!("{}", outcome.summary_line());
    Ok(outcome.exit_code())
}
