// src/notify/mod.rs

//! Pluggable notification delivery.
//!
//! The runtime hands every finished report plus the gate decision to a
//! `Notifier`. Delivery failures are logged by the caller and never abort the
//! run.
//!
//! - `LogNotifier` only records the decision in the log.
//! - `CommandNotifier` pipes the report into a shell command (e.g. a mail
//!   client) when the decision is `NOTIFY`.

use std::future::Future;
use std::pin::Pin;
use std::process::Stdio;

use anyhow::{Context, bail};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info};

use crate::errors::Result;
use crate::types::{Decision, NotificationDecision};

/// Trait abstracting how a report is delivered.
pub trait Notifier: Send + Sync {
    fn deliver(
        &self,
        report: String,
        decision: NotificationDecision,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// Logs the decision; delivers nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn deliver(
        &self,
        report: String,
        decision: NotificationDecision,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            match decision.decision {
                Decision::Notify => info!(
                    %decision,
                    report_bytes = report.len(),
                    "change notification due (no delivery command configured)"
                ),
                _ => debug!(%decision, "no notification due"),
            }
            Ok(())
        })
    }
}

/// Runs a shell command with the report on stdin for `NOTIFY` decisions.
#[derive(Debug, Clone)]
pub struct CommandNotifier {
    command: String,
}

impl CommandNotifier {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }
}

impl Notifier for CommandNotifier {
    fn deliver(
        &self,
        report: String,
        decision: NotificationDecision,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            if decision.decision != Decision::Notify {
                debug!(%decision, "skipping notification command");
                return Ok(());
            }
            run_command(&self.command, &report, decision).await?;
            Ok(())
        })
    }
}

async fn run_command(
    command: &str,
    report: &str,
    decision: NotificationDecision,
) -> anyhow::Result<()> {
    info!(cmd = %command, "running notification command");

    // Build a shell command appropriate for the platform.
    let mut cmd = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(command);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(command);
        c
    };

    cmd.stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .env("DISTWATCH_DECISION", decision.decision.as_str())
        .kill_on_drop(true);

    let mut child = cmd
        .spawn()
        .with_context(|| format!("spawning notification command '{command}'"))?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(report.as_bytes())
            .await
            .context("writing report to notification command")?;
        // Dropping stdin closes the pipe so the command sees EOF.
    }

    let output = child
        .wait_with_output()
        .await
        .context("waiting for notification command")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!(
            "notification command exited with {}: {}",
            output.status,
            stderr.trim()
        );
    }

    info!("notification command finished");
    Ok(())
}
