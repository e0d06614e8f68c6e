// src/engine/runtime.rs

use std::fmt;
use std::sync::Arc;

use anyhow::Context;
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::baseline;
use crate::config::ConfigFile;
use crate::detect::HashIndexer;
use crate::errors::Result;
use crate::fs::FileSystem;
use crate::gate::{Clock, LockStore, NotificationGate};
use crate::notify::Notifier;
use crate::report::render_decision;
use crate::types::Classification;

use super::{Detector, RunOptions, RunOutcome};

/// Drives one full run: detection, report, gate, delivery, baseline.
///
/// Detection errors end up as a `COMPARISON_ERROR` report and never touch the
/// lock or the baseline. Notifier failures are logged and ignored.
pub struct Runtime<S: LockStore, C: Clock> {
    fs: Arc<dyn FileSystem>,
    config: ConfigFile,
    detector: Detector,
    gate: NotificationGate<S, C>,
    notifier: Box<dyn Notifier>,
    options: RunOptions,
}

impl<S: LockStore, C: Clock> fmt::Debug for Runtime<S, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("config", &self.config)
            .field("gate", &self.gate)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<S: LockStore, C: Clock> Runtime<S, C> {
    pub fn new(
        fs: Arc<dyn FileSystem>,
        config: ConfigFile,
        gate: NotificationGate<S, C>,
        notifier: Box<dyn Notifier>,
        options: RunOptions,
    ) -> Self {
        let detector = Detector::new(
            Arc::clone(&fs),
            HashIndexer::from_algorithms(&config.algorithms),
            config.exclude.clone(),
        );
        Self::with_detector(fs, config, detector, gate, notifier, options)
    }

    /// Like [`Runtime::new`], with a caller-built detector (e.g. a custom
    /// digest chain).
    pub fn with_detector(
        fs: Arc<dyn FileSystem>,
        config: ConfigFile,
        detector: Detector,
        gate: NotificationGate<S, C>,
        notifier: Box<dyn Notifier>,
        options: RunOptions,
    ) -> Self {
        Self {
            fs,
            config,
            detector,
            gate,
            notifier,
            options,
        }
    }

    pub fn gate(&self) -> &NotificationGate<S, C> {
        &self.gate
    }

    pub async fn run(&mut self) -> Result<RunOutcome> {
        let cfg = &self.config;
        info!(
            previous = %cfg.previous.display(),
            current = %cfg.current.display(),
            dry_run = self.options.dry_run,
            "distwatch run started"
        );

        let report = self
            .detector
            .detect_concurrently(&cfg.previous, &cfg.current)
            .await;
        let classification = report.classification();

        let generated_at: DateTime<Utc> = self.gate.clock().now().into();
        let mut text = report.render(generated_at, &cfg.render);
        self.write_report(&text, cfg.report_append)?;

        let decision = match classification {
            Classification::ComparisonError => None,
            c if self.options.dry_run => Some(self.gate.preview(c)?),
            c => Some(self.gate.evaluate(c)?),
        };

        let decision_line = render_decision(decision.as_ref(), self.options.dry_run);
        self.write_report(&decision_line, true)?;
        text.push_str(&decision_line);

        if let Some(d) = decision {
            if let Err(err) = self.notifier.deliver(text, d).await {
                warn!(error = %err, "notification delivery failed; continuing");
            }
        }

        let baseline_advanced = if !self.options.dry_run && classification.is_change() {
            baseline::advance(self.fs.as_ref(), &self.config.current, &self.config.previous)?;
            true
        } else {
            false
        };

        let outcome = RunOutcome {
            classification,
            decision,
            report_path: self.config.report_path.clone(),
            baseline_advanced,
        };
        info!(
            classification = %outcome.classification,
            decision = ?outcome.decision.map(|d| d.decision),
            baseline_advanced,
            "distwatch run finished"
        );
        Ok(outcome)
    }

    fn write_report(&self, text: &str, append: bool) -> Result<()> {
        let path = &self.config.report_path;
        let written = if append {
            self.fs.append(path, text.as_bytes())
        } else {
            self.fs.write(path, text.as_bytes())
        };
        written.with_context(|| format!("writing report to {}", path.display()))?;
        Ok(())
    }
}
