// src/engine/mod.rs

//! Run orchestration for distwatch.
//!
//! - [`detection`] runs the detection components over the snapshot pair and
//!   assembles the report.
//! - [`runtime`] is the IO shell around it: writes the report, consults the
//!   notification gate, hands the report to the notifier and advances the
//!   baseline.
//!
//! State flows through explicit values ([`ComparisonReport`],
//! [`NotificationDecision`], [`RunOutcome`]); no stage reads anything it was
//! not handed.
//!
//! [`ComparisonReport`]: crate::report::ComparisonReport

use std::path::PathBuf;

use crate::types::{Classification, NotificationDecision};

pub mod detection;
pub mod runtime;

pub use detection::Detector;
pub use runtime::Runtime;

/// Options for a single run.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Compare and report, but do not mutate the lock or the baseline.
    pub dry_run: bool,
}

/// What a run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub classification: Classification,
    /// `None` when the gate was not consulted (comparison error).
    pub decision: Option<NotificationDecision>,
    pub report_path: PathBuf,
    pub baseline_advanced: bool,
}

impl RunOutcome {
    pub fn exit_code(&self) -> i32 {
        self.classification.exit_code()
    }

    /// One-line summary printed on STDOUT, e.g. `CHANGES_DETECTED ARMED`.
    pub fn summary_line(&self) -> String {
        match &self.decision {
            Some(d) => format!("{} {}", self.classification, d.decision),
            None => format!("{} -", self.classification),
        }
    }
}
