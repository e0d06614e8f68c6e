// src/report/mod.rs

//! Aggregation of all detection outputs into one report.
//!
//! [`ComparisonReport`] holds the structural result, the hash comparison and
//! the change set, and exposes the single overall classification. Rendering
//! lives in [`render`]; no decision logic lives here.

pub mod render;

use std::path::PathBuf;

use crate::detect::{combine, verdicts_disagree, ChangeSet, ComparisonResult, HashComparison};
use crate::types::{Classification, HashVerdict};

pub use render::{format_size, render_decision, RenderOptions};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonReport {
    pub previous_root: PathBuf,
    pub current_root: PathBuf,
    pub result: ComparisonResult,
    pub hash: HashComparison,
    pub change_set: Option<ChangeSet>,
}

impl ComparisonReport {
    /// Merge the hash comparison and change set into the structural result.
    pub fn assemble(
        previous_root: PathBuf,
        current_root: PathBuf,
        structural: ComparisonResult,
        hash: HashComparison,
        change_set: Option<ChangeSet>,
    ) -> Self {
        let mut result = structural;
        result.hash_verdict = hash.verdict;
        result.classification = combine(result.structural, hash.verdict);
        Self {
            previous_root,
            current_root,
            result,
            hash,
            change_set,
        }
    }

    /// Report for a run that failed before any comparison could happen.
    pub fn failed(previous_root: PathBuf, current_root: PathBuf, error: String) -> Self {
        Self {
            previous_root,
            current_root,
            result: ComparisonResult {
                classification: Classification::ComparisonError,
                structural: Classification::ComparisonError,
                previous: Default::default(),
                current: Default::default(),
                diff: String::new(),
                hash_verdict: HashVerdict::Unavailable,
                error: Some(error),
            },
            hash: HashComparison::unavailable("comparison did not run"),
            change_set: None,
        }
    }

    pub fn classification(&self) -> Classification {
        self.result.classification
    }

    pub fn verdicts_disagree(&self) -> bool {
        verdicts_disagree(self.result.structural, self.hash.verdict)
    }
}
