// src/detect/structural.rs

use tracing::{debug, info, warn};

use crate::detect::tree_diff::{diff_trees, DiffOutcome};
use crate::detect::ComparisonResult;
use crate::errors::DistwatchError;
use crate::fs::FileSystem;
use crate::snapshot::Snapshot;
use crate::types::{Classification, HashVerdict};

/// File-count / size / tree-diff classification of a snapshot pair.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuralComparator;

impl StructuralComparator {
    pub fn new() -> Self {
        Self
    }

    /// Classify `previous` against `current`.
    ///
    /// - previous empty, current non-empty: `FirstRun`, the diff text is the
    ///   full listing of current.
    /// - both empty, or current empty: `ComparisonError`.
    /// - otherwise the tree diff decides between `NoChanges`,
    ///   `ChangesDetected` and `ComparisonError`.
    ///
    /// The returned result carries `HashVerdict::Unavailable`; the hash
    /// verdict is merged in later by the report.
    pub fn compare(
        &self,
        fs: &dyn FileSystem,
        previous: &Snapshot,
        current: &Snapshot,
    ) -> ComparisonResult {
        let prev_stats = previous.stats();
        let cur_stats = current.stats();

        let (classification, diff, error) = if previous.is_empty() {
            if current.is_empty() {
                warn!("both snapshots are missing or empty");
                (
                    Classification::ComparisonError,
                    String::new(),
                    Some(
                        DistwatchError::Precondition(format!(
                            "both snapshots are missing or empty: {} and {}",
                            previous.root().display(),
                            current.root().display()
                        ))
                        .to_string(),
                    ),
                )
            } else {
                info!(files = cur_stats.file_count, "no previous snapshot; first run");
                (Classification::FirstRun, full_listing(current), None)
            }
        } else if current.is_empty() {
            warn!(root = %current.root().display(), "current snapshot is missing or empty");
            (
                Classification::ComparisonError,
                String::new(),
                Some(format!(
                    "current snapshot is missing or empty: {}",
                    current.root().display()
                )),
            )
        } else {
            match diff_trees(fs, previous, current) {
                DiffOutcome::Equal => (Classification::NoChanges, String::new(), None),
                DiffOutcome::Different(text) => (Classification::ChangesDetected, text, None),
                DiffOutcome::Error(msg) => {
                    warn!(error = %msg, "tree diff failed");
                    let err = DistwatchError::DiffMechanism(msg);
                    (Classification::ComparisonError, String::new(), Some(err.to_string()))
                }
            }
        };

        debug!(%classification, "structural comparison finished");

        ComparisonResult {
            classification,
            structural: classification,
            previous: prev_stats,
            current: cur_stats,
            diff,
            hash_verdict: HashVerdict::Unavailable,
            error,
        }
    }
}

fn full_listing(snapshot: &Snapshot) -> String {
    let mut out = String::new();
    for rel in snapshot.relative_paths() {
        out.push_str(rel);
        out.push('\n');
    }
    out
}
