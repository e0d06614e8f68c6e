// src/detect/mod.rs

//! Change detection between a previous and a current snapshot.
//!
//! - [`structural`]: file counts, sizes and the recursive tree diff.
//! - [`hash`]: per-file content digests and the hash verdict.
//! - [`changeset`]: added / removed relative paths.
//!
//! [`combine`] folds the structural classification and the hash verdict into
//! the single classification the notification gate consumes.

pub mod changeset;
pub mod hash;
pub mod structural;
pub mod tree_diff;

use crate::snapshot::SnapshotStats;
use crate::types::{Classification, HashVerdict};

pub use changeset::{ChangeSet, ChangeSetAnalyzer};
pub use hash::{
    compare_indexes, BuiltinProvider, DigestProvider, FileEntry, HashComparison, HashIndex,
    HashIndexer,
};
pub use structural::StructuralComparator;
pub use tree_diff::{diff_trees, DiffOutcome};

/// Counts, diff text and verdicts for one snapshot pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonResult {
    /// Overall classification (structural and hash combined).
    pub classification: Classification,
    /// Classification from the structural comparison alone.
    pub structural: Classification,
    pub previous: SnapshotStats,
    pub current: SnapshotStats,
    /// Raw structural diff text (or the full listing on a first run).
    pub diff: String,
    pub hash_verdict: HashVerdict,
    /// Error message when the classification is `ComparisonError`.
    pub error: Option<String>,
}

/// Combine the structural classification with the hash verdict.
///
/// `ComparisonError` and `FirstRun` pass through unchanged. Otherwise the
/// result is `ChangesDetected` if either signal reports a change; a missing
/// hash verdict never masks a structural detection.
pub fn combine(structural: Classification, hash: HashVerdict) -> Classification {
    match structural {
        Classification::ComparisonError | Classification::FirstRun => structural,
        Classification::ChangesDetected => Classification::ChangesDetected,
        Classification::NoChanges => match hash {
            HashVerdict::Different => Classification::ChangesDetected,
            HashVerdict::Identical | HashVerdict::Unavailable => Classification::NoChanges,
        },
    }
}

/// True when the two signals point in different directions.
///
/// An unavailable hash verdict never disagrees; first runs and errors are
/// not compared.
pub fn verdicts_disagree(structural: Classification, hash: HashVerdict) -> bool {
    matches!(
        (structural, hash),
        (Classification::NoChanges, HashVerdict::Different)
            | (Classification::ChangesDetected, HashVerdict::Identical)
    )
}
