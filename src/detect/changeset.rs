// src/detect/changeset.rs

use std::collections::BTreeSet;

use tracing::debug;

use crate::snapshot::Snapshot;

/// Added and removed relative paths between two snapshots.
///
/// Renames show up as one removed plus one added path. Modified files are
/// not tracked here; they come from the hash comparison.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    pub added: BTreeSet<String>,
    pub removed: BTreeSet<String>,
}

impl ChangeSet {
    /// `added = current − previous`, `removed = previous − current`.
    pub fn from_paths<P, C, S>(previous: P, current: C) -> Self
    where
        P: IntoIterator<Item = S>,
        C: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let previous: BTreeSet<String> = previous.into_iter().map(Into::into).collect();
        let current: BTreeSet<String> = current.into_iter().map(Into::into).collect();

        let added = current.difference(&previous).cloned().collect();
        let removed = previous.difference(&current).cloned().collect();
        Self { added, removed }
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ChangeSetAnalyzer;

impl ChangeSetAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Compute the change set of two snapshot listings.
    ///
    /// With an empty previous snapshot every current path is `added`.
    pub fn analyze(&self, previous: &Snapshot, current: &Snapshot) -> ChangeSet {
        let set = if previous.is_empty() {
            ChangeSet {
                added: current.relative_paths().map(str::to_string).collect(),
                removed: BTreeSet::new(),
            }
        } else {
            ChangeSet::from_paths(previous.relative_paths(), current.relative_paths())
        };
        debug!(
            added = set.added.len(),
            removed = set.removed.len(),
            "change set computed"
        );
        set
    }
}
