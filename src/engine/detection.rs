// src/engine/detection.rs

//! Runs the detection components over one snapshot pair and assembles the
//! [`ComparisonReport`].

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::detect::{
    compare_indexes, ChangeSetAnalyzer, ComparisonResult, HashComparison, HashIndexer,
    StructuralComparator,
};
use crate::fs::FileSystem;
use crate::report::ComparisonReport;
use crate::snapshot::{ExcludeFilter, Snapshot};
use crate::types::Classification;

/// Detection pipeline shared by the sequential and concurrent drivers.
#[derive(Debug, Clone)]
pub struct Detector {
    fs: Arc<dyn FileSystem>,
    indexer: Arc<HashIndexer>,
    exclude: ExcludeFilter,
}

impl Detector {
    pub fn new(fs: Arc<dyn FileSystem>, indexer: HashIndexer, exclude: ExcludeFilter) -> Self {
        Self {
            fs,
            indexer: Arc::new(indexer),
            exclude,
        }
    }

    /// Run every stage on the calling thread.
    pub fn detect(&self, previous: &Path, current: &Path) -> ComparisonReport {
        let (prev, cur) = match self.open_pair(previous, current) {
            Ok(pair) => pair,
            Err(report) => return report,
        };

        let structural = StructuralComparator::new().compare(self.fs.as_ref(), &prev, &cur);
        let hash = hash_comparison(self.fs.as_ref(), &self.indexer, &prev, &cur);
        finish(&prev, &cur, structural, hash)
    }

    /// Run the structural comparison and the hash comparison in parallel on
    /// blocking threads, then assemble the report.
    pub async fn detect_concurrently(&self, previous: &Path, current: &Path) -> ComparisonReport {
        let (prev, cur) = match self.open_pair(previous, current) {
            Ok((prev, cur)) => (Arc::new(prev), Arc::new(cur)),
            Err(report) => return report,
        };

        let structural_task = {
            let (fs, prev, cur) = (Arc::clone(&self.fs), Arc::clone(&prev), Arc::clone(&cur));
            tokio::task::spawn_blocking(move || {
                StructuralComparator::new().compare(fs.as_ref(), &prev, &cur)
            })
        };
        let hash_task = {
            let (fs, indexer) = (Arc::clone(&self.fs), Arc::clone(&self.indexer));
            let (prev, cur) = (Arc::clone(&prev), Arc::clone(&cur));
            tokio::task::spawn_blocking(move || hash_comparison(fs.as_ref(), &indexer, &prev, &cur))
        };

        let (structural, hash) = tokio::join!(structural_task, hash_task);

        let hash = hash.unwrap_or_else(|e| {
            warn!(error = %e, "hash comparison task failed");
            HashComparison::unavailable(format!("hash task failed: {e}"))
        });
        match structural {
            Ok(structural) => finish(&prev, &cur, structural, hash),
            Err(e) => ComparisonReport::failed(
                prev.root().to_path_buf(),
                cur.root().to_path_buf(),
                format!("structural comparison task failed: {e}"),
            ),
        }
    }

    fn open_pair(
        &self,
        previous: &Path,
        current: &Path,
    ) -> Result<(Snapshot, Snapshot), ComparisonReport> {
        let open = |root: &Path| {
            Snapshot::open(self.fs.as_ref(), root, &self.exclude).map_err(|e| {
                warn!(root = %root.display(), error = %e, "cannot list snapshot");
                ComparisonReport::failed(
                    previous.to_path_buf(),
                    current.to_path_buf(),
                    format!("cannot list snapshot {}: {e:#}", root.display()),
                )
            })
        };
        Ok((open(previous)?, open(current)?))
    }
}

/// Hash both snapshots and compare. Never fails: any indexing error turns
/// into a `HASH_UNAVAILABLE` verdict.
fn hash_comparison(
    fs: &dyn FileSystem,
    indexer: &HashIndexer,
    previous: &Snapshot,
    current: &Snapshot,
) -> HashComparison {
    let indexes = indexer
        .index(fs, previous)
        .and_then(|p| indexer.index(fs, current).map(|c| (p, c)));
    match indexes {
        Ok((p, c)) => compare_indexes(&p, &c),
        Err(e) => {
            warn!(error = %e, "hash comparison unavailable; structural result stands");
            HashComparison::unavailable(e.to_string())
        }
    }
}

fn finish(
    previous: &Snapshot,
    current: &Snapshot,
    structural: ComparisonResult,
    hash: HashComparison,
) -> ComparisonReport {
    let change_set = match structural.structural {
        Classification::ComparisonError => None,
        _ => Some(ChangeSetAnalyzer::new().analyze(previous, current)),
    };
    let report = ComparisonReport::assemble(
        previous.root().to_path_buf(),
        current.root().to_path_buf(),
        structural,
        hash,
        change_set,
    );
    debug!(
        classification = %report.classification(),
        hash = %report.hash.verdict,
        "detection finished"
    );
    report
}
