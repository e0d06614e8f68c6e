// src/snapshot/mod.rs

//! Read-only view of one snapshot directory tree.
//!
//! A [`Snapshot`] records where the tree lives, whether it exists, and the
//! sorted listing of its regular files and directories (relative to the
//! root, forward-slash separated). Every detection component works off this
//! listing; none of them mutate the tree.

pub mod filter;

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::debug;

use crate::fs::FileSystem;

pub use filter::ExcludeFilter;

/// One regular file inside a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotFile {
    pub path: PathBuf,
    pub size: u64,
}

/// File count and aggregate byte size of a snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SnapshotStats {
    pub file_count: usize,
    pub total_bytes: u64,
}

#[derive(Debug, Clone)]
pub struct Snapshot {
    root: PathBuf,
    exists: bool,
    files: BTreeMap<String, SnapshotFile>,
    dirs: BTreeSet<String>,
}

impl Snapshot {
    /// Walk the tree under `root` and record its listing.
    ///
    /// A missing root (or a root that is not a directory) yields a snapshot
    /// with `exists() == false` and no files. The root itself may be a
    /// symlink to a directory; links below it are never followed. Errors
    /// reading a directory inside an existing tree are propagated.
    pub fn open(fs: &dyn FileSystem, root: &Path, filter: &ExcludeFilter) -> Result<Self> {
        let mut snapshot = Self {
            root: root.to_path_buf(),
            exists: fs.resolves_to_dir(root),
            files: BTreeMap::new(),
            dirs: BTreeSet::new(),
        };

        if !snapshot.exists {
            debug!(root = %root.display(), "snapshot root missing");
            return Ok(snapshot);
        }

        let mut stack = vec![root.to_path_buf()];
        while let Some(dir) = stack.pop() {
            for path in fs.read_dir(&dir)? {
                let Some(rel) = relative_str(root, &path) else {
                    continue;
                };
                if filter.is_excluded(&rel) {
                    debug!(path = %rel, "excluded from snapshot listing");
                    continue;
                }
                if fs.is_dir(&path) {
                    snapshot.dirs.insert(rel);
                    stack.push(path);
                } else if fs.is_file(&path) {
                    let size = fs.file_len(&path)?;
                    snapshot.files.insert(rel, SnapshotFile { path, size });
                }
            }
        }

        debug!(
            root = %root.display(),
            files = snapshot.files.len(),
            dirs = snapshot.dirs.len(),
            "snapshot listed"
        );
        Ok(snapshot)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn exists(&self) -> bool {
        self.exists
    }

    /// Empty means "zero regular files"; a missing root is empty too.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn stats(&self) -> SnapshotStats {
        SnapshotStats {
            file_count: self.files.len(),
            total_bytes: self.files.values().map(|f| f.size).sum(),
        }
    }

    /// Regular files keyed by relative path, in path order.
    pub fn files(&self) -> &BTreeMap<String, SnapshotFile> {
        &self.files
    }

    /// Relative paths of all (non-excluded) directories below the root.
    pub fn dirs(&self) -> &BTreeSet<String> {
        &self.dirs
    }

    /// Sorted relative paths of all regular files.
    pub fn relative_paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }
}

/// Convert a path into a string relative to `root`, with forward slashes.
///
/// Returns `None` if `path` does not live under `root`.
pub fn relative_str(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let s = rel.to_string_lossy().replace('\\', "/");
    if s.is_empty() { None } else { Some(s) }
}
