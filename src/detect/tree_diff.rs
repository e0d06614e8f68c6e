// src/detect/tree_diff.rs

//! Recursive content + structure diff between two snapshot listings.
//!
//! Output lines follow the familiar `diff -r` wording:
//!
//! ```text
//! Only in /prev/docs: old.txt
//! Files /prev/a.txt and /cur/a.txt differ
//! File /prev/x is a regular file while file /cur/x is a directory
//! ```
//!
//! A path that exists only on one side is reported once; its descendants are
//! not listed again.

use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use crate::fs::FileSystem;
use crate::snapshot::Snapshot;

const CHUNK: usize = 8192;

/// Outcome of a tree diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffOutcome {
    Equal,
    /// Differences found; carries the diff text.
    Different(String),
    /// The diff itself could not be carried out.
    Error(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    File,
    Dir,
}

fn kind_of(snapshot: &Snapshot, rel: &str) -> Option<EntryKind> {
    if snapshot.files().contains_key(rel) {
        Some(EntryKind::File)
    } else if snapshot.dirs().contains(rel) {
        Some(EntryKind::Dir)
    } else {
        None
    }
}

/// Diff `previous` against `current`.
pub fn diff_trees(fs: &dyn FileSystem, previous: &Snapshot, current: &Snapshot) -> DiffOutcome {
    match diff_lines(fs, previous, current) {
        Ok(lines) if lines.is_empty() => DiffOutcome::Equal,
        Ok(lines) => {
            let mut text = lines.join("\n");
            text.push('\n');
            DiffOutcome::Different(text)
        }
        Err(err) => DiffOutcome::Error(format!("{err:#}")),
    }
}

fn diff_lines(
    fs: &dyn FileSystem,
    previous: &Snapshot,
    current: &Snapshot,
) -> Result<Vec<String>> {
    let all: BTreeSet<&str> = previous
        .files()
        .keys()
        .chain(previous.dirs().iter())
        .chain(current.files().keys())
        .chain(current.dirs().iter())
        .map(String::as_str)
        .collect();

    let mut lines = Vec::new();
    // Paths reported as one-sided; their descendants are skipped.
    let mut reported: BTreeSet<&str> = BTreeSet::new();

    for rel in all {
        if has_reported_ancestor(&reported, rel) {
            continue;
        }

        let prev_path = previous.root().join(rel);
        let cur_path = current.root().join(rel);

        match (kind_of(previous, rel), kind_of(current, rel)) {
            (Some(_), None) => {
                lines.push(only_in(previous.root(), rel));
                reported.insert(rel);
            }
            (None, Some(_)) => {
                lines.push(only_in(current.root(), rel));
                reported.insert(rel);
            }
            (Some(EntryKind::File), Some(EntryKind::Dir)) => {
                lines.push(format!(
                    "File {} is a regular file while file {} is a directory",
                    prev_path.display(),
                    cur_path.display()
                ));
                reported.insert(rel);
            }
            (Some(EntryKind::Dir), Some(EntryKind::File)) => {
                lines.push(format!(
                    "File {} is a directory while file {} is a regular file",
                    prev_path.display(),
                    cur_path.display()
                ));
                reported.insert(rel);
            }
            (Some(EntryKind::File), Some(EntryKind::File)) => {
                if !files_equal(fs, previous, current, rel)? {
                    lines.push(format!(
                        "Files {} and {} differ",
                        prev_path.display(),
                        cur_path.display()
                    ));
                }
            }
            (Some(EntryKind::Dir), Some(EntryKind::Dir)) | (None, None) => {}
        }
    }

    debug!(differences = lines.len(), "tree diff finished");
    Ok(lines)
}

/// Checks each proper ancestor of `rel` (`a`, `a/b` for `a/b/c`).
fn has_reported_ancestor(reported: &BTreeSet<&str>, rel: &str) -> bool {
    rel.match_indices('/')
        .any(|(i, _)| reported.contains(&rel[..i]))
}

fn only_in(root: &Path, rel: &str) -> String {
    let (parent, name) = match rel.rsplit_once('/') {
        Some((parent, name)) => (root.join(parent), name),
        None => (root.to_path_buf(), rel),
    };
    format!("Only in {}: {}", parent.display(), name)
}

fn files_equal(
    fs: &dyn FileSystem,
    previous: &Snapshot,
    current: &Snapshot,
    rel: &str,
) -> Result<bool> {
    let (Some(a), Some(b)) = (previous.files().get(rel), current.files().get(rel)) else {
        return Ok(false);
    };
    if a.size != b.size {
        return Ok(false);
    }

    let mut left = fs
        .open_read(&a.path)
        .with_context(|| format!("diffing {rel}"))?;
    let mut right = fs
        .open_read(&b.path)
        .with_context(|| format!("diffing {rel}"))?;

    let mut buf_a = [0u8; CHUNK];
    let mut buf_b = [0u8; CHUNK];
    loop {
        let n_a = read_full(&mut left, &mut buf_a)
            .with_context(|| format!("reading {:?}", a.path))?;
        let n_b = read_full(&mut right, &mut buf_b)
            .with_context(|| format!("reading {:?}", b.path))?;
        if n_a != n_b || buf_a[..n_a] != buf_b[..n_b] {
            return Ok(false);
        }
        if n_a == 0 {
            return Ok(true);
        }
    }
}

/// Fill `buf` as far as the reader allows; returns bytes read (0 at EOF).
fn read_full(reader: &mut dyn Read, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader.read(&mut buf[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}
