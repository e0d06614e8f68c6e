// src/baseline.rs

//! Advancing the "previous" baseline to the current snapshot.
//!
//! The copy goes into a staging directory next to `previous` and is swapped
//! in only once complete. A failed advance leaves `previous` as it was.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::fs::FileSystem;

/// Replace the contents of `previous` with a copy of the tree at `current`.
///
/// Every regular file and directory under `current` is copied, including
/// paths excluded from comparison. Returns the number of files copied.
pub fn advance(fs: &dyn FileSystem, current: &Path, previous: &Path) -> Result<usize> {
    if !fs.resolves_to_dir(current) {
        anyhow::bail!("current snapshot {:?} is not a directory", current);
    }

    let staging = sibling(previous, "staging")?;
    let retired = sibling(previous, "retired")?;
    for leftover in [&staging, &retired] {
        if fs.exists(leftover) {
            warn!(path = %leftover.display(), "removing leftover from an interrupted advance");
            fs.remove_dir_all(leftover)?;
        }
    }

    let copied = match copy_tree(fs, current, &staging) {
        Ok(n) => n,
        Err(err) => {
            discard(fs, &staging);
            return Err(err.context(format!(
                "copying {:?} into the baseline; {:?} left untouched",
                current, previous
            )));
        }
    };

    swap_in(fs, &staging, previous, &retired)?;

    info!(
        previous = %previous.display(),
        current = %current.display(),
        files = copied,
        "advanced previous baseline"
    );
    Ok(copied)
}

/// `<parent>/.<name>.distwatch-<tag>`, a sibling of `previous`.
fn sibling(previous: &Path, tag: &str) -> Result<PathBuf> {
    let name = previous
        .file_name()
        .with_context(|| format!("baseline path {:?} has no final component", previous))?;
    let sibling = format!(".{}.distwatch-{tag}", name.to_string_lossy());
    Ok(previous.with_file_name(sibling))
}

fn copy_tree(fs: &dyn FileSystem, from: &Path, to: &Path) -> Result<usize> {
    fs.create_dir_all(to)?;

    let mut copied = 0usize;
    let mut stack = vec![from.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for path in fs.read_dir(&dir)? {
            let Ok(rel) = path.strip_prefix(from) else {
                continue;
            };
            let target = to.join(rel);
            if fs.is_dir(&path) {
                fs.create_dir_all(&target)?;
                stack.push(path);
            } else if fs.is_file(&path) {
                let mut buf = Vec::new();
                fs.open_read(&path)?
                    .read_to_end(&mut buf)
                    .with_context(|| format!("reading {:?}", path))?;
                fs.write(&target, &buf)?;
                debug!(file = %rel.display(), "copied into staging");
                copied += 1;
            }
        }
    }
    Ok(copied)
}

/// Move the complete staging tree into place. The old baseline is renamed
/// aside first and restored if the final rename fails.
fn swap_in(fs: &dyn FileSystem, staging: &Path, previous: &Path, retired: &Path) -> Result<()> {
    let had_previous = fs.exists(previous);
    if had_previous {
        if let Err(err) = fs.rename(previous, retired) {
            discard(fs, staging);
            return Err(err.context("setting the old baseline aside"));
        }
    }

    if let Err(err) = fs.rename(staging, previous) {
        if had_previous {
            if let Err(restore) = fs.rename(retired, previous) {
                warn!(error = %restore, "could not restore the old baseline");
            }
        }
        discard(fs, staging);
        return Err(err.context("moving the new baseline into place"));
    }

    if had_previous {
        if let Err(err) = fs.remove_dir_all(retired) {
            warn!(path = %retired.display(), error = %err, "could not remove the old baseline");
        }
    }
    Ok(())
}

fn discard(fs: &dyn FileSystem, path: &Path) {
    if fs.exists(path) {
        if let Err(err) = fs.remove_dir_all(path) {
            warn!(path = %path.display(), error = %err, "could not remove staging directory");
        }
    }
}
