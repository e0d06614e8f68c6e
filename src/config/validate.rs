// src/config/validate.rs

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{DistwatchError, Result};
use crate::report::RenderOptions;
use crate::snapshot::ExcludeFilter;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::DistwatchError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        let previous = required(&raw.snapshots.previous, "snapshots.previous", "--previous")?;
        let current = required(&raw.snapshots.current, "snapshots.current", "--current")?;
        let report_path = required(&raw.report.path, "report.path", "--report")?;
        let (lock_path, cooldown) = lock_settings(&raw)?;

        validate_snapshot_paths(&previous, &current)?;
        validate_outside_snapshots("report.path", &report_path, &previous, &current)?;
        validate_outside_snapshots("lock.path", &lock_path, &previous, &current)?;
        validate_report(&raw)?;
        validate_algorithms(&raw)?;

        let exclude = ExcludeFilter::new(&raw.snapshots.exclude)
            .map_err(|e| config_error(format!("[snapshots].exclude: {e:#}")))?;

        Ok(ConfigFile {
            previous,
            current,
            exclude,
            report_path,
            report_append: raw.report.append,
            render: RenderOptions {
                diff_excerpt_lines: raw.report.diff_excerpt_lines,
                list_limit: raw.report.list_limit,
            },
            lock_path,
            cooldown,
            algorithms: raw.hash.algorithms,
            notify_command: raw
                .notify
                .command
                .filter(|c| !c.trim().is_empty()),
        })
    }
}

/// Lock marker path and cooldown, the only settings `--status` needs.
pub fn lock_settings(raw: &RawConfigFile) -> Result<(PathBuf, Duration)> {
    let lock_path = required(&raw.lock.path, "lock.path", "--lock")?;
    let cooldown = parse_duration(&raw.lock.cooldown)
        .map_err(|e| config_error(format!("[lock].cooldown: {e}")))?;
    Ok((lock_path, cooldown))
}

fn config_error(msg: String) -> DistwatchError {
    DistwatchError::ConfigError(msg)
}

fn required(value: &Option<PathBuf>, key: &str, flag: &str) -> Result<PathBuf> {
    match value {
        Some(p) if !p.as_os_str().is_empty() => Ok(p.clone()),
        _ => Err(config_error(format!(
            "missing {key} (set it in the config file or pass {flag})"
        ))),
    }
}

fn validate_snapshot_paths(previous: &Path, current: &Path) -> Result<()> {
    let (prev_abs, cur_abs) = (normalized(previous)?, normalized(current)?);
    if prev_abs == cur_abs {
        return Err(config_error(format!(
            "previous and current snapshot must differ (both are {})",
            prev_abs.display()
        )));
    }
    if prev_abs.starts_with(&cur_abs) || cur_abs.starts_with(&prev_abs) {
        return Err(config_error(format!(
            "previous ({}) and current ({}) snapshots must not be nested",
            previous.display(),
            current.display()
        )));
    }
    Ok(())
}

fn validate_outside_snapshots(
    key: &str,
    path: &Path,
    previous: &Path,
    current: &Path,
) -> Result<()> {
    let path_abs = normalized(path)?;
    if path_abs.starts_with(normalized(previous)?) || path_abs.starts_with(normalized(current)?) {
        return Err(config_error(format!(
            "{key} ({}) must not live inside a snapshot directory",
            path.display()
        )));
    }
    Ok(())
}

/// Absolute form of `path` with `.` and `..` folded away lexically, so that
/// relative and absolute spellings of one location compare equal.
fn normalized(path: &Path) -> Result<PathBuf> {
    let absolute = std::path::absolute(path)
        .map_err(|e| config_error(format!("cannot resolve {}: {e}", path.display())))?;
    let mut out = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    Ok(out)
}

fn validate_report(raw: &RawConfigFile) -> Result<()> {
    if raw.report.diff_excerpt_lines == 0 {
        return Err(config_error(
            "[report].diff_excerpt_lines must be >= 1 (got 0)".to_string(),
        ));
    }
    if raw.report.list_limit == 0 {
        return Err(config_error(
            "[report].list_limit must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn validate_algorithms(raw: &RawConfigFile) -> Result<()> {
    if raw.hash.algorithms.is_empty() {
        return Err(config_error(
            "[hash].algorithms must list at least one algorithm".to_string(),
        ));
    }
    let mut seen = HashSet::new();
    for algorithm in &raw.hash.algorithms {
        if !seen.insert(*algorithm) {
            return Err(config_error(format!(
                "[hash].algorithms lists '{algorithm}' more than once"
            )));
        }
    }
    Ok(())
}

/// Parse a duration such as `"90s"`, `"30m"`, `"36h"` or `"15d"`.
pub fn parse_duration(s: &str) -> std::result::Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    // Find the boundary between digits and suffix.
    let idx = s
        .chars()
        .position(|c| !c.is_ascii_digit())
        .ok_or_else(|| "duration missing unit suffix".to_string())?;

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{}': {}", num_part, e))?;
    let unit = unit_part.trim().to_lowercase();

    let secs = match unit.as_str() {
        "s" => Some(value),
        "m" => value.checked_mul(60),
        "h" => value.checked_mul(60 * 60),
        "d" => value.checked_mul(24 * 60 * 60),
        _ => {
            return Err(format!(
                "unsupported duration unit '{}'; expected s, m, h, or d",
                unit
            ));
        }
    };
    secs.map(Duration::from_secs)
        .ok_or_else(|| format!("duration '{s}' is too large"))
}
