// src/report/render.rs

use std::collections::BTreeSet;
use std::fmt::Write as _;

use chrono::{DateTime, Utc};

use crate::report::ComparisonReport;
use crate::types::{Classification, HashVerdict, NotificationDecision};

const RULE: &str = "================================================================";

/// Knobs for the textual report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Maximum structural diff lines shown.
    pub diff_excerpt_lines: usize,
    /// Maximum paths shown per added / removed / modified list.
    pub list_limit: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            diff_excerpt_lines: 50,
            list_limit: 200,
        }
    }
}

impl ComparisonReport {
    /// Render the report in its fixed section order.
    pub fn render(&self, generated_at: DateTime<Utc>, options: &RenderOptions) -> String {
        let mut out = String::new();
        let r = &self.result;

        let _ = writeln!(out, "{RULE}");
        let _ = writeln!(out, "Distribution comparison report");
        let _ = writeln!(out, "Generated: {}", generated_at.format("%Y-%m-%d %H:%M:%S UTC"));
        let _ = writeln!(out, "Previous snapshot: {}", self.previous_root.display());
        let _ = writeln!(out, "Current snapshot:  {}", self.current_root.display());
        let _ = writeln!(out, "{RULE}");
        let _ = writeln!(out);
        let _ = writeln!(out, "Classification: {}", r.classification);

        if let Some(err) = &r.error {
            let _ = writeln!(out, "Error: {err}");
        }
        if r.classification == Classification::ComparisonError {
            let _ = writeln!(out);
            return out;
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "File count analysis");
        let _ = writeln!(out, "  previous: {} files", r.previous.file_count);
        let _ = writeln!(out, "  current:  {} files", r.current.file_count);
        let _ = writeln!(
            out,
            "  delta:    {:+}",
            r.current.file_count as i64 - r.previous.file_count as i64
        );

        let _ = writeln!(out);
        let _ = writeln!(out, "Size analysis");
        let _ = writeln!(
            out,
            "  previous: {} ({} bytes)",
            format_size(r.previous.total_bytes),
            r.previous.total_bytes
        );
        let _ = writeln!(
            out,
            "  current:  {} ({} bytes)",
            format_size(r.current.total_bytes),
            r.current.total_bytes
        );
        let _ = writeln!(
            out,
            "  delta:    {:+} bytes",
            r.current.total_bytes as i128 - r.previous.total_bytes as i128
        );

        let _ = writeln!(out);
        self.render_diff(&mut out, options);

        let _ = writeln!(out);
        self.render_hash(&mut out);

        if let Some(set) = &self.change_set {
            let _ = writeln!(out);
            render_list(&mut out, "Added files", "+", &set.added, options.list_limit);
            let _ = writeln!(out);
            render_list(&mut out, "Removed files", "-", &set.removed, options.list_limit);
        }
        if !self.hash.modified.is_empty() {
            let modified: BTreeSet<String> = self.hash.modified.iter().cloned().collect();
            let _ = writeln!(out);
            render_list(&mut out, "Modified files", "~", &modified, options.list_limit);
        }

        let _ = writeln!(out);
        out
    }

    fn render_diff(&self, out: &mut String, options: &RenderOptions) {
        let r = &self.result;
        let title = if r.structural == Classification::FirstRun {
            "Current snapshot listing"
        } else {
            "Structural diff"
        };
        let lines: Vec<&str> = r.diff.lines().collect();
        if lines.is_empty() {
            let _ = writeln!(out, "{title}: no differences");
            return;
        }
        let shown = lines.len().min(options.diff_excerpt_lines);
        if shown < lines.len() {
            let _ = writeln!(out, "{title} (first {shown} of {} lines)", lines.len());
        } else {
            let _ = writeln!(out, "{title} ({} lines)", lines.len());
        }
        for line in &lines[..shown] {
            let _ = writeln!(out, "  {line}");
        }
    }

    fn render_hash(&self, out: &mut String) {
        let h = &self.hash;
        match (h.verdict, h.algorithm_mismatch) {
            (HashVerdict::Different, Some((prev, cur))) => {
                let _ = writeln!(
                    out,
                    "Hash comparison: DIFFERENT (algorithm mismatch: {prev} vs {cur})"
                );
            }
            (HashVerdict::Unavailable, _) => {
                let reason = h.unavailable_reason.as_deref().unwrap_or("unknown reason");
                let _ = writeln!(out, "Hash comparison: {} ({reason})", h.verdict);
            }
            (verdict, _) => {
                let _ = writeln!(out, "Hash comparison: {verdict}");
            }
        }
        if self.verdicts_disagree() {
            let _ = writeln!(
                out,
                "VERDICT DISAGREEMENT: structural={} hash={}",
                self.result.structural, h.verdict
            );
        }
    }
}

/// Trailing report line recording the gate decision.
pub fn render_decision(decision: Option<&NotificationDecision>, dry_run: bool) -> String {
    let suffix = if dry_run { " (dry run, lock untouched)" } else { "" };
    match decision {
        Some(d) => format!("Notification decision: {d}{suffix}\n\n"),
        None => format!("Notification decision: none (gate not consulted){suffix}\n\n"),
    }
}

fn render_list(
    out: &mut String,
    title: &str,
    marker: &str,
    paths: &BTreeSet<String>,
    limit: usize,
) {
    let _ = writeln!(out, "{title} ({})", paths.len());
    if paths.is_empty() {
        let _ = writeln!(out, "  (none)");
        return;
    }
    for path in paths.iter().take(limit) {
        let _ = writeln!(out, "  {marker} {path}");
    }
    if paths.len() > limit {
        let _ = writeln!(out, "  ... and {} more", paths.len() - limit);
    }
}

/// Human-readable binary size, e.g. `1.5 KiB`.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}
