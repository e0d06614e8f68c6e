// src/config/model.rs

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::report::RenderOptions;
use crate::snapshot::ExcludeFilter;
use crate::types::{default_algorithms, HashAlgorithm};

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// [snapshots]
/// previous = "state/previous"
/// current = "work/current"
/// exclude = ["**/.DS_Store"]
///
/// [report]
/// path = "state/report.txt"
///
/// [lock]
/// path = "state/notify.lock"
/// cooldown = "15d"
///
/// [hash]
/// algorithms = ["sha256", "sha1"]
///
/// [notify]
/// command = "mail -s 'distribution changed' ops@example.com"
/// ```
///
/// All sections are optional; CLI flags can fill in or override the paths.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub snapshots: SnapshotsSection,

    #[serde(default)]
    pub report: ReportSection,

    #[serde(default)]
    pub lock: LockSection,

    #[serde(default)]
    pub hash: HashSection,

    #[serde(default)]
    pub notify: NotifySection,
}

/// `[snapshots]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SnapshotsSection {
    /// Baseline directory; advanced to `current` after a detected change.
    #[serde(default)]
    pub previous: Option<PathBuf>,

    /// Freshly populated directory to compare against the baseline.
    #[serde(default)]
    pub current: Option<PathBuf>,

    /// Glob patterns of relative paths left out of every comparison.
    #[serde(default)]
    pub exclude: Vec<String>,
}

/// `[report]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReportSection {
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Append to an existing report file instead of truncating it.
    #[serde(default = "default_true")]
    pub append: bool,

    #[serde(default = "default_diff_excerpt_lines")]
    pub diff_excerpt_lines: usize,

    #[serde(default = "default_list_limit")]
    pub list_limit: usize,
}

fn default_true() -> bool {
    true
}

fn default_diff_excerpt_lines() -> usize {
    50
}

fn default_list_limit() -> usize {
    200
}

impl Default for ReportSection {
    fn default() -> Self {
        Self {
            path: None,
            append: default_true(),
            diff_excerpt_lines: default_diff_excerpt_lines(),
            list_limit: default_list_limit(),
        }
    }
}

/// `[lock]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LockSection {
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Duration string such as `"15d"` or `"36h"`.
    #[serde(default = "default_cooldown")]
    pub cooldown: String,
}

fn default_cooldown() -> String {
    "15d".to_string()
}

impl Default for LockSection {
    fn default() -> Self {
        Self {
            path: None,
            cooldown: default_cooldown(),
        }
    }
}

/// `[hash]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HashSection {
    /// Digest preference order, strongest first.
    #[serde(default = "default_algorithms")]
    pub algorithms: Vec<HashAlgorithm>,
}

impl Default for HashSection {
    fn default() -> Self {
        Self {
            algorithms: default_algorithms(),
        }
    }
}

/// `[notify]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NotifySection {
    /// Shell command receiving the report on stdin when a notification is due.
    #[serde(default)]
    pub command: Option<String>,
}

/// Validated configuration. Build it with `ConfigFile::try_from(raw)`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub previous: PathBuf,
    pub current: PathBuf,
    pub exclude: ExcludeFilter,
    pub report_path: PathBuf,
    pub report_append: bool,
    pub render: RenderOptions,
    pub lock_path: PathBuf,
    pub cooldown: Duration,
    pub algorithms: Vec<HashAlgorithm>,
    pub notify_command: Option<String>,
}
