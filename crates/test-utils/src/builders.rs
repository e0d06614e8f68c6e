#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use distwatch::config::{ConfigFile, RawConfigFile};
use distwatch::types::HashAlgorithm;

/// Writes a snapshot tree to disk.
pub struct SnapshotBuilder {
    root: PathBuf,
}

impl SnapshotBuilder {
    /// Start a tree at `root`; the directory is created immediately.
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).expect("create snapshot root");
        Self { root }
    }

    pub fn file(self, rel: &str, content: impl AsRef<[u8]>) -> Self {
        let path = self.root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dir");
        }
        fs::write(&path, content).expect("write snapshot file");
        self
    }

    pub fn dir(self, rel: &str) -> Self {
        fs::create_dir_all(self.root.join(rel)).expect("create snapshot dir");
        self
    }

    pub fn build(self) -> PathBuf {
        self.root
    }
}

/// Temporary directory laid out like a real deployment:
///
/// ```text
/// <tmp>/previous/   baseline snapshot
/// <tmp>/current/    freshly fetched snapshot
/// <tmp>/state/report.txt
/// <tmp>/state/notify.lock
/// ```
pub struct TestWorkspace {
    _tmp: TempDir,
    pub previous: PathBuf,
    pub current: PathBuf,
    pub report: PathBuf,
    pub lock: PathBuf,
}

impl TestWorkspace {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let base = tmp.path().to_path_buf();
        fs::create_dir_all(base.join("state")).expect("create state dir");
        Self {
            previous: base.join("previous"),
            current: base.join("current"),
            report: base.join("state").join("report.txt"),
            lock: base.join("state").join("notify.lock"),
            _tmp: tmp,
        }
    }

    pub fn previous_tree(&self) -> SnapshotBuilder {
        SnapshotBuilder::new(&self.previous)
    }

    pub fn current_tree(&self) -> SnapshotBuilder {
        SnapshotBuilder::new(&self.current)
    }

    /// Config pointing at this workspace's paths.
    pub fn config(&self) -> ConfigFileBuilder {
        ConfigFileBuilder::new()
            .previous(&self.previous)
            .current(&self.current)
            .report(&self.report)
            .lock(&self.lock)
    }

    pub fn report_text(&self) -> String {
        fs::read_to_string(&self.report).unwrap_or_default()
    }
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn previous(mut self, path: impl AsRef<Path>) -> Self {
        self.config.snapshots.previous = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn current(mut self, path: impl AsRef<Path>) -> Self {
        self.config.snapshots.current = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn report(mut self, path: impl AsRef<Path>) -> Self {
        self.config.report.path = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn lock(mut self, path: impl AsRef<Path>) -> Self {
        self.config.lock.path = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn cooldown(mut self, cooldown: &str) -> Self {
        self.config.lock.cooldown = cooldown.to_string();
        self
    }

    pub fn exclude(mut self, pattern: &str) -> Self {
        self.config.snapshots.exclude.push(pattern.to_string());
        self
    }

    pub fn algorithms(mut self, algorithms: &[HashAlgorithm]) -> Self {
        self.config.hash.algorithms = algorithms.to_vec();
        self
    }

    pub fn append_report(mut self, append: bool) -> Self {
        self.config.report.append = append;
        self
    }

    pub fn notify_command(mut self, command: &str) -> Self {
        self.config.notify.command = Some(command.to_string());
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}
