#![allow(dead_code)]

use std::future::Future;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

use anyhow::anyhow;

use distwatch::config::ConfigFile;
use distwatch::engine::{RunOptions, Runtime};
use distwatch::errors::{DistwatchError, Result};
use distwatch::fs::{FileSystem, RealFileSystem};
use distwatch::gate::{FixedClock, MemoryLockStore, NotificationGate};
use distwatch::notify::Notifier;
use distwatch::types::NotificationDecision;

pub use distwatch_test_utils::{init_tracing, reference_time};

pub type TestResult = std::result::Result<(), Box<dyn std::error::Error>>;

pub const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Records every delivery it is asked to make.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    pub delivered: Arc<Mutex<Vec<(NotificationDecision, String)>>>,
}

impl RecordingNotifier {
    pub fn decisions(&self) -> Vec<NotificationDecision> {
        self.delivered
            .lock()
            .unwrap()
            .iter()
            .map(|(d, _)| *d)
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn deliver(
        &self,
        report: String,
        decision: NotificationDecision,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let delivered = Arc::clone(&self.delivered);
        Box::pin(async move {
            delivered.lock().unwrap().push((decision, report));
            Ok(())
        })
    }
}

/// Always fails, like an unreachable mail relay.
pub struct FailingNotifier;

impl Notifier for FailingNotifier {
    fn deliver(
        &self,
        _report: String,
        _decision: NotificationDecision,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async { Err(DistwatchError::Other(anyhow!("mail relay unreachable"))) })
    }
}

/// Runtime over the real filesystem with an in-memory lock and a fixed clock.
pub fn memory_runtime(
    config: ConfigFile,
    store: MemoryLockStore,
    clock: FixedClock,
    notifier: Box<dyn Notifier>,
    options: RunOptions,
) -> Runtime<MemoryLockStore, FixedClock> {
    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let gate = NotificationGate::new(store, clock, config.cooldown);
    Runtime::new(fs, config, gate, notifier, options)
}

/// Delegates to `inner` but fails every `write` to a path ending in `needle`,
/// like a disk filling up partway through a copy.
#[derive(Debug)]
pub struct FailingWriteFs {
    pub inner: Arc<dyn FileSystem>,
    pub needle: String,
}

impl FailingWriteFs {
    pub fn new(inner: Arc<dyn FileSystem>, needle: &str) -> Self {
        Self {
            inner,
            needle: needle.to_string(),
        }
    }
}

impl FileSystem for FailingWriteFs {
    fn read_to_string(&self, path: &Path) -> anyhow::Result<String> {
        self.inner.read_to_string(path)
    }

    fn open_read(&self, path: &Path) -> anyhow::Result<Box<dyn Read + Send>> {
        self.inner.open_read(path)
    }

    fn write(&self, path: &Path, contents: &[u8]) -> anyhow::Result<()> {
        if path.to_string_lossy().ends_with(&self.needle) {
            anyhow::bail!("no space left on device writing {:?}", path);
        }
        self.inner.write(path, contents)
    }

    fn append(&self, path: &Path, contents: &[u8]) -> anyhow::Result<()> {
        self.inner.append(path, contents)
    }

    fn exists(&self, path: &Path) -> bool {
        self.inner.exists(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        self.inner.is_file(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.inner.is_dir(path)
    }

    fn resolves_to_dir(&self, path: &Path) -> bool {
        self.inner.resolves_to_dir(path)
    }

    fn file_len(&self, path: &Path) -> anyhow::Result<u64> {
        self.inner.file_len(path)
    }

    fn modified(&self, path: &Path) -> anyhow::Result<SystemTime> {
        self.inner.modified(path)
    }

    fn create_dir_all(&self, path: &Path) -> anyhow::Result<()> {
        self.inner.create_dir_all(path)
    }

    fn remove_file(&self, path: &Path) -> anyhow::Result<()> {
        self.inner.remove_file(path)
    }

    fn remove_dir_all(&self, path: &Path) -> anyhow::Result<()> {
        self.inner.remove_dir_all(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> anyhow::Result<()> {
        self.inner.rename(from, to)
    }

    fn read_dir(&self, path: &Path) -> anyhow::Result<Vec<PathBuf>> {
        self.inner.read_dir(path)
    }
}
