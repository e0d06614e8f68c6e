// src/gate/lock.rs

//! Persistence for the single cooldown lock.
//!
//! The lock timestamp is taken from storage metadata (the marker file's
//! modification time), never from its content. The content is advisory and
//! never parsed.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use anyhow::Result;
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::fs::FileSystem;

/// A persisted cooldown marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockRecord {
    /// `None` when the marker exists but its timestamp cannot be read.
    pub timestamp: Option<SystemTime>,
}

/// Abstract storage for the lock record.
pub trait LockStore: Send + Sync {
    fn read(&self) -> Result<Option<LockRecord>>;
    /// Create the lock; `note` is free-form advisory content.
    fn create(&mut self, now: SystemTime, note: &str) -> Result<()>;
    fn remove(&mut self) -> Result<()>;
}

/// Lock marker stored as a file; its mtime is the lock timestamp.
#[derive(Debug, Clone)]
pub struct FileLockStore {
    fs: Arc<dyn FileSystem>,
    path: PathBuf,
}

impl FileLockStore {
    pub fn new(fs: Arc<dyn FileSystem>, path: PathBuf) -> Self {
        Self { fs, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LockStore for FileLockStore {
    fn read(&self) -> Result<Option<LockRecord>> {
        if !self.fs.exists(&self.path) {
            return Ok(None);
        }
        let timestamp = match self.fs.modified(&self.path) {
            Ok(t) => Some(t),
            Err(err) => {
                warn!(
                    path = %self.path.display(),
                    error = %err,
                    "lock marker exists but its timestamp is unreadable"
                );
                None
            }
        };
        Ok(Some(LockRecord { timestamp }))
    }

    fn create(&mut self, now: SystemTime, note: &str) -> Result<()> {
        let stamp: DateTime<Utc> = now.into();
        let content = format!("armed_at: {}\n{}\n", stamp.to_rfc3339(), note);
        self.fs.write(&self.path, content.as_bytes())?;
        info!(path = %self.path.display(), "created notification lock (file)");
        Ok(())
    }

    fn remove(&mut self) -> Result<()> {
        if self.fs.exists(&self.path) {
            self.fs.remove_file(&self.path)?;
            info!(path = %self.path.display(), "removed notification lock (file)");
        }
        Ok(())
    }
}

/// Stores the lock in memory only.
#[derive(Debug, Clone, Default)]
pub struct MemoryLockStore {
    record: Option<LockRecord>,
}

impl MemoryLockStore {
    pub fn new() -> Self {
        Self { record: None }
    }

    /// Start with a lock created at `timestamp`.
    pub fn with_lock(timestamp: SystemTime) -> Self {
        Self {
            record: Some(LockRecord {
                timestamp: Some(timestamp),
            }),
        }
    }

    /// Start with a lock whose timestamp cannot be read.
    pub fn with_unreadable_lock() -> Self {
        Self {
            record: Some(LockRecord { timestamp: None }),
        }
    }

    pub fn record(&self) -> Option<LockRecord> {
        self.record
    }
}

impl LockStore for MemoryLockStore {
    fn read(&self) -> Result<Option<LockRecord>> {
        Ok(self.record)
    }

    fn create(&mut self, now: SystemTime, _note: &str) -> Result<()> {
        self.record = Some(LockRecord {
            timestamp: Some(now),
        });
        info!("created notification lock (memory)");
        Ok(())
    }

    fn remove(&mut self) -> Result<()> {
        if self.record.take().is_some() {
            info!("removed notification lock (memory)");
        }
        Ok(())
    }
}
