// src/fs/mock.rs

use super::FileSystem;
use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::SystemTime;

#[derive(Debug, Clone)]
pub enum MockEntry {
    File {
        content: Vec<u8>,
        /// `None` models a file whose timestamp cannot be read.
        modified: Option<SystemTime>,
    },
    Dir(Vec<String>), // List of child names
}

#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    files: Arc<Mutex<HashMap<PathBuf, MockEntry>>>,
}

fn parent_key(path: &Path) -> Option<&Path> {
    path.parent().map(|parent| {
        if parent.as_os_str().is_empty() {
            Path::new(".")
        } else {
            parent
        }
    })
}

impl MockFileSystem {
    pub fn new() -> Self {
        let mut files = HashMap::new();
        // Ensure root exists
        files.insert(PathBuf::from("."), MockEntry::Dir(Vec::new()));

        Self {
            files: Arc::new(Mutex::new(files)),
        }
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<PathBuf, MockEntry>> {
        self.files.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Add a file without a modification time.
    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        self.insert_file(path.as_ref(), content.into(), None);
    }

    /// Add a file stamped with the given modification time.
    pub fn add_file_with_mtime(
        &self,
        path: impl AsRef<Path>,
        content: impl Into<Vec<u8>>,
        modified: SystemTime,
    ) {
        self.insert_file(path.as_ref(), content.into(), Some(modified));
    }

    /// Add an (empty) directory and any missing parents.
    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let mut files = self.entries();
        Self::ensure_dir_entry(&mut files, path.as_ref());
    }

    /// Overwrite (or clear) the modification time of an existing file.
    pub fn set_modified(&self, path: impl AsRef<Path>, modified: Option<SystemTime>) {
        let mut files = self.entries();
        if let Some(MockEntry::File { modified: m, .. }) = files.get_mut(path.as_ref()) {
            *m = modified;
        }
    }

    fn insert_file(&self, path: &Path, content: Vec<u8>, modified: Option<SystemTime>) {
        let mut files = self.entries();
        files.insert(path.to_path_buf(), MockEntry::File { content, modified });

        // Ensure parent directories exist implicitly for simplicity in this mock
        if let Some(parent) = parent_key(path) {
            Self::ensure_dir_entry(&mut files, parent);
            Self::link_child(&mut files, parent, path);
        }
    }

    fn link_child(files: &mut HashMap<PathBuf, MockEntry>, parent: &Path, path: &Path) {
        if let Some(MockEntry::Dir(children)) = files.get_mut(parent) {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if !children.iter().any(|c| c == name) {
                    children.push(name.to_string());
                }
            }
        }
    }

    fn ensure_dir_entry(files: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
        if files.contains_key(path) {
            return;
        }
        files.insert(path.to_path_buf(), MockEntry::Dir(Vec::new()));
        if let Some(parent) = parent_key(path) {
            if parent != path {
                // Avoid infinite loop at root
                Self::ensure_dir_entry(files, parent);
                Self::link_child(files, parent, path);
            }
        }
    }

    fn unlink(files: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
        if let Some(parent) = parent_key(path) {
            if let (Some(MockEntry::Dir(children)), Some(name)) = (
                files.get_mut(parent),
                path.file_name().and_then(|n| n.to_str()),
            ) {
                children.retain(|c| c != name);
            }
        }
    }
}

impl FileSystem for MockFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        let files = self.entries();
        match files.get(path) {
            Some(MockEntry::File { content, .. }) => String::from_utf8(content.clone())
                .map_err(|e| anyhow!("Invalid UTF-8: {}", e)),
            Some(MockEntry::Dir(_)) => Err(anyhow!("Is a directory: {:?}", path)),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    fn open_read(&self, path: &Path) -> Result<Box<dyn Read + Send>> {
        let files = self.entries();
        match files.get(path) {
            Some(MockEntry::File { content, .. }) => Ok(Box::new(Cursor::new(content.clone()))),
            Some(MockEntry::Dir(_)) => Err(anyhow!("Is a directory: {:?}", path)),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        self.insert_file(path, contents.to_vec(), Some(SystemTime::now()));
        Ok(())
    }

    fn append(&self, path: &Path, contents: &[u8]) -> Result<()> {
        let existing = {
            let files = self.entries();
            match files.get(path) {
                Some(MockEntry::File { content, .. }) => content.clone(),
                Some(MockEntry::Dir(_)) => return Err(anyhow!("Is a directory: {:?}", path)),
                None => Vec::new(),
            }
        };
        let mut combined = existing;
        combined.extend_from_slice(contents);
        self.insert_file(path, combined, Some(SystemTime::now()));
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.entries().contains_key(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        matches!(self.entries().get(path), Some(MockEntry::File { .. }))
    }

    fn is_dir(&self, path: &Path) -> bool {
        matches!(self.entries().get(path), Some(MockEntry::Dir(_)))
    }

    fn resolves_to_dir(&self, path: &Path) -> bool {
        self.is_dir(path)
    }

    fn file_len(&self, path: &Path) -> Result<u64> {
        match self.entries().get(path) {
            Some(MockEntry::File { content, .. }) => Ok(content.len() as u64),
            Some(MockEntry::Dir(_)) => Ok(0),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    fn modified(&self, path: &Path) -> Result<SystemTime> {
        match self.entries().get(path) {
            Some(MockEntry::File {
                modified: Some(t), ..
            }) => Ok(*t),
            Some(_) => Err(anyhow!("No modification time recorded for {:?}", path)),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        self.add_dir(path);
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        let mut files = self.entries();
        match files.get(path) {
            Some(MockEntry::File { .. }) => {
                files.remove(path);
                Self::unlink(&mut files, path);
                Ok(())
            }
            Some(MockEntry::Dir(_)) => Err(anyhow!("Is a directory: {:?}", path)),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    fn remove_dir_all(&self, path: &Path) -> Result<()> {
        let mut files = self.entries();
        if !matches!(files.get(path), Some(MockEntry::Dir(_))) {
            return Err(anyhow!("Not a directory or not found: {:?}", path));
        }
        files.retain(|p, _| !p.starts_with(path));
        Self::unlink(&mut files, path);
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        let mut files = self.entries();
        if !files.contains_key(from) {
            return Err(anyhow!("File not found: {:?}", from));
        }
        if files.contains_key(to) {
            return Err(anyhow!("Destination exists: {:?}", to));
        }

        let moved: Vec<PathBuf> = files
            .keys()
            .filter(|p| p.starts_with(from))
            .cloned()
            .collect();
        for old in moved {
            let Some(entry) = files.remove(&old) else {
                continue;
            };
            let new = match old.strip_prefix(from) {
                Ok(rel) if !rel.as_os_str().is_empty() => to.join(rel),
                _ => to.to_path_buf(),
            };
            files.insert(new, entry);
        }

        Self::unlink(&mut files, from);
        if let Some(parent) = parent_key(to) {
            Self::ensure_dir_entry(&mut files, parent);
            Self::link_child(&mut files, parent, to);
        }
        Ok(())
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let files = self.entries();
        match files.get(path) {
            Some(MockEntry::Dir(children)) => {
                Ok(children.iter().map(|name| path.join(name)).collect())
            }
            _ => Err(anyhow!("Not a directory or not found: {:?}", path)),
        }
    }
}
