// src/detect/hash.rs

//! Content-hash indexing of a snapshot.
//!
//! The digest algorithm is picked from an ordered chain of
//! [`DigestProvider`]s: the first provider reporting itself available wins
//! and is used for every file of that index.
//!
//! Indexes built during a run never leave memory. [`HashIndex::to_listing`]
//! and [`HashIndex::parse_listing`] exist for diagnostics and tests: a
//! listing saved by an older run or another host can be parsed and fed to
//! [`compare_indexes`]. Within a run the algorithm-mismatch branch needs a
//! provider whose availability changed between the two indexes; built-in
//! providers are always available.

use std::collections::BTreeMap;
use std::fmt;
use std::io::Read;

use anyhow::{Context, Result};
use sha1::Sha1;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::errors::DistwatchError;
use crate::fs::FileSystem;
use crate::snapshot::Snapshot;
use crate::types::{HashAlgorithm, HashVerdict};

const CHUNK: usize = 8192;

/// One digest implementation in the fallback chain.
pub trait DigestProvider: Send + Sync {
    fn algorithm(&self) -> HashAlgorithm;

    /// Evaluated each time an index is built.
    fn is_available(&self) -> bool;

    /// Hex digest of everything readable from `reader`.
    fn digest(&self, reader: &mut dyn Read) -> Result<String>;
}

/// In-process provider backed by the `sha2`, `sha1` or `blake3` crates.
#[derive(Debug, Clone, Copy)]
pub struct BuiltinProvider {
    algorithm: HashAlgorithm,
}

impl BuiltinProvider {
    pub fn new(algorithm: HashAlgorithm) -> Self {
        Self { algorithm }
    }
}

impl DigestProvider for BuiltinProvider {
    fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    fn is_available(&self) -> bool {
        true
    }

    fn digest(&self, reader: &mut dyn Read) -> Result<String> {
        match self.algorithm {
            HashAlgorithm::Sha256 => digest_with::<Sha256>(reader),
            HashAlgorithm::Sha1 => digest_with::<Sha1>(reader),
            HashAlgorithm::Blake3 => {
                let mut hasher = blake3::Hasher::new();
                let mut buf = [0u8; CHUNK];
                loop {
                    let n = reader.read(&mut buf)?;
                    if n == 0 {
                        break;
                    }
                    hasher.update(&buf[..n]);
                }
                Ok(hasher.finalize().to_hex().to_string())
            }
        }
    }
}

fn digest_with<D: Digest>(reader: &mut dyn Read) -> Result<String> {
    let mut hasher = D::new();
    let mut buf = [0u8; CHUNK];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// One hashed file. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub path: String,
    pub algorithm: HashAlgorithm,
    pub digest: String,
    pub size: u64,
}

/// Path-sorted content-hash listing of one snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashIndex {
    algorithm: HashAlgorithm,
    entries: BTreeMap<String, FileEntry>,
}

impl HashIndex {
    pub fn new(algorithm: HashAlgorithm) -> Self {
        Self {
            algorithm,
            entries: BTreeMap::new(),
        }
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, path: &str) -> Option<&FileEntry> {
        self.entries.get(path)
    }

    pub fn entries(&self) -> impl Iterator<Item = &FileEntry> {
        self.entries.values()
    }

    pub fn insert(&mut self, entry: FileEntry) {
        self.entries.insert(entry.path.clone(), entry);
    }

    /// Render as `<digest>  <path>` lines, preceded by an algorithm header.
    pub fn to_listing(&self) -> String {
        let mut out = format!("# algorithm: {}\n", self.algorithm);
        for entry in self.entries.values() {
            out.push_str(&entry.digest);
            out.push_str("  ");
            out.push_str(&entry.path);
            out.push('\n');
        }
        out
    }

    /// Parse the format produced by [`HashIndex::to_listing`].
    ///
    /// Sizes are not part of the listing and read back as 0.
    pub fn parse_listing(text: &str) -> Result<Self> {
        let mut lines = text.lines();
        let header = lines.next().context("empty hash listing")?;
        let algorithm: HashAlgorithm = header
            .strip_prefix("# algorithm:")
            .context("hash listing is missing its algorithm header")?
            .parse()
            .map_err(anyhow::Error::msg)?;

        let mut index = HashIndex::new(algorithm);
        for (n, line) in lines.enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let (digest, path) = line
                .split_once("  ")
                .with_context(|| format!("malformed hash listing line {}: {line:?}", n + 2))?;
            index.insert(FileEntry {
                path: path.to_string(),
                algorithm,
                digest: digest.to_string(),
                size: 0,
            });
        }
        Ok(index)
    }
}

/// Builds [`HashIndex`]es using the first available provider in its chain.
pub struct HashIndexer {
    chain: Vec<Box<dyn DigestProvider>>,
}

impl fmt::Debug for HashIndexer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let algorithms: Vec<HashAlgorithm> = self.chain.iter().map(|p| p.algorithm()).collect();
        f.debug_struct("HashIndexer")
            .field("chain", &algorithms)
            .finish()
    }
}

impl HashIndexer {
    pub fn new(chain: Vec<Box<dyn DigestProvider>>) -> Self {
        Self { chain }
    }

    /// Chain of built-in providers in the given preference order.
    pub fn from_algorithms(algorithms: &[HashAlgorithm]) -> Self {
        let chain = algorithms
            .iter()
            .map(|&a| Box::new(BuiltinProvider::new(a)) as Box<dyn DigestProvider>)
            .collect();
        Self::new(chain)
    }

    /// First provider in the chain that reports itself available.
    pub fn select(&self) -> Result<&dyn DigestProvider, DistwatchError> {
        for provider in &self.chain {
            if provider.is_available() {
                return Ok(provider.as_ref());
            }
            debug!(algorithm = %provider.algorithm(), "digest provider unavailable; trying next");
        }
        let tried: Vec<&str> = self.chain.iter().map(|p| p.algorithm().as_str()).collect();
        Err(DistwatchError::HashUnavailable(format!(
            "tried [{}]",
            tried.join(", ")
        )))
    }

    /// Hash every file of `snapshot` with a single algorithm.
    pub fn index(
        &self,
        fs: &dyn FileSystem,
        snapshot: &Snapshot,
    ) -> Result<HashIndex, DistwatchError> {
        let provider = self.select()?;
        let algorithm = provider.algorithm();
        let mut index = HashIndex::new(algorithm);

        for (rel, file) in snapshot.files() {
            let mut reader = fs.open_read(&file.path)?;
            let digest = provider
                .digest(&mut reader)
                .with_context(|| format!("hashing {:?}", file.path))?;
            index.insert(FileEntry {
                path: rel.clone(),
                algorithm,
                digest,
                size: file.size,
            });
        }

        info!(
            root = %snapshot.root().display(),
            %algorithm,
            files = index.len(),
            "built hash index"
        );
        Ok(index)
    }
}

/// Verdict of comparing two hash indexes, with the details the report needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashComparison {
    pub verdict: HashVerdict,
    /// `(previous, current)` algorithms when they differ.
    pub algorithm_mismatch: Option<(HashAlgorithm, HashAlgorithm)>,
    /// Paths present in both indexes with different digests.
    pub modified: Vec<String>,
    /// Why no verdict could be reached.
    pub unavailable_reason: Option<String>,
}

impl HashComparison {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            verdict: HashVerdict::Unavailable,
            algorithm_mismatch: None,
            modified: Vec::new(),
            unavailable_reason: Some(reason.into()),
        }
    }
}

/// `Identical` iff both indexes are equal as ordered `(path, digest)`
/// sequences; `Different` otherwise.
pub fn compare_indexes(previous: &HashIndex, current: &HashIndex) -> HashComparison {
    let algorithm_mismatch = if previous.algorithm() != current.algorithm() {
        warn!(
            previous = %previous.algorithm(),
            current = %current.algorithm(),
            "hash indexes were built with different algorithms"
        );
        Some((previous.algorithm(), current.algorithm()))
    } else {
        None
    };

    let modified: Vec<String> = if algorithm_mismatch.is_some() {
        Vec::new()
    } else {
        previous
            .entries()
            .filter_map(|p| match current.get(&p.path) {
                Some(c) if c.digest != p.digest => Some(p.path.clone()),
                _ => None,
            })
            .collect()
    };

    let same = algorithm_mismatch.is_none()
        && previous
            .entries()
            .map(|e| (&e.path, &e.digest))
            .eq(current.entries().map(|e| (&e.path, &e.digest)));

    HashComparison {
        verdict: if same {
            HashVerdict::Identical
        } else {
            HashVerdict::Different
        },
        algorithm_mismatch,
        modified,
        unavailable_reason: None,
    }
}
