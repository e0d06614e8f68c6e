// tests/hash_index.rs

mod common;
use crate::common::{init_tracing, TestResult};

use std::io::Read;
use std::path::Path;

use distwatch::detect::{
    compare_indexes, BuiltinProvider, DigestProvider, FileEntry, HashIndex, HashIndexer,
};
use distwatch::errors::DistwatchError;
use distwatch::fs::mock::MockFileSystem;
use distwatch::snapshot::{ExcludeFilter, Snapshot};
use distwatch::types::{HashAlgorithm, HashVerdict};

fn single_file_snapshot(fs: &MockFileSystem, content: &[u8]) -> Snapshot {
    fs.add_file("/snap/hello.txt", content);
    Snapshot::open(fs, Path::new("/snap"), &ExcludeFilter::none()).unwrap()
}

#[test]
fn builtin_digests_match_known_vectors() {
    init_tracing();
    let fs = MockFileSystem::new();
    let snap = single_file_snapshot(&fs, b"hello world");

    let cases = [
        (
            HashAlgorithm::Sha256,
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9",
        ),
        (HashAlgorithm::Sha1, "2aae6c35c94fcfb415dbe95f408b9ce91ee846ed"),
        (
            HashAlgorithm::Blake3,
            "d74981efa70a0c880b8d8c1985d075dbcbf679b99a5f9914e5aaf96b831a9e24",
        ),
    ];

    for (algorithm, expected) in cases {
        let index = HashIndexer::from_algorithms(&[algorithm])
            .index(&fs, &snap)
            .unwrap();
        let entry = index.get("hello.txt").unwrap();
        assert_eq!(index.algorithm(), algorithm);
        assert_eq!(entry.algorithm, algorithm);
        assert_eq!(entry.digest, expected, "{algorithm} digest");
        assert_eq!(entry.size, 11);
    }
}

struct Unavailable(HashAlgorithm);

impl DigestProvider for Unavailable {
    fn algorithm(&self) -> HashAlgorithm {
        self.0
    }

    fn is_available(&self) -> bool {
        false
    }

    fn digest(&self, _reader: &mut dyn Read) -> anyhow::Result<String> {
        anyhow::bail!("{} is not available", self.0)
    }
}

#[test]
fn indexer_falls_back_to_next_available_provider() {
    init_tracing();
    let fs = MockFileSystem::new();
    let snap = single_file_snapshot(&fs, b"hello world");

    let chain: Vec<Box<dyn DigestProvider>> = vec![
        Box::new(Unavailable(HashAlgorithm::Sha256)),
        Box::new(BuiltinProvider::new(HashAlgorithm::Sha1)),
    ];
    let indexer = HashIndexer::new(chain);

    let index = indexer.index(&fs, &snap).unwrap();
    assert_eq!(index.algorithm(), HashAlgorithm::Sha1);
    assert!(index.entries().all(|e| e.algorithm == HashAlgorithm::Sha1));
}

#[test]
fn exhausted_chain_reports_hash_unavailable() {
    init_tracing();
    let fs = MockFileSystem::new();
    let snap = single_file_snapshot(&fs, b"data");

    let chain: Vec<Box<dyn DigestProvider>> = vec![
        Box::new(Unavailable(HashAlgorithm::Sha256)),
        Box::new(Unavailable(HashAlgorithm::Sha1)),
    ];
    let indexer = HashIndexer::new(chain);

    match indexer.index(&fs, &snap) {
        Err(DistwatchError::HashUnavailable(msg)) => {
            assert!(msg.contains("sha256"));
            assert!(msg.contains("sha1"));
        }
        other => panic!("expected HashUnavailable, got {other:?}"),
    }
}

#[test]
fn indexes_from_different_roots_compare_by_content() {
    init_tracing();
    let fs = MockFileSystem::new();
    fs.add_file("/a/root/x/1.bin", b"one".to_vec());
    fs.add_file("/a/root/2.bin", b"two".to_vec());
    fs.add_file("/elsewhere/x/1.bin", b"one".to_vec());
    fs.add_file("/elsewhere/2.bin", b"two".to_vec());

    let indexer = HashIndexer::from_algorithms(&[HashAlgorithm::Sha256]);
    let left = Snapshot::open(&fs, Path::new("/a/root"), &ExcludeFilter::none()).unwrap();
    let right = Snapshot::open(&fs, Path::new("/elsewhere"), &ExcludeFilter::none()).unwrap();

    let cmp = compare_indexes(
        &indexer.index(&fs, &left).unwrap(),
        &indexer.index(&fs, &right).unwrap(),
    );

    assert_eq!(cmp.verdict, HashVerdict::Identical);
    assert!(cmp.modified.is_empty());
}

fn entry(path: &str, algorithm: HashAlgorithm, digest: &str) -> FileEntry {
    FileEntry {
        path: path.to_string(),
        algorithm,
        digest: digest.to_string(),
        size: 1,
    }
}

#[test]
fn modified_paths_come_from_digest_mismatch() {
    let mut prev = HashIndex::new(HashAlgorithm::Sha256);
    prev.insert(entry("a", HashAlgorithm::Sha256, "aa"));
    prev.insert(entry("b", HashAlgorithm::Sha256, "bb"));
    prev.insert(entry("gone", HashAlgorithm::Sha256, "cc"));

    let mut cur = HashIndex::new(HashAlgorithm::Sha256);
    cur.insert(entry("a", HashAlgorithm::Sha256, "aa"));
    cur.insert(entry("b", HashAlgorithm::Sha256, "b2"));
    cur.insert(entry("new", HashAlgorithm::Sha256, "dd"));

    let cmp = compare_indexes(&prev, &cur);

    assert_eq!(cmp.verdict, HashVerdict::Different);
    assert_eq!(cmp.modified, vec!["b".to_string()]);
    assert!(cmp.algorithm_mismatch.is_none());
}

#[test]
fn algorithm_mismatch_is_flagged_separately() {
    let mut prev = HashIndex::new(HashAlgorithm::Sha256);
    prev.insert(entry("a", HashAlgorithm::Sha256, "aa"));
    let mut cur = HashIndex::new(HashAlgorithm::Sha1);
    cur.insert(entry("a", HashAlgorithm::Sha1, "aa"));

    let cmp = compare_indexes(&prev, &cur);

    assert_eq!(cmp.verdict, HashVerdict::Different);
    assert_eq!(
        cmp.algorithm_mismatch,
        Some((HashAlgorithm::Sha256, HashAlgorithm::Sha1))
    );
    assert!(cmp.modified.is_empty());
}

#[test]
fn listing_uses_sum_format_and_reads_back() -> TestResult {
    let fs = MockFileSystem::new();
    fs.add_file("/snap/b.txt", b"bee".to_vec());
    fs.add_file("/snap/dir/a.txt", b"ay".to_vec());
    let snap = Snapshot::open(&fs, Path::new("/snap"), &ExcludeFilter::none())?;
    let index = HashIndexer::from_algorithms(&[HashAlgorithm::Blake3]).index(&fs, &snap)?;

    let listing = index.to_listing();
    let lines: Vec<&str> = listing.lines().collect();
    assert_eq!(lines[0], "# algorithm: blake3");
    assert!(lines[1].ends_with("  b.txt"));
    assert!(lines[2].ends_with("  dir/a.txt"));

    let parsed = HashIndex::parse_listing(&listing)?;
    assert_eq!(parsed.algorithm(), HashAlgorithm::Blake3);
    assert_eq!(compare_indexes(&index, &parsed).verdict, HashVerdict::Identical);
    Ok(())
}

#[test]
fn saved_listing_from_other_algorithm_is_a_mismatch() -> TestResult {
    init_tracing();
    let fs = MockFileSystem::new();
    let snap = single_file_snapshot(&fs, b"hello world");
    let saved = HashIndexer::from_algorithms(&[HashAlgorithm::Sha1])
        .index(&fs, &snap)?
        .to_listing();
    let fresh = HashIndexer::from_algorithms(&[HashAlgorithm::Blake3]).index(&fs, &snap)?;

    let cmp = compare_indexes(&HashIndex::parse_listing(&saved)?, &fresh);

    assert_eq!(cmp.verdict, HashVerdict::Different);
    assert_eq!(
        cmp.algorithm_mismatch,
        Some((HashAlgorithm::Sha1, HashAlgorithm::Blake3))
    );
    assert!(cmp.modified.is_empty());
    Ok(())
}

#[test]
fn malformed_listing_is_rejected() {
    assert!(HashIndex::parse_listing("").is_err());
    assert!(HashIndex::parse_listing("no header\n").is_err());
    assert!(HashIndex::parse_listing("# algorithm: md4\n").is_err());
    assert!(HashIndex::parse_listing("# algorithm: sha1\nabc-without-separator\n").is_err());
}
