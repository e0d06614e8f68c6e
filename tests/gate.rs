// tests/gate.rs

mod common;
use crate::common::{init_tracing, reference_time, DAY};

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use distwatch::errors::DistwatchError;
use distwatch::fs::mock::MockFileSystem;
use distwatch::fs::FileSystem;
use distwatch::gate::{
    classify_lock, transition, FileLockStore, FixedClock, GateState, LockAction, LockRecord,
    LockStore, MemoryLockStore, NotificationGate, DEFAULT_COOLDOWN,
};
use distwatch::types::{Classification, Decision};

const COOLDOWN: Duration = Duration::from_secs(15 * 24 * 60 * 60);

fn locked_at(ago: Duration) -> NotificationGate<MemoryLockStore, FixedClock> {
    let now = reference_time();
    NotificationGate::new(
        MemoryLockStore::with_lock(now - ago),
        FixedClock::new(now),
        COOLDOWN,
    )
}

#[test]
fn default_cooldown_is_fifteen_days() {
    assert_eq!(DEFAULT_COOLDOWN, 15 * DAY);
}

#[test]
fn transition_table_matches_every_state() {
    let active = GateState::LockActive { age: DAY };
    let expired = GateState::LockExpired { age: Some(20 * DAY) };
    let unknown = GateState::LockExpired { age: None };

    let cases = [
        (GateState::NoLock, Classification::NoChanges, LockAction::Keep, Decision::Suppressed),
        (GateState::NoLock, Classification::ChangesDetected, LockAction::Create, Decision::Armed),
        (GateState::NoLock, Classification::FirstRun, LockAction::Create, Decision::Armed),
        (active, Classification::NoChanges, LockAction::Keep, Decision::Suppressed),
        (active, Classification::ChangesDetected, LockAction::Keep, Decision::Suppressed),
        (active, Classification::FirstRun, LockAction::Keep, Decision::Suppressed),
        (expired, Classification::NoChanges, LockAction::Delete, Decision::Suppressed),
        (expired, Classification::ChangesDetected, LockAction::Delete, Decision::Notify),
        (expired, Classification::FirstRun, LockAction::Delete, Decision::Notify),
        (unknown, Classification::ChangesDetected, LockAction::Delete, Decision::Notify),
    ];

    for (state, classification, action, decision) in cases {
        assert_eq!(
            transition(state, classification),
            Some((action, decision)),
            "{state} + {classification}"
        );
    }
}

#[test]
fn comparison_error_has_no_transition() {
    for state in [
        GateState::NoLock,
        GateState::LockActive { age: DAY },
        GateState::LockExpired { age: None },
    ] {
        assert_eq!(transition(state, Classification::ComparisonError), None);
    }
}

#[test]
fn age_at_threshold_counts_as_expired() {
    let now = reference_time();
    let at = |ago: Duration| {
        classify_lock(
            Some(LockRecord {
                timestamp: Some(now - ago),
            }),
            now,
            COOLDOWN,
        )
    };

    assert_eq!(at(COOLDOWN), GateState::LockExpired { age: Some(COOLDOWN) });
    assert_eq!(
        at(COOLDOWN - Duration::from_secs(1)),
        GateState::LockActive {
            age: COOLDOWN - Duration::from_secs(1)
        }
    );
    assert_eq!(classify_lock(None, now, COOLDOWN), GateState::NoLock);
}

#[test]
fn future_timestamp_is_age_zero_and_active() {
    let now = reference_time();
    let state = classify_lock(
        Some(LockRecord {
            timestamp: Some(now + DAY),
        }),
        now,
        COOLDOWN,
    );
    assert_eq!(state, GateState::LockActive { age: Duration::ZERO });
}

#[test]
fn first_change_arms_and_creates_lock() {
    init_tracing();
    let now = reference_time();
    let mut gate = NotificationGate::new(MemoryLockStore::new(), FixedClock::new(now), COOLDOWN);

    let decision = gate.evaluate(Classification::ChangesDetected).unwrap();

    assert_eq!(decision.decision, Decision::Armed);
    assert_eq!(decision.lock_age_secs, None);
    assert_eq!(
        gate.store().record(),
        Some(LockRecord {
            timestamp: Some(now)
        })
    );
}

#[test]
fn no_changes_without_lock_is_suppressed_and_stateless() {
    init_tracing();
    let mut gate = NotificationGate::new(
        MemoryLockStore::new(),
        FixedClock::new(reference_time()),
        COOLDOWN,
    );

    let decision = gate.evaluate(Classification::NoChanges).unwrap();

    assert_eq!(decision.decision, Decision::Suppressed);
    assert_eq!(gate.store().record(), None);
}

#[test]
fn change_just_before_threshold_keeps_original_timestamp() {
    init_tracing();
    let ago = COOLDOWN - Duration::from_secs(1);
    let mut gate = locked_at(ago);
    let created = gate.store().record();

    let decision = gate.evaluate(Classification::ChangesDetected).unwrap();

    assert_eq!(decision.decision, Decision::Suppressed);
    assert_eq!(decision.lock_age_secs, Some(ago.as_secs()));
    assert_eq!(gate.store().record(), created);
}

#[test]
fn no_changes_at_threshold_deletes_lock() {
    init_tracing();
    let mut gate = locked_at(COOLDOWN);

    let decision = gate.evaluate(Classification::NoChanges).unwrap();

    assert_eq!(decision.decision, Decision::Suppressed);
    assert_eq!(decision.lock_age_secs, Some(COOLDOWN.as_secs()));
    assert_eq!(gate.store().record(), None);
}

#[test]
fn change_after_threshold_notifies_and_deletes_lock() {
    init_tracing();
    let mut gate = locked_at(16 * DAY);

    let decision = gate.evaluate(Classification::ChangesDetected).unwrap();

    assert_eq!(decision.decision, Decision::Notify);
    assert_eq!(gate.store().record(), None);

    // The next change starts a fresh cycle.
    let next = gate.evaluate(Classification::ChangesDetected).unwrap();
    assert_eq!(next.decision, Decision::Armed);
}

#[test]
fn unreadable_lock_is_treated_as_expired() {
    init_tracing();
    let mut gate = NotificationGate::new(
        MemoryLockStore::with_unreadable_lock(),
        FixedClock::new(reference_time()),
        COOLDOWN,
    );

    assert_eq!(gate.state().unwrap(), GateState::LockExpired { age: None });
    let decision = gate.evaluate(Classification::ChangesDetected).unwrap();
    assert_eq!(decision.decision, Decision::Notify);
    assert_eq!(decision.lock_age_secs, None);
    assert_eq!(gate.store().record(), None);
}

#[test]
fn preview_leaves_lock_untouched() {
    init_tracing();
    let mut gate = locked_at(20 * DAY);
    let before = gate.store().record();

    let preview = gate.preview(Classification::ChangesDetected).unwrap();
    assert_eq!(preview.decision, Decision::Notify);
    assert_eq!(gate.store().record(), before);

    let applied = gate.evaluate(Classification::ChangesDetected).unwrap();
    assert_eq!(applied, preview);
}

#[test]
fn comparison_error_is_refused() {
    init_tracing();
    let mut gate = locked_at(DAY);
    let before = gate.store().record();

    let err = gate.evaluate(Classification::ComparisonError).unwrap_err();

    assert!(matches!(err, DistwatchError::Precondition(_)));
    assert_eq!(gate.store().record(), before);
}

#[test]
fn lock_age_is_monotonic_under_repeated_changes() {
    init_tracing();
    let start = reference_time();
    let mut gate = NotificationGate::new(MemoryLockStore::new(), FixedClock::new(start), COOLDOWN);

    assert_eq!(
        gate.evaluate(Classification::ChangesDetected).unwrap().decision,
        Decision::Armed
    );

    for day in 1..15u64 {
        gate.clock().advance(DAY);
        let d = gate.evaluate(Classification::ChangesDetected).unwrap();
        assert_eq!(d.decision, Decision::Suppressed);
        assert_eq!(d.lock_age_secs, Some(day * DAY.as_secs()));
    }

    gate.clock().advance(DAY);
    let d = gate.evaluate(Classification::ChangesDetected).unwrap();
    assert_eq!(d.decision, Decision::Notify);
    assert_eq!(d.lock_age_secs, Some(COOLDOWN.as_secs()));
}

#[test]
fn file_lock_store_uses_marker_mtime() {
    init_tracing();
    let fs = Arc::new(MockFileSystem::new());
    let path = PathBuf::from("/state/notify.lock");
    let mut store = FileLockStore::new(fs.clone(), path.clone());

    assert_eq!(store.read().unwrap(), None);

    let created = reference_time();
    fs.add_file_with_mtime(&path, b"whatever".to_vec(), created);
    assert_eq!(
        store.read().unwrap(),
        Some(LockRecord {
            timestamp: Some(created)
        })
    );

    fs.set_modified(&path, None);
    assert_eq!(store.read().unwrap(), Some(LockRecord { timestamp: None }));

    store.remove().unwrap();
    assert!(!fs.exists(&path));
    // Removing an absent lock is fine.
    store.remove().unwrap();
}

#[test]
fn file_lock_store_writes_advisory_content() {
    init_tracing();
    let fs = Arc::new(MockFileSystem::new());
    let path = PathBuf::from("/state/notify.lock");
    let mut store = FileLockStore::new(fs.clone(), path.clone());

    store
        .create(reference_time(), "classification: CHANGES_DETECTED")
        .unwrap();

    let content = fs.read_to_string(&path).unwrap();
    assert!(content.starts_with("armed_at: "));
    assert!(content.contains("classification: CHANGES_DETECTED"));
    assert!(store.read().unwrap().is_some());
}

#[test]
fn file_backed_gate_runs_a_full_cycle_on_real_disk() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let lock = dir.path().join("notify.lock");
    let fs: Arc<dyn FileSystem> = Arc::new(distwatch::fs::RealFileSystem);
    let store = FileLockStore::new(fs, lock.clone());

    // Clock far ahead so the freshly written marker already looks old.
    let clock = FixedClock::new(std::time::SystemTime::now() + 30 * DAY);
    let mut gate = NotificationGate::new(store, clock, COOLDOWN);

    let first = gate.evaluate(Classification::ChangesDetected).unwrap();
    assert_eq!(first.decision, Decision::Armed);
    assert!(lock.exists());

    let second = gate.evaluate(Classification::ChangesDetected).unwrap();
    assert_eq!(second.decision, Decision::Notify);
    assert!(!lock.exists());
}

#[test]
fn status_line_formats() {
    assert_eq!(GateState::NoLock.to_string(), "NO_LOCK");
    assert_eq!(
        GateState::LockActive { age: Duration::from_secs(90) }.to_string(),
        "LOCK_ACTIVE age=90s"
    );
    assert_eq!(
        GateState::LockExpired { age: Some(COOLDOWN) }.to_string(),
        "LOCK_EXPIRED age=1296000s"
    );
    assert_eq!(
        GateState::LockExpired { age: None }.to_string(),
        "LOCK_EXPIRED age=unknown"
    );
}
