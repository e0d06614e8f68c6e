// tests/properties.rs

use std::collections::BTreeSet;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use proptest::prelude::*;

use distwatch::detect::{combine, ChangeSet};
use distwatch::gate::{
    classify_lock, FixedClock, GateState, LockRecord, MemoryLockStore, NotificationGate,
};
use distwatch::types::{Classification, Decision, HashVerdict};

fn classification() -> impl Strategy<Value = Classification> {
    prop_oneof![
        Just(Classification::FirstRun),
        Just(Classification::NoChanges),
        Just(Classification::ChangesDetected),
        Just(Classification::ComparisonError),
    ]
}

fn verdict() -> impl Strategy<Value = HashVerdict> {
    prop_oneof![
        Just(HashVerdict::Identical),
        Just(HashVerdict::Different),
        Just(HashVerdict::Unavailable),
    ]
}

fn path_set() -> impl Strategy<Value = BTreeSet<String>> {
    proptest::collection::btree_set("[a-c]{1,2}(/[a-c]{1,2}){0,2}", 0..12)
}

proptest! {
    #[test]
    fn change_set_is_exact_set_difference(prev in path_set(), cur in path_set()) {
        let set = ChangeSet::from_paths(prev.iter().cloned(), cur.iter().cloned());

        let added: BTreeSet<String> = cur.difference(&prev).cloned().collect();
        let removed: BTreeSet<String> = prev.difference(&cur).cloned().collect();
        prop_assert_eq!(&set.added, &added);
        prop_assert_eq!(&set.removed, &removed);
        prop_assert!(set.added.is_disjoint(&set.removed));
        prop_assert_eq!(set.is_empty(), prev == cur);
    }

    #[test]
    fn combined_result_follows_or_law(structural in classification(), hash in verdict()) {
        let combined = combine(structural, hash);
        match structural {
            Classification::FirstRun | Classification::ComparisonError => {
                prop_assert_eq!(combined, structural);
            }
            _ => {
                let changed = structural == Classification::ChangesDetected
                    || hash == HashVerdict::Different;
                prop_assert_eq!(combined == Classification::ChangesDetected, changed);
            }
        }
    }

    #[test]
    fn threshold_is_inclusive(cooldown_secs in 1u64..10_000_000, age_secs in 0u64..20_000_000) {
        let now = UNIX_EPOCH + Duration::from_secs(1_800_000_000);
        let record = LockRecord { timestamp: Some(now - Duration::from_secs(age_secs)) };
        let state = classify_lock(Some(record), now, Duration::from_secs(cooldown_secs));

        let expired = matches!(state, GateState::LockExpired { .. });
        prop_assert_eq!(expired, age_secs >= cooldown_secs);
        prop_assert_eq!(state.age(), Some(Duration::from_secs(age_secs)));
    }

    #[test]
    fn lock_age_never_resets_while_active(
        steps in proptest::collection::vec((0u64..3 * 86_400, prop::bool::ANY), 1..40)
    ) {
        let cooldown = Duration::from_secs(15 * 86_400);
        let start: SystemTime = UNIX_EPOCH + Duration::from_secs(1_800_000_000);
        let mut gate =
            NotificationGate::new(MemoryLockStore::new(), FixedClock::new(start), cooldown);
        let mut created: Option<SystemTime> = None;

        for (advance, changed) in steps {
            gate.clock().advance(Duration::from_secs(advance));
            let classification = if changed {
                Classification::ChangesDetected
            } else {
                Classification::NoChanges
            };
            let before = gate.store().record().and_then(|r| r.timestamp);
            let decision = gate.evaluate(classification).unwrap();
            let after = gate.store().record().and_then(|r| r.timestamp);

            match decision.decision {
                Decision::Armed => {
                    prop_assert!(before.is_none());
                    created = after;
                }
                Decision::Notify => {
                    prop_assert!(after.is_none());
                    created = None;
                }
                Decision::Suppressed => {
                    if after.is_some() {
                        // Lock survived: timestamp must be the original one.
                        prop_assert_eq!(after, created);
                    } else {
                        created = None;
                    }
                }
            }
        }
    }
}
