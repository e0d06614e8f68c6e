// src/gate/mod.rs

//! Delayed-notification state machine.
//!
//! The gate reads the single [`LockRecord`] to derive a [`GateState`], then
//! applies the transition table for the run's classification:
//!
//! | state          | `NoChanges`            | `ChangesDetected` / `FirstRun` |
//! |----------------|------------------------|--------------------------------|
//! | `NoLock`       | suppressed             | create lock, armed             |
//! | `LockActive`   | suppressed             | suppressed (lock untouched)    |
//! | `LockExpired`  | delete lock, suppressed| delete lock, notify            |
//!
//! The lock age is measured from its creation and never reset by further
//! changes. `age >= cooldown` counts as expired.

pub mod clock;
pub mod lock;

use std::fmt;
use std::time::{Duration, SystemTime};

use tracing::{info, warn};

use crate::errors::{DistwatchError, Result};
use crate::types::{Classification, Decision, NotificationDecision};

pub use clock::{Clock, FixedClock, SystemClock};
pub use lock::{FileLockStore, LockRecord, LockStore, MemoryLockStore};

/// Default cooldown: 15 days.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(15 * 24 * 60 * 60);

/// Gate state derived from the lock record and the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    NoLock,
    LockActive { age: Duration },
    /// `age` is `None` when the lock timestamp could not be read.
    LockExpired { age: Option<Duration> },
}

impl GateState {
    pub fn age(&self) -> Option<Duration> {
        match self {
            GateState::NoLock => None,
            GateState::LockActive { age } => Some(*age),
            GateState::LockExpired { age } => *age,
        }
    }
}

impl fmt::Display for GateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateState::NoLock => f.write_str("NO_LOCK"),
            GateState::LockActive { age } => write!(f, "LOCK_ACTIVE age={}s", age.as_secs()),
            GateState::LockExpired { age: Some(age) } => {
                write!(f, "LOCK_EXPIRED age={}s", age.as_secs())
            }
            GateState::LockExpired { age: None } => f.write_str("LOCK_EXPIRED age=unknown"),
        }
    }
}

/// Side effect the gate applies to the lock store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockAction {
    Keep,
    Create,
    Delete,
}

/// Derive the gate state from an optional lock record.
///
/// A lock with an unreadable timestamp is treated as expired. A timestamp in
/// the future yields age zero.
pub fn classify_lock(record: Option<LockRecord>, now: SystemTime, cooldown: Duration) -> GateState {
    match record {
        None => GateState::NoLock,
        Some(LockRecord { timestamp: None }) => GateState::LockExpired { age: None },
        Some(LockRecord {
            timestamp: Some(created),
        }) => {
            let age = now.duration_since(created).unwrap_or(Duration::ZERO);
            if age >= cooldown {
                GateState::LockExpired { age: Some(age) }
            } else {
                GateState::LockActive { age }
            }
        }
    }
}

/// The transition table. `None` for `ComparisonError`, which the gate never
/// acts on.
pub fn transition(
    state: GateState,
    classification: Classification,
) -> Option<(LockAction, Decision)> {
    let changed = match classification {
        Classification::ComparisonError => return None,
        Classification::NoChanges => false,
        Classification::ChangesDetected | Classification::FirstRun => true,
    };

    let step = match (state, changed) {
        (GateState::NoLock, false) => (LockAction::Keep, Decision::Suppressed),
        (GateState::NoLock, true) => (LockAction::Create, Decision::Armed),
        (GateState::LockActive { .. }, _) => (LockAction::Keep, Decision::Suppressed),
        (GateState::LockExpired { .. }, false) => (LockAction::Delete, Decision::Suppressed),
        (GateState::LockExpired { .. }, true) => (LockAction::Delete, Decision::Notify),
    };
    Some(step)
}

/// Lock-backed notification gate.
pub struct NotificationGate<S: LockStore, C: Clock> {
    store: S,
    clock: C,
    cooldown: Duration,
}

impl<S: LockStore, C: Clock> fmt::Debug for NotificationGate<S, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationGate")
            .field("cooldown", &self.cooldown)
            .finish_non_exhaustive()
    }
}

impl<S: LockStore, C: Clock> NotificationGate<S, C> {
    pub fn new(store: S, clock: C, cooldown: Duration) -> Self {
        Self {
            store,
            clock,
            cooldown,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Current state of the gate.
    pub fn state(&self) -> Result<GateState> {
        let record = self.store.read()?;
        let state = classify_lock(record, self.clock.now(), self.cooldown);
        if matches!(state, GateState::LockExpired { age: None }) {
            warn!("lock timestamp unreadable; treating lock as expired");
        }
        Ok(state)
    }

    /// What the gate would decide, without touching the lock.
    pub fn preview(&self, classification: Classification) -> Result<NotificationDecision> {
        let state = self.state()?;
        let (_, decision) =
            transition(state, classification).ok_or_else(|| refuse(classification))?;
        Ok(NotificationDecision::new(decision, age_secs(state)))
    }

    /// Apply the transition for `classification` and return the decision.
    pub fn evaluate(&mut self, classification: Classification) -> Result<NotificationDecision> {
        let state = self.state()?;
        let (action, decision) =
            transition(state, classification).ok_or_else(|| refuse(classification))?;

        match action {
            LockAction::Keep => {}
            LockAction::Create => {
                let note = format!("classification: {classification}");
                self.store.create(self.clock.now(), &note)?;
            }
            LockAction::Delete => self.store.remove()?,
        }

        info!(%state, %classification, %decision, "notification gate evaluated");
        Ok(NotificationDecision::new(decision, age_secs(state)))
    }
}

fn age_secs(state: GateState) -> Option<u64> {
    state.age().map(|a| a.as_secs())
}

fn refuse(classification: Classification) -> DistwatchError {
    DistwatchError::Precondition(format!(
        "notification gate cannot act on {classification}"
    ))
}
