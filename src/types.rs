use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// Overall verdict of the detection layer for one snapshot pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    /// No usable previous snapshot; everything in current is new.
    FirstRun,
    NoChanges,
    ChangesDetected,
    /// The comparison itself could not be completed.
    ComparisonError,
}

impl Classification {
    pub fn as_str(self) -> &'static str {
        match self {
            Classification::FirstRun => "FIRST_RUN",
            Classification::NoChanges => "NO_CHANGES",
            Classification::ChangesDetected => "CHANGES_DETECTED",
            Classification::ComparisonError => "COMPARISON_ERROR",
        }
    }

    /// Whether this classification counts as an observed change for the
    /// notification gate and the baseline update.
    pub fn is_change(self) -> bool {
        matches!(
            self,
            Classification::FirstRun | Classification::ChangesDetected
        )
    }

    /// Process exit code for standalone invocation.
    ///
    /// - `0`: no changes
    /// - `1`: changes detected or first run
    /// - `2`: comparison error
    pub fn exit_code(self) -> i32 {
        match self {
            Classification::NoChanges => 0,
            Classification::FirstRun | Classification::ChangesDetected => 1,
            Classification::ComparisonError => 2,
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of comparing two content-hash indexes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashVerdict {
    Identical,
    Different,
    /// No digest could be computed for at least one side.
    Unavailable,
}

impl HashVerdict {
    pub fn as_str(self) -> &'static str {
        match self {
            HashVerdict::Identical => "IDENTICAL",
            HashVerdict::Different => "DIFFERENT",
            HashVerdict::Unavailable => "HASH_UNAVAILABLE",
        }
    }
}

impl fmt::Display for HashVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the notification gate decided for this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decision {
    Suppressed,
    /// A fresh cooldown lock was created.
    Armed,
    /// The cooldown elapsed; deliver the report.
    Notify,
}

impl Decision {
    pub fn as_str(self) -> &'static str {
        match self {
            Decision::Suppressed => "SUPPRESSED",
            Decision::Armed => "ARMED",
            Decision::Notify => "NOTIFY",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Gate output: the decision plus the age of the lock that was consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationDecision {
    pub decision: Decision,
    /// Age of the lock in whole seconds, if a lock existed when the gate ran
    /// and its timestamp could be read.
    pub lock_age_secs: Option<u64>,
}

impl NotificationDecision {
    pub fn new(decision: Decision, lock_age_secs: Option<u64>) -> Self {
        Self {
            decision,
            lock_age_secs,
        }
    }
}

impl fmt::Display for NotificationDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.lock_age_secs {
            Some(age) => write!(f, "{} (lock age {}s)", self.decision, age),
            None => write!(f, "{}", self.decision),
        }
    }
}

/// Content digest algorithms that can appear in a hash index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    Sha256,
    Sha1,
    Blake3,
}

impl HashAlgorithm {
    pub fn as_str(self) -> &'static str {
        match self {
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha1 => "sha1",
            HashAlgorithm::Blake3 => "blake3",
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HashAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sha256" => Ok(HashAlgorithm::Sha256),
            "sha1" => Ok(HashAlgorithm::Sha1),
            "blake3" => Ok(HashAlgorithm::Blake3),
            other => Err(format!(
                "unknown hash algorithm: {other} (expected \"sha256\", \"sha1\" or \"blake3\")"
            )),
        }
    }
}

/// Default digest preference order: strongest first.
pub fn default_algorithms() -> Vec<HashAlgorithm> {
    vec![HashAlgorithm::Sha256, HashAlgorithm::Sha1]
}
