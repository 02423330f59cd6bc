//! Suspicious-activity records and the bounded log that holds them.

use circle_types::Timestamp;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use std::fmt;

/// What kind of inconsistency a check detected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuspiciousActivityType {
    /// Wall clock diverged from monotonic uptime.
    ClockTampering,
    /// Motion says moving, location says stationary, sustained.
    MotionLocationMismatch,
    /// Implausible instantaneous speed for the activity context.
    RapidLocationChange,
    /// Physically impossible pairwise speed over recent samples.
    ImpossibleMovement,
    /// Sensors jointly unable to support a confident decision.
    DataInconsistency,
    /// Many detections in a short window — deliberate, not a glitch.
    SuspiciousPattern,
}

impl fmt::Display for SuspiciousActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ClockTampering => "clock_tampering",
            Self::MotionLocationMismatch => "motion_location_mismatch",
            Self::RapidLocationChange => "rapid_location_change",
            Self::ImpossibleMovement => "impossible_movement",
            Self::DataInconsistency => "data_inconsistency",
            Self::SuspiciousPattern => "suspicious_pattern",
        };
        write!(f, "{name}")
    }
}

/// How much a detection should cost.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Whether this severity escalates to camera verification on its own.
    pub fn escalates(&self) -> bool {
        matches!(self, Self::High | Self::Critical)
    }
}

/// One detection, appended to the log by the engine.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SuspiciousActivity {
    pub activity_type: SuspiciousActivityType,
    pub severity: Severity,
    pub timestamp: Timestamp,
    pub description: String,
    /// Free-form key/value context (speeds, deltas, accuracies).
    pub details: BTreeMap<String, String>,
}

impl SuspiciousActivity {
    pub fn new(
        activity_type: SuspiciousActivityType,
        severity: Severity,
        timestamp: Timestamp,
        description: impl Into<String>,
    ) -> Self {
        Self {
            activity_type,
            severity,
            timestamp,
            description: description.into(),
            details: BTreeMap::new(),
        }
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

/// Bounded, append-only log of suspicious activity.
///
/// FIFO by count: when full, the oldest record is evicted to make room.
/// Age-based pruning runs on every monitoring tick on top of that, so the
/// log never serves records older than the retention period.
pub struct ActivityLog {
    entries: VecDeque<SuspiciousActivity>,
    capacity: usize,
}

impl ActivityLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a record, evicting the oldest if at capacity.
    pub fn record(&mut self, activity: SuspiciousActivity) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(activity);
    }

    /// Drop records older than `max_age_secs`.
    pub fn prune_older_than(&mut self, max_age_secs: u64, now: Timestamp) {
        while let Some(front) = self.entries.front() {
            if front.timestamp.has_expired(max_age_secs, now) {
                self.entries.pop_front();
            } else {
                break;
            }
        }
    }

    /// Records whose timestamp falls inside the trailing window.
    pub fn recent(
        &self,
        window_secs: u64,
        now: Timestamp,
    ) -> impl Iterator<Item = &SuspiciousActivity> {
        self.entries
            .iter()
            .filter(move |a| !a.timestamp.has_expired(window_secs, now))
    }

    /// Number of records inside the trailing window.
    pub fn count_within(&self, window_secs: u64, now: Timestamp) -> usize {
        self.recent(window_secs, now).count()
    }

    /// Whether any record of `ty` sits inside the trailing window.
    pub fn has_type_within(
        &self,
        ty: SuspiciousActivityType,
        window_secs: u64,
        now: Timestamp,
    ) -> bool {
        self.recent(window_secs, now)
            .any(|a| a.activity_type == ty)
    }

    /// Lifetime counts per type (bounded by retention, not truly lifetime).
    pub fn counts_by_type(&self) -> BTreeMap<SuspiciousActivityType, usize> {
        let mut counts = BTreeMap::new();
        for a in &self.entries {
            *counts.entry(a.activity_type).or_insert(0) += 1;
        }
        counts
    }

    /// Counts per severity.
    pub fn counts_by_severity(&self) -> BTreeMap<Severity, usize> {
        let mut counts = BTreeMap::new();
        for a in &self.entries {
            *counts.entry(a.severity).or_insert(0) += 1;
        }
        counts
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SuspiciousActivity> {
        self.entries.iter()
    }
}
