//! Nullable clock — deterministic time for testing.

use circle_types::{Clock, Timestamp};
use std::sync::atomic::{AtomicU64, Ordering};

/// A deterministic clock for testing.
///
/// Wall time and uptime only advance when you tell them to, and they can
/// be advanced independently to simulate a user adjusting the device
/// clock. Atomics rather than a `Cell` so it can be shared with the
/// monitor's tokio tasks.
pub struct NullClock {
    wall_secs: AtomicU64,
    uptime_secs: AtomicU64,
}

impl NullClock {
    pub fn new(initial_secs: u64) -> Self {
        Self {
            wall_secs: AtomicU64::new(initial_secs),
            uptime_secs: AtomicU64::new(0),
        }
    }

    /// Advance wall time and uptime together — normal passage of time.
    pub fn advance(&self, secs: u64) {
        self.wall_secs.fetch_add(secs, Ordering::SeqCst);
        self.uptime_secs.fetch_add(secs, Ordering::SeqCst);
    }

    /// Advance only the wall clock — a manual clock adjustment.
    pub fn skew_wall(&self, secs: u64) {
        self.wall_secs.fetch_add(secs, Ordering::SeqCst);
    }

    /// Set wall time to a specific value, leaving uptime untouched.
    pub fn set_wall(&self, secs: u64) {
        self.wall_secs.store(secs, Ordering::SeqCst);
    }
}

impl Clock for NullClock {
    fn now(&self) -> Timestamp {
        Timestamp::new(self.wall_secs.load(Ordering::SeqCst))
    }

    fn uptime_secs(&self) -> u64 {
        self.uptime_secs.load(Ordering::SeqCst)
    }
}
