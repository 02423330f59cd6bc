//! Nullable store — thread-safe in-memory storage for testing.

use circle_anticheat::{EngineStore, StoreError, SuspiciousActivity};
use circle_verify::VerificationResult;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// An in-memory engine store for testing.
/// Thread-safe for use with tokio's multi-threaded runtime.
pub struct NullStore {
    activities: Mutex<Vec<SuspiciousActivity>>,
    results: Mutex<Vec<VerificationResult>>,
    failing: AtomicBool,
}

impl NullStore {
    pub fn new() -> Self {
        Self {
            activities: Mutex::new(Vec::new()),
            results: Mutex::new(Vec::new()),
            failing: AtomicBool::new(false),
        }
    }

    /// Make every save fail, to exercise the fire-and-forget policy.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn saved_activities(&self) -> Vec<SuspiciousActivity> {
        self.activities.lock().unwrap().clone()
    }

    pub fn saved_results(&self) -> Vec<VerificationResult> {
        self.results.lock().unwrap().clone()
    }
}

impl Default for NullStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineStore for NullStore {
    fn save_activity(&self, activity: &SuspiciousActivity) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("null store set to fail".into()));
        }
        self.activities.lock().unwrap().push(activity.clone());
        Ok(())
    }

    fn save_result(&self, result: &VerificationResult) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("null store set to fail".into()));
        }
        self.results.lock().unwrap().push(result.clone());
        Ok(())
    }
}
