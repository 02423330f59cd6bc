//! Persistence sink for engine outputs.
//!
//! The engine's in-memory state is authoritative for the current session:
//! saves are fire-and-forget, and a failed save must never block or
//! revert a decision that already returned to the caller. Enforcement of
//! that policy lives at the call site (the monitor logs and moves on).

use crate::activity::SuspiciousActivity;
use circle_verify::VerificationResult;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),

    #[error("serialization failed: {0}")]
    Serialization(String),
}

/// Where suspicious activity and verification results get written.
///
/// Implemented by the app's CoreData/CloudKit bridge in production and by
/// `circle_nullables::NullStore` in tests.
pub trait EngineStore: Send + Sync {
    fn save_activity(&self, activity: &SuspiciousActivity) -> Result<(), StoreError>;

    fn save_result(&self, result: &VerificationResult) -> Result<(), StoreError>;
}
