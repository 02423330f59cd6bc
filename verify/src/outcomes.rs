//! Verification outcome types.

use crate::method::VerificationMethod;
use circle_types::{SignalSnapshot, Timestamp};
use serde::{Deserialize, Serialize};

/// A verifier branch's raw decision, before the integrity gate.
#[derive(Clone, Debug, PartialEq)]
pub struct VerifierOutcome {
    /// Whether the method-specific check passed.
    pub passed: bool,
    /// Method-specific confidence multiplier in [0,1]; the liveness score
    /// for camera, 1.0 for the other methods.
    pub sub_score: f64,
    /// Human-readable reason, surfaced to the UI on failure.
    pub note: String,
}

impl VerifierOutcome {
    pub fn pass(sub_score: f64, note: impl Into<String>) -> Self {
        Self {
            passed: true,
            sub_score,
            note: note.into(),
        }
    }

    pub fn fail(note: impl Into<String>) -> Self {
        Self {
            passed: false,
            sub_score: 0.0,
            note: note.into(),
        }
    }
}

/// The final, gate-intersected result of one verification attempt.
///
/// Produced exactly once per attempt. `confidence` is bounded above by the
/// ambient integrity score — a perfect sensor match cannot outrank recent
/// suspicious behavior.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VerificationResult {
    pub is_verified: bool,
    /// Combined confidence in [0,1].
    pub confidence: f64,
    pub method: VerificationMethod,
    /// The sensor view the decision was made from. Camera results carry
    /// derived evidence only (content hashes), never raw frames.
    pub snapshot: SignalSnapshot,
    pub timestamp: Timestamp,
    pub notes: String,
}

impl VerificationResult {
    /// An unverified result with zero confidence.
    pub fn rejected(
        method: VerificationMethod,
        snapshot: SignalSnapshot,
        timestamp: Timestamp,
        notes: impl Into<String>,
    ) -> Self {
        Self {
            is_verified: false,
            confidence: 0.0,
            method,
            snapshot,
            timestamp,
            notes: notes.into(),
        }
    }
}
