//! Camera liveness evidence — verify, don't retain.
//!
//! Raw frames exist only for the duration of scoring. What survives is a
//! mean liveness score and a SHA-256 content hash per frame, enough to
//! prove a capture happened and bind the result to specific frames
//! without keeping any imagery.

use circle_types::Timestamp;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// One captured frame plus the camera pipeline's per-frame liveness score.
#[derive(Clone, Debug)]
pub struct CameraFrame {
    pub bytes: Vec<u8>,
    /// Per-frame liveness score in [0,1].
    pub score: f64,
}

/// Derived evidence from a completed liveness capture.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LivenessEvidence {
    /// Mean per-frame liveness score, clamped to [0,1].
    pub score: f64,
    /// Hex SHA-256 digest of each frame, in capture order.
    pub frame_hashes: Vec<String>,
    pub captured_at: Timestamp,
}

impl LivenessEvidence {
    /// Score and hash a capture. Returns `None` for an empty capture —
    /// no frames is "no result", not a failed one.
    pub fn from_frames(frames: &[CameraFrame], captured_at: Timestamp) -> Option<Self> {
        if frames.is_empty() {
            return None;
        }
        let score = frames.iter().map(|f| f.score).sum::<f64>() / frames.len() as f64;
        let frame_hashes = frames
            .iter()
            .map(|f| hex::encode(Sha256::digest(&f.bytes)))
            .collect();
        Some(Self {
            score: score.clamp(0.0, 1.0),
            frame_hashes,
            captured_at,
        })
    }
}
