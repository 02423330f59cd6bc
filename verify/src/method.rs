//! The closed set of verification methods.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a challenge completion is verified.
///
/// A closed enum rather than a string key: dispatch is exhaustive, so a
/// typo or an unhandled method cannot silently verify nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationMethod {
    /// Geofence visit with a minimum dwell time.
    Location,
    /// Daily step count, optionally restricted to a time-of-day window.
    Motion,
    /// Device usage time; requires the usage-tracking capability.
    ScreenTime,
    /// Camera liveness capture.
    Camera,
}

impl fmt::Display for VerificationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Location => "location",
            Self::Motion => "motion",
            Self::ScreenTime => "screen_time",
            Self::Camera => "camera",
        };
        write!(f, "{name}")
    }
}
