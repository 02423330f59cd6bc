//! Challenge model — immutable once created except for activation state.

use crate::method::VerificationMethod;
use circle_types::{GeoPoint, Timestamp};
use serde::{Deserialize, Serialize};

/// A time-of-day restriction in local hours, e.g. "before 8:00" for a
/// morning-steps challenge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeOfDayWindow {
    /// Inclusive start hour, 0–23.
    pub start_hour: u8,
    /// Exclusive end hour, 1–24.
    pub end_hour: u8,
}

impl TimeOfDayWindow {
    /// Whether a timestamp's local hour falls inside the window.
    /// The caller supplies the UTC offset; the core does not know the
    /// device's time zone.
    pub fn contains(&self, at: Timestamp, utc_offset_secs: i64) -> bool {
        let local = at.as_secs() as i64 + utc_offset_secs;
        let hour = ((local.rem_euclid(86_400)) / 3600) as u8;
        hour >= self.start_hour && hour < self.end_hour
    }
}

/// Method-specific verification parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VerificationParams {
    Location {
        /// Center of the geofence.
        target: GeoPoint,
        /// Geofence radius in meters.
        radius_m: f64,
        /// Continuous time the user must spend inside, in seconds.
        min_dwell_secs: u64,
    },
    Motion {
        /// Steps required.
        target_steps: u32,
        /// Optional time-of-day restriction.
        window: Option<TimeOfDayWindow>,
        /// Local-time UTC offset used to evaluate the window, in seconds.
        utc_offset_secs: i64,
    },
    ScreenTime {
        /// Maximum screen minutes allowed today (an "under X" challenge).
        max_minutes: u32,
    },
    Camera,
}

/// A verifiable challenge within a circle.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Challenge {
    pub id: u64,
    pub method: VerificationMethod,
    pub params: VerificationParams,
    /// Points awarded on a verified completion.
    pub points_reward: i64,
    /// Points forfeited on failure (consumed by the ledger layer).
    pub points_penalty: i64,
    /// Start of the activity window.
    pub starts_at: Timestamp,
    /// End of the activity window.
    pub ends_at: Timestamp,
    /// Whether the challenge is currently accepting verification attempts.
    pub is_active: bool,
}

impl Challenge {
    /// Whether `now` falls inside the activity window.
    pub fn window_contains(&self, now: Timestamp) -> bool {
        now >= self.starts_at && now <= self.ends_at
    }
}
