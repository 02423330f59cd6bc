//! Sensor snapshot types — the engine's current view of each signal.

use crate::geo::LocationSample;
use crate::time::Timestamp;
use serde::{Deserialize, Serialize};

/// The most recent motion-provider reading.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MotionSnapshot {
    /// Whether the motion coprocessor currently classifies the user as moving.
    pub is_moving: bool,
    /// How long the current movement episode has lasted, in seconds.
    /// Zero when stationary.
    pub active_duration_secs: u64,
    /// Step count for the current day.
    pub steps_today: u32,
    /// When this reading was taken.
    pub timestamp: Timestamp,
}

/// Everything the verifiers and the integrity gate get to look at.
///
/// `None` fields mean the provider has not produced a reading yet — the
/// verifiers treat absence as fail-closed, never as a pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalSnapshot {
    pub location: Option<LocationSample>,
    pub motion: Option<MotionSnapshot>,
    /// Latest camera liveness score in [0,1], if a capture has completed.
    pub liveness_score: Option<f64>,
    /// Whether the device exposes a usage/screen-time tracking capability.
    pub screen_time_available: bool,
    /// Screen time recorded today, in minutes, when the capability exists.
    pub screen_time_minutes: Option<u32>,
}
