//! Engine parameters — every tuned threshold in one configurable struct.
//!
//! The cutoffs below are empirically tuned rather than principled, so none
//! of them is hard-coded in the engines: construct with
//! [`EngineParams::circle_defaults`] and override what a deployment (or a
//! test) needs.

use serde::{Deserialize, Serialize};

/// All thresholds consumed by the hangout tracker, the verifiers, and the
/// anti-cheat engine.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EngineParams {
    // ── Monitoring ───────────────────────────────────────────────────────
    /// Period of the anti-cheat monitoring tick, in seconds.
    pub monitor_tick_secs: u64,

    /// Trailing window over which suspicious records count toward the
    /// integrity score and the gate, in seconds.
    pub suspicious_lookback_secs: u64,

    /// Maximum retained suspicious-activity records (FIFO eviction beyond).
    pub activity_log_capacity: usize,

    /// Records older than this are pruned regardless of capacity, in seconds.
    pub activity_max_age_secs: u64,

    /// Rolling location-history length kept for movement checks.
    pub location_history_len: usize,

    // ── Consistency checks ───────────────────────────────────────────────
    /// Allowed divergence between wall-clock delta and monotonic uptime
    /// delta before flagging clock tampering, in seconds.
    pub clock_drift_tolerance_secs: u64,

    /// Minimum sustained movement duration (motion signal) while the
    /// location signal shows the user stationary, in seconds.
    pub mismatch_min_duration_secs: u64,

    /// Total recent displacement below which the location signal counts as
    /// stationary, in meters.
    pub stationary_displacement_m: f64,

    /// Instantaneous speed above this is implausible for the activity
    /// context, in m/s.
    pub rapid_speed_mps: f64,

    /// Pairwise speed above this is physically impossible, in m/s.
    pub impossible_speed_mps: f64,

    /// Horizontal accuracy above this counts as a coarse fix, in meters.
    pub coarse_accuracy_m: f64,

    /// More than this many suspicious records inside the lookback window
    /// fires the meta-level pattern detection.
    pub pattern_threshold: usize,

    // ── Integrity score weights ──────────────────────────────────────────
    /// Score cost per high-severity record in the lookback window.
    pub weight_high: f64,
    /// Score cost per medium-severity record.
    pub weight_medium: f64,
    /// Score cost per low-severity record.
    pub weight_low: f64,

    // ── Integrity gate ───────────────────────────────────────────────────
    /// More than this many recent suspicious records rejects outright.
    pub gate_max_recent_records: usize,

    /// Integrity score below this rejects outright.
    pub gate_min_integrity: f64,

    /// Minimum camera liveness score accepted by the gate.
    pub gate_liveness_min: f64,

    // ── Verifiers ────────────────────────────────────────────────────────
    /// Maximum horizontal accuracy a location verification will trust,
    /// in meters.
    pub location_accuracy_max_m: f64,

    /// Minimum interval between two credits for the same geofence target,
    /// in seconds.
    pub geofence_cooldown_secs: u64,

    /// Daily step counts above this are impossible readings, not passes.
    pub step_sanity_ceiling: u32,

    /// Frames collected per camera liveness capture.
    pub camera_frame_count: usize,

    /// Maximum wait for a liveness capture to complete, in seconds.
    pub camera_capture_window_secs: u64,

    // ── Hangout detection ────────────────────────────────────────────────
    /// Loose proximity buffer that keeps a candidate alive, in meters.
    /// Wider than the confirm radius to absorb GPS jitter.
    pub hangout_candidate_radius_m: f64,

    /// Tight radius the pair must actually reach for promotion, in meters.
    pub hangout_confirm_radius_m: f64,

    /// Continuous candidacy required before promotion, in seconds.
    pub hangout_promote_secs: u64,

    /// No proximity refresh for this long ends a candidate or session,
    /// in seconds.
    pub hangout_stale_secs: u64,

    /// A new candidate within this gap of a just-ended session reopens it,
    /// in seconds.
    pub hangout_merge_gap_secs: u64,

    /// Completed sessions kept in memory (oldest-first eviction beyond).
    pub hangout_history_len: usize,
}

impl EngineParams {
    /// Circle defaults — the shipped configuration.
    pub fn circle_defaults() -> Self {
        Self {
            monitor_tick_secs: 60,
            suspicious_lookback_secs: 3600,
            activity_log_capacity: 200,
            activity_max_age_secs: 7 * 24 * 3600,
            location_history_len: 12,

            clock_drift_tolerance_secs: 300,
            mismatch_min_duration_secs: 600,
            stationary_displacement_m: 15.0,
            rapid_speed_mps: 50.0,
            impossible_speed_mps: 200.0,
            coarse_accuracy_m: 100.0,
            pattern_threshold: 5,

            weight_high: 0.30,
            weight_medium: 0.15,
            weight_low: 0.05,

            gate_max_recent_records: 2,
            gate_min_integrity: 0.5,
            gate_liveness_min: 0.7,

            location_accuracy_max_m: 50.0,
            geofence_cooldown_secs: 4 * 3600,
            step_sanity_ceiling: 50_000,
            camera_frame_count: 5,
            camera_capture_window_secs: 10,

            hangout_candidate_radius_m: 150.0,
            hangout_confirm_radius_m: 50.0,
            hangout_promote_secs: 30 * 60,
            hangout_stale_secs: 10 * 60,
            hangout_merge_gap_secs: 15 * 60,
            hangout_history_len: 64,
        }
    }
}

impl Default for EngineParams {
    fn default() -> Self {
        Self::circle_defaults()
    }
}
