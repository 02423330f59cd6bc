//! Core anti-cheat engine: consistency checks, integrity score, and the
//! verification integrity gate.

use crate::activity::{ActivityLog, Severity, SuspiciousActivity, SuspiciousActivityType};
use circle_types::{
    geo::speed_between, EngineParams, LocationSample, MotionSnapshot, SignalSnapshot, Timestamp,
};
use circle_verify::{Challenge, VerificationMethod, VerificationResult};
use std::collections::{BTreeMap, VecDeque};

/// Events surfaced to the UI/notification layer.
#[derive(Clone, Debug)]
pub enum AntiCheatEvent {
    /// A check fired; the record has already been appended to the log.
    SuspiciousActivityDetected { activity: SuspiciousActivity },
    /// Escalation: no proof is accepted until a camera liveness pass.
    CameraVerificationRequired { reason: String },
}

/// Snapshot of engine state for the stats surface.
#[derive(Clone, Debug)]
pub struct AntiCheatStats {
    pub counts_by_type: BTreeMap<SuspiciousActivityType, usize>,
    pub counts_by_severity: BTreeMap<Severity, usize>,
    pub integrity_score: f64,
    pub camera_required: bool,
    pub is_monitoring: bool,
}

/// The multi-signal consistency monitor.
///
/// All state lives in memory and every method takes time explicitly
/// (wall clock and monotonic uptime), so behavior is fully deterministic
/// under an injected test clock. The engine never reads back its own
/// persisted output — the in-memory log is authoritative.
pub struct AntiCheatEngine {
    params: EngineParams,
    log: ActivityLog,
    /// Rolling window of the local user's recent fixes.
    history: VecDeque<LocationSample>,
    motion: Option<MotionSnapshot>,
    liveness_score: Option<f64>,
    screen_time_available: bool,
    screen_time_minutes: Option<u32>,
    /// Wall clock and uptime captured at construction; their deltas must
    /// stay in step unless someone adjusts the clock.
    wall_baseline: Timestamp,
    uptime_baseline_secs: u64,
    /// Cached score from the last recompute.
    integrity: f64,
    /// Escalation latch: cleared only by a passing camera verification.
    camera_required: bool,
    /// Newest sample timestamp already covered by the speed checks, so a
    /// single jump is flagged once rather than once per tick.
    speed_checked_up_to: Option<Timestamp>,
    pending_events: Vec<AntiCheatEvent>,
}

impl AntiCheatEngine {
    pub fn new(params: EngineParams, now: Timestamp, uptime_secs: u64) -> Self {
        let log = ActivityLog::new(params.activity_log_capacity);
        Self {
            params,
            log,
            history: VecDeque::new(),
            motion: None,
            liveness_score: None,
            screen_time_available: false,
            screen_time_minutes: None,
            wall_baseline: now,
            uptime_baseline_secs: uptime_secs,
            integrity: 1.0,
            camera_required: false,
            speed_checked_up_to: None,
            pending_events: Vec::new(),
        }
    }

    // ── Signal intake ────────────────────────────────────────────────────

    /// Record a new location fix in the rolling history.
    pub fn on_location_update(&mut self, sample: LocationSample) {
        self.history.push_back(sample);
        while self.history.len() > self.params.location_history_len {
            self.history.pop_front();
        }
    }

    /// Record the latest motion-provider reading.
    pub fn on_motion_update(&mut self, motion: MotionSnapshot) {
        self.motion = Some(motion);
    }

    /// Record a completed camera liveness score.
    pub fn on_liveness_result(&mut self, score: f64) {
        self.liveness_score = Some(score.clamp(0.0, 1.0));
    }

    /// Update the screen-time capability state and today's reading.
    pub fn set_screen_time(&mut self, available: bool, minutes: Option<u32>) {
        self.screen_time_available = available;
        self.screen_time_minutes = minutes;
    }

    /// The engine's current view of all signals.
    pub fn snapshot(&self) -> SignalSnapshot {
        SignalSnapshot {
            location: self.history.back().copied(),
            motion: self.motion,
            liveness_score: self.liveness_score,
            screen_time_available: self.screen_time_available,
            screen_time_minutes: self.screen_time_minutes,
        }
    }

    // ── Monitoring ───────────────────────────────────────────────────────

    /// One monitoring pass: prune, run every check, recompute the score.
    ///
    /// Runs on the periodic tick and synchronously before every
    /// verification attempt. Each pass is a fresh independent evaluation;
    /// nothing is retried, and a transient false positive self-corrects
    /// when its record ages out of the lookback window.
    pub fn run_checks(&mut self, now: Timestamp, uptime_secs: u64) {
        self.log
            .prune_older_than(self.params.activity_max_age_secs, now);

        self.check_clock_tampering(now, uptime_secs);
        self.check_movement_speeds(now);
        self.check_motion_location_mismatch(now);
        self.check_data_inconsistency(now);
        self.check_suspicious_pattern(now);

        self.integrity = self.compute_integrity(now);
    }

    /// Compare wall-clock delta against monotonic uptime delta.
    fn check_clock_tampering(&mut self, now: Timestamp, uptime_secs: u64) {
        let wall_delta = self.wall_baseline.elapsed_since(now);
        let uptime_delta = uptime_secs.saturating_sub(self.uptime_baseline_secs);
        let drift = wall_delta.abs_diff(uptime_delta);
        if drift > self.params.clock_drift_tolerance_secs {
            let activity = SuspiciousActivity::new(
                SuspiciousActivityType::ClockTampering,
                Severity::High,
                now,
                format!("wall clock diverged {drift}s from system uptime"),
            )
            .with_detail("wall_delta_secs", wall_delta.to_string())
            .with_detail("uptime_delta_secs", uptime_delta.to_string());
            self.record(activity);
        }
    }

    /// Rapid (two newest samples) and impossible (pairwise over the three
    /// newest) speed checks. Each sample pair is evaluated once — a
    /// single jump produces a single record, not one per tick.
    fn check_movement_speeds(&mut self, now: Timestamp) {
        let n = self.history.len();
        if n < 2 {
            return;
        }
        let newest_ts = self.history[n - 1].timestamp;
        if self.speed_checked_up_to == Some(newest_ts) {
            return;
        }
        self.speed_checked_up_to = Some(newest_ts);

        let newest = self.history[n - 1];
        let previous = self.history[n - 2];
        if let Some(speed) = speed_between(&previous, &newest) {
            if speed > self.params.rapid_speed_mps {
                let activity = SuspiciousActivity::new(
                    SuspiciousActivityType::RapidLocationChange,
                    Severity::High,
                    now,
                    format!("implied speed {speed:.0} m/s between consecutive fixes"),
                )
                .with_detail("speed_mps", format!("{speed:.1}"));
                self.record(activity);
            }
        }

        // Pair the newest sample against the two before it: a spoofed
        // midpoint sample cannot hide a teleport from the skip-one pair.
        let mut worst: Option<f64> = None;
        for back in 2..=3usize {
            if n < back {
                break;
            }
            if let Some(speed) = speed_between(&self.history[n - back], &newest) {
                if speed > self.params.impossible_speed_mps {
                    worst = Some(worst.map_or(speed, |w: f64| w.max(speed)));
                }
            }
        }
        if let Some(speed) = worst {
            let activity = SuspiciousActivity::new(
                SuspiciousActivityType::ImpossibleMovement,
                Severity::High,
                now,
                format!("physically impossible speed {speed:.0} m/s across recent fixes"),
            )
            .with_detail("speed_mps", format!("{speed:.1}"));
            self.record(activity);
        }
    }

    /// Motion says moving for ten-plus minutes while the fixes say the
    /// user hasn't budged: the two signals should correlate.
    fn check_motion_location_mismatch(&mut self, now: Timestamp) {
        let Some(motion) = self.motion else {
            return;
        };
        if !motion.is_moving
            || motion.active_duration_secs < self.params.mismatch_min_duration_secs
        {
            return;
        }

        let window = self.params.mismatch_min_duration_secs;
        let recent: Vec<&LocationSample> = self
            .history
            .iter()
            .filter(|s| !s.timestamp.has_expired(window, now))
            .collect();
        if recent.len() < 2 {
            return;
        }
        let newest = recent[recent.len() - 1];
        let max_displacement = recent
            .iter()
            .map(|s| s.distance_to(newest))
            .fold(0.0_f64, f64::max);
        if max_displacement < self.params.stationary_displacement_m {
            let activity = SuspiciousActivity::new(
                SuspiciousActivityType::MotionLocationMismatch,
                Severity::Medium,
                now,
                format!(
                    "motion active for {}s while location shows {max_displacement:.0}m of movement",
                    motion.active_duration_secs
                ),
            )
            .with_detail("active_duration_secs", motion.active_duration_secs.to_string())
            .with_detail("max_displacement_m", format!("{max_displacement:.1}"));
            self.record(activity);
        }
    }

    /// A coarse fix plus an active motion signal cannot jointly support a
    /// confident decision.
    fn check_data_inconsistency(&mut self, now: Timestamp) {
        let (Some(sample), Some(motion)) = (self.history.back(), self.motion) else {
            return;
        };
        if motion.is_moving && sample.horizontal_accuracy_m > self.params.coarse_accuracy_m {
            let activity = SuspiciousActivity::new(
                SuspiciousActivityType::DataInconsistency,
                Severity::Medium,
                now,
                format!(
                    "accuracy {:.0}m too coarse to corroborate active movement",
                    sample.horizontal_accuracy_m
                ),
            )
            .with_detail(
                "accuracy_m",
                format!("{:.0}", sample.horizontal_accuracy_m),
            );
            self.record(activity);
        }
    }

    /// Meta-check: many detections inside the lookback window signal a
    /// sustained attempt, not an isolated glitch. Does not re-fire while
    /// a pattern record is already inside the window, so the meta-check
    /// cannot feed itself.
    fn check_suspicious_pattern(&mut self, now: Timestamp) {
        let lookback = self.params.suspicious_lookback_secs;
        if self.log.count_within(lookback, now) <= self.params.pattern_threshold {
            return;
        }
        if self
            .log
            .has_type_within(SuspiciousActivityType::SuspiciousPattern, lookback, now)
        {
            return;
        }
        let count = self.log.count_within(lookback, now);
        let activity = SuspiciousActivity::new(
            SuspiciousActivityType::SuspiciousPattern,
            Severity::High,
            now,
            format!("{count} suspicious detections within the last hour"),
        )
        .with_detail("recent_count", count.to_string());
        self.record(activity);
    }

    /// Append a detection, emit events, and latch escalation for
    /// high-severity findings.
    fn record(&mut self, activity: SuspiciousActivity) {
        tracing::warn!(
            activity_type = %activity.activity_type,
            severity = ?activity.severity,
            description = %activity.description,
            "suspicious activity detected"
        );
        let escalate = activity.severity.escalates();
        let reason = activity.description.clone();
        self.pending_events
            .push(AntiCheatEvent::SuspiciousActivityDetected {
                activity: activity.clone(),
            });
        self.log.record(activity);

        if escalate && !self.camera_required {
            self.camera_required = true;
            self.pending_events
                .push(AntiCheatEvent::CameraVerificationRequired { reason });
        }
    }

    // ── Integrity score ──────────────────────────────────────────────────

    /// Recompute the score from the trailing window: start at 1.0 and
    /// subtract per-severity weights, clamped to [0,1]. Self-healing —
    /// reflects recent trustworthiness, not lifetime reputation.
    fn compute_integrity(&self, now: Timestamp) -> f64 {
        let lookback = self.params.suspicious_lookback_secs;
        let penalty: f64 = self
            .log
            .recent(lookback, now)
            .map(|a| match a.severity {
                Severity::Low => self.params.weight_low,
                Severity::Medium => self.params.weight_medium,
                Severity::High | Severity::Critical => self.params.weight_high,
            })
            .sum();
        (1.0 - penalty).clamp(0.0, 1.0)
    }

    /// Current integrity score in [0,1].
    pub fn integrity_score(&self, now: Timestamp) -> f64 {
        self.compute_integrity(now)
    }

    /// Whether camera escalation is currently latched.
    pub fn camera_required(&self) -> bool {
        self.camera_required
    }

    // ── Integrity gate ───────────────────────────────────────────────────

    /// Gate a verification attempt on the engine's current trust state.
    ///
    /// Runs the full check battery synchronously first, then rejects
    /// outright on too many recent detections, a low integrity score, or
    /// an unsatisfied camera escalation; otherwise applies the
    /// method-specific sub-check. On pass, confidence is the integrity
    /// score times the method sub-score — ambient distrust always caps
    /// per-proof confidence.
    pub fn verify_challenge_integrity(
        &mut self,
        challenge: &Challenge,
        now: Timestamp,
        uptime_secs: u64,
    ) -> VerificationResult {
        self.run_checks(now, uptime_secs);
        let snapshot = self.snapshot();
        let method = challenge.method;

        let recent = self
            .log
            .count_within(self.params.suspicious_lookback_secs, now);
        if recent > self.params.gate_max_recent_records {
            return VerificationResult::rejected(
                method,
                snapshot,
                now,
                format!(
                    "{recent} suspicious signals in the last hour; camera verification required"
                ),
            );
        }
        if self.integrity < self.params.gate_min_integrity {
            return VerificationResult::rejected(
                method,
                snapshot,
                now,
                format!(
                    "integrity score {:.2} below {:.2}; camera verification required",
                    self.integrity, self.params.gate_min_integrity
                ),
            );
        }
        if self.camera_required && method != VerificationMethod::Camera {
            return VerificationResult::rejected(
                method,
                snapshot,
                now,
                "camera verification required before this proof can be accepted",
            );
        }

        let sub_score = match method {
            VerificationMethod::Location => {
                let Some(sample) = snapshot.location else {
                    return VerificationResult::rejected(
                        method,
                        snapshot,
                        now,
                        "no location fix to cross-check",
                    );
                };
                if sample.horizontal_accuracy_m > self.params.location_accuracy_max_m {
                    return VerificationResult::rejected(
                        method,
                        snapshot,
                        now,
                        format!(
                            "accuracy {:.0}m exceeds the trusted limit",
                            sample.horizontal_accuracy_m
                        ),
                    );
                }
                if self.log.has_type_within(
                    SuspiciousActivityType::MotionLocationMismatch,
                    self.params.suspicious_lookback_secs,
                    now,
                ) {
                    return VerificationResult::rejected(
                        method,
                        snapshot,
                        now,
                        "motion/location mismatch active; location cannot be trusted",
                    );
                }
                1.0
            }
            VerificationMethod::Motion => {
                let Some(motion) = snapshot.motion else {
                    return VerificationResult::rejected(
                        method,
                        snapshot,
                        now,
                        "no motion data to cross-check",
                    );
                };
                if motion.steps_today > self.params.step_sanity_ceiling {
                    return VerificationResult::rejected(
                        method,
                        snapshot,
                        now,
                        format!("step count {} is an impossible reading", motion.steps_today),
                    );
                }
                1.0
            }
            VerificationMethod::Camera => {
                let Some(score) = snapshot.liveness_score else {
                    return VerificationResult::rejected(
                        method,
                        snapshot,
                        now,
                        "no liveness capture to evaluate",
                    );
                };
                if score < self.params.gate_liveness_min {
                    return VerificationResult::rejected(
                        method,
                        snapshot,
                        now,
                        format!("liveness score {score:.2} insufficient"),
                    );
                }
                // A live human on camera satisfies the escalation.
                self.camera_required = false;
                score
            }
            VerificationMethod::ScreenTime => 1.0,
        };

        let confidence = (self.integrity * sub_score).clamp(0.0, 1.0);
        VerificationResult {
            is_verified: true,
            confidence,
            method,
            snapshot,
            timestamp: now,
            notes: format!("integrity {:.2}, sub-score {sub_score:.2}", self.integrity),
        }
    }

    // ── Stats / events ───────────────────────────────────────────────────

    /// Aggregate counts and the current score for the stats surface.
    /// `is_monitoring` comes from the runtime layer that owns the timer.
    pub fn stats(&self, now: Timestamp, is_monitoring: bool) -> AntiCheatStats {
        AntiCheatStats {
            counts_by_type: self.log.counts_by_type(),
            counts_by_severity: self.log.counts_by_severity(),
            integrity_score: self.compute_integrity(now),
            camera_required: self.camera_required,
            is_monitoring,
        }
    }

    /// Take the accumulated events for broadcast.
    pub fn drain_events(&mut self) -> Vec<AntiCheatEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Read access to the activity log (stats, tests).
    pub fn log(&self) -> &ActivityLog {
        &self.log
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use circle_types::GeoPoint;
    use circle_verify::VerificationParams;

    fn ts(secs: u64) -> Timestamp {
        Timestamp::new(secs)
    }

    fn engine() -> AntiCheatEngine {
        AntiCheatEngine::new(EngineParams::circle_defaults(), ts(1000), 0)
    }

    fn sample_at(offset_m: f64, secs: u64) -> LocationSample {
        let lat = 40.0 + offset_m / 111_195.0;
        LocationSample::new(GeoPoint::new(lat, -73.0), 5.0, ts(secs))
    }

    fn moving(duration_secs: u64, steps: u32, secs: u64) -> MotionSnapshot {
        MotionSnapshot {
            is_moving: true,
            active_duration_secs: duration_secs,
            steps_today: steps,
            timestamp: ts(secs),
        }
    }

    fn location_challenge() -> Challenge {
        Challenge {
            id: 1,
            method: VerificationMethod::Location,
            params: VerificationParams::Location {
                target: GeoPoint::new(40.0, -73.0),
                radius_m: 50.0,
                min_dwell_secs: 0,
            },
            points_reward: 10,
            points_penalty: 5,
            starts_at: ts(0),
            ends_at: ts(10_000_000),
            is_active: true,
        }
    }

    fn camera_challenge() -> Challenge {
        Challenge {
            id: 2,
            method: VerificationMethod::Camera,
            params: VerificationParams::Camera,
            points_reward: 10,
            points_penalty: 5,
            starts_at: ts(0),
            ends_at: ts(10_000_000),
            is_active: true,
        }
    }

    #[test]
    fn clean_state_has_full_integrity() {
        let mut e = engine();
        e.run_checks(ts(1060), 60);
        assert_eq!(e.integrity_score(ts(1060)), 1.0);
        assert!(e.log().is_empty());
        assert!(!e.camera_required());
    }

    #[test]
    fn clock_jump_is_flagged_high_and_escalates() {
        let mut e = engine();
        // Wall clock advances 2 hours, uptime only 10 seconds.
        e.run_checks(ts(1000 + 7200), 10);

        assert!(e.log().has_type_within(
            SuspiciousActivityType::ClockTampering,
            3600,
            ts(1000 + 7200)
        ));
        assert!(e.camera_required());

        let events = e.drain_events();
        assert!(events
            .iter()
            .any(|ev| matches!(ev, AntiCheatEvent::CameraVerificationRequired { .. })));
    }

    #[test]
    fn consistent_clocks_are_not_flagged() {
        let mut e = engine();
        e.run_checks(ts(1000 + 7200), 7150); // 50s skew, inside tolerance
        assert!(e.log().is_empty());
    }

    #[test]
    fn rapid_jump_is_flagged_once_not_per_tick() {
        let mut e = engine();
        e.on_location_update(sample_at(0.0, 1000));
        // 600m in 10 seconds: 60 m/s.
        e.on_location_update(sample_at(600.0, 1010));

        e.run_checks(ts(1010), 10);
        e.run_checks(ts(1070), 70);
        e.run_checks(ts(1130), 130);

        let counts = e.log().counts_by_type();
        assert_eq!(counts[&SuspiciousActivityType::RapidLocationChange], 1);
        assert!(!counts.contains_key(&SuspiciousActivityType::ImpossibleMovement));
        assert!((e.integrity_score(ts(1130)) - 0.70).abs() < 1e-9);
    }

    #[test]
    fn impossible_speed_fires_both_speed_checks() {
        let mut e = engine();
        e.on_location_update(sample_at(0.0, 1000));
        e.run_checks(ts(1000), 0);
        // 250 m/s jump, then near-stationary.
        e.on_location_update(sample_at(2500.0, 1010));
        e.run_checks(ts(1010), 10);
        e.on_location_update(sample_at(2510.0, 1020));
        e.run_checks(ts(1020), 20);

        let counts = e.log().counts_by_type();
        assert_eq!(counts[&SuspiciousActivityType::RapidLocationChange], 1);
        assert_eq!(counts[&SuspiciousActivityType::ImpossibleMovement], 1);
    }

    #[test]
    fn walking_speed_is_never_flagged() {
        let mut e = engine();
        for i in 0..5u64 {
            // ~1.4 m/s
            e.on_location_update(sample_at(i as f64 * 84.0, 1000 + i * 60));
            e.run_checks(ts(1000 + i * 60), i * 60);
        }
        assert!(e.log().is_empty());
        assert_eq!(e.integrity_score(ts(1300)), 1.0);
    }

    #[test]
    fn sustained_motion_while_stationary_is_a_mismatch() {
        let mut e = engine();
        let now = 1000 + 700;
        // Samples all within a few meters across the window.
        e.on_location_update(sample_at(0.0, 1100));
        e.on_location_update(sample_at(2.0, 1400));
        e.on_location_update(sample_at(1.0, now));
        e.on_motion_update(moving(660, 4000, now));
        e.run_checks(ts(now), 700);

        assert!(e.log().has_type_within(
            SuspiciousActivityType::MotionLocationMismatch,
            3600,
            ts(now)
        ));
    }

    #[test]
    fn short_motion_episode_is_not_a_mismatch() {
        let mut e = engine();
        e.on_location_update(sample_at(0.0, 1100));
        e.on_location_update(sample_at(1.0, 1160));
        e.on_motion_update(moving(120, 500, 1160));
        e.run_checks(ts(1160), 160);
        assert!(e.log().is_empty());
    }

    #[test]
    fn coarse_fix_while_moving_is_inconsistent() {
        let mut e = engine();
        let coarse = LocationSample::new(GeoPoint::new(40.0, -73.0), 150.0, ts(1100));
        e.on_location_update(coarse);
        e.on_motion_update(moving(60, 500, 1100));
        e.run_checks(ts(1100), 100);

        assert!(e.log().has_type_within(
            SuspiciousActivityType::DataInconsistency,
            3600,
            ts(1100)
        ));
    }

    #[test]
    fn pattern_fires_above_threshold_and_does_not_feed_itself() {
        let mut e = engine();
        // Six medium records via repeated coarse-fix-while-moving ticks.
        for i in 0..6u64 {
            let t = 1100 + i * 60;
            e.on_location_update(LocationSample::new(
                GeoPoint::new(40.0, -73.0),
                150.0,
                ts(t),
            ));
            e.on_motion_update(moving(60, 500, t));
            e.run_checks(ts(t), t - 1000);
        }
        let now = ts(1100 + 6 * 60);
        let counts = e.log().counts_by_type();
        assert_eq!(counts[&SuspiciousActivityType::SuspiciousPattern], 1);
        assert!(e.camera_required());

        // More ticks do not add pattern records while one is in-window.
        e.run_checks(now, 500);
        e.run_checks(now.plus(60), 560);
        assert_eq!(
            e.log().counts_by_type()[&SuspiciousActivityType::SuspiciousPattern],
            1
        );
    }

    #[test]
    fn score_recovers_after_the_lookback_window() {
        let mut e = engine();
        e.on_location_update(sample_at(0.0, 1000));
        e.on_location_update(sample_at(600.0, 1010));
        e.run_checks(ts(1010), 10);
        assert!(e.integrity_score(ts(1010)) < 1.0);

        // An hour and a bit later, with nothing new flagged.
        let later = ts(1010 + 3700);
        e.run_checks(later, 3710);
        assert_eq!(e.integrity_score(later), 1.0);
    }

    #[test]
    fn gate_passes_clean_location_with_full_confidence() {
        let mut e = engine();
        e.on_location_update(sample_at(10.0, 1000));
        let result = e.verify_challenge_integrity(&location_challenge(), ts(1060), 60);
        assert!(result.is_verified);
        assert!((result.confidence - 1.0).abs() < 1e-9);
    }

    #[test]
    fn gate_rejects_after_rapid_jump_with_camera_note() {
        let mut e = engine();
        e.on_location_update(sample_at(0.0, 1000));
        e.on_location_update(sample_at(600.0, 1010));
        e.run_checks(ts(1010), 10);
        assert!(e.integrity_score(ts(1010)) <= 0.70);

        let result = e.verify_challenge_integrity(&location_challenge(), ts(1020), 20);
        assert!(!result.is_verified);
        assert_eq!(result.confidence, 0.0);
        assert!(result.notes.contains("camera verification"));
    }

    #[test]
    fn gate_rejects_on_too_many_recent_records() {
        let mut e = engine();
        // Three medium inconsistencies within the hour.
        for i in 0..3u64 {
            let t = 1100 + i * 60;
            e.on_location_update(LocationSample::new(
                GeoPoint::new(40.0, -73.0),
                150.0,
                ts(t),
            ));
            e.on_motion_update(moving(60, 500, t));
            e.run_checks(ts(t), t - 1000);
        }
        // Stop the condition so the verify-time pass adds no fourth record.
        e.on_motion_update(MotionSnapshot {
            is_moving: false,
            active_duration_secs: 0,
            steps_today: 500,
            timestamp: ts(1300),
        });

        let result = e.verify_challenge_integrity(&location_challenge(), ts(1320), 320);
        assert!(!result.is_verified);
        assert!(result.notes.contains("suspicious signals"));
    }

    #[test]
    fn gate_rejects_coarse_fix_for_location_method() {
        let mut e = engine();
        e.on_location_update(LocationSample::new(GeoPoint::new(40.0, -73.0), 80.0, ts(1000)));
        let result = e.verify_challenge_integrity(&location_challenge(), ts(1060), 60);
        assert!(!result.is_verified);
        assert!(result.notes.contains("accuracy"));
    }

    #[test]
    fn gate_rejects_impossible_step_reading() {
        let mut e = engine();
        e.on_motion_update(MotionSnapshot {
            is_moving: false,
            active_duration_secs: 0,
            steps_today: 80_000,
            timestamp: ts(1000),
        });
        let challenge = Challenge {
            id: 3,
            method: VerificationMethod::Motion,
            params: VerificationParams::Motion {
                target_steps: 1000,
                window: None,
                utc_offset_secs: 0,
            },
            points_reward: 10,
            points_penalty: 5,
            starts_at: ts(0),
            ends_at: ts(10_000_000),
            is_active: true,
        };
        let result = e.verify_challenge_integrity(&challenge, ts(1060), 60);
        assert!(!result.is_verified);
        assert!(result.notes.contains("impossible"));
    }

    #[test]
    fn passing_camera_verification_clears_the_escalation() {
        let mut e = engine();
        // Escalate via a rapid jump (flagged once, then quiet).
        e.on_location_update(sample_at(0.0, 1000));
        e.on_location_update(sample_at(600.0, 1010));
        e.run_checks(ts(1010), 10);
        assert!(e.camera_required());

        // Location attempts are refused while escalated; integrity is
        // 0.70 here, above the cutoff, so the camera latch is what
        // rejects.
        let rejected = e.verify_challenge_integrity(&location_challenge(), ts(1020), 20);
        assert!(!rejected.is_verified);
        assert!(rejected.notes.contains("camera verification"));

        // An hour later the record has aged out, and a live camera pass
        // clears the latch at full confidence.
        e.on_liveness_result(0.95);
        let camera = e.verify_challenge_integrity(&camera_challenge(), ts(1010 + 3700), 3710);
        assert!(camera.is_verified);
        assert!(!e.camera_required());
        assert!((camera.confidence - 0.95).abs() < 1e-9);
    }

    #[test]
    fn camera_attempt_with_weak_liveness_keeps_the_latch() {
        let mut e = engine();
        e.on_location_update(sample_at(0.0, 1000));
        e.on_location_update(sample_at(600.0, 1010));
        e.run_checks(ts(1010), 10);
        assert!(e.camera_required());

        e.on_liveness_result(0.4);
        let result = e.verify_challenge_integrity(&camera_challenge(), ts(1010 + 3700), 3710);
        assert!(!result.is_verified);
        assert!(e.camera_required());
    }

    #[test]
    fn history_is_bounded() {
        let mut e = engine();
        for i in 0..100u64 {
            e.on_location_update(sample_at(i as f64, 1000 + i));
        }
        assert_eq!(e.snapshot().location.unwrap().timestamp, ts(1099));
        assert!(e.log().is_empty());
        // History capped at the configured length.
        let params = EngineParams::circle_defaults();
        assert!(e.history.len() <= params.location_history_len);
    }
}
