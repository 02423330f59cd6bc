//! Geofence dwell and cooldown tracking.
//!
//! Dwell is continuous: leaving the fence resets the episode, including
//! between verification attempts — a fence observed once stays tracked,
//! and every routine location sample is held against it until the
//! challenge's activity window closes. Credits are keyed by the target
//! coordinate (not the challenge), so two challenges pointing at the same
//! spot cannot double-claim one visit.

use crate::challenge::{Challenge, VerificationParams};
use circle_types::{GeoPoint, LocationSample, Timestamp};
use std::collections::HashMap;

/// A location challenge's fence, remembered across attempts.
#[derive(Clone, Copy, Debug)]
struct TrackedFence {
    target: GeoPoint,
    radius_m: f64,
    /// End of the challenge's activity window; the fence is dropped after.
    ends_at: Timestamp,
}

/// Tracks per-challenge dwell episodes and per-target credit cooldowns.
pub struct GeofenceTracker {
    /// Challenge id → fence, registered on first observation.
    tracked: HashMap<u64, TrackedFence>,
    /// Challenge id → when the current continuous inside-episode began.
    inside_since: HashMap<u64, Timestamp>,
    /// Quantized target coordinate → last credit time.
    last_credit: HashMap<String, Timestamp>,
}

impl GeofenceTracker {
    pub fn new() -> Self {
        Self {
            tracked: HashMap::new(),
            inside_since: HashMap::new(),
            last_credit: HashMap::new(),
        }
    }

    /// Feed a location sample for one location challenge, registering its
    /// fence and updating the dwell episode. Non-location challenges are
    /// ignored.
    pub fn observe(&mut self, challenge: &Challenge, sample: &LocationSample, now: Timestamp) {
        let VerificationParams::Location {
            target, radius_m, ..
        } = &challenge.params
        else {
            return;
        };
        self.tracked.insert(
            challenge.id,
            TrackedFence {
                target: *target,
                radius_m: *radius_m,
                ends_at: challenge.ends_at,
            },
        );

        let inside = sample.point.distance_m(target) <= *radius_m;
        if inside {
            self.inside_since.entry(challenge.id).or_insert(now);
        } else {
            self.inside_since.remove(&challenge.id);
        }
    }

    /// Feed a routine location sample to every tracked fence.
    ///
    /// This is what makes dwell honest between attempts: a sample outside
    /// a fence resets that fence's episode even when nobody is verifying
    /// right now. Fences whose activity window has closed are dropped.
    pub fn observe_sample(&mut self, sample: &LocationSample, now: Timestamp) {
        let expired: Vec<u64> = self
            .tracked
            .iter()
            .filter(|(_, fence)| now > fence.ends_at)
            .map(|(id, _)| *id)
            .collect();
        for id in expired {
            self.tracked.remove(&id);
            self.inside_since.remove(&id);
        }

        for (id, fence) in &self.tracked {
            if sample.point.distance_m(&fence.target) <= fence.radius_m {
                self.inside_since.entry(*id).or_insert(now);
            } else {
                self.inside_since.remove(id);
            }
        }
    }

    /// Seconds of the current continuous inside-episode for a challenge.
    pub fn dwell_secs(&self, challenge_id: u64, now: Timestamp) -> u64 {
        self.inside_since
            .get(&challenge_id)
            .map(|since| since.elapsed_since(now))
            .unwrap_or(0)
    }

    /// Whether a credit for this target is still inside the cooldown.
    pub fn in_cooldown(&self, target: &GeoPoint, cooldown_secs: u64, now: Timestamp) -> bool {
        self.last_credit
            .get(&Self::target_key(target))
            .map(|at| !at.has_expired(cooldown_secs, now))
            .unwrap_or(false)
    }

    /// Record a credited visit for a target. Called only after the final
    /// (gate-intersected) result passes, so a vetoed attempt does not burn
    /// the cooldown.
    pub fn record_credit(&mut self, target: &GeoPoint, now: Timestamp) {
        self.last_credit.insert(Self::target_key(target), now);
    }

    /// ~11m quantization: the same venue maps to the same key across
    /// challenges even with slightly different stored coordinates.
    fn target_key(target: &GeoPoint) -> String {
        format!("{:.4},{:.4}", target.lat, target.lon)
    }
}

impl Default for GeofenceTracker {
    fn default() -> Self {
        Self::new()
    }
}
