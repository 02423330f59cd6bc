//! Per-method verification decision procedures.

use crate::challenge::{Challenge, VerificationParams};
use crate::error::VerifyError;
use crate::geofence::GeofenceTracker;
use crate::method::VerificationMethod;
use crate::outcomes::VerifierOutcome;
use circle_types::{EngineParams, SignalSnapshot, Timestamp};

/// Run the verifier for a challenge against the current signal snapshot.
///
/// Returns the raw method outcome; the caller intersects it with the
/// anti-cheat integrity gate before producing a final result. `Err` is
/// reserved for caller misuse — a failed verification is an `Ok` outcome
/// with `passed == false` and a reason note.
pub fn run_verifier(
    challenge: &Challenge,
    snapshot: &SignalSnapshot,
    geofences: &mut GeofenceTracker,
    params: &EngineParams,
    now: Timestamp,
) -> Result<VerifierOutcome, VerifyError> {
    if !challenge.is_active {
        return Err(VerifyError::ChallengeInactive(challenge.id));
    }
    if !challenge.window_contains(now) {
        return Ok(VerifierOutcome::fail("outside the challenge activity window"));
    }

    let outcome = match &challenge.params {
        VerificationParams::Location {
            target,
            radius_m,
            min_dwell_secs,
        } => {
            expect_method(challenge, VerificationMethod::Location)?;
            verify_location(
                challenge,
                snapshot,
                geofences,
                params,
                now,
                target,
                *radius_m,
                *min_dwell_secs,
            )
        }
        VerificationParams::Motion {
            target_steps,
            window,
            utc_offset_secs,
        } => {
            expect_method(challenge, VerificationMethod::Motion)?;
            verify_motion(snapshot, params, now, *target_steps, window, *utc_offset_secs)
        }
        VerificationParams::ScreenTime { max_minutes } => {
            expect_method(challenge, VerificationMethod::ScreenTime)?;
            verify_screen_time(snapshot, *max_minutes)
        }
        VerificationParams::Camera => {
            expect_method(challenge, VerificationMethod::Camera)?;
            verify_camera(snapshot, params)
        }
    };

    tracing::debug!(
        challenge = challenge.id,
        method = %challenge.method,
        passed = outcome.passed,
        note = %outcome.note,
        "verifier outcome"
    );
    Ok(outcome)
}

fn expect_method(challenge: &Challenge, expected: VerificationMethod) -> Result<(), VerifyError> {
    if challenge.method == expected {
        Ok(())
    } else {
        Err(VerifyError::MethodMismatch {
            id: challenge.id,
            expected: expected.to_string(),
            got: challenge.method.to_string(),
        })
    }
}

#[allow(clippy::too_many_arguments)]
fn verify_location(
    challenge: &Challenge,
    snapshot: &SignalSnapshot,
    geofences: &mut GeofenceTracker,
    params: &EngineParams,
    now: Timestamp,
    target: &circle_types::GeoPoint,
    radius_m: f64,
    min_dwell_secs: u64,
) -> VerifierOutcome {
    let Some(sample) = snapshot.location else {
        return VerifierOutcome::fail("no location fix available");
    };
    if sample.horizontal_accuracy_m > params.location_accuracy_max_m {
        return VerifierOutcome::fail(format!(
            "location accuracy {:.0}m too coarse to trust (limit {:.0}m)",
            sample.horizontal_accuracy_m, params.location_accuracy_max_m
        ));
    }

    geofences.observe(challenge, &sample, now);

    let distance_m = sample.point.distance_m(target);
    if distance_m > radius_m {
        return VerifierOutcome::fail(format!(
            "{distance_m:.0}m from target, outside {radius_m:.0}m geofence"
        ));
    }

    let dwell = geofences.dwell_secs(challenge.id, now);
    if dwell < min_dwell_secs {
        return VerifierOutcome::fail(format!(
            "dwell {dwell}s of required {min_dwell_secs}s"
        ));
    }

    if geofences.in_cooldown(target, params.geofence_cooldown_secs, now) {
        return VerifierOutcome::fail("this location was already credited recently");
    }

    VerifierOutcome::pass(
        1.0,
        format!("inside geofence ({distance_m:.0}m from target, dwell {dwell}s)"),
    )
}

fn verify_motion(
    snapshot: &SignalSnapshot,
    params: &EngineParams,
    now: Timestamp,
    target_steps: u32,
    window: &Option<crate::challenge::TimeOfDayWindow>,
    utc_offset_secs: i64,
) -> VerifierOutcome {
    let Some(motion) = snapshot.motion else {
        return VerifierOutcome::fail("no motion data available");
    };
    if let Some(window) = window {
        if !window.contains(now, utc_offset_secs) {
            return VerifierOutcome::fail(format!(
                "outside the {}:00–{}:00 window",
                window.start_hour, window.end_hour
            ));
        }
    }
    // An impossible reading is a failure, never a success — the anti-cheat
    // engine separately flags it as suspicious.
    if motion.steps_today > params.step_sanity_ceiling {
        return VerifierOutcome::fail(format!(
            "step count {} exceeds the plausible daily ceiling ({})",
            motion.steps_today, params.step_sanity_ceiling
        ));
    }
    if motion.steps_today < target_steps {
        return VerifierOutcome::fail(format!(
            "{} steps of required {}",
            motion.steps_today, target_steps
        ));
    }
    VerifierOutcome::pass(1.0, format!("{} steps recorded", motion.steps_today))
}

fn verify_screen_time(snapshot: &SignalSnapshot, max_minutes: u32) -> VerifierOutcome {
    // Fail closed, with a note the UI can use to offer a fallback flow.
    if !snapshot.screen_time_available {
        return VerifierOutcome::fail(
            "screen-time tracking capability unavailable; cannot verify this challenge",
        );
    }
    let Some(minutes) = snapshot.screen_time_minutes else {
        return VerifierOutcome::fail("no screen-time reading available yet");
    };
    if minutes > max_minutes {
        return VerifierOutcome::fail(format!(
            "{minutes} screen minutes exceeds the {max_minutes}-minute limit"
        ));
    }
    VerifierOutcome::pass(1.0, format!("{minutes} screen minutes, within limit"))
}

fn verify_camera(snapshot: &SignalSnapshot, params: &EngineParams) -> VerifierOutcome {
    let Some(score) = snapshot.liveness_score else {
        return VerifierOutcome::fail("no liveness capture available");
    };
    if score < params.gate_liveness_min {
        return VerifierOutcome::fail(format!(
            "liveness score {score:.2} below the {:.2} threshold",
            params.gate_liveness_min
        ));
    }
    VerifierOutcome::pass(score, format!("liveness score {score:.2}"))
}
