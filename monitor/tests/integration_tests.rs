//! End-to-end tests driving the monitor through the public surface only:
//! signal callbacks in, verification results and events out.

use circle_anticheat::{EngineStore, SuspiciousActivityType};
use circle_monitor::{EngineEvent, Monitor, MonitorConfig};
use circle_nullables::{NullClock, NullStore};
use circle_types::{Clock, GeoPoint, LocationSample, MotionSnapshot, Timestamp, UserId};
use circle_verify::{CameraFrame, Challenge, VerificationMethod, VerificationParams};
use std::sync::Arc;

const T0: u64 = 100_000;

fn setup() -> (Monitor, Arc<NullClock>, Arc<NullStore>) {
    let clock = Arc::new(NullClock::new(T0));
    let store = Arc::new(NullStore::new());
    let monitor = Monitor::new(
        &MonitorConfig::default(),
        Arc::clone(&clock) as Arc<dyn Clock>,
        Arc::clone(&store) as Arc<dyn EngineStore>,
    );
    (monitor, clock, store)
}

fn local() -> UserId {
    UserId::from("local")
}

fn gym() -> GeoPoint {
    GeoPoint::new(40.7580, -73.9855)
}

fn offset_north(point: GeoPoint, meters: f64) -> GeoPoint {
    GeoPoint::new(point.lat + meters / 111_195.0, point.lon)
}

fn sample(point: GeoPoint, at: u64) -> LocationSample {
    LocationSample::new(point, 5.0, Timestamp::new(at))
}

fn gym_challenge(min_dwell_secs: u64) -> Challenge {
    Challenge {
        id: 1,
        method: VerificationMethod::Location,
        params: VerificationParams::Location {
            target: gym(),
            radius_m: 50.0,
            min_dwell_secs,
        },
        points_reward: 10,
        points_penalty: 5,
        starts_at: Timestamp::new(0),
        ends_at: Timestamp::new(10_000_000),
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
        starts_at: Timestamp::new(0),
        ends_at: Timestamp::new(10_000_000),
        is_active: true,
    }
}

fn motion_challenge(target_steps: u32) -> Challenge {
    Challenge {
        id: 3,
        method: VerificationMethod::Motion,
        params: VerificationParams::Motion {
            target_steps,
            window: None,
            utc_offset_secs: 0,
        },
        points_reward: 10,
        points_penalty: 5,
        starts_at: Timestamp::new(0),
        ends_at: Timestamp::new(10_000_000),
        is_active: true,
    }
}

fn screen_time_challenge(max_minutes: u32) -> Challenge {
    Challenge {
        id: 4,
        method: VerificationMethod::ScreenTime,
        params: VerificationParams::ScreenTime { max_minutes },
        points_reward: 10,
        points_penalty: 5,
        starts_at: Timestamp::new(0),
        ends_at: Timestamp::new(10_000_000),
        is_active: true,
    }
}

fn frames(count: usize, score: f64) -> Vec<CameraFrame> {
    (0..count)
        .map(|i| CameraFrame {
            bytes: vec![i as u8; 32],
            score,
        })
        .collect()
}

// ── Scenario: a clean gym visit ────────────────────────────────────────

#[tokio::test]
async fn clean_gym_visit_verifies_with_full_confidence() {
    let (monitor, clock, store) = setup();
    let challenge = gym_challenge(1200);

    monitor
        .on_location_update(&local(), sample(offset_north(gym(), 10.0), T0))
        .await;

    // First attempt: inside the fence but no dwell yet.
    let early = monitor.verify_challenge(&challenge).await.expect("pipeline");
    assert!(!early.is_verified);
    assert!(early.notes.contains("dwell"));

    // Stay put for 22 minutes.
    clock.advance(1320);
    monitor
        .on_location_update(&local(), sample(offset_north(gym(), 12.0), T0 + 1320))
        .await;

    let result = monitor.verify_challenge(&challenge).await.expect("pipeline");
    assert!(result.is_verified);
    assert!((result.confidence - 1.0).abs() < 1e-9);

    // The credited target is now in cooldown.
    let repeat = monitor.verify_challenge(&challenge).await.expect("pipeline");
    assert!(!repeat.is_verified);
    assert!(repeat.notes.contains("credited"));

    assert_eq!(store.saved_results().len(), 3);
    assert!(store.saved_activities().is_empty());
}

#[tokio::test]
async fn dwell_is_not_credited_across_an_observed_absence() {
    let (monitor, clock, _store) = setup();
    let challenge = gym_challenge(1200);

    monitor
        .on_location_update(&local(), sample(offset_north(gym(), 10.0), T0))
        .await;
    let early = monitor.verify_challenge(&challenge).await.expect("pipeline");
    assert!(!early.is_verified);

    // Walks 5km away ten minutes in; the fence episode resets.
    clock.advance(600);
    monitor
        .on_location_update(&local(), sample(offset_north(gym(), 5000.0), T0 + 600))
        .await;

    // Back inside 25 minutes after the first attempt. Total elapsed time
    // exceeds the dwell requirement, but the stay was not continuous.
    clock.advance(900);
    monitor
        .on_location_update(&local(), sample(gym(), T0 + 1500))
        .await;
    let after_return = monitor.verify_challenge(&challenge).await.expect("pipeline");
    assert!(!after_return.is_verified);
    assert!(after_return.notes.contains("dwell"));

    // A full continuous stay counted from the return does verify.
    clock.advance(1300);
    monitor
        .on_location_update(&local(), sample(offset_north(gym(), 8.0), T0 + 2800))
        .await;
    let result = monitor.verify_challenge(&challenge).await.expect("pipeline");
    assert!(result.is_verified);
}

// ── Scenario: a teleport jump ──────────────────────────────────────────

#[tokio::test]
async fn teleport_blocks_location_until_a_camera_pass() {
    let (monitor, clock, store) = setup();
    let mut events = monitor.subscribe();

    // 600m in 10 seconds: 60 m/s.
    monitor
        .on_location_update(&local(), sample(offset_north(gym(), 600.0), T0))
        .await;
    clock.advance(10);
    monitor
        .on_location_update(&local(), sample(gym(), T0 + 10))
        .await;

    let rejected = monitor
        .verify_challenge(&gym_challenge(0))
        .await
        .expect("pipeline");
    assert!(!rejected.is_verified);
    assert!(rejected.notes.contains("camera verification"));

    let stats = monitor.stats().await;
    assert!(stats.camera_required);
    assert!((stats.integrity_score - 0.70).abs() < 1e-9);
    assert!(store
        .saved_activities()
        .iter()
        .any(|a| a.activity_type == SuspiciousActivityType::RapidLocationChange));

    // The escalation was broadcast.
    let mut saw_escalation = false;
    while let Ok(event) = events.try_recv() {
        if matches!(event, EngineEvent::CameraVerificationRequired { .. }) {
            saw_escalation = true;
        }
    }
    assert!(saw_escalation);

    // A live camera capture satisfies the escalation...
    let evidence = monitor
        .capture_liveness(async { frames(5, 0.9) })
        .await
        .expect("evidence");
    assert!((evidence.score - 0.9).abs() < 1e-9);

    let camera = monitor
        .verify_challenge(&camera_challenge())
        .await
        .expect("pipeline");
    assert!(camera.is_verified);
    assert!((camera.confidence - 0.63).abs() < 1e-9);
    assert!(!monitor.stats().await.camera_required);

    // ...and location works again, capped by the still-degraded score.
    let location = monitor
        .verify_challenge(&gym_challenge(0))
        .await
        .expect("pipeline");
    assert!(location.is_verified);
    assert!((location.confidence - 0.70).abs() < 1e-9);
}

// ── Scenario: a manual clock adjustment ────────────────────────────────

#[tokio::test]
async fn clock_jump_is_caught_and_escalates() {
    let (monitor, clock, store) = setup();
    monitor
        .on_motion_update(MotionSnapshot {
            is_moving: false,
            active_duration_secs: 0,
            steps_today: 5000,
            timestamp: Timestamp::new(T0),
        })
        .await;

    // Ten real seconds pass while the wall clock jumps two hours ahead.
    clock.advance(10);
    clock.skew_wall(7190);

    let result = monitor
        .verify_challenge(&motion_challenge(1000))
        .await
        .expect("pipeline");
    assert!(!result.is_verified);
    assert!(result.notes.contains("camera verification"));

    let stats = monitor.stats().await;
    assert!(stats.camera_required);
    assert_eq!(
        stats.counts_by_type[&SuspiciousActivityType::ClockTampering],
        1
    );
    assert!(store
        .saved_activities()
        .iter()
        .any(|a| a.activity_type == SuspiciousActivityType::ClockTampering));

    // The gate-only surface refuses too: the drift is still present, so a
    // second record lands and drags the score below the cutoff.
    let gate_only = monitor.verify_challenge_integrity(&motion_challenge(1000)).await;
    assert!(!gate_only.is_verified);
}

// ── Hangout lifecycle through the monitor ──────────────────────────────

#[tokio::test]
async fn sustained_proximity_becomes_a_session_and_decays() {
    let (monitor, clock, _store) = setup();
    let mut events = monitor.subscribe();
    let alice = UserId::from("alice");
    let bob = UserId::from("bob");

    // Half an hour of samples every five minutes, 20m apart.
    for step in 0..=6u64 {
        let t = T0 + step * 300;
        monitor
            .on_location_update(&alice, sample(gym(), t))
            .await;
        monitor
            .on_location_update(&bob, sample(offset_north(gym(), 20.0), t))
            .await;
        if step < 6 {
            clock.advance(300);
        }
    }

    let active = monitor.active_hangouts().await;
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].started_at, Timestamp::new(T0));
    let session_id = active[0].id;

    // Silence past the staleness window ends the session.
    clock.advance(700);
    monitor
        .on_location_update(&alice, sample(gym(), T0 + 2500))
        .await;
    assert!(monitor.active_hangouts().await.is_empty());

    // The pair reappears inside the merge gap: same session, reopened.
    clock.advance(100);
    monitor
        .on_location_update(&alice, sample(gym(), T0 + 2600))
        .await;
    monitor
        .on_location_update(&bob, sample(offset_north(gym(), 20.0), T0 + 2600))
        .await;
    let reopened = monitor.active_hangouts().await;
    assert_eq!(reopened.len(), 1);
    assert_eq!(reopened[0].id, session_id, "one continuous session");

    let mut started = 0;
    let mut ended = 0;
    let mut resumed = 0;
    while let Ok(event) = events.try_recv() {
        match event {
            EngineEvent::Hangout(circle_hangout::HangoutEvent::SessionStarted { .. }) => {
                started += 1
            }
            EngineEvent::Hangout(circle_hangout::HangoutEvent::SessionEnded { .. }) => ended += 1,
            EngineEvent::Hangout(circle_hangout::HangoutEvent::SessionResumed { .. }) => {
                resumed += 1
            }
            _ => {}
        }
    }
    assert_eq!(started, 1);
    assert_eq!(ended, 1);
    assert_eq!(resumed, 1);
}

// ── Persistence is fire-and-forget ─────────────────────────────────────

#[tokio::test]
async fn store_failure_never_blocks_verification() {
    let (monitor, _clock, store) = setup();
    store.set_failing(true);

    monitor
        .on_location_update(&local(), sample(gym(), T0))
        .await;
    let result = monitor
        .verify_challenge(&gym_challenge(0))
        .await
        .expect("pipeline");

    assert!(result.is_verified);
    assert!(store.saved_results().is_empty());
}

// ── Screen time fails closed end to end ────────────────────────────────

#[tokio::test]
async fn screen_time_without_the_capability_fails_closed() {
    let (monitor, _clock, _store) = setup();

    monitor.set_screen_time(false, None).await;
    let denied = monitor
        .verify_challenge(&screen_time_challenge(60))
        .await
        .expect("pipeline");
    assert!(!denied.is_verified);
    assert!(denied.notes.contains("capability"));

    monitor.set_screen_time(true, Some(30)).await;
    let granted = monitor
        .verify_challenge(&screen_time_challenge(60))
        .await
        .expect("pipeline");
    assert!(granted.is_verified);
    assert!((granted.confidence - 1.0).abs() < 1e-9);
}
