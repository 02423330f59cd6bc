//! The verification monitor — owns the engines and the periodic loop.
//!
//! One `Monitor` per device. Signal callbacks and verification attempts
//! funnel through a single mutex-guarded core, so every decision sees a
//! consistent view of the engines. The background loop only runs the
//! periodic battery; all state mutation happens through the same core.

use crate::config::MonitorConfig;
use crate::error::MonitorError;
use crate::events::{EngineEvent, EventBus};
use crate::shutdown::ShutdownController;
use circle_anticheat::{AntiCheatEngine, AntiCheatEvent, AntiCheatStats, EngineStore};
use circle_hangout::{HangoutSession, HangoutTracker};
use circle_types::{Clock, EngineParams, LocationSample, MotionSnapshot, UserId};
use circle_verify::{
    run_verifier, CameraFrame, Challenge, GeofenceTracker, LivenessEvidence, VerificationParams,
    VerificationResult,
};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;

/// Engine state guarded by one lock.
struct Core {
    anticheat: AntiCheatEngine,
    hangouts: HangoutTracker,
    geofences: GeofenceTracker,
    params: EngineParams,
}

/// The device-local verification monitor.
pub struct Monitor {
    core: Arc<Mutex<Core>>,
    clock: Arc<dyn Clock>,
    store: Arc<dyn EngineStore>,
    events: EventBus,
    shutdown: ShutdownController,
    local_user: UserId,
    params: EngineParams,
    /// Handle of the running tick loop; `None` while stopped.
    task: Option<JoinHandle<()>>,
}

impl Monitor {
    pub fn new(
        config: &MonitorConfig,
        clock: Arc<dyn Clock>,
        store: Arc<dyn EngineStore>,
    ) -> Self {
        let params = config.params.clone();
        let now = clock.now();
        let uptime = clock.uptime_secs();
        let core = Core {
            anticheat: AntiCheatEngine::new(params.clone(), now, uptime),
            hangouts: HangoutTracker::new(params.clone()),
            geofences: GeofenceTracker::new(),
            params: params.clone(),
        };
        Self {
            core: Arc::new(Mutex::new(core)),
            clock,
            store,
            events: EventBus::default(),
            shutdown: ShutdownController::new(),
            local_user: UserId::new(config.local_user.clone()),
            params,
            task: None,
        }
    }

    /// Subscribe to engine events (detections, escalations, hangouts,
    /// verification outcomes).
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.events.subscribe()
    }

    /// Whether the periodic loop is running.
    pub fn is_monitoring(&self) -> bool {
        self.task.is_some()
    }

    // ── Lifecycle ────────────────────────────────────────────────────────

    /// Start the periodic monitoring loop. Idempotent: a second call
    /// while running is a no-op.
    pub fn start(&mut self) {
        if self.task.is_some() {
            tracing::debug!("monitor already running");
            return;
        }
        let core = Arc::clone(&self.core);
        let clock = Arc::clone(&self.clock);
        let store = Arc::clone(&self.store);
        let events = self.events.clone();
        let mut shutdown_rx = self.shutdown.subscribe();
        let tick = Duration::from_secs(self.params.monitor_tick_secs);

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick);
            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        tracing::debug!("monitoring loop shutting down");
                        break;
                    }
                    _ = interval.tick() => {
                        let now = clock.now();
                        let uptime = clock.uptime_secs();
                        let mut core = core.lock().await;
                        core.anticheat.run_checks(now, uptime);
                        core.hangouts.expire_stale(now);
                        flush_engine_events(&mut core, store.as_ref(), &events);
                    }
                }
            }
        });
        self.task = Some(handle);
        tracing::info!(tick_secs = self.params.monitor_tick_secs, "monitoring started");
    }

    /// Stop the periodic loop and wait for it to exit. Idempotent.
    pub async fn stop(&mut self) {
        let Some(handle) = self.task.take() else {
            return;
        };
        self.shutdown.shutdown();
        let _ = handle.await;
        tracing::info!("monitoring stopped");
    }

    // ── Signal intake ────────────────────────────────────────────────────

    /// Feed a location fix. The local user's fixes drive the anti-cheat
    /// movement checks and keep geofence dwell episodes honest between
    /// verification attempts; everyone's fixes drive hangout detection.
    pub async fn on_location_update(&self, user: &UserId, sample: LocationSample) {
        let now = self.clock.now();
        let mut core = self.core.lock().await;
        if *user == self.local_user {
            core.anticheat.on_location_update(sample);
            core.geofences.observe_sample(&sample, now);
        }
        core.hangouts.update_location(user, sample, now);
        flush_engine_events(&mut core, self.store.as_ref(), &self.events);
    }

    /// Feed the latest motion-provider reading.
    pub async fn on_motion_update(&self, motion: MotionSnapshot) {
        self.core.lock().await.anticheat.on_motion_update(motion);
    }

    /// Update the screen-time capability state and today's reading.
    pub async fn set_screen_time(&self, available: bool, minutes: Option<u32>) {
        self.core
            .lock()
            .await
            .anticheat
            .set_screen_time(available, minutes);
    }

    /// Run a camera liveness capture with the configured time budget.
    ///
    /// `capture` resolves to the frames the camera pipeline produced.
    /// Returns `None` — and records nothing — on timeout, on too few
    /// frames, or on an empty capture; a half-finished capture must not
    /// feed the engine a score.
    pub async fn capture_liveness<F>(&self, capture: F) -> Option<LivenessEvidence>
    where
        F: Future<Output = Vec<CameraFrame>>,
    {
        let window = Duration::from_secs(self.params.camera_capture_window_secs);
        let frames = match tokio::time::timeout(window, capture).await {
            Ok(frames) => frames,
            Err(_) => {
                tracing::warn!("liveness capture timed out");
                return None;
            }
        };
        if frames.len() < self.params.camera_frame_count {
            tracing::warn!(
                got = frames.len(),
                need = self.params.camera_frame_count,
                "liveness capture incomplete"
            );
            return None;
        }
        let evidence = LivenessEvidence::from_frames(&frames, self.clock.now())?;
        self.core
            .lock()
            .await
            .anticheat
            .on_liveness_result(evidence.score);
        Some(evidence)
    }

    // ── Verification pipeline ────────────────────────────────────────────

    /// Run one verification attempt end to end: method verifier first,
    /// then the anti-cheat integrity gate. A geofence credit is recorded
    /// only when the final result passes, so a vetoed attempt does not
    /// burn the target's cooldown. The result is persisted fire-and-forget
    /// and broadcast before returning.
    pub async fn verify_challenge(
        &self,
        challenge: &Challenge,
    ) -> Result<VerificationResult, MonitorError> {
        let now = self.clock.now();
        let uptime = self.clock.uptime_secs();
        let mut core = self.core.lock().await;
        let snapshot = core.anticheat.snapshot();

        let result = {
            let Core {
                anticheat,
                geofences,
                params,
                ..
            } = &mut *core;
            let outcome = run_verifier(challenge, &snapshot, geofences, params, now)?;
            if !outcome.passed {
                VerificationResult::rejected(challenge.method, snapshot, now, outcome.note)
            } else {
                anticheat.verify_challenge_integrity(challenge, now, uptime)
            }
        };

        if result.is_verified {
            if let VerificationParams::Location { target, .. } = &challenge.params {
                core.geofences.record_credit(target, now);
            }
        }

        tracing::info!(
            challenge = challenge.id,
            method = %challenge.method,
            verified = result.is_verified,
            confidence = result.confidence,
            "verification attempt completed"
        );
        if let Err(e) = self.store.save_result(&result) {
            tracing::warn!(error = %e, "failed to persist verification result");
        }
        self.events.publish(EngineEvent::VerificationCompleted {
            result: result.clone(),
        });
        flush_engine_events(&mut core, self.store.as_ref(), &self.events);
        Ok(result)
    }

    /// Run only the anti-cheat integrity gate for a challenge, without the
    /// method verifier. Used by flows that need the trust decision alone
    /// (e.g. pre-flighting whether an attempt is worth starting).
    pub async fn verify_challenge_integrity(&self, challenge: &Challenge) -> VerificationResult {
        let now = self.clock.now();
        let uptime = self.clock.uptime_secs();
        let mut core = self.core.lock().await;
        let result = core.anticheat.verify_challenge_integrity(challenge, now, uptime);
        if let Err(e) = self.store.save_result(&result) {
            tracing::warn!(error = %e, "failed to persist verification result");
        }
        self.events.publish(EngineEvent::VerificationCompleted {
            result: result.clone(),
        });
        flush_engine_events(&mut core, self.store.as_ref(), &self.events);
        result
    }

    // ── Introspection ────────────────────────────────────────────────────

    /// Current anti-cheat stats, including whether the loop is running.
    pub async fn stats(&self) -> AntiCheatStats {
        let now = self.clock.now();
        self.core
            .lock()
            .await
            .anticheat
            .stats(now, self.task.is_some())
    }

    /// Currently active hangout sessions.
    pub async fn active_hangouts(&self) -> Vec<HangoutSession> {
        self.core
            .lock()
            .await
            .hangouts
            .active_sessions()
            .into_iter()
            .cloned()
            .collect()
    }

    /// Sessions that ended and survived the merge gap.
    pub async fn hangout_history(&self) -> Vec<HangoutSession> {
        self.core.lock().await.hangouts.finished_sessions().to_vec()
    }
}

/// Drain engine events: persist detections (fire-and-forget) and fan
/// everything out on the bus.
fn flush_engine_events(core: &mut Core, store: &dyn EngineStore, events: &EventBus) {
    for event in core.anticheat.drain_events() {
        match event {
            AntiCheatEvent::SuspiciousActivityDetected { activity } => {
                if let Err(e) = store.save_activity(&activity) {
                    tracing::warn!(error = %e, "failed to persist suspicious activity");
                }
                events.publish(EngineEvent::SuspiciousActivity { activity });
            }
            AntiCheatEvent::CameraVerificationRequired { reason } => {
                events.publish(EngineEvent::CameraVerificationRequired { reason });
            }
        }
    }
    for event in core.hangouts.drain_events() {
        events.publish(EngineEvent::Hangout(event));
    }
}
