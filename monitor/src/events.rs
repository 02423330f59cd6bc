//! Engine event bus.
//!
//! Detections, escalations, hangout transitions, and verification
//! outcomes are fanned out over a `tokio::sync::broadcast` channel so the
//! UI and notification layers can react without polling. Publishing never
//! blocks; with no subscribers the event is simply dropped.

use circle_anticheat::SuspiciousActivity;
use circle_hangout::HangoutEvent;
use circle_verify::VerificationResult;
use tokio::sync::broadcast;

/// Everything the engine reports outward.
#[derive(Clone, Debug)]
pub enum EngineEvent {
    SuspiciousActivity { activity: SuspiciousActivity },
    CameraVerificationRequired { reason: String },
    Hangout(HangoutEvent),
    VerificationCompleted { result: VerificationResult },
}

/// Broadcast fan-out for [`EngineEvent`]s.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<EngineEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.tx.subscribe()
    }

    /// Fire-and-forget publish; an error just means nobody is listening.
    pub fn publish(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}
