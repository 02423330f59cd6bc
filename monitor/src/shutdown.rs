//! Graceful shutdown signalling for the monitoring loop.

use tokio::sync::broadcast;

/// Coordinates shutdown of the monitor's background tasks.
///
/// Tasks call [`subscribe`](Self::subscribe) to get a receiver, then
/// `select!` on it alongside their main loop. Triggering shutdown
/// notifies every receiver. Receivers only see signals sent after they
/// subscribed, so the controller can be reused across stop/start cycles.
pub struct ShutdownController {
    tx: broadcast::Sender<()>,
}

impl ShutdownController {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Get a receiver that will be notified on shutdown.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Trigger shutdown.
    pub fn shutdown(&self) {
        let _ = self.tx.send(());
    }
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}
