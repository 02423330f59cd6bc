//! The anti-cheat engine.
//!
//! A continuously running monitor cross-validates the location, motion,
//! clock, and camera signals. Each monitoring tick runs a fixed battery of
//! consistency checks; detections land in a bounded suspicious-activity
//! log, and a decaying integrity score summarizes the trailing window.
//! Score and log together gate every verification attempt — and any
//! high-severity detection escalates to camera liveness before further
//! proofs are accepted.
//!
//! The engine is a deterrent, not a proof system: everything runs
//! on-device, so the worst in-engine consequence is repeated escalation.
//! There is no ban state, and the score self-heals as flagged windows age
//! out of the lookback.

pub mod activity;
pub mod engine;
pub mod persist;

pub use activity::{ActivityLog, Severity, SuspiciousActivity, SuspiciousActivityType};
pub use engine::{AntiCheatEngine, AntiCheatEvent, AntiCheatStats};
pub use persist::{EngineStore, StoreError};
