//! Shared leaf types for the Circle verification core.
//!
//! Everything here is a plain value type: timestamps, user identifiers,
//! geodesy, sensor snapshots, and the engine parameter set. No I/O, no
//! global state — the engines above this crate take these by value and
//! receive time explicitly, so every decision path is deterministic under
//! test.

pub mod geo;
pub mod params;
pub mod signal;
pub mod time;
pub mod user;

pub use geo::{GeoPoint, LocationSample};
pub use params::EngineParams;
pub use signal::{MotionSnapshot, SignalSnapshot};
pub use time::{Clock, SystemClock, Timestamp};
pub use user::UserId;
