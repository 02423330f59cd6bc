//! Runtime layer for the Circle verification engine.
//!
//! Wires the hangout tracker, the verifiers, and the anti-cheat engine
//! into one [`Monitor`] with a periodic background loop, an event bus for
//! the UI layer, TOML configuration, and structured logging.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;
pub mod monitor;
pub mod shutdown;

pub use config::MonitorConfig;
pub use error::MonitorError;
pub use events::{EngineEvent, EventBus};
pub use logging::{init_logging, init_logging_from_config, LogFormat};
pub use monitor::Monitor;
pub use shutdown::ShutdownController;
