//! Monitor configuration with TOML file support.

use serde::{Deserialize, Serialize};

use circle_types::EngineParams;

use crate::MonitorError;

/// Configuration for the verification monitor.
///
/// Can be loaded from a TOML file via [`MonitorConfig::from_toml_file`] or
/// built programmatically (e.g. for tests). Every engine threshold lives
/// in `[params]`, so a deployment can retune without a code change.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Identifier of the device's own user, used to route location
    /// updates into the anti-cheat engine.
    #[serde(default = "default_local_user")]
    pub local_user: String,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Engine thresholds for the tracker, verifiers, and anti-cheat checks.
    #[serde(default)]
    pub params: EngineParams,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_local_user() -> String {
    "local".to_string()
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl MonitorConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, MonitorError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| MonitorError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, MonitorError> {
        toml::from_str(s).map_err(|e| MonitorError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> String {
        toml::to_string_pretty(self).expect("MonitorConfig is always serializable to TOML")
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            local_user: default_local_user(),
            log_format: default_log_format(),
            log_level: default_log_level(),
            params: EngineParams::circle_defaults(),
        }
    }
}
