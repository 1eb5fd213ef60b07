//! Configuration for the keep-awake host.

use crate::wake_actor::WakerError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variable naming a JSON config file.
pub const CONFIG_ENV: &str = "WAKER_CONFIG";

/// Host configuration.
///
/// Every field has a default, so a partial (or empty) JSON object is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WakerConfig {
    /// Tag attached to the platform wake lock (shows up in its logs).
    pub lock_tag: String,

    /// How long a controller waits for a query reply before treating the owner as gone.
    pub reply_timeout_ms: u64,

    /// Whether stop hints may tear the actor down once no controller is bound.
    pub stop_on_release: bool,

    /// Whether a restarted actor is told the last desired keep-awake value.
    pub sticky: bool,
}

impl Default for WakerConfig {
    fn default() -> Self {
        Self {
            lock_tag: "WakerService".to_string(),
            reply_timeout_ms: 1000,
            stop_on_release: true,
            sticky: true,
        }
    }
}

impl WakerConfig {
    pub fn reply_timeout(&self) -> Duration {
        Duration::from_millis(self.reply_timeout_ms)
    }

    /// Parses and validates a JSON config.
    pub fn from_json(json: &str) -> Result<Self, WakerError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| WakerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the file named by [`CONFIG_ENV`], or the defaults when it is unset.
    pub fn load() -> Result<Self, WakerError> {
        match std::env::var(CONFIG_ENV) {
            Ok(path) => {
                let raw = std::fs::read_to_string(&path)
                    .map_err(|e| WakerError::Config(format!("{}: {}", path, e)))?;
                Self::from_json(&raw)
            }
            Err(_) => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), WakerError> {
        if self.lock_tag.trim().is_empty() {
            return Err(WakerError::Config("lock_tag must not be empty".into()));
        }
        if self.reply_timeout_ms == 0 {
            return Err(WakerError::Config("reply_timeout_ms must be positive".into()));
        }
        Ok(())
    }
}
