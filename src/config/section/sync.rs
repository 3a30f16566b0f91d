//! `[sync]` section configuration.
//!
//! ```toml
//! [sync]
//! throttle_ms = 100           # Slider send window
//! debounce_ms = 300           # Quiet period before a typed value is sent
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub throttle_ms: u64,
    pub debounce_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            throttle_ms: 100,
            debounce_ms: 300,
        }
    }
}

impl SyncConfig {
    pub fn validate(&self, problems: &mut Vec<(&'static str, String)>) {
        if self.throttle_ms == 0 {
            problems.push(("sync.throttle_ms", "must be greater than 0".into()));
        }
        if self.debounce_ms == 0 {
            problems.push(("sync.debounce_ms", "must be greater than 0".into()));
        }
    }
}
