//! `[connection]` section configuration.
//!
//! Backend endpoint and reconnect policy.
//!
//! # Example
//!
//! ```toml
//! [connection]
//! url = "ws://127.0.0.1:8000/ws/preview"
//! max_attempts = 5            # Reconnect attempts before giving up
//! base_delay_ms = 1000        # First reconnect delay, doubled per attempt
//! max_delay_ms = 30000        # Upper bound for a single delay
//! error_grace_ms = 1500       # Time spent in Error before reconnecting
//! ```

use serde::{Deserialize, Serialize};

pub const DEFAULT_URL: &str = "ws://127.0.0.1:8000/ws/preview";

/// Backend connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// WebSocket endpoint (`ws://` or `wss://`).
    pub url: String,

    pub max_attempts: u32,

    pub base_delay_ms: u32,

    pub max_delay_ms: u32,

    /// How long an errored connection waits before entering `Reconnecting`.
    pub error_grace_ms: u64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_owned(),
            max_attempts: 5,
            base_delay_ms: 1000,
            max_delay_ms: 30_000,
            error_grace_ms: 1500,
        }
    }
}

impl ConnectionConfig {
    /// Collect validation problems as `(field, message)` pairs.
    pub fn validate(&self, problems: &mut Vec<(&'static str, String)>) {
        match url::Url::parse(&self.url) {
            Ok(url) if matches!(url.scheme(), "ws" | "wss") => {}
            Ok(url) => problems.push((
                "connection.url",
                format!("scheme must be ws or wss, got `{}`", url.scheme()),
            )),
            Err(e) => problems.push(("connection.url", format!("`{}`: {e}", self.url))),
        }

        if self.base_delay_ms == 0 {
            problems.push(("connection.base_delay_ms", "must be greater than 0".into()));
        }
        if self.max_delay_ms < self.base_delay_ms {
            problems.push((
                "connection.max_delay_ms",
                format!(
                    "must be at least base_delay_ms ({}), got {}",
                    self.base_delay_ms, self.max_delay_ms
                ),
            ));
        }
    }
}
