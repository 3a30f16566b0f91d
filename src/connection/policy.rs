//! Bounded exponential backoff.

use std::time::Duration;

use crate::config::ConnectionConfig;

/// Reconnect attempt counter and delay schedule.
///
/// Invariant: `attempt <= max_attempts`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconnectPolicy {
    attempt: u32,
    max_attempts: u32,
    base_delay_ms: u32,
    max_delay_ms: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::new(5, 1000, 30_000)
    }
}

impl ReconnectPolicy {
    pub const fn new(max_attempts: u32, base_delay_ms: u32, max_delay_ms: u32) -> Self {
        Self {
            attempt: 0,
            max_attempts,
            base_delay_ms,
            max_delay_ms,
        }
    }

    pub fn from_config(config: &ConnectionConfig) -> Self {
        Self::new(
            config.max_attempts,
            config.base_delay_ms,
            config.max_delay_ms,
        )
    }

    pub const fn attempt(&self) -> u32 {
        self.attempt
    }

    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub const fn is_exhausted(&self) -> bool {
        self.attempt >= self.max_attempts
    }

    /// Claim the next attempt and return how long to wait before it.
    ///
    /// The delay uses the attempt count *before* the increment, so the
    /// schedule is `base, 2*base, 4*base, ...` capped at `max_delay_ms`, and
    /// the last permitted attempt is still scheduled. Returns `None` once
    /// exhausted.
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.is_exhausted() {
            return None;
        }
        let delay = Self::delay_for(self.attempt, self.base_delay_ms, self.max_delay_ms);
        self.attempt += 1;
        Some(delay)
    }

    /// Called when a transport opens.
    pub fn reset(&mut self) {
        self.attempt = 0;
    }

    fn delay_for(attempt: u32, base_ms: u32, max_ms: u32) -> Duration {
        let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
        let ms = u64::from(base_ms)
            .saturating_mul(factor)
            .min(u64::from(max_ms));
        Duration::from_millis(ms)
    }
}
