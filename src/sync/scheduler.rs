//! Outbound flow control.
//!
//! | Source      | Policy                                                   |
//! |-------------|----------------------------------------------------------|
//! | `Immediate` | send now                                                 |
//! | `Slider`    | throttle: at most one send per window, plus one trailing |
//! | `Text`      | debounce: send once input has been quiet for a window    |
//!
//! Deferred sends always read the latest design at fire time, so the last
//! state of any burst of edits is what the backend ends up with.

use std::time::Duration;

use tokio::time::Instant;

use super::{ChangeSource, Outbound};
use crate::config::SyncConfig;
use crate::protocol::{Design, encode_design};
use crate::timer::{TimerSlot, earliest};

pub const DEFAULT_THROTTLE: Duration = Duration::from_millis(100);
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

pub struct SyncScheduler {
    throttle: Duration,
    debounce: Duration,
    latest: Option<Design>,
    last_throttled_send: Option<Instant>,
    throttle_timer: TimerSlot,
    debounce_timer: TimerSlot,
}

impl Default for SyncScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_THROTTLE, DEFAULT_DEBOUNCE)
    }
}

impl SyncScheduler {
    pub const fn new(throttle: Duration, debounce: Duration) -> Self {
        Self {
            throttle,
            debounce,
            latest: None,
            last_throttled_send: None,
            throttle_timer: TimerSlot::new(),
            debounce_timer: TimerSlot::new(),
        }
    }

    pub fn from_config(config: &SyncConfig) -> Self {
        Self::new(
            Duration::from_millis(config.throttle_ms),
            Duration::from_millis(config.debounce_ms),
        )
    }

    /// Replace the design later sends will carry, without sending.
    pub fn set_latest(&mut self, design: Design) {
        self.latest = Some(design);
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        earliest([&self.throttle_timer, &self.debounce_timer])
    }

    pub fn has_pending(&self) -> bool {
        self.throttle_timer.is_armed() || self.debounce_timer.is_armed()
    }

    /// Observe a committed edit. Returns whether it was transmitted now.
    pub fn on_parameter_change(
        &mut self,
        design: Design,
        source: ChangeSource,
        now: Instant,
        out: &mut impl Outbound,
    ) -> bool {
        self.latest = Some(design);

        match source {
            ChangeSource::Immediate => self.flush(out),
            ChangeSource::Slider => self.throttled(now, out),
            ChangeSource::Text => {
                self.debounce_timer.arm(now, self.debounce);
                false
            }
        }
    }

    /// Send the latest design regardless of policy. Pending trailing sends
    /// are dropped since this one already carries the newest state.
    pub fn resync(&mut self, out: &mut impl Outbound) -> bool {
        self.throttle_timer.cancel();
        self.debounce_timer.cancel();
        self.flush(out)
    }

    /// Drop pending deferred sends.
    pub fn cancel(&mut self) {
        self.throttle_timer.cancel();
        self.debounce_timer.cancel();
    }

    /// Send whatever deferred updates are due. Returns whether any was transmitted.
    pub fn fire_due_timers(&mut self, now: Instant, out: &mut impl Outbound) -> bool {
        let mut sent = false;
        if self.throttle_timer.take_due(now) {
            self.last_throttled_send = Some(now);
            sent |= self.flush(out);
        }
        if self.debounce_timer.take_due(now) {
            sent |= self.flush(out);
        }
        sent
    }

    fn throttled(&mut self, now: Instant, out: &mut impl Outbound) -> bool {
        let elapsed = self
            .last_throttled_send
            .map(|last| now.saturating_duration_since(last));

        match elapsed {
            Some(elapsed) if elapsed < self.throttle => {
                // Later requests in the same window collapse into this timer
                self.throttle_timer
                    .arm_if_idle(now, self.throttle.saturating_sub(elapsed));
                false
            }
            _ if self.throttle_timer.is_armed() => false,
            _ => {
                self.last_throttled_send = Some(now);
                self.flush(out)
            }
        }
    }

    fn flush(&mut self, out: &mut impl Outbound) -> bool {
        let Some(design) = &self.latest else {
            return false;
        };
        let payload = match encode_design(design) {
            Ok(payload) => payload,
            Err(e) => {
                crate::log!("sync"; "failed to encode design: {}", e);
                return false;
            }
        };
        let sent = out.send(&payload);
        if !sent {
            crate::debug!("sync"; "not connected, dropped update (resync on connect)");
        }
        sent
    }
}
