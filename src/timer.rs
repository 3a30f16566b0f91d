//! Cancellable one-shot timer slots.
//!
//! A slot holds at most one pending deadline. Arming replaces whatever was
//! pending, so two fires for the same purpose can never happen. The session
//! loop sleeps until the earliest armed deadline and then asks each slot
//! whether it is due; [`TimerSlot::take_due`] is the liveness check, so a slot
//! cancelled between the wake-up and the check simply reports `false`.

use std::time::Duration;

use tokio::time::Instant;

#[derive(Debug, Default)]
pub struct TimerSlot {
    deadline: Option<Instant>,
}

impl TimerSlot {
    pub const fn new() -> Self {
        Self { deadline: None }
    }

    /// Arm (or re-arm) the slot to fire `after` from `now`.
    pub fn arm(&mut self, now: Instant, after: Duration) {
        self.deadline = Some(now + after);
    }

    /// Arm only if nothing is pending. Returns whether it armed.
    pub fn arm_if_idle(&mut self, now: Instant, after: Duration) -> bool {
        if self.deadline.is_some() {
            return false;
        }
        self.arm(now, after);
        true
    }

    /// Cancel any pending fire. Idempotent; returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    pub const fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Consume the pending fire if its deadline has passed.
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// Earliest deadline among the given slots.
pub fn earliest<'a>(slots: impl IntoIterator<Item = &'a TimerSlot>) -> Option<Instant> {
    slots.into_iter().filter_map(TimerSlot::deadline).min()
}
