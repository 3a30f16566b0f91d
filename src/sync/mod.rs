//! Outbound Synchronization
//!
//! Turns committed edits into sends according to how each edit was made.
//!
//! ```text
//! edit --(design, source)--> SyncScheduler --[JSON]--> Outbound (ConnectionManager)
//! ```

pub mod scheduler;
pub mod source;

pub use scheduler::SyncScheduler;
pub use source::ChangeSource;

/// The send primitive the scheduler drives.
pub trait Outbound {
    /// Transmit a payload. `false` means it was not delivered to a transport.
    fn send(&mut self, payload: &str) -> bool;
}
