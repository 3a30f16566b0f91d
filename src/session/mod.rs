//! Editing Session
//!
//! Composes connection, scheduler and history into the object the UI talks to.
//!
//! # Module Structure
//!
//! - `core` - `Session`, the single-threaded service object
//! - `actor` - `SessionActor` event loop and `SessionHandle`
//! - `messages` - command and event types

pub mod actor;
pub mod core;
pub mod messages;

pub use actor::{SessionActor, SessionClosed, SessionHandle};
pub use core::Session;
pub use messages::{SessionCommand, SessionEvent};
