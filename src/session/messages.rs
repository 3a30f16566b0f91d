//! Session Message Definitions
//!
//! ```text
//! SessionHandle --SessionCommand--> SessionActor --SessionEvent--> consumer
//! ```

use tokio::sync::oneshot;

use crate::connection::ConnectionState;
use crate::protocol::{DecodeError, Design, Frame};
use crate::sync::ChangeSource;

/// Requests into the session loop.
#[derive(Debug)]
pub enum SessionCommand {
    Connect,
    Disconnect,
    /// Raw send; replies whether the payload reached a transport.
    Send {
        payload: String,
        reply: oneshot::Sender<bool>,
    },
    ParameterChange {
        design: Design,
        source: ChangeSource,
    },
    /// Replies with the restored design, `None` at the boundary.
    Undo(oneshot::Sender<Option<Design>>),
    Redo(oneshot::Sender<Option<Design>>),
    /// Imported or loaded design: recorded, then resynced.
    Load { design: Design, label: String },
    /// Intentional disconnect, then stop the loop.
    Shutdown,
}

/// Notifications out of the session loop. Dropping the receiver unsubscribes.
#[derive(Debug)]
pub enum SessionEvent {
    StateChanged(ConnectionState),
    Frame(Frame),
    DecodeError(DecodeError),
    /// The "generating" indicator flipped.
    Generating(bool),
    HistoryChanged { can_undo: bool, can_redo: bool },
}
