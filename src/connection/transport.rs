//! Transport abstraction.
//!
//! A [`Connector`] opens one [`Transport`] per connection attempt. Everything
//! the transport observes comes back as a [`TransportEvent`] on the session's
//! event channel, tagged with the epoch it was opened under so the manager can
//! drop events from transports it already replaced.

use thiserror::Error;
use tokio::sync::mpsc;

/// Monotonic id of a connection attempt.
pub type Epoch = u64;

/// Event channel from transports into the session loop.
pub type EventSender = mpsc::Sender<TransportEvent>;

#[derive(Debug)]
pub struct TransportEvent {
    pub epoch: Epoch,
    pub kind: TransportEventKind,
}

impl TransportEvent {
    pub const fn new(epoch: Epoch, kind: TransportEventKind) -> Self {
        Self { epoch, kind }
    }
}

#[derive(Debug)]
pub enum TransportEventKind {
    /// Handshake finished; the channel is usable.
    Opened,
    /// Inbound binary frame.
    Binary(Vec<u8>),
    /// Inbound text frame (not part of the protocol).
    Text(String),
    /// Transport fault. A `Closed` normally follows.
    Error(String),
    /// Channel closed by the peer or the network.
    Closed,
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid endpoint `{0}`: {1}")]
    InvalidUrl(String, String),

    #[error("transport is closed")]
    Closed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// One live duplex channel.
pub trait Transport: Send {
    /// Queue a UTF-8 text frame for delivery.
    fn send_text(&mut self, text: String) -> Result<(), TransportError>;

    /// Close intentionally. No further events are expected afterwards.
    fn close(&mut self);
}

/// Opens transports. Opening must not block; the handshake outcome arrives
/// later as `Opened` or `Error` + `Closed`.
pub trait Connector {
    type Transport: Transport;

    fn open(
        &mut self,
        url: &str,
        epoch: Epoch,
        events: EventSender,
    ) -> Result<Self::Transport, TransportError>;
}
