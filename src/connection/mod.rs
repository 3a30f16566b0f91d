//! Backend Connection
//!
//! Owns the single live transport and the reconnect state machine.
//!
//! # Modules
//!
//! - `manager` - state machine, send primitive, inbound decoding
//! - `policy` - bounded exponential backoff
//! - `state` - `ConnectionState`
//! - `transport` - connector/transport traits and transport events
//! - `ws` - tungstenite transport

pub mod manager;
pub mod policy;
pub mod state;
pub mod transport;
pub mod ws;

pub use manager::{ConnectionEvent, ConnectionManager};
pub use policy::ReconnectPolicy;
pub use state::ConnectionState;
pub use transport::{Connector, Epoch, EventSender, Transport, TransportEvent, TransportEventKind};
pub use ws::WsConnector;
