//! Configuration section definitions.

mod connection;
mod history;
mod sync;

pub use connection::{ConnectionConfig, DEFAULT_URL};
pub use history::HistoryConfig;
pub use sync::SyncConfig;
