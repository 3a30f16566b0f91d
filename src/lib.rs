//! Aerolink - live preview client for a parametric aircraft backend.
//!
//! Keeps the compute backend in lockstep with the design being edited: edits
//! go out as JSON over a WebSocket, regenerated meshes come back as binary
//! frames.
//!
//! ```text
//! UI ──SessionHandle──> SessionActor ─┬─ SyncScheduler ──> ConnectionManager ──> backend
//!  ^                                  └─ History                │
//!  └──────────── SessionEvent <──────── decode <────────────────┘
//! ```
//!
//! # Modules
//!
//! - `session` - the object a UI embeds; owns everything below
//! - `connection` - transport lifecycle and reconnect policy
//! - `sync` - per-source flow control for outbound updates
//! - `history` - bounded undo/redo log
//! - `protocol` - wire codec and design/frame types
//! - `config` - `aerolink.toml`
//! - `cli` - the `aerolink` command

pub mod cli;
pub mod config;
pub mod connection;
pub mod history;
pub mod logger;
pub mod protocol;
pub mod session;
pub mod sync;
pub mod timer;
