//! Preview Wire Protocol
//!
//! Stateless encode/decode between the client and the compute backend.
//!
//! # Modules
//!
//! - `codec` - binary frame decoder and JSON design encoder
//! - `design` - the design snapshot sent upstream
//! - `error` - decode fault taxonomy
//! - `frame` - inbound frame types
//! - `params` - UI name to wire name table

pub mod codec;
pub mod design;
pub mod error;
pub mod frame;
pub mod params;

#[cfg(test)]
pub(crate) mod fixtures;

pub use codec::{decode, encode_design};
pub use design::Design;
pub use error::DecodeError;
pub use frame::{DerivedValues, ErrorFrame, Frame, MeshFrame, Warning, WarningLevel};
pub use params::Param;
