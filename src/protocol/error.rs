//! Inbound frame decode errors.

use thiserror::Error;

/// Why an inbound binary frame could not be decoded.
///
/// All variants are local faults: the connection stays open and the next
/// frame is decoded independently.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("buffer too small: need {needed} bytes, got {actual}")]
    BufferTooSmall { needed: usize, actual: usize },

    #[error("unknown message type 0x{0:02x}")]
    UnknownMessageType(u32),

    #[error("truncated {section}: need {needed} bytes, got {actual}")]
    Truncated {
        section: &'static str,
        needed: usize,
        actual: usize,
    },

    #[error("trailer is not valid UTF-8")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    #[error("malformed trailer JSON: {0}")]
    MalformedJson(#[from] serde_json::Error),

    #[error("face index {index} out of range for {vertex_count} vertices")]
    FaceIndexOutOfRange { index: u32, vertex_count: u32 },

    #[error("component range `{name}` is outside the face list")]
    InvalidComponentRange { name: String },
}
