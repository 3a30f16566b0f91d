//! Wire codec.
//!
//! Inbound frames are binary, little-endian:
//!
//! ```text
//! mesh  (0x01): type:u32 | vertex_count:u32 | face_count:u32
//!               | vertices:f32[3v] | normals:f32[3v] | faces:u32[3f]
//!               | trailer JSON {derived, validation, componentRanges?}
//! error (0x02): type:u32 | JSON {error, detail, field}
//! ```
//!
//! Outbound messages are JSON text keyed by wire names.

use super::design::Design;
use super::error::DecodeError;
use super::frame::{ErrorFrame, Frame, MeshFrame, MeshTrailer};

pub const MSG_MESH: u32 = 0x01;
pub const MSG_ERROR: u32 = 0x02;

/// Type tag only.
pub const TYPE_HEADER_LEN: usize = 4;
/// Type tag plus vertex and face counts.
pub const MESH_HEADER_LEN: usize = 12;

/// Decode one inbound frame. Total over arbitrary input: never panics.
pub fn decode(bytes: &[u8]) -> Result<Frame, DecodeError> {
    let mut reader = Reader::new(bytes);

    let msg_type = reader
        .u32()
        .ok_or(DecodeError::BufferTooSmall {
            needed: TYPE_HEADER_LEN,
            actual: bytes.len(),
        })?;

    match msg_type {
        MSG_MESH => decode_mesh(bytes, reader).map(Frame::Mesh),
        MSG_ERROR => decode_error(reader.rest()).map(Frame::Error),
        other => Err(DecodeError::UnknownMessageType(other)),
    }
}

/// Serialize a design to the outbound JSON text.
pub fn encode_design(design: &Design) -> serde_json::Result<String> {
    serde_json::to_string(design)
}

fn decode_mesh(bytes: &[u8], mut reader: Reader<'_>) -> Result<MeshFrame, DecodeError> {
    if bytes.len() < MESH_HEADER_LEN {
        return Err(DecodeError::BufferTooSmall {
            needed: MESH_HEADER_LEN,
            actual: bytes.len(),
        });
    }

    // Header length was checked above
    let vertex_count = reader.u32().unwrap_or_default();
    let face_count = reader.u32().unwrap_or_default();

    let vertices = reader.f32_array("vertices", vertex_count)?;
    let normals = reader.f32_array("normals", vertex_count)?;
    let faces = reader.u32_array("faces", face_count)?;

    if let Some(&index) = faces.iter().find(|&&i| i >= vertex_count) {
        return Err(DecodeError::FaceIndexOutOfRange {
            index,
            vertex_count,
        });
    }

    let text = std::str::from_utf8(reader.rest())?;
    let trailer: MeshTrailer = serde_json::from_str(text)?;

    if let Some(ranges) = &trailer.component_ranges {
        for (name, [start, end]) in ranges {
            if start > end || *end > face_count {
                return Err(DecodeError::InvalidComponentRange { name: name.clone() });
            }
        }
    }

    Ok(MeshFrame {
        vertex_count,
        face_count,
        vertices,
        normals,
        faces,
        derived: trailer.derived,
        validation: trailer.validation,
        component_ranges: trailer.component_ranges,
    })
}

fn decode_error(body: &[u8]) -> Result<ErrorFrame, DecodeError> {
    let text = std::str::from_utf8(body)?;
    Ok(serde_json::from_str(text)?)
}

// ============================================================================
// Bounds-checked reader
// ============================================================================

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    const fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }

    fn take(&mut self, len: usize) -> Option<&'a [u8]> {
        let end = self.pos.checked_add(len)?;
        let slice = self.buf.get(self.pos..end)?;
        self.pos = end;
        Some(slice)
    }

    fn rest(&mut self) -> &'a [u8] {
        let rest = self.buf.get(self.pos..).unwrap_or_default();
        self.pos = self.buf.len();
        rest
    }

    fn u32(&mut self) -> Option<u32> {
        self.take(4).map(le_word).map(u32::from_le_bytes)
    }

    /// Take the byte span for `count` triples of 4-byte words.
    fn triples(&mut self, section: &'static str, count: u32) -> Result<&'a [u8], DecodeError> {
        let actual = self.remaining();
        let needed = (count as usize)
            .checked_mul(3 * 4)
            .ok_or(DecodeError::Truncated {
                section,
                needed: usize::MAX,
                actual,
            })?;
        self.take(needed).ok_or(DecodeError::Truncated {
            section,
            needed,
            actual,
        })
    }

    fn f32_array(&mut self, section: &'static str, count: u32) -> Result<Vec<f32>, DecodeError> {
        let span = self.triples(section, count)?;
        Ok(span
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes(le_word(c)))
            .collect())
    }

    fn u32_array(&mut self, section: &'static str, count: u32) -> Result<Vec<u32>, DecodeError> {
        let span = self.triples(section, count)?;
        Ok(span
            .chunks_exact(4)
            .map(|c| u32::from_le_bytes(le_word(c)))
            .collect())
    }
}

/// Copy a 4-byte chunk into an array. Callers only pass 4-byte slices.
fn le_word(chunk: &[u8]) -> [u8; 4] {
    let mut word = [0u8; 4];
    word.copy_from_slice(chunk);
    word
}
