//! `decode` command: inspect a captured frame offline.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use super::report::frame_report;
use crate::{debug, log};
use crate::protocol::{self, Frame};

/// Execute decode command
pub fn decode_file(path: &Path) -> Result<()> {
    let frame = decode_path(path)?;
    println!("{}", frame_report(&frame));
    Ok(())
}

fn decode_path(path: &Path) -> Result<Frame> {
    let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    log!("decode"; "{} ({} bytes)", path.display(), bytes.len());

    let frame = protocol::decode(&bytes)
        .with_context(|| format!("{} is not a valid frame", path.display()))?;
    debug!("decode"; "{} frame", frame.kind());
    Ok(frame)
}
