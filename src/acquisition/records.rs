//! Frame record I/O shared by all landmark sources.
//!
//! Records are JSON lines (one [`Frame`] per line). Blank lines are ignored.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use thiserror::Error;

use crate::types::Frame;

/// Frame retrieval errors.
///
/// Every variant is treated as a transient failure by the acquisition loop:
/// it backs off and retries.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Source not ready: {0}")]
    NotReady(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Timeout waiting for frame")]
    Timeout,

    #[error("Connection closed by peer")]
    ConnectionClosed,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed frame record: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Parse one JSON-lines record. Returns `Ok(None)` for blank lines.
pub fn parse_frame_line(line: &str) -> Result<Option<Frame>, CaptureError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let frame: Frame = serde_json::from_str(line)?;
    Ok(Some(frame))
}

/// Load every well-formed frame record from a JSON-lines file.
///
/// Malformed lines are logged and skipped; only failing to open or read the
/// file is an error.
pub fn read_frame_file(path: &Path) -> Result<Vec<Frame>, CaptureError> {
    let reader = BufReader::new(File::open(path)?);
    let mut frames = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        match parse_frame_line(&line) {
            Ok(Some(frame)) => frames.push(frame),
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(path = %path.display(), line = idx + 1, error = %e, "Skipping malformed frame record");
            }
        }
    }

    Ok(frames)
}
