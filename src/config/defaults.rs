//! System-wide default constants.
//!
//! Grouped by subsystem. Values that operators may tune are also exposed
//! through `GazeConfig`; these are the built-in fallbacks.

// ============================================================================
// Server
// ============================================================================

/// Default HTTP bind address.
pub const DEFAULT_SERVER_ADDR: &str = "0.0.0.0:5000";

// ============================================================================
// Acquisition Loop
// ============================================================================

/// Pause between acquisition cycles, regardless of outcome (ms).
pub const POLL_INTERVAL_MS: u64 = 10;

/// Backoff after a failed frame retrieval before retrying (ms).
pub const CAPTURE_BACKOFF_MS: u64 = 100;

/// Connect timeout for network landmark sources (seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 5;

/// Emit a progress line every N captured frames.
pub const PROGRESS_LOG_EVERY: u64 = 500;

// ============================================================================
// Freshness
// ============================================================================

/// Maximum age of the last detection still reported as current (seconds).
pub const MAX_AGE_SECS: f64 = 2.0;

// ============================================================================
// Classifier
// ============================================================================

/// `cx` below this fraction of the frame width is LEFT.
pub const LEFT_FRACTION: f64 = 0.4;

/// `cx` above this fraction of the frame width is RIGHT.
pub const RIGHT_FRACTION: f64 = 0.6;

// ============================================================================
// Sources
// ============================================================================

/// Default replay rate for `--replay` (frames per second).
pub const REPLAY_FPS: u32 = 30;

/// Synthetic source frame size (pixels).
pub const SYNTHETIC_FRAME_WIDTH: u32 = 640;
pub const SYNTHETIC_FRAME_HEIGHT: u32 = 480;

/// Synthetic source frame period (ms). ~30 fps.
pub const SYNTHETIC_FRAME_PERIOD_MS: u64 = 33;

/// TCP keepalive idle time for network landmark sources (seconds).
pub const TCP_KEEPALIVE_SECS: u64 = 30;

/// Read timeout for one frame record from a network landmark source (seconds).
pub const TCP_READ_TIMEOUT_SECS: u64 = 5;

// ============================================================================
// API Messages
// ============================================================================

pub const MESSAGE_DETECTED: &str = "eyes detected";
pub const MESSAGE_NOT_DETECTED: &str = "eyes not detected";
