//! API route handlers
//!
//! - `/gaze`: latest observation, judged fresh or stale at request time
//! - `/health`, `/status`: liveness and acquisition diagnostics
//! - `/stop`: request the acquisition loop to stop

mod control;
mod gaze;

pub use control::*;
pub use gaze::*;

use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::config::FreshnessConfig;
use crate::pipeline::{AcquisitionMonitor, StatusStore};

// ============================================================================
// API State
// ============================================================================

/// Shared state for API handlers
#[derive(Clone)]
pub struct ApiState {
    /// Latest gaze observation (written only by the acquisition loop)
    pub store: Arc<StatusStore>,
    /// Acquisition loop counters and state
    pub monitor: Arc<AcquisitionMonitor>,
    /// Staleness window applied on every `/gaze` read
    pub freshness: FreshnessConfig,
    /// Stops the acquisition loop only; the server keeps serving
    pub acquisition_cancel: CancellationToken,
    /// Name of the active landmark source, for `/status`
    pub source_name: Arc<str>,
}

impl ApiState {
    pub fn new(
        store: Arc<StatusStore>,
        monitor: Arc<AcquisitionMonitor>,
        freshness: FreshnessConfig,
        acquisition_cancel: CancellationToken,
        source_name: &str,
    ) -> Self {
        Self {
            store,
            monitor,
            freshness,
            acquisition_cancel,
            source_name: Arc::from(source_name),
        }
    }
}
