//! Liveness, diagnostics and stop endpoints

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::pipeline::LoopStats;

use super::ApiState;

#[derive(Debug, Serialize)]
pub struct SimpleStatus {
    pub status: &'static str,
}

/// GET /health
pub async fn health_check() -> Json<SimpleStatus> {
    Json(SimpleStatus { status: "ok" })
}

/// POST /stop
///
/// Cancels the acquisition loop. Repeated calls are harmless. The HTTP
/// server keeps answering; `/gaze` goes stale once the window passes.
pub async fn stop_acquisition(State(state): State<ApiState>) -> Json<SimpleStatus> {
    if !state.acquisition_cancel.is_cancelled() {
        tracing::info!("[HttpServer] Stop requested, cancelling acquisition");
    }
    state.acquisition_cancel.cancel();
    Json(SimpleStatus { status: "stopping" })
}

/// Acquisition diagnostics
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub source: String,
    pub max_age_secs: f64,
    pub has_observation: bool,
    pub stop_requested: bool,
    pub version: &'static str,
    #[serde(flatten)]
    pub stats: LoopStats,
}

/// GET /status
pub async fn get_status(State(state): State<ApiState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        source: state.source_name.to_string(),
        max_age_secs: state.freshness.max_age_secs,
        has_observation: !state.store.is_empty(),
        stop_requested: state.acquisition_cancel.is_cancelled(),
        version: env!("CARGO_PKG_VERSION"),
        stats: state.monitor.snapshot(),
    })
}
