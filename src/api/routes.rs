//! API route definitions
//!
//! - GET  /gaze   - latest gaze observation (200) or no data (204)
//! - GET  /health - liveness
//! - GET  /status - acquisition loop counters
//! - POST /stop   - stop the acquisition loop

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{self, ApiState};

/// Create all API routes
pub fn api_routes(state: ApiState) -> Router {
    Router::new()
        .route("/gaze", get(handlers::get_gaze))
        .route("/health", get(handlers::health_check))
        .route("/status", get(handlers::get_status))
        .route("/stop", post(handlers::stop_acquisition))
        .with_state(state)
}
