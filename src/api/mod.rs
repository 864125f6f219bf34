//! REST API module using Axum
//!
//! Serves the gaze status endpoint and its control/diagnostic companions.
//! Handlers only read the [`StatusStore`](crate::pipeline::StatusStore) and
//! never wait on the acquisition loop.

pub mod handlers;
mod routes;

pub use handlers::ApiState;

use axum::http::{header, HeaderValue, Method};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Env var holding a comma-separated list of allowed cross-origin callers.
pub const CORS_ORIGINS_ENV_VAR: &str = "GAZE_CORS_ORIGINS";

/// Build a CORS layer that is restrictive by default (same-origin only).
///
/// Set `GAZE_CORS_ORIGINS` to a comma-separated list of allowed origins
/// (e.g. `http://localhost:8081` for an Expo dev client).
fn build_cors_layer() -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    match std::env::var(CORS_ORIGINS_ENV_VAR) {
        Ok(origins) => {
            let allowed: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|o| o.trim().parse().ok())
                .collect();
            tracing::info!(origins = %origins, "CORS: allowing configured origins");
            base.allow_origin(allowed)
        }
        Err(_) => base,
    }
}

/// Create the complete application router.
pub fn create_app(state: ApiState) -> Router {
    routes::api_routes(state)
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer())
}
