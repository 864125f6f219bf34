//! Gaze status endpoint

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use crate::config::defaults::{MESSAGE_DETECTED, MESSAGE_NOT_DETECTED};
use crate::pipeline::{evaluate, GazeStatus};
use crate::types::{GazeLabel, PixelPoint};

use super::ApiState;

/// Fresh detection.
#[derive(Debug, Serialize)]
pub struct GazeResponse {
    /// Capture time, fractional Unix seconds
    pub timestamp: f64,
    pub gaze_text: GazeLabel,
    pub left_center: PixelPoint,
    pub right_center: PixelPoint,
    pub cx: i32,
    /// Frame width in pixels
    pub w: u32,
    /// Seconds since capture
    pub age: f64,
    pub detected: bool,
    pub message: &'static str,
}

/// Never detected, or the last detection is stale.
#[derive(Debug, Serialize)]
pub struct NoDataResponse {
    pub status: &'static str,
    pub detected: bool,
    pub message: &'static str,
    /// Present only when a stale observation exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<f64>,
}

impl NoDataResponse {
    fn new(age: Option<f64>) -> Self {
        Self {
            status: "no_data",
            detected: false,
            message: MESSAGE_NOT_DETECTED,
            age,
        }
    }
}

/// GET /gaze
///
/// 200 with the observation while fresh; 204 with a `no_data` body when
/// nothing was ever detected or the last detection is older than the window.
pub async fn get_gaze(State(state): State<ApiState>) -> Response {
    let status = evaluate(state.store.read(), Utc::now(), state.freshness.max_age_secs);
    gaze_response(status)
}

/// Render a freshness verdict as an HTTP response.
pub fn gaze_response(status: GazeStatus) -> Response {
    match status {
        GazeStatus::NeverDetected => {
            (StatusCode::NO_CONTENT, Json(NoDataResponse::new(None))).into_response()
        }
        GazeStatus::Stale { age_secs } => {
            (StatusCode::NO_CONTENT, Json(NoDataResponse::new(Some(age_secs)))).into_response()
        }
        GazeStatus::Fresh {
            observation,
            age_secs,
        } => Json(GazeResponse {
            timestamp: observation.timestamp_secs(),
            gaze_text: observation.label,
            left_center: observation.left_center,
            right_center: observation.right_center,
            cx: observation.cx,
            w: observation.frame_width,
            age: age_secs,
            detected: true,
            message: MESSAGE_DETECTED,
        })
        .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GazeObservation;
    use std::sync::Arc;

    #[test]
    fn test_never_detected_body_omits_age() {
        let json = serde_json::to_value(NoDataResponse::new(None)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "status": "no_data",
                "detected": false,
                "message": MESSAGE_NOT_DETECTED,
            })
        );
    }

    #[test]
    fn test_stale_body_includes_age() {
        let json = serde_json::to_value(NoDataResponse::new(Some(2.5))).unwrap();
        assert_eq!(json["age"], 2.5);
        assert_eq!(json["detected"], false);
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            gaze_response(GazeStatus::NeverDetected).status(),
            StatusCode::NO_CONTENT
        );
        assert_eq!(
            gaze_response(GazeStatus::Stale { age_secs: 3.0 }).status(),
            StatusCode::NO_CONTENT
        );

        let observation = Arc::new(GazeObservation {
            timestamp: chrono::Utc::now(),
            label: GazeLabel::Center,
            left_center: PixelPoint::new(300, 200),
            right_center: PixelPoint::new(340, 200),
            cx: 320,
            frame_width: 640,
        });
        let fresh = GazeStatus::Fresh {
            observation,
            age_secs: 0.1,
        };
        assert_eq!(gaze_response(fresh).status(), StatusCode::OK);
    }
}
