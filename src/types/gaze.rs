//! Gaze classification output types: GazeLabel, PixelPoint, GazeObservation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Gaze Label
// ============================================================================

/// Discrete horizontal gaze direction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum GazeLabel {
    Left,
    Center,
    Right,
}

impl GazeLabel {
    /// Wire representation used in API responses (`gaze_text`).
    pub fn as_str(&self) -> &'static str {
        match self {
            GazeLabel::Left => "LEFT",
            GazeLabel::Center => "CENTER",
            GazeLabel::Right => "RIGHT",
        }
    }
}

impl std::fmt::Display for GazeLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Pixel Coordinates
// ============================================================================

/// Integer pixel coordinate. Serializes as a `[x, y]` array.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(from = "[i32; 2]", into = "[i32; 2]")]
pub struct PixelPoint {
    pub x: i32,
    pub y: i32,
}

impl PixelPoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<[i32; 2]> for PixelPoint {
    fn from([x, y]: [i32; 2]) -> Self {
        Self { x, y }
    }
}

impl From<PixelPoint> for [i32; 2] {
    fn from(p: PixelPoint) -> Self {
        [p.x, p.y]
    }
}

// ============================================================================
// Gaze Observation
// ============================================================================

/// Immutable snapshot produced once per successful detection cycle.
///
/// Published into the [`StatusStore`](crate::pipeline::StatusStore) as a
/// whole unit; readers never see fields from two different observations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GazeObservation {
    /// Capture instant, non-decreasing across successive publishes
    pub timestamp: DateTime<Utc>,
    /// Classified horizontal gaze direction
    pub label: GazeLabel,
    /// Iris centroid of the subject's left eye (pixels)
    pub left_center: PixelPoint,
    /// Iris centroid of the subject's right eye (pixels)
    pub right_center: PixelPoint,
    /// Horizontal midpoint between the two centroids (pixels)
    pub cx: i32,
    /// Width of the source frame at capture time (pixels)
    pub frame_width: u32,
}

impl GazeObservation {
    /// Capture timestamp as fractional Unix seconds.
    pub fn timestamp_secs(&self) -> f64 {
        unix_secs(self.timestamp)
    }
}

/// Convert a UTC instant to fractional Unix seconds.
pub fn unix_secs(t: DateTime<Utc>) -> f64 {
    t.timestamp_micros() as f64 / 1_000_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_wire_format() {
        assert_eq!(serde_json::to_string(&GazeLabel::Left).unwrap(), "\"LEFT\"");
        assert_eq!(GazeLabel::Center.to_string(), "CENTER");
        let parsed: GazeLabel = serde_json::from_str("\"RIGHT\"").unwrap();
        assert_eq!(parsed, GazeLabel::Right);
    }

    #[test]
    fn test_pixel_point_serializes_as_array() {
        let v = serde_json::to_value(PixelPoint::new(312, 240)).unwrap();
        assert_eq!(v, serde_json::json!([312, 240]));
    }

    #[test]
    fn test_unix_secs_keeps_sub_second_precision() {
        let t = DateTime::<Utc>::from_timestamp(1_700_000_000, 250_000_000).unwrap();
        assert!((unix_secs(t) - 1_700_000_000.25).abs() < 1e-6);
    }
}
