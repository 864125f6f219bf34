//! Landmark frame records and iris landmark extraction
//!
//! External extractors (e.g. a MediaPipe face-mesh sidecar) emit one JSON
//! object per captured frame:
//!
//! ```json
//! {"width": 640, "height": 480, "faces": [{"landmarks": [[0.51, 0.43], ...]}]}
//! ```
//!
//! A face is either a refined face mesh (478+ normalized points) or a compact
//! pair of iris point sets (`left_iris` / `right_iris`). Coordinates are
//! normalized to `[0, 1]` and converted to pixels here.

use serde::{Deserialize, Serialize};

use super::PixelPoint;

/// Refined face-mesh indices outlining the subject's left iris.
pub const LEFT_IRIS: [usize; 4] = [474, 475, 476, 477];

/// Refined face-mesh indices outlining the subject's right iris.
pub const RIGHT_IRIS: [usize; 4] = [469, 470, 471, 472];

/// Minimum mesh length that contains the refined iris landmarks.
pub const REFINED_MESH_LEN: usize = 478;

/// Normalized `[x, y]` landmark coordinate in `[0, 1]` frame space.
pub type NormalizedPoint = [f32; 2];

// ============================================================================
// Frame Record
// ============================================================================

/// One captured frame as delivered by a landmark source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Detected faces, in extractor order
    #[serde(default)]
    pub faces: Vec<FaceRecord>,
}

/// Landmarks of a single detected face.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FaceRecord {
    /// Compact form: only the iris outline points
    Iris {
        left_iris: Vec<NormalizedPoint>,
        right_iris: Vec<NormalizedPoint>,
    },
    /// Full refined face mesh
    Mesh { landmarks: Vec<NormalizedPoint> },
}

// ============================================================================
// Iris Landmarks
// ============================================================================

/// Pixel-space iris landmark sets for the first detected face.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IrisLandmarks {
    pub left_iris: Vec<PixelPoint>,
    pub right_iris: Vec<PixelPoint>,
    pub frame_width: u32,
}

impl IrisLandmarks {
    /// Extract iris landmarks from the first face in `frame`.
    ///
    /// Returns `None` (no face) when the frame has no faces, the mesh lacks
    /// refined iris points, either iris set is empty, or the frame has zero
    /// width.
    pub fn from_frame(frame: &Frame) -> Option<Self> {
        if frame.width == 0 {
            return None;
        }
        let face = frame.faces.first()?;
        let to_px = |p: &NormalizedPoint| to_pixel(*p, frame.width, frame.height);

        let (left_iris, right_iris): (Vec<PixelPoint>, Vec<PixelPoint>) = match face {
            FaceRecord::Iris { left_iris, right_iris } => (
                left_iris.iter().map(to_px).collect(),
                right_iris.iter().map(to_px).collect(),
            ),
            FaceRecord::Mesh { landmarks } => {
                if landmarks.len() < REFINED_MESH_LEN {
                    tracing::debug!(
                        points = landmarks.len(),
                        "Face mesh lacks refined iris landmarks"
                    );
                    return None;
                }
                (
                    LEFT_IRIS.iter().map(|&i| to_px(&landmarks[i])).collect(),
                    RIGHT_IRIS.iter().map(|&i| to_px(&landmarks[i])).collect(),
                )
            }
        };

        if left_iris.is_empty() || right_iris.is_empty() {
            return None;
        }

        Some(Self {
            left_iris,
            right_iris,
            frame_width: frame.width,
        })
    }
}

/// Scale a normalized coordinate to pixels, truncating toward zero.
fn to_pixel(p: NormalizedPoint, width: u32, height: u32) -> PixelPoint {
    PixelPoint::new(
        (f64::from(p[0]) * f64::from(width)) as i32,
        (f64::from(p[1]) * f64::from(height)) as i32,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mesh_with_irises(left: NormalizedPoint, right: NormalizedPoint) -> Vec<NormalizedPoint> {
        let mut mesh = vec![[0.5, 0.5]; REFINED_MESH_LEN];
        for i in LEFT_IRIS {
            mesh[i] = left;
        }
        for i in RIGHT_IRIS {
            mesh[i] = right;
        }
        mesh
    }

    #[test]
    fn test_parse_mesh_record() {
        let json = serde_json::json!({
            "width": 640,
            "height": 480,
            "faces": [{ "landmarks": mesh_with_irises([0.25, 0.5], [0.75, 0.5]) }]
        });
        let frame: Frame = serde_json::from_value(json).unwrap();
        let iris = IrisLandmarks::from_frame(&frame).unwrap();
        assert_eq!(iris.frame_width, 640);
        assert_eq!(iris.left_iris, vec![PixelPoint::new(160, 240); 4]);
        assert_eq!(iris.right_iris, vec![PixelPoint::new(480, 240); 4]);
    }

    #[test]
    fn test_parse_compact_iris_record() {
        let line = r#"{"width":100,"height":50,"faces":[{"left_iris":[[0.10,0.2],[0.125,0.2]],"right_iris":[[0.3,0.2]]}]}"#;
        let frame: Frame = serde_json::from_str(line).unwrap();
        let iris = IrisLandmarks::from_frame(&frame).unwrap();
        assert_eq!(iris.left_iris, vec![PixelPoint::new(10, 10), PixelPoint::new(12, 10)]);
        assert_eq!(iris.right_iris, vec![PixelPoint::new(30, 10)]);
    }

    #[test]
    fn test_pixel_conversion_truncates() {
        assert_eq!(to_pixel([0.999, 0.0015], 100, 1000), PixelPoint::new(99, 1));
    }

    #[test]
    fn test_no_faces_is_no_face() {
        let frame: Frame = serde_json::from_str(r#"{"width":640,"height":480}"#).unwrap();
        assert!(IrisLandmarks::from_frame(&frame).is_none());
    }

    #[test]
    fn test_unrefined_mesh_is_no_face() {
        let frame = Frame {
            width: 640,
            height: 480,
            faces: vec![FaceRecord::Mesh { landmarks: vec![[0.5, 0.5]; 468] }],
        };
        assert!(IrisLandmarks::from_frame(&frame).is_none());
    }

    #[test]
    fn test_empty_iris_set_is_no_face() {
        let frame = Frame {
            width: 640,
            height: 480,
            faces: vec![FaceRecord::Iris { left_iris: vec![], right_iris: vec![[0.5, 0.5]] }],
        };
        assert!(IrisLandmarks::from_frame(&frame).is_none());
    }

    #[test]
    fn test_only_first_face_is_used() {
        let frame = Frame {
            width: 100,
            height: 100,
            faces: vec![
                FaceRecord::Iris { left_iris: vec![[0.1, 0.1]], right_iris: vec![[0.2, 0.1]] },
                FaceRecord::Iris { left_iris: vec![[0.8, 0.1]], right_iris: vec![[0.9, 0.1]] },
            ],
        };
        let iris = IrisLandmarks::from_frame(&frame).unwrap();
        assert_eq!(iris.left_iris, vec![PixelPoint::new(10, 10)]);
    }
}
