//! Gaze Classifier
//!
//! Pure geometry: iris landmark sets + frame width -> horizontal gaze label.
//! No I/O and no state; safe to call from any task.
//!
//! ```text
//! left_center, right_center = centroid(iris points)      (truncated to pixels)
//! cx = floor((left_center.x + right_center.x) / 2)
//! cx <  left_fraction  * w  -> LEFT
//! cx >  right_fraction * w  -> RIGHT
//! otherwise                 -> CENTER
//! ```

use crate::config::ClassifierConfig;
use crate::types::{GazeLabel, IrisLandmarks, PixelPoint};

/// Result of classifying one face.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub label: GazeLabel,
    pub left_center: PixelPoint,
    pub right_center: PixelPoint,
    pub cx: i32,
    pub frame_width: u32,
}

/// Classify extracted iris landmarks.
pub fn classify_landmarks(iris: &IrisLandmarks, thresholds: &ClassifierConfig) -> Classification {
    classify(&iris.left_iris, &iris.right_iris, iris.frame_width, thresholds)
}

/// Classify gaze from raw iris point sets.
///
/// Total over non-empty point sets and a positive width. An empty set
/// contributes a `(0, 0)` centroid rather than failing.
pub fn classify(
    left_iris: &[PixelPoint],
    right_iris: &[PixelPoint],
    frame_width: u32,
    thresholds: &ClassifierConfig,
) -> Classification {
    let left_center = centroid(left_iris);
    let right_center = centroid(right_iris);
    // Widened so two centroids near i32::MAX cannot overflow; the mean fits back
    let cx = (i64::from(left_center.x) + i64::from(right_center.x)).div_euclid(2) as i32;

    Classification {
        label: label_for(cx, frame_width, thresholds),
        left_center,
        right_center,
        cx,
        frame_width,
    }
}

/// Map a horizontal midpoint to a gaze label for a frame of width `w`.
///
/// Both boundaries are exclusive: `cx == left_fraction * w` is CENTER.
pub fn label_for(cx: i32, w: u32, thresholds: &ClassifierConfig) -> GazeLabel {
    let cx = f64::from(cx);
    let w = f64::from(w);
    if cx < w * thresholds.left_fraction {
        GazeLabel::Left
    } else if cx > w * thresholds.right_fraction {
        GazeLabel::Right
    } else {
        GazeLabel::Center
    }
}

/// Arithmetic mean of a point set, truncated toward zero.
pub fn centroid(points: &[PixelPoint]) -> PixelPoint {
    if points.is_empty() {
        return PixelPoint::default();
    }
    let n = points.len() as i64;
    let (sx, sy) = points
        .iter()
        .fold((0i64, 0i64), |(sx, sy), p| (sx + i64::from(p.x), sy + i64::from(p.y)));
    PixelPoint::new((sx / n) as i32, (sy / n) as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FaceRecord, Frame};

    fn thresholds() -> ClassifierConfig {
        ClassifierConfig::default()
    }

    #[test]
    fn test_label_boundaries_at_width_100() {
        let t = thresholds();
        assert_eq!(label_for(39, 100, &t), GazeLabel::Left);
        assert_eq!(label_for(40, 100, &t), GazeLabel::Center);
        assert_eq!(label_for(60, 100, &t), GazeLabel::Center);
        assert_eq!(label_for(61, 100, &t), GazeLabel::Right);
    }

    #[test]
    fn test_centroid_truncates() {
        let pts = [
            PixelPoint::new(10, 20),
            PixelPoint::new(11, 21),
            PixelPoint::new(11, 21),
            PixelPoint::new(11, 21),
        ];
        // mean = (10.75, 20.75)
        assert_eq!(centroid(&pts), PixelPoint::new(10, 20));
    }

    #[test]
    fn test_centroid_of_empty_set_is_origin() {
        assert_eq!(centroid(&[]), PixelPoint::new(0, 0));
    }

    #[test]
    fn test_midpoint_uses_floor_division() {
        let c = classify(
            &[PixelPoint::new(100, 50)],
            &[PixelPoint::new(201, 50)],
            640,
            &thresholds(),
        );
        assert_eq!(c.cx, 150);
        assert_eq!(c.left_center, PixelPoint::new(100, 50));
        assert_eq!(c.right_center, PixelPoint::new(201, 50));
        assert_eq!(c.frame_width, 640);
    }

    #[test]
    fn test_midpoint_of_extreme_centroids_does_not_overflow() {
        let t = thresholds();
        let c = classify(
            &[PixelPoint::new(i32::MAX - 1, 0)],
            &[PixelPoint::new(i32::MAX - 3, 0)],
            u32::MAX,
            &t,
        );
        assert_eq!(c.cx, i32::MAX - 2);
        assert_eq!(c.label, GazeLabel::Center);

        let c = classify(
            &[PixelPoint::new(i32::MIN, 0)],
            &[PixelPoint::new(i32::MIN + 1, 0)],
            100,
            &t,
        );
        assert_eq!(c.cx, i32::MIN);
        assert_eq!(c.label, GazeLabel::Left);
    }

    #[test]
    fn test_very_wide_frame_classifies_without_panic() {
        let frame = Frame {
            width: 3_000_000_000,
            height: 10,
            faces: vec![FaceRecord::Iris {
                left_iris: vec![[0.9, 0.5]],
                right_iris: vec![[0.8, 0.5]],
            }],
        };
        let iris = IrisLandmarks::from_frame(&frame).unwrap();
        let c = classify_landmarks(&iris, &thresholds());
        // Both pixel xs saturate at i32::MAX, which is past 0.6 * 3e9
        assert_eq!(c.cx, i32::MAX);
        assert_eq!(c.label, GazeLabel::Right);
        assert_eq!(c.frame_width, 3_000_000_000);
    }

    #[test]
    fn test_classify_full_face() {
        let t = thresholds();
        // Both irises far to the left of a 640px frame
        let left = [PixelPoint::new(90, 200), PixelPoint::new(94, 204)];
        let right = [PixelPoint::new(150, 200), PixelPoint::new(154, 204)];
        assert_eq!(classify(&left, &right, 640, &t).label, GazeLabel::Left);

        let left = [PixelPoint::new(280, 240)];
        let right = [PixelPoint::new(360, 240)];
        assert_eq!(classify(&left, &right, 640, &t).label, GazeLabel::Center);

        let left = [PixelPoint::new(420, 240)];
        let right = [PixelPoint::new(500, 240)];
        assert_eq!(classify(&left, &right, 640, &t).label, GazeLabel::Right);
    }

    #[test]
    fn test_custom_thresholds() {
        let t = ClassifierConfig {
            left_fraction: 0.3,
            right_fraction: 0.7,
        };
        assert_eq!(label_for(35, 100, &t), GazeLabel::Center);
        assert_eq!(label_for(29, 100, &t), GazeLabel::Left);
        assert_eq!(label_for(71, 100, &t), GazeLabel::Right);
    }

    #[test]
    fn test_classify_landmarks_uses_frame_width() {
        let iris = IrisLandmarks {
            left_iris: vec![PixelPoint::new(30, 10)],
            right_iris: vec![PixelPoint::new(40, 10)],
            frame_width: 100,
        };
        let c = classify_landmarks(&iris, &thresholds());
        assert_eq!(c.cx, 35);
        assert_eq!(c.label, GazeLabel::Left);
    }
}
