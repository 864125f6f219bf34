//! Shared data structures for the gaze estimation pipeline
//!
//! - Landmark Source: Frame, FaceRecord, IrisLandmarks (external extractor records)
//! - Gaze Classifier: GazeLabel, PixelPoint, GazeObservation

mod gaze;
mod landmarks;

pub use gaze::*;
pub use landmarks::*;
