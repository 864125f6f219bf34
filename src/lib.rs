//! GazeServe: real-time horizontal gaze status service
//!
//! A background acquisition loop turns facial landmark frames into
//! LEFT / CENTER / RIGHT gaze observations; an HTTP endpoint reports the most
//! recent one while it is still fresh.
//!
//! ## Architecture
//!
//! - **Acquisition**: landmark sources (stdin, replay file, TCP extractor, synthetic)
//! - **Classifier**: iris centroids + frame width -> gaze label
//! - **Pipeline**: single-writer acquisition loop, lock-free status store, read-time freshness
//! - **API**: `/gaze`, `/health`, `/status`, `/stop`

pub mod acquisition;
pub mod api;
pub mod classifier;
pub mod config;
pub mod pipeline;
pub mod types;

// Re-export configuration
pub use config::{ConfigError, GazeConfig};

// Re-export commonly used types
pub use types::{FaceRecord, Frame, GazeLabel, GazeObservation, IrisLandmarks, PixelPoint};

// Re-export pipeline components
pub use pipeline::{
    AcquisitionLoop, AcquisitionMonitor, AcquisitionState, FrameEvent, GazeStatus,
    LandmarkSource, LoopStats, StatusStore,
};

// Re-export API entry point
pub use api::{create_app, ApiState};
