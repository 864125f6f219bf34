//! Landmark data acquisition
//!
//! Handles frame records from external landmark extractors: the JSON-lines
//! record format, the TCP extractor client, and the synthetic generator.

pub mod landmark_client;
pub mod records;
pub mod synthetic;

pub use landmark_client::{LandmarkClient, LandmarkClientStats};
pub use records::{parse_frame_line, read_frame_file, CaptureError};
pub use synthetic::{SweepConfig, SweepGenerator};
