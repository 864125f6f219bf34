//! Acquisition Pipeline Module
//!
//! ```text
//! LandmarkSource --frame--> extract --iris--> classify --observation--> StatusStore
//!        ^                                                                  |
//!        |  backoff on failure, poll interval between cycles                | read
//!   AcquisitionLoop (single writer)                        HTTP handlers (many readers)
//! ```
//!
//! The store never expires data. Handlers judge freshness at read time with
//! [`freshness::evaluate`].

mod state;
pub mod acquisition_loop;
pub mod freshness;
pub mod source;

pub use acquisition_loop::AcquisitionLoop;
pub use freshness::{evaluate, GazeStatus};
pub use source::{FrameEvent, LandmarkSource, ReplaySource, StdinSource, SyntheticSource, TcpSource};
pub use state::*;
