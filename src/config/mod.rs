//! Gaze Service Configuration
//!
//! Per-deployment tuning loaded from TOML, replacing hardcoded pacing and
//! threshold literals with operator-tunable values.
//!
//! ## Loading Order
//!
//! 1. `--config <path>` CLI flag (load failure is fatal)
//! 2. `GAZE_CONFIG` environment variable (path to TOML file)
//! 3. `gaze_config.toml` in the current working directory
//! 4. Built-in defaults (see [`defaults`])
//!
//! The loaded config is validated once at startup and then passed by value
//! (or shared handle) to the acquisition loop and the HTTP layer.

mod gaze_config;
pub mod defaults;
pub mod validation;

pub use gaze_config::*;
