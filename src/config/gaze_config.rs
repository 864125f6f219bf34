//! Gaze service configuration - operator-tunable TOML values
//!
//! Every section implements `Default` with the built-in constants from
//! [`defaults`](super::defaults), so a missing or partial file behaves
//! exactly like the stock service.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

use super::defaults;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "GAZE_CONFIG";

/// Config file searched in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "gaze_config.toml";

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config I/O error ({}): {1}", .0.display())]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Config parse error ({}): {1}", .0.display())]
    Parse(PathBuf, #[source] toml::de::Error),

    #[error("Config serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Config validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
}

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for a gaze service deployment.
///
/// Load with `GazeConfig::load()` which searches:
/// 1. `$GAZE_CONFIG` env var
/// 2. `./gaze_config.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GazeConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Acquisition loop pacing
    #[serde(default)]
    pub acquisition: AcquisitionConfig,

    /// Staleness window for the status endpoint
    #[serde(default)]
    pub freshness: FreshnessConfig,

    /// Gaze label thresholds
    #[serde(default)]
    pub classifier: ClassifierConfig,
}

impl GazeConfig {
    /// Load configuration using the standard search order.
    ///
    /// Never fails: unreadable or invalid files are logged and skipped.
    pub fn load() -> Self {
        // 1. Check env var
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded gaze config from {}", CONFIG_ENV_VAR);
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from {}, falling back", CONFIG_ENV_VAR);
                    }
                }
            } else {
                warn!(path = %path, "{} points to non-existent file, falling back", CONFIG_ENV_VAR);
            }
        }

        // 2. Check ./gaze_config.toml
        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("Loaded gaze config from ./{}", LOCAL_CONFIG_FILE);
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./{}, using defaults", LOCAL_CONFIG_FILE);
                }
            }
        }

        // 3. Defaults
        info!("No {} found, using built-in defaults", LOCAL_CONFIG_FILE);
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;

        // Unknown keys are warnings only
        for w in super::validation::validate_unknown_keys(&contents) {
            warn!("{}", w);
        }

        let config: Self =
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the current config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validate all values for internal consistency.
    ///
    /// Rules:
    /// - Classifier fractions lie in (0, 1) and left < right
    /// - `max_age_secs` is positive and finite
    /// - Poll interval, backoff and connect timeout are non-zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors: Vec<String> = Vec::new();

        let c = &self.classifier;
        for (name, value) in [
            ("classifier.left_fraction", c.left_fraction),
            ("classifier.right_fraction", c.right_fraction),
        ] {
            if !(value > 0.0 && value < 1.0) {
                errors.push(format!("{name} must be in (0, 1), got {value}"));
            }
        }
        if c.left_fraction >= c.right_fraction {
            errors.push(format!(
                "classifier.left_fraction ({}) must be < classifier.right_fraction ({})",
                c.left_fraction, c.right_fraction
            ));
        }

        let max_age = self.freshness.max_age_secs;
        if !(max_age.is_finite() && max_age > 0.0) {
            errors.push(format!(
                "freshness.max_age_secs must be positive and finite, got {max_age}"
            ));
        }

        let a = &self.acquisition;
        for (name, value) in [
            ("acquisition.poll_interval_ms", a.poll_interval_ms),
            ("acquisition.backoff_ms", a.backoff_ms),
            ("acquisition.connect_timeout_secs", a.connect_timeout_secs),
        ] {
            if value == 0 {
                errors.push(format!("{name} must be > 0"));
            }
        }

        if self.server.addr.trim().is_empty() {
            errors.push("server.addr must not be empty".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

// ============================================================================
// Server
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server bind address.
    ///
    /// Can be overridden by `GAZE_SERVER_ADDR` env var or `--addr` CLI flag.
    #[serde(default = "default_server_addr")]
    pub addr: String,
}

fn default_server_addr() -> String {
    defaults::DEFAULT_SERVER_ADDR.to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_server_addr(),
        }
    }
}

// ============================================================================
// Acquisition
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcquisitionConfig {
    /// Pause between cycles regardless of outcome (ms)
    pub poll_interval_ms: u64,
    /// Wait after a failed frame retrieval (ms)
    pub backoff_ms: u64,
    /// Connect timeout for network sources (seconds)
    pub connect_timeout_secs: u64,
    /// Progress log cadence in captured frames (0 disables)
    pub progress_log_every: u64,
}

impl AcquisitionConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: defaults::POLL_INTERVAL_MS,
            backoff_ms: defaults::CAPTURE_BACKOFF_MS,
            connect_timeout_secs: defaults::CONNECT_TIMEOUT_SECS,
            progress_log_every: defaults::PROGRESS_LOG_EVERY,
        }
    }
}

// ============================================================================
// Freshness
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FreshnessConfig {
    /// A detection older than this is reported as "no data" (seconds)
    pub max_age_secs: f64,
}

impl Default for FreshnessConfig {
    fn default() -> Self {
        Self {
            max_age_secs: defaults::MAX_AGE_SECS,
        }
    }
}

// ============================================================================
// Classifier
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// `cx < left_fraction * w` is LEFT
    pub left_fraction: f64,
    /// `cx > right_fraction * w` is RIGHT
    pub right_fraction: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            left_fraction: defaults::LEFT_FRACTION,
            right_fraction: defaults::RIGHT_FRACTION,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        let config = GazeConfig::default();
        assert!(config.validate().is_ok(), "Default config must always validate");
    }

    #[test]
    fn test_empty_toml_produces_defaults() {
        let config: GazeConfig = toml::from_str("").expect("empty TOML should parse");
        assert_eq!(config, GazeConfig::default());
        assert_eq!(config.server.addr, "0.0.0.0:5000");
        assert_eq!(config.acquisition.poll_interval_ms, 10);
        assert_eq!(config.acquisition.backoff_ms, 100);
        assert_eq!(config.freshness.max_age_secs, 2.0);
        assert_eq!(config.classifier.left_fraction, 0.4);
        assert_eq!(config.classifier.right_fraction, 0.6);
    }

    #[test]
    fn test_partial_toml_override() {
        let toml_str = r#"
[freshness]
max_age_secs = 0.5

[acquisition]
backoff_ms = 250
"#;
        let config: GazeConfig = toml::from_str(toml_str).expect("partial TOML should parse");
        assert_eq!(config.freshness.max_age_secs, 0.5);
        assert_eq!(config.acquisition.backoff_ms, 250);
        // Non-overridden values retain defaults
        assert_eq!(config.acquisition.poll_interval_ms, 10);
        assert_eq!(config.classifier.left_fraction, 0.4);
    }

    #[test]
    fn test_validation_catches_inverted_fractions() {
        let mut config = GazeConfig::default();
        config.classifier.left_fraction = 0.7;
        config.classifier.right_fraction = 0.3;
        match config.validate() {
            Err(ConfigError::Validation(errors)) => {
                assert!(errors.iter().any(|e| e.contains("left_fraction")));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_validation_catches_bad_max_age() {
        let mut config = GazeConfig::default();
        config.freshness.max_age_secs = 0.0;
        assert!(config.validate().is_err());
        config.freshness.max_age_secs = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_collects_all_errors() {
        let mut config = GazeConfig::default();
        config.acquisition.poll_interval_ms = 0;
        config.acquisition.backoff_ms = 0;
        config.classifier.right_fraction = 1.5;
        match config.validate() {
            Err(ConfigError::Validation(errors)) => assert_eq!(errors.len(), 3),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_roundtrip_toml() {
        let original = GazeConfig::default();
        let toml_str = original.to_toml().expect("serialization should work");
        let roundtripped: GazeConfig = toml::from_str(&toml_str).expect("deserialization should work");
        assert_eq!(original, roundtripped);
    }

    #[test]
    fn test_durations() {
        let a = AcquisitionConfig::default();
        assert_eq!(a.poll_interval(), Duration::from_millis(10));
        assert_eq!(a.backoff(), Duration::from_millis(100));
        assert_eq!(a.connect_timeout(), Duration::from_secs(5));
    }
}
