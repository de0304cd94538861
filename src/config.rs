//! Configuration file loading.
//!
//! Settings live in a JSON file shaped like [`EngineConfig`]. Every field
//! is optional and falls back to its default:
//!
//! ```json
//! {
//!   "tick_resolution": "centiseconds",
//!   "auto_reset_on_expiry": false,
//!   "pomodoro": { "work_seconds": 3000, "auto_start_next": true }
//! }
//! ```

use std::fs;
use std::path::Path;

use thiserror::Error;
use tracing::debug;

use crate::types::EngineConfig;

/// Errors that can occur while loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config file {path}: {message}")]
    Io {
        /// Path that was read
        path: String,
        /// Underlying error message
        message: String,
    },

    /// The file is not valid JSON for an engine configuration.
    #[error("failed to parse config file {path}: {message}")]
    Parse {
        /// Path that was parsed
        path: String,
        /// Underlying error message
        message: String,
    },

    /// The configuration parsed but holds out-of-range values.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Loads and validates an engine configuration from a JSON file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed or validated.
pub fn load_config(path: &Path) -> Result<EngineConfig, ConfigError> {
    let path_str = path.display().to_string();
    let text = fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path_str.clone(),
        message: e.to_string(),
    })?;

    let config = parse_config(&text).map_err(|e| match e {
        ConfigError::Parse { message, .. } => ConfigError::Parse {
            path: path_str.clone(),
            message,
        },
        other => other,
    })?;

    debug!(path = %path_str, "Loaded configuration");
    Ok(config)
}

/// Parses and validates an engine configuration from JSON text.
///
/// # Errors
///
/// Returns `ConfigError::Parse` for malformed JSON and
/// `ConfigError::Invalid` for out-of-range values.
pub fn parse_config(text: &str) -> Result<EngineConfig, ConfigError> {
    let config: EngineConfig = serde_json::from_str(text).map_err(|e| ConfigError::Parse {
        path: "<inline>".to_string(),
        message: e.to_string(),
    })?;
    config.validate().map_err(ConfigError::Invalid)?;
    Ok(config)
}
