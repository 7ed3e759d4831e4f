//! Core error types for workout-core.
//!
//! This module defines the error hierarchy using thiserror. Every
//! operation that touches the record source or the filesystem returns
//! [`CoreError`]; the caller decides how to surface it.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for workout-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// The health store is not present or cannot be opened
    #[error("Workout data source unavailable: {0}")]
    DataSourceUnavailable(String),

    /// Read access to workout data has not been granted
    #[error("Authorization required to read workout data")]
    AuthorizationRequired,

    /// The fetch returned zero records
    #[error("No workout records found")]
    NoRecordsFound,

    /// The underlying query failed
    #[error("Failed to fetch workout records: {message}")]
    FetchFailed { message: String },

    /// An artifact could not be written
    #[error("Failed to write {path}: {source}")]
    PersistenceFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV writer errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl CoreError {
    /// Wrap any displayable query failure as [`CoreError::FetchFailed`].
    pub fn fetch_failed(message: impl std::fmt::Display) -> Self {
        CoreError::FetchFailed {
            message: message.to_string(),
        }
    }
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Home/config directory could not be determined
    #[error("Could not determine configuration directory")]
    NoConfigDir,
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Date range with start after end
    #[error("Invalid date range: start ({start}) is after end ({end})")]
    InvalidDateRange {
        start: chrono::DateTime<chrono::Utc>,
        end: chrono::DateTime<chrono::Utc>,
    },

    /// Heatmap level outside 1..=5
    #[error("Invalid level {level} for '{label}': levels must be between 1 and {max}")]
    LevelOutOfRange { label: String, level: u8, max: u8 },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_failing_step() {
        assert_eq!(CoreError::NoRecordsFound.to_string(), "No workout records found");
        assert_eq!(
            CoreError::fetch_failed("query timed out").to_string(),
            "Failed to fetch workout records: query timed out"
        );

        let err = CoreError::PersistenceFailed {
            path: PathBuf::from("/tmp/out.csv"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().starts_with("Failed to write /tmp/out.csv"));
    }

    #[test]
    fn test_config_error_converts() {
        let err: CoreError = ConfigError::UnknownKey("nope".into()).into();
        assert!(matches!(err, CoreError::Config(ConfigError::UnknownKey(_))));
    }
}
