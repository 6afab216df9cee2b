//! Core error types for timetile-core.
//!
//! The engine itself only ever fails in two ways: a caller broke a documented
//! precondition (`InvalidArgument`) or an internal invariant did not hold
//! (`Logic`). The remaining variants belong to the host-side layers
//! (configuration, the JSON store file) so that the CLI can carry a single
//! error type.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for timetile-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A documented precondition was violated by the caller.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// An internal invariant failed; the current call is aborted.
    #[error("Logic error: {0}")]
    Logic(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CoreError {
    /// Shorthand for [`CoreError::InvalidArgument`].
    pub fn invalid(message: impl Into<String>) -> Self {
        CoreError::InvalidArgument(message.into())
    }

    /// Shorthand for [`CoreError::Logic`].
    pub fn logic(message: impl Into<String>) -> Self {
        CoreError::Logic(message.into())
    }

    /// True for caller-side precondition failures.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, CoreError::InvalidArgument(_))
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

    /// Key does not exist in the configuration tree
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Fails with `InvalidArgument` unless `condition` holds.
pub(crate) fn ensure(condition: bool, message: impl FnOnce() -> String) -> Result<()> {
    if condition {
        Ok(())
    } else {
        Err(CoreError::InvalidArgument(message()))
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
