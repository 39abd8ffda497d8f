//! Core error types for earlybird-core.
//!
//! Session operations can fail in exactly one way: being issued without an
//! active session. Everything else the tracker reports (insufficient data,
//! ungraded sessions) is an ordinary result, not an error.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for earlybird-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Poll or stop was issued with no active monitoring session.
    #[error("no active monitoring session")]
    NotStarted,

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
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

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
