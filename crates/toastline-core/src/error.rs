//! Core error types for toastline-core.
//!
//! Scheduling itself never fails: unknown ids and repeated dismissals are
//! no-ops. The fallible edges are configuration I/O, scenario scripts and
//! the async service channel, and they all funnel into [`CoreError`].

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for toastline-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Scenario script errors
    #[error("Scenario error: {0}")]
    Scenario(#[from] ScenarioError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The service task has stopped and can no longer accept commands
    #[error("Toast service is no longer running")]
    ServiceClosed,

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
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

/// Scenario script errors.
#[derive(Error, Debug)]
pub enum ScenarioError {
    /// Script could not be parsed
    #[error("Failed to parse scenario: {0}")]
    ParseFailed(#[from] toml::de::Error),

    /// The embedded `[config]` table fails validation
    #[error("Invalid scenario config: {0}")]
    InvalidConfig(#[from] ConfigError),

    /// Steps are not in chronological order
    #[error("Step {index} at {at}ms is earlier than the previous step at {previous}ms")]
    OutOfOrder { index: usize, at: u64, previous: u64 },

    /// A step refers to a request label that was never issued
    #[error("Step {index} refers to unknown toast '{label}'")]
    UnknownLabel { index: usize, label: String },
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },

    /// Unknown enum variant given as text
    #[error("Unknown {kind} '{value}'")]
    UnknownVariant { kind: &'static str, value: String },
}

impl From<tokio::sync::oneshot::error::RecvError> for CoreError {
    fn from(_: tokio::sync::oneshot::error::RecvError) -> Self {
        CoreError::ServiceClosed
    }
}

impl<T> From<tokio::sync::mpsc::error::SendError<T>> for CoreError {
    fn from(_: tokio::sync::mpsc::error::SendError<T>) -> Self {
        CoreError::ServiceClosed
    }
}

impl From<Box<dyn std::error::Error + Send + Sync>> for CoreError {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        CoreError::Custom(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
