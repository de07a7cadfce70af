//! Error types for the probing tools
//!
//! This module defines the error types shared by the decoder, the diff
//! engine and the snapshot monitor.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for csprobe
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Input path does not exist
    #[error("File not found: {}", .0.display())]
    MissingFile(PathBuf),

    /// Read, write or copy failure
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The external diff invocation failed
    #[error("Error comparing files: {0}")]
    Subprocess(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// JSON encoding or decoding errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ProbeError {
    /// Wrap an I/O error with the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ProbeError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A length or limit that must be positive was zero
    #[error("{field} must be greater than zero")]
    ZeroValue { field: &'static str },

    /// Minimum context string length exceeds the truncation length
    #[error("Context string minimum ({min}) exceeds maximum ({max})")]
    ContextLengthRange { min: usize, max: usize },

    /// Device pattern list contains an empty entry
    #[error("Device pattern at index {0} is empty")]
    EmptyDevicePattern(usize),

    /// Polling interval is not a positive finite number of seconds
    #[error("Invalid polling interval: {0} seconds")]
    InvalidInterval(f64),
}

/// Specialized result types
pub type ProbeResult<T> = std::result::Result<T, ProbeError>;
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
