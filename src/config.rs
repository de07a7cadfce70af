//! Configuration management for the probing tools
//!
//! This module holds the tunable limits used by the extractors, the diff
//! engine and the report builders, together with the list of controller
//! device names the decoder looks for. Defaults match the values the tools
//! were calibrated with; a JSON file can override any subset of them.

use crate::error::{ConfigError, ConfigResult, ProbeError, ProbeResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Controller names known to appear in assignment files
pub const DEFAULT_DEVICE_PATTERNS: &[&str] = &[
    "Logic Control",
    "Logic Remote",
    "Console 1",
    "Launchpad",
    "TouchOSC",
    "microKONTROL",
];

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Substrings identifying controller devices
    pub device_patterns: Vec<String>,
    /// Minimum printable-run length for general string extraction
    pub min_string_length: usize,
    /// Minimum printable-run length for the strict (analyzer) mode
    pub strict_string_length: usize,
    /// Radius in bytes around a difference block searched for context strings
    pub context_radius: usize,
    /// Maximum context strings reported per difference block
    pub max_context_strings: usize,
    /// Context strings are truncated to this many bytes
    pub max_context_length: usize,
    /// Shortest printable run accepted as a context string
    pub min_context_length: usize,
    /// Maximum number of OSC mappings kept in a decode report
    pub mapping_limit: usize,
    /// Maximum number of OSC mappings printed in the text report
    pub text_mapping_limit: usize,
    /// Maximum nearby strings attached to a mapping
    pub nearby_limit: usize,
    /// Hex dump padding around difference blocks
    pub default_context_bytes: usize,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            device_patterns: DEFAULT_DEVICE_PATTERNS.iter().map(|s| s.to_string()).collect(),
            min_string_length: 4,
            strict_string_length: 8,
            context_radius: 100,
            max_context_strings: 5,
            max_context_length: 50,
            min_context_length: 4,
            mapping_limit: 100,
            text_mapping_limit: 30,
            nearby_limit: 3,
            default_context_bytes: 16,
        }
    }
}

impl ProbeConfig {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a configuration from a JSON file and validate it
    ///
    /// Missing fields fall back to their defaults.
    pub fn load(path: &Path) -> ProbeResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ProbeError::io(path, e))?;
        let config: ProbeConfig = serde_json::from_str(&content)?;
        config.validate()?;
        log::debug!("loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load from `path` when given, otherwise use defaults
    pub fn load_or_default(path: Option<&Path>) -> ProbeResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> ConfigResult<()> {
        let positive = [
            ("min_string_length", self.min_string_length),
            ("strict_string_length", self.strict_string_length),
            ("max_context_length", self.max_context_length),
            ("min_context_length", self.min_context_length),
        ];
        for (field, value) in positive {
            if value == 0 {
                return Err(ConfigError::ZeroValue { field });
            }
        }

        if self.min_context_length > self.max_context_length {
            return Err(ConfigError::ContextLengthRange {
                min: self.min_context_length,
                max: self.max_context_length,
            });
        }

        if let Some(index) = self.device_patterns.iter().position(|p| p.is_empty()) {
            return Err(ConfigError::EmptyDevicePattern(index));
        }

        Ok(())
    }
}

/// Convert a monitor polling interval given in seconds
///
/// Rejects zero, negative and non-finite values, and values too large to
/// represent as a `Duration`.
pub fn validate_interval(seconds: f64) -> ConfigResult<Duration> {
    if !(seconds.is_finite() && seconds > 0.0) {
        return Err(ConfigError::InvalidInterval(seconds));
    }
    Duration::try_from_secs_f64(seconds).map_err(|_| ConfigError::InvalidInterval(seconds))
}
