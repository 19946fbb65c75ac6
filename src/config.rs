//! Configuration for the dissection pipeline.
//!
//! Provides centralized configuration with sensible defaults; every section
//! can be loaded from or saved to JSON.

use serde::{Deserialize, Serialize};

use crate::error::{DissectError, Result};
use crate::io::IoLimits;
use crate::timeout::DEFAULT_TIMEOUT_SECONDS;

/// Master configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DissectConfig {
    /// File loading limits.
    pub io: IoConfig,
    /// Content sniffing for the media-type selection pass.
    pub sniff: SniffConfig,
    /// Background worker configuration.
    pub worker: WorkerConfig,
}

impl DissectConfig {
    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| DissectError::Serialization(format!("JSON serialization error: {}", e)))
    }

    /// Missing fields fall back to their defaults.
    pub fn from_json_str(json_str: &str) -> Result<Self> {
        serde_json::from_str(json_str)
            .map_err(|e| DissectError::Serialization(format!("JSON deserialization error: {}", e)))
    }
}

/// I/O configuration for file loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IoConfig {
    /// Maximum file size to open (default: 268435456 = 256MB).
    pub max_file_size: u64,
    /// Maximum bytes to read from a file (default: 268435456 = 256MB).
    pub max_read_bytes: u64,
}

impl Default for IoConfig {
    fn default() -> Self {
        let limits = IoLimits::default();
        Self {
            max_file_size: limits.max_file_size,
            max_read_bytes: limits.max_read_bytes,
        }
    }
}

impl IoConfig {
    pub fn limits(&self) -> IoLimits {
        IoLimits {
            max_file_size: self.max_file_size,
            max_read_bytes: self.max_read_bytes,
        }
    }
}

/// Sniffing configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SniffConfig {
    /// Maximum prefix inspected for content sniffing (default: 4096).
    pub max_sniff_size: usize,
    /// Fall back to an extension-derived media type when the content says nothing.
    pub extension_fallback: bool,
}

impl Default for SniffConfig {
    fn default() -> Self {
        Self {
            max_sniff_size: 4096,
            extension_fallback: false,
        }
    }
}

/// Background worker configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Per-job timeout in seconds (default: 60).
    pub timeout_seconds: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}
