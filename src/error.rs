// GNSS Sentinel - Satellite fix anomaly detection
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Error types for GNSS Sentinel
//!
//! Detection itself never fails: malformed samples surface as alerts.
//! Errors only arise when loading or validating configuration.

use thiserror::Error;

/// Result type alias for GNSS Sentinel operations
pub type Result<T> = std::result::Result<T, SentinelError>;

/// Main error type for GNSS Sentinel operations
#[derive(Error, Debug)]
pub enum SentinelError {
    /// Configuration rejected
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Reading a configuration file failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration JSON could not be parsed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors in detector configuration values
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Threshold is negative, NaN or infinite
    #[error("Invalid threshold for {field}: {value}")]
    InvalidThreshold { field: &'static str, value: f64 },
}
