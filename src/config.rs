// GNSS Sentinel - Satellite fix anomaly detection
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Detector configuration.

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Thresholds for quality and jump detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Step distance (meters) above which a fix counts as a jump.
    pub max_jump_meters: f64,

    /// HDOP above which a fix is flagged.
    pub max_hdop: f64,

    /// Satellite count below which a fix is flagged.
    pub min_satellites: u32,

    /// Minimum seconds between two jump alerts.
    pub spoof_cooldown_secs: u64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            max_jump_meters: 100.0,
            max_hdop: 5.0,
            min_satellites: 4,
            spoof_cooldown_secs: 10,
        }
    }
}

impl DetectorConfig {
    /// Builder: set jump threshold.
    pub fn with_max_jump_meters(mut self, meters: f64) -> Self {
        self.max_jump_meters = meters;
        self
    }

    /// Builder: set HDOP threshold.
    pub fn with_max_hdop(mut self, hdop: f64) -> Self {
        self.max_hdop = hdop;
        self
    }

    /// Builder: set satellite threshold.
    pub fn with_min_satellites(mut self, count: u32) -> Self {
        self.min_satellites = count;
        self
    }

    /// Builder: set jump alert cooldown.
    pub fn with_cooldown_secs(mut self, secs: u64) -> Self {
        self.spoof_cooldown_secs = secs;
        self
    }

    /// Cooldown window in milliseconds.
    pub fn cooldown_ms(&self) -> u64 {
        self.spoof_cooldown_secs.saturating_mul(1000)
    }

    /// Reject negative or non-finite thresholds.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        for (field, value) in [
            ("max_jump_meters", self.max_jump_meters),
            ("max_hdop", self.max_hdop),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidThreshold { field, value });
            }
        }
        Ok(())
    }

    /// Parse and validate from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: DetectorConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Serialize to pretty JSON.
    pub fn to_json_pretty(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SentinelError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = DetectorConfig::default();
        assert_eq!(config.max_jump_meters, 100.0);
        assert_eq!(config.max_hdop, 5.0);
        assert_eq!(config.min_satellites, 4);
        assert_eq!(config.spoof_cooldown_secs, 10);
        assert_eq!(config.cooldown_ms(), 10_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = DetectorConfig::from_json(r#"{"max_hdop": 2.5}"#).unwrap();
        assert_eq!(config.max_hdop, 2.5);
        assert_eq!(config.max_jump_meters, 100.0);
        assert_eq!(config.min_satellites, 4);
    }

    #[test]
    fn test_config_serialization() {
        let config = DetectorConfig::default().with_cooldown_secs(30);
        let json = config.to_json_pretty().unwrap();
        let parsed = DetectorConfig::from_json(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_negative_threshold_rejected() {
        let err = DetectorConfig::from_json(r#"{"max_jump_meters": -5.0}"#).unwrap_err();
        assert!(matches!(
            err,
            SentinelError::Config(ConfigError::InvalidThreshold {
                field: "max_jump_meters",
                ..
            })
        ));
    }

    #[test]
    fn test_non_finite_threshold_rejected() {
        let config = DetectorConfig::default().with_max_hdop(f64::INFINITY);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_json() {
        let err = DetectorConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, SentinelError::Json(_)));
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"min_satellites": 6, "spoof_cooldown_secs": 3}}"#).unwrap();
        file.flush().unwrap();

        let config = DetectorConfig::from_file(file.path()).unwrap();
        assert_eq!(config.min_satellites, 6);
        assert_eq!(config.spoof_cooldown_secs, 3);
    }

    #[test]
    fn test_missing_file() {
        let err = DetectorConfig::from_file("/nonexistent/sentinel.json").unwrap_err();
        assert!(matches!(err, SentinelError::Io(_)));
    }
}
