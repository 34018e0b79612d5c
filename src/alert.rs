// GNSS Sentinel - Satellite fix anomaly detection
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Alert types emitted by the detectors.

use serde::{Deserialize, Serialize};

/// Kind of alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlertKind {
    /// Sample carried no usable coordinates.
    NoValidData,
    /// Too few satellites in the solution (possible jamming).
    LowSatelliteCount,
    /// Horizontal dilution of precision too high (possible spoofing).
    HighHdop,
    /// Implausible position jump (possible spoofing).
    SuddenJump,
}

impl AlertKind {
    /// All kinds, in emission order.
    pub const ALL: [AlertKind; 4] = [
        AlertKind::NoValidData,
        AlertKind::LowSatelliteCount,
        AlertKind::HighHdop,
        AlertKind::SuddenJump,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::NoValidData => "NO_VALID_DATA",
            AlertKind::LowSatelliteCount => "LOW_SATELLITE_COUNT",
            AlertKind::HighHdop => "HIGH_HDOP",
            AlertKind::SuddenJump => "SUDDEN_JUMP",
        }
    }

    /// Console marker, escalating with how strongly the kind implies spoofing.
    pub fn marker(&self) -> &'static str {
        match self {
            AlertKind::NoValidData | AlertKind::LowSatelliteCount => "!",
            AlertKind::HighHdop => "!!",
            AlertKind::SuddenJump => "!!!",
        }
    }

    pub fn severity(&self) -> AlertSeverity {
        match self {
            AlertKind::SuddenJump => AlertSeverity::Critical,
            _ => AlertSeverity::Warning,
        }
    }
}

/// Severity level of an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AlertSeverity {
    Warning,
    Critical,
}

impl AlertSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertSeverity::Warning => "WARN",
            AlertSeverity::Critical => "CRIT",
        }
    }
}

/// Measured values behind an alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AlertDetails {
    SatelliteCount { observed: u32, minimum: u32 },
    Hdop { observed: f64, maximum: f64 },
    Jump { distance_m: f64, threshold_m: f64 },
    None,
}

/// An alert raised for one sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertEvent {
    pub kind: AlertKind,
    pub severity: AlertSeverity,
    /// Timestamp of the sample that raised the alert (ms).
    pub timestamp_ms: u64,
    /// Human-readable message including the measured values.
    pub message: String,
    pub details: AlertDetails,
}

impl AlertEvent {
    /// Create a new alert; severity follows from the kind.
    pub fn new(
        kind: AlertKind,
        timestamp_ms: u64,
        message: impl Into<String>,
        details: AlertDetails,
    ) -> Self {
        Self {
            kind,
            severity: kind.severity(),
            timestamp_ms,
            message: message.into(),
            details,
        }
    }

    /// Sample had no usable latitude/longitude.
    pub fn no_valid_data(timestamp_ms: u64) -> Self {
        Self::new(
            AlertKind::NoValidData,
            timestamp_ms,
            "No valid lat/lon data available",
            AlertDetails::None,
        )
    }

    pub fn low_satellite_count(timestamp_ms: u64, observed: u32, minimum: u32) -> Self {
        Self::new(
            AlertKind::LowSatelliteCount,
            timestamp_ms,
            format!(
                "Low satellite count: {} (minimum {}), possible jamming",
                observed, minimum
            ),
            AlertDetails::SatelliteCount { observed, minimum },
        )
    }

    pub fn high_hdop(timestamp_ms: u64, observed: f64, maximum: f64) -> Self {
        Self::new(
            AlertKind::HighHdop,
            timestamp_ms,
            format!(
                "High HDOP ({:.1}, maximum {:.1}), possible spoof",
                observed, maximum
            ),
            AlertDetails::Hdop { observed, maximum },
        )
    }

    pub fn sudden_jump(timestamp_ms: u64, distance_m: f64, threshold_m: f64) -> Self {
        Self::new(
            AlertKind::SuddenJump,
            timestamp_ms,
            format!(
                "Sudden jump of {:.1} meters (threshold {:.1}), possible spoof",
                distance_m, threshold_m
            ),
            AlertDetails::Jump {
                distance_m,
                threshold_m,
            },
        )
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_as_str() {
        assert_eq!(AlertKind::NoValidData.as_str(), "NO_VALID_DATA");
        assert_eq!(AlertKind::SuddenJump.as_str(), "SUDDEN_JUMP");
    }

    #[test]
    fn test_severity_by_kind() {
        assert_eq!(AlertKind::SuddenJump.severity(), AlertSeverity::Critical);
        assert_eq!(AlertKind::HighHdop.severity(), AlertSeverity::Warning);
        assert_eq!(AlertKind::LowSatelliteCount.severity(), AlertSeverity::Warning);
        assert!(AlertSeverity::Critical > AlertSeverity::Warning);
    }

    #[test]
    fn test_markers_escalate() {
        assert_eq!(AlertKind::LowSatelliteCount.marker(), "!");
        assert_eq!(AlertKind::HighHdop.marker(), "!!");
        assert_eq!(AlertKind::SuddenJump.marker(), "!!!");
    }

    #[test]
    fn test_low_satellite_message() {
        let alert = AlertEvent::low_satellite_count(1000, 3, 4);
        assert_eq!(alert.kind, AlertKind::LowSatelliteCount);
        assert!(alert.message.contains('3'));
        assert!(alert.message.contains("jamming"));
        assert_eq!(
            alert.details,
            AlertDetails::SatelliteCount {
                observed: 3,
                minimum: 4
            }
        );
    }

    #[test]
    fn test_sudden_jump_message() {
        let alert = AlertEvent::sudden_jump(2000, 150.04, 100.0);
        assert_eq!(alert.severity, AlertSeverity::Critical);
        assert!(alert.message.contains("150.0 meters"));
        match alert.details {
            AlertDetails::Jump {
                distance_m,
                threshold_m,
            } => {
                assert!((distance_m - 150.04).abs() < 1e-9);
                assert!((threshold_m - 100.0).abs() < 1e-9);
            }
            _ => panic!("Wrong details type"),
        }
    }

    #[test]
    fn test_json_serialization() {
        let alert = AlertEvent::high_hdop(1000, 6.0, 5.0);
        let json = alert.to_json().unwrap();
        assert!(json.contains("HighHdop"));
        assert!(json.contains("1000"));

        let parsed: AlertEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, alert);
    }
}
