// GNSS Sentinel - Satellite fix anomaly detection
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Position samples as reported by a receiver.
//!
//! A sample is one polling cycle's view of the receiver. Fields a receiver
//! may omit (coordinates, HDOP) are optional; the engine decides what an
//! absent value means.
//!
//! Example JSON:
//! ```json
//! {
//!   "timestamp_ms": 120000,
//!   "latitude": 52.5200,
//!   "longitude": 13.4050,
//!   "satellite_count": 9,
//!   "hdop": 0.9,
//!   "fix_mode": "Fix3D"
//! }
//! ```

use crate::geodesic::Coordinates;
use serde::{Deserialize, Serialize};

/// Receiver lock quality.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FixMode {
    /// No position lock (receiver modes 0 and 1).
    #[default]
    NoFix,
    /// Horizontal position only.
    Fix2D,
    /// Full position including altitude.
    Fix3D,
}

impl FixMode {
    /// Map a gpsd-style numeric mode (0/1 = none, 2 = 2D, 3 = 3D).
    pub fn from_mode(mode: u8) -> Self {
        match mode {
            2 => FixMode::Fix2D,
            m if m >= 3 => FixMode::Fix3D,
            _ => FixMode::NoFix,
        }
    }

    /// Numeric mode, 1 for no fix.
    pub fn as_mode(&self) -> u8 {
        match self {
            FixMode::NoFix => 1,
            FixMode::Fix2D => 2,
            FixMode::Fix3D => 3,
        }
    }

    /// Whether the receiver has at least a 2D lock.
    pub fn is_valid(&self) -> bool {
        *self >= FixMode::Fix2D
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FixMode::NoFix => "NO FIX",
            FixMode::Fix2D => "2D FIX",
            FixMode::Fix3D => "3D FIX",
        }
    }
}

/// One position fix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionSample {
    /// Milliseconds on a monotonic-compatible clock.
    pub timestamp_ms: u64,

    /// Latitude in decimal degrees.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,

    /// Longitude in decimal degrees.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,

    /// Satellites used in the solution (0 if unknown).
    #[serde(default)]
    pub satellite_count: u32,

    /// Horizontal dilution of precision; `None` means unknown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hdop: Option<f64>,

    #[serde(default)]
    pub fix_mode: FixMode,
}

impl PositionSample {
    /// Create a sample with coordinates and a 3D fix.
    pub fn new(timestamp_ms: u64, latitude: f64, longitude: f64) -> Self {
        Self {
            timestamp_ms,
            latitude: Some(latitude),
            longitude: Some(longitude),
            satellite_count: 0,
            hdop: None,
            fix_mode: FixMode::Fix3D,
        }
    }

    /// Create a sample with no coordinates and no fix.
    pub fn empty(timestamp_ms: u64) -> Self {
        Self {
            timestamp_ms,
            latitude: None,
            longitude: None,
            satellite_count: 0,
            hdop: None,
            fix_mode: FixMode::NoFix,
        }
    }

    /// Builder: set satellite count.
    pub fn with_satellites(mut self, count: u32) -> Self {
        self.satellite_count = count;
        self
    }

    /// Builder: set HDOP.
    pub fn with_hdop(mut self, hdop: f64) -> Self {
        self.hdop = Some(hdop);
        self
    }

    /// Builder: set fix mode.
    pub fn with_fix_mode(mut self, fix_mode: FixMode) -> Self {
        self.fix_mode = fix_mode;
        self
    }

    /// Coordinates, if both are present and finite.
    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => {
                Some(Coordinates::new(lat, lon))
            }
            _ => None,
        }
    }

    /// Whether the fix mode allows quality and jump checks.
    pub fn has_fix(&self) -> bool {
        self.fix_mode.is_valid()
    }

    /// Parse from JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
