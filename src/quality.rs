// GNSS Sentinel - Satellite fix anomaly detection
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Per-sample fix quality checks.

use crate::alert::AlertEvent;
use crate::config::DetectorConfig;
use crate::sample::PositionSample;

/// Stateless satellite count and HDOP checks.
///
/// Satellite and HDOP figures mean nothing without a lock, so callers only
/// evaluate samples whose fix mode is at least 2D.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixQualityEvaluator;

impl FixQualityEvaluator {
    /// Returns LowSatelliteCount then HighHdop, each only when it applies.
    pub fn evaluate(sample: &PositionSample, config: &DetectorConfig) -> Vec<AlertEvent> {
        let mut alerts = Vec::with_capacity(2);

        if sample.satellite_count < config.min_satellites {
            alerts.push(AlertEvent::low_satellite_count(
                sample.timestamp_ms,
                sample.satellite_count,
                config.min_satellites,
            ));
        }

        // Unknown HDOP is not bad HDOP
        if let Some(hdop) = sample.hdop {
            if hdop > config.max_hdop {
                alerts.push(AlertEvent::high_hdop(
                    sample.timestamp_ms,
                    hdop,
                    config.max_hdop,
                ));
            }
        }

        alerts
    }
}
