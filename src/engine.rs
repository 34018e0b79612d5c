// GNSS Sentinel - Satellite fix anomaly detection
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! SpoofDetectionEngine - per-sample orchestration of the detectors.

use crate::alert::{AlertEvent, AlertKind};
use crate::config::DetectorConfig;
use crate::error::ConfigError;
use crate::jump::{JumpDetector, JumpDetectorState};
use crate::quality::FixQualityEvaluator;
use crate::sample::PositionSample;
use serde::{Deserialize, Serialize};

/// How a sample was treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SampleStatus {
    /// No usable coordinates; reported as a NoValidData alert.
    NoData,
    /// Coordinates present but no lock; detection paused.
    NoFix,
    /// Quality and jump checks ran.
    Fix,
}

impl SampleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SampleStatus::NoData => "no_data",
            SampleStatus::NoFix => "no_fix",
            SampleStatus::Fix => "fix",
        }
    }
}

/// Result of processing one sample.
#[derive(Debug, Clone, PartialEq)]
pub struct Assessment {
    pub status: SampleStatus,
    /// Alerts in emission order.
    pub alerts: Vec<AlertEvent>,
}

/// Counters since creation or the last reset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineStats {
    pub samples_processed: u64,
    pub no_data_samples: u64,
    pub no_fix_samples: u64,
    pub fix_samples: u64,
    pub no_valid_data_alerts: u64,
    pub low_satellite_alerts: u64,
    pub high_hdop_alerts: u64,
    pub sudden_jump_alerts: u64,
    pub suppressed_jumps: u64,
}

impl EngineStats {
    /// Alerts of one kind.
    pub fn alerts(&self, kind: AlertKind) -> u64 {
        match kind {
            AlertKind::NoValidData => self.no_valid_data_alerts,
            AlertKind::LowSatelliteCount => self.low_satellite_alerts,
            AlertKind::HighHdop => self.high_hdop_alerts,
            AlertKind::SuddenJump => self.sudden_jump_alerts,
        }
    }

    pub fn total_alerts(&self) -> u64 {
        AlertKind::ALL.iter().map(|k| self.alerts(*k)).sum()
    }

    fn record(&mut self, assessment: &Assessment) {
        self.samples_processed += 1;
        match assessment.status {
            SampleStatus::NoData => self.no_data_samples += 1,
            SampleStatus::NoFix => self.no_fix_samples += 1,
            SampleStatus::Fix => self.fix_samples += 1,
        }
        for alert in &assessment.alerts {
            match alert.kind {
                AlertKind::NoValidData => self.no_valid_data_alerts += 1,
                AlertKind::LowSatelliteCount => self.low_satellite_alerts += 1,
                AlertKind::HighHdop => self.high_hdop_alerts += 1,
                AlertKind::SuddenJump => self.sudden_jump_alerts += 1,
            }
        }
    }
}

/// Detection engine for one receiver.
///
/// Owns the jump detector state exclusively. Run one engine per monitored
/// receiver; sample timestamps must come from a clock that does not step
/// backwards.
pub struct SpoofDetectionEngine {
    config: DetectorConfig,
    jump_detector: JumpDetector,
    stats: EngineStats,
}

impl SpoofDetectionEngine {
    /// Create a new engine with the given configuration.
    pub fn new(config: DetectorConfig) -> Self {
        Self {
            config,
            jump_detector: JumpDetector::new(),
            stats: EngineStats::default(),
        }
    }

    /// Process a sample and return its alerts in order.
    pub fn process(&mut self, sample: &PositionSample) -> Vec<AlertEvent> {
        self.assess(sample).alerts
    }

    /// Process a sample and report how it was treated.
    pub fn assess(&mut self, sample: &PositionSample) -> Assessment {
        let assessment = self.evaluate(sample);

        log::debug!(
            "Sample at {} ms: {} ({} alerts)",
            sample.timestamp_ms,
            assessment.status.as_str(),
            assessment.alerts.len()
        );
        for alert in &assessment.alerts {
            log::warn!("[{}] {}", alert.kind.as_str(), alert.message);
        }

        self.stats.record(&assessment);
        self.stats.suppressed_jumps = self.jump_detector.suppressed_jumps();
        assessment
    }

    fn evaluate(&mut self, sample: &PositionSample) -> Assessment {
        let Some(position) = sample.coordinates() else {
            return Assessment {
                status: SampleStatus::NoData,
                alerts: vec![AlertEvent::no_valid_data(sample.timestamp_ms)],
            };
        };

        if !sample.has_fix() {
            return Assessment {
                status: SampleStatus::NoFix,
                alerts: Vec::new(),
            };
        }

        let mut alerts = FixQualityEvaluator::evaluate(sample, &self.config);
        if let Some(alert) = self
            .jump_detector
            .check(position, &self.config, sample.timestamp_ms)
        {
            alerts.push(alert);
        }

        Assessment {
            status: SampleStatus::Fix,
            alerts,
        }
    }

    /// Get current configuration.
    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Swap in a new configuration; detector state is kept.
    ///
    /// An invalid configuration is rejected and the current one stays active.
    pub fn replace_config(&mut self, config: DetectorConfig) -> Result<(), ConfigError> {
        config.validate()?;
        log::info!("Detector configuration replaced: {:?}", config);
        self.config = config;
        Ok(())
    }

    pub fn jump_state(&self) -> &JumpDetectorState {
        self.jump_detector.state()
    }

    /// Step distance measured on the last valid fix.
    pub fn last_step_m(&self) -> Option<f64> {
        self.jump_detector.last_distance_m()
    }

    pub fn stats(&self) -> &EngineStats {
        &self.stats
    }

    /// Reset all state, as if the engine had just started.
    pub fn reset(&mut self) {
        log::info!("Detection engine reset");
        self.jump_detector.reset();
        self.stats = EngineStats::default();
    }
}
