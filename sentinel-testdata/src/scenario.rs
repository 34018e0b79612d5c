// GNSS Sentinel Testdata - Attack scenarios
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Jamming and spoofing scenarios with their expected detection outcome.
//!
//! Each preset uses the default 120-sample walk and injects one
//! disturbance at sample 60. Expectations assume the default detector
//! configuration.

use crate::dataset::FixDataset;
use crate::disturbance::{DisturbanceConfig, DisturbanceKind};
use crate::generator::{generate_track, TrackConfig};
use gnss_sentinel::{AlertEvent, AlertKind, DetectorConfig, SpoofDetectionEngine};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Sample index where preset disturbances start.
pub const DISTURBANCE_START: usize = 60;

/// Default seed used by presets.
pub const SCENARIO_SEED: u64 = 42;

/// Alerts a scenario should produce.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedAlerts {
    pub no_valid_data: usize,
    pub low_satellite_count: usize,
    pub high_hdop: usize,
    /// Sample indices where SUDDEN_JUMP fires.
    pub jump_samples: Vec<usize>,
}

impl ExpectedAlerts {
    /// Tally alerts from a replay.
    pub fn from_alerts(alerts: &[(usize, AlertEvent)]) -> Self {
        let mut tally = Self::default();
        for (idx, alert) in alerts {
            match alert.kind {
                AlertKind::NoValidData => tally.no_valid_data += 1,
                AlertKind::LowSatelliteCount => tally.low_satellite_count += 1,
                AlertKind::HighHdop => tally.high_hdop += 1,
                AlertKind::SuddenJump => tally.jump_samples.push(*idx),
            }
        }
        tally
    }

    pub fn total(&self) -> usize {
        self.no_valid_data + self.low_satellite_count + self.high_hdop + self.jump_samples.len()
    }
}

/// Scenario definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpoofScenario {
    pub name: String,
    pub description: String,
    pub track: TrackConfig,
    #[serde(default)]
    pub disturbances: Vec<DisturbanceConfig>,
    pub expected: ExpectedAlerts,
}

/// Result of running a scenario through an engine.
#[derive(Debug, Clone)]
pub struct ScenarioOutcome {
    pub dataset: FixDataset,
    pub alerts: Vec<(usize, AlertEvent)>,
    pub observed: ExpectedAlerts,
}

impl ScenarioOutcome {
    pub fn matches(&self, expected: &ExpectedAlerts) -> bool {
        self.observed == *expected
    }
}

impl SpoofScenario {
    fn preset(name: &str, description: &str, disturbance: Option<DisturbanceKind>) -> Self {
        let disturbances = disturbance
            .map(|kind| DisturbanceConfig::new(kind, DISTURBANCE_START).with_duration(20))
            .into_iter()
            .collect();
        Self {
            name: name.to_string(),
            description: description.to_string(),
            track: TrackConfig::new().with_seed(SCENARIO_SEED),
            disturbances,
            expected: ExpectedAlerts::default(),
        }
    }

    /// Clean walk, no alerts.
    pub fn nominal() -> Self {
        Self::preset("nominal", "Healthy receiver walking at 1.5 m/s", None)
    }

    /// Reception degraded for 20 samples.
    pub fn jamming() -> Self {
        let mut s = Self::preset(
            "jamming",
            "Constellation drops to 2 satellites with HDOP 8",
            Some(DisturbanceKind::Jamming {
                satellites: 2,
                hdop: 8.0,
            }),
        );
        s.expected.low_satellite_count = 20;
        s.expected.high_hdop = 20;
        s
    }

    /// Receiver loses lock for 20 samples; detection pauses silently.
    pub fn fix_loss() -> Self {
        Self::preset(
            "fix_loss",
            "Receiver reports positions without a fix",
            Some(DisturbanceKind::FixLoss),
        )
    }

    /// No coordinates for 20 samples.
    pub fn dropout() -> Self {
        let mut s = Self::preset(
            "dropout",
            "Receiver stops reporting coordinates",
            Some(DisturbanceKind::Dropout),
        );
        s.expected.no_valid_data = 20;
        s
    }

    /// Position displaced by 2 km for 20 samples.
    pub fn teleport() -> Self {
        let mut s = Self::preset(
            "teleport",
            "Reported position jumps 2 km south and back",
            Some(DisturbanceKind::Teleport {
                offset_m: 2_000.0,
                bearing_deg: 180.0,
            }),
        );
        s.expected.jump_samples = vec![DISTURBANCE_START, DISTURBANCE_START + 20];
        s
    }

    /// Position dragged east 20 m per sample for 40 samples, then released.
    pub fn creeping_spoof() -> Self {
        let mut s = Self::preset(
            "creeping_spoof",
            "Spoofer drags the fix away below the jump threshold",
            Some(DisturbanceKind::CreepingSpoof {
                meters_per_sample: 20.0,
                bearing_deg: 90.0,
            }),
        );
        s.disturbances[0].duration_samples = Some(40);
        s.expected.jump_samples = vec![DISTURBANCE_START + 40];
        s
    }

    /// Generate the scenario's dataset.
    pub fn generate(&self) -> FixDataset {
        generate_track(&self.track, &self.disturbances)
            .with_name(&self.name)
            .with_description(&self.description)
    }

    /// Generate and replay through a fresh engine.
    pub fn run(&self, config: &DetectorConfig) -> ScenarioOutcome {
        let dataset = self.generate();
        let alerts = replay_dataset(&dataset, config);
        let observed = ExpectedAlerts::from_alerts(&alerts);
        ScenarioOutcome {
            dataset,
            alerts,
            observed,
        }
    }

    /// Load scenario from JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, std::io::Error> {
        let json = fs::read_to_string(path)?;
        serde_json::from_str(&json)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    /// Save scenario to JSON file.
    pub fn to_json_file(&self, path: impl AsRef<Path>) -> Result<(), std::io::Error> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        fs::write(path, json)
    }
}

/// Feed every row to a fresh engine; alerts are tagged with their row index.
pub fn replay_dataset(dataset: &FixDataset, config: &DetectorConfig) -> Vec<(usize, AlertEvent)> {
    let mut engine = SpoofDetectionEngine::new(config.clone());
    dataset
        .to_samples()
        .iter()
        .enumerate()
        .flat_map(|(idx, sample)| {
            engine
                .process(sample)
                .into_iter()
                .map(move |alert| (idx, alert))
        })
        .collect()
}

/// Collection of predefined scenarios.
pub fn predefined_scenarios() -> Vec<SpoofScenario> {
    vec![
        SpoofScenario::nominal(),
        SpoofScenario::jamming(),
        SpoofScenario::fix_loss(),
        SpoofScenario::dropout(),
        SpoofScenario::teleport(),
        SpoofScenario::creeping_spoof(),
    ]
}
