// GNSS Sentinel Testdata - Synthetic fix track generator
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! # GNSS Sentinel Testdata
//!
//! Synthetic receiver tracks for exercising the detection engine:
//!
//! - **Tracks**: a noisy walk with a healthy constellation
//! - **Disturbances**: jamming, fix loss, dropout, teleport, creeping spoof
//! - **Scenarios**: presets pairing a disturbance with the alerts it must raise
//!
//! ## Quick Start
//!
//! ```rust
//! use gnss_sentinel::DetectorConfig;
//! use sentinel_testdata::SpoofScenario;
//!
//! let scenario = SpoofScenario::teleport();
//! let outcome = scenario.run(&DetectorConfig::default());
//! assert!(outcome.matches(&scenario.expected));
//! ```
//!
//! Datasets export to CSV with the columns
//! `timestamp_ms,latitude,longitude,satellites,hdop,mode`, which is what
//! the monitor's replay mode reads.

pub mod dataset;
pub mod disturbance;
pub mod generator;
pub mod scenario;

// Re-exports for convenience
pub use dataset::{DatasetError, DatasetMetadata, FixDataset, FixRow};
pub use disturbance::{DisturbanceConfig, DisturbanceKind};
pub use generator::{destination, generate_track, offset_position, TrackConfig};
pub use scenario::{
    predefined_scenarios, replay_dataset, ExpectedAlerts, ScenarioOutcome, SpoofScenario,
};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
