// GNSS Sentinel Monitor - Track replay
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Replay of recorded or generated fix tracks.
//!
//! CSV input uses the header
//! `timestamp_ms,latitude,longitude,satellites,hdop,mode`; empty cells are
//! absent values. Samples keep their recorded timestamps.

use gnss_sentinel::{FixMode, PositionSample, PositionSource};
use std::convert::Infallible;
use std::path::Path;
use tracing::info;

/// Columns a replay file must start with, in order.
pub const CSV_HEADER: [&str; 6] = [
    "timestamp_ms",
    "latitude",
    "longitude",
    "satellites",
    "hdop",
    "mode",
];

/// Replay errors.
#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid format at line {line}: {reason}")]
    InvalidFormat { line: u64, reason: String },

    #[error("Empty dataset")]
    EmptyDataset,

    #[error("Unknown scenario: {0}")]
    UnknownScenario(String),
}

/// Summary of a loaded track.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackInfo {
    pub sample_count: usize,
    pub duration_ms: u64,
}

/// In-memory track consumed sample by sample.
#[derive(Debug, Clone)]
pub struct ReplaySource {
    samples: Vec<PositionSample>,
    position: usize,
}

impl ReplaySource {
    pub fn new(samples: Vec<PositionSample>) -> Result<Self, ReplayError> {
        if samples.is_empty() {
            return Err(ReplayError::EmptyDataset);
        }
        Ok(Self {
            samples,
            position: 0,
        })
    }

    /// Load a CSV track.
    pub fn from_csv(path: impl AsRef<Path>) -> Result<Self, ReplayError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ReplayError::FileNotFound(path.display().to_string()));
        }

        let source = Self::new(parse_csv(csv::Reader::from_path(path)?)?)?;
        let info = source.info();
        info!(
            "Loaded track {}: {} samples over {} ms",
            path.display(),
            info.sample_count,
            info.duration_ms
        );
        Ok(source)
    }

    /// Generate one of the built-in scenarios.
    #[cfg(feature = "replay")]
    pub fn from_scenario(name: &str) -> Result<Self, ReplayError> {
        let scenario = sentinel_testdata::predefined_scenarios()
            .into_iter()
            .find(|s| s.name == name)
            .ok_or_else(|| ReplayError::UnknownScenario(name.to_string()))?;

        info!("Generated scenario {}: {}", scenario.name, scenario.description);
        Self::new(scenario.generate().to_samples())
    }

    pub fn info(&self) -> TrackInfo {
        let duration_ms = match (self.samples.first(), self.samples.last()) {
            (Some(first), Some(last)) => last.timestamp_ms.saturating_sub(first.timestamp_ms),
            _ => 0,
        };
        TrackInfo {
            sample_count: self.samples.len(),
            duration_ms,
        }
    }

    /// Gap to the next sample, used to pace the replay.
    pub fn next_gap_ms(&self) -> Option<u64> {
        let current = self.samples.get(self.position.checked_sub(1)?)?;
        let next = self.samples.get(self.position)?;
        Some(next.timestamp_ms.saturating_sub(current.timestamp_ms))
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Rewind to the first sample.
    pub fn rewind(&mut self) {
        self.position = 0;
    }
}

impl PositionSource for ReplaySource {
    type Error = Infallible;

    fn next_sample(&mut self) -> Result<Option<PositionSample>, Self::Error> {
        let sample = self.samples.get(self.position).cloned();
        if sample.is_some() {
            self.position += 1;
        }
        Ok(sample)
    }
}

/// Parse CSV records into samples.
fn parse_csv<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<Vec<PositionSample>, ReplayError> {
    let headers = reader.headers()?.clone();
    let names: Vec<&str> = headers.iter().map(str::trim).collect();
    if names.len() < CSV_HEADER.len() || names[..CSV_HEADER.len()] != CSV_HEADER {
        return Err(ReplayError::InvalidFormat {
            line: 1,
            reason: format!("header must be '{}'", CSV_HEADER.join(",")),
        });
    }

    let mut samples = Vec::new();
    for result in reader.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let field = |i: usize| record.get(i).map(str::trim).filter(|s| !s.is_empty());
        let invalid = |column: &str| ReplayError::InvalidFormat {
            line,
            reason: format!("invalid {}", column),
        };

        let timestamp_ms = field(0)
            .and_then(|s| s.parse::<u64>().ok())
            .ok_or_else(|| invalid("timestamp_ms"))?;
        let latitude = optional(field(1)).map_err(|_| invalid("latitude"))?;
        let longitude = optional(field(2)).map_err(|_| invalid("longitude"))?;
        let satellites = optional::<u32>(field(3))
            .map_err(|_| invalid("satellites"))?
            .unwrap_or(0);
        let hdop = optional(field(4)).map_err(|_| invalid("hdop"))?;
        let mode = optional::<u8>(field(5))
            .map_err(|_| invalid("mode"))?
            .unwrap_or(0);

        samples.push(PositionSample {
            timestamp_ms,
            latitude,
            longitude,
            satellite_count: satellites,
            hdop,
            fix_mode: FixMode::from_mode(mode),
        });
    }

    Ok(samples)
}

fn optional<T: std::str::FromStr>(cell: Option<&str>) -> Result<Option<T>, T::Err> {
    cell.map(str::parse).transpose()
}
