// GNSS Sentinel Testdata - Dataset structures
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Fix datasets and their CSV/JSON representation.
//!
//! CSV layout, empty cells meaning "not reported":
//! ```text
//! timestamp_ms,latitude,longitude,satellites,hdop,mode
//! 0,59.329300,18.068600,9,0.9,3
//! 1000,,,0,,1
//! ```

use chrono::{DateTime, Utc};
use gnss_sentinel::{FixMode, PositionSample};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use thiserror::Error;

/// Dataset error types.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Empty dataset")]
    Empty,
}

/// One receiver report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixRow {
    pub timestamp_ms: u64,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(default)]
    pub satellites: u32,
    pub hdop: Option<f64>,
    /// gpsd-style mode: 0/1 none, 2 = 2D, 3 = 3D.
    #[serde(default)]
    pub mode: u8,
}

impl FixRow {
    pub fn to_sample(&self) -> PositionSample {
        PositionSample {
            timestamp_ms: self.timestamp_ms,
            latitude: self.latitude,
            longitude: self.longitude,
            satellite_count: self.satellites,
            hdop: self.hdop,
            fix_mode: FixMode::from_mode(self.mode),
        }
    }
}

impl From<&PositionSample> for FixRow {
    fn from(sample: &PositionSample) -> Self {
        Self {
            timestamp_ms: sample.timestamp_ms,
            latitude: sample.latitude,
            longitude: sample.longitude,
            satellites: sample.satellite_count,
            hdop: sample.hdop,
            mode: sample.fix_mode.as_mode(),
        }
    }
}

/// Dataset metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatasetMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_interval_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<DateTime<Utc>>,
}

/// An ordered sequence of receiver reports.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FixDataset {
    pub rows: Vec<FixRow>,
    #[serde(default)]
    pub metadata: DatasetMetadata,
}

impl FixDataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_samples<'a>(samples: impl IntoIterator<Item = &'a PositionSample>) -> Self {
        Self {
            rows: samples.into_iter().map(FixRow::from).collect(),
            metadata: DatasetMetadata::default(),
        }
    }

    pub fn add_row(&mut self, row: FixRow) {
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[FixRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Get duration in milliseconds.
    pub fn duration_ms(&self) -> u64 {
        match (self.rows.first(), self.rows.last()) {
            (Some(first), Some(last)) => last.timestamp_ms.saturating_sub(first.timestamp_ms),
            _ => 0,
        }
    }

    /// Convert every row to an engine sample.
    pub fn to_samples(&self) -> Vec<PositionSample> {
        self.rows.iter().map(FixRow::to_sample).collect()
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.metadata.name = Some(name.to_string());
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.metadata.description = Some(description.to_string());
        self
    }

    /// Write rows as CSV to any writer.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), DatasetError> {
        let mut writer = csv::Writer::from_writer(writer);
        for row in &self.rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Read rows from CSV. Metadata is not part of the CSV form.
    pub fn read_csv<R: Read>(reader: R) -> Result<Self, DatasetError> {
        let mut reader = csv::Reader::from_reader(reader);
        let rows = reader
            .deserialize()
            .collect::<Result<Vec<FixRow>, csv::Error>>()?;

        if rows.is_empty() {
            return Err(DatasetError::Empty);
        }

        Ok(Self {
            rows,
            metadata: DatasetMetadata::default(),
        })
    }

    /// Export to CSV file.
    pub fn to_csv(&self, path: impl AsRef<Path>) -> Result<(), DatasetError> {
        self.write_csv(BufWriter::new(File::create(path)?))
    }

    /// Import from CSV file.
    pub fn from_csv(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        Self::read_csv(BufReader::new(File::open(path)?))
    }

    /// Export to JSON file, metadata included.
    pub fn to_json(&self, path: impl AsRef<Path>) -> Result<(), DatasetError> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Import from JSON file.
    pub fn from_json(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}
