// GNSS Sentinel Monitor - Console output
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Console rendering of samples and alerts.
//!
//! Text mode prints a status line per sample and each alert in red:
//! ```text
//! [FIX] Lat: 59.329300, Lon: 18.068600 | Sats: 9 | HDOP: 0.9
//! !!! Sudden jump of 2000.4 meters (threshold 100.0), possible spoof
//! ```
//! JSON mode prints one alert object per line and nothing else.

use gnss_sentinel::{AlertEvent, AlertSink, Assessment, PositionSample, SampleStatus};
use std::io::{self, Write};
use tracing::warn;

pub const RED: &str = "\x1b[91m";
pub const RESET: &str = "\x1b[0m";

/// Shown for samples with coordinates but no fix.
pub const PAUSED_MESSAGE: &str = "No valid GPS fix yet. Spoof detection paused.";

/// Console output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Status line for a sample with coordinates.
pub fn status_line(sample: &PositionSample) -> Option<String> {
    let position = sample.coordinates()?;
    let fix = if sample.has_fix() { "FIX" } else { "NO FIX" };
    let hdop = sample
        .hdop
        .map_or_else(|| "N/A".to_string(), |h| format!("{:.1}", h));
    Some(format!(
        "[{}] Lat: {:.6}, Lon: {:.6} | Sats: {} | HDOP: {}",
        fix, position.latitude, position.longitude, sample.satellite_count, hdop
    ))
}

/// Writes samples and alerts to a terminal or any writer.
pub struct ConsoleSink<W: Write> {
    out: W,
    color: bool,
    format: OutputFormat,
}

impl ConsoleSink<io::Stdout> {
    pub fn stdout(color: bool, format: OutputFormat) -> Self {
        Self::new(io::stdout(), color, format)
    }
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(out: W, color: bool, format: OutputFormat) -> Self {
        Self { out, color, format }
    }

    /// Render one processed sample with its alerts.
    pub fn report(&mut self, sample: &PositionSample, assessment: &Assessment) {
        if self.format == OutputFormat::Text {
            if let Some(line) = status_line(sample) {
                self.write_line(&line);
            }
            if assessment.status == SampleStatus::NoFix {
                self.write_line(PAUSED_MESSAGE);
            }
        }
        for alert in &assessment.alerts {
            self.emit(alert);
        }
    }

    /// Print an acquisition error the way alerts are printed.
    pub fn error(&mut self, message: &str) {
        if self.format == OutputFormat::Text {
            let line = format!("! Error: {}", message);
            self.write_red(&line);
        }
    }

    #[allow(dead_code)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_red(&mut self, line: &str) {
        if self.color {
            self.write_line(&format!("{}{}{}", RED, line, RESET));
        } else {
            self.write_line(line);
        }
    }

    fn write_line(&mut self, line: &str) {
        if let Err(e) = writeln!(self.out, "{}", line).and_then(|_| self.out.flush()) {
            warn!("Console write failed: {}", e);
        }
    }
}

impl<W: Write> AlertSink for ConsoleSink<W> {
    fn emit(&mut self, alert: &AlertEvent) {
        match self.format {
            OutputFormat::Text => {
                let line = format!("{} {}", alert.kind.marker(), alert.message);
                self.write_red(&line);
            }
            OutputFormat::Json => match alert.to_json() {
                Ok(json) => self.write_line(&json),
                Err(e) => warn!("Failed to serialize alert: {}", e),
            },
        }
    }
}
