// GNSS Sentinel Testdata - Disturbance injection
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Jamming and spoofing disturbances injected into generated tracks.

use serde::{Deserialize, Serialize};

/// Disturbance injection configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisturbanceConfig {
    /// Type of disturbance to inject.
    pub kind: DisturbanceKind,
    /// Sample index when the disturbance starts.
    pub start_sample: usize,
    /// Duration in samples (None = until end).
    pub duration_samples: Option<usize>,
}

impl DisturbanceConfig {
    pub fn new(kind: DisturbanceKind, start_sample: usize) -> Self {
        Self {
            kind,
            start_sample,
            duration_samples: None,
        }
    }

    /// Set duration in samples.
    pub fn with_duration(mut self, samples: usize) -> Self {
        self.duration_samples = Some(samples);
        self
    }

    /// Check if the disturbance is active at the given sample index.
    pub fn is_active(&self, sample_idx: usize) -> bool {
        if sample_idx < self.start_sample {
            return false;
        }
        match self.duration_samples {
            Some(duration) => sample_idx < self.start_sample + duration,
            None => true,
        }
    }

    /// First sample index after the disturbance, if it ends.
    pub fn end_sample(&self) -> Option<usize> {
        self.duration_samples.map(|d| self.start_sample + d)
    }

    pub fn samples_since_start(&self, sample_idx: usize) -> usize {
        sample_idx.saturating_sub(self.start_sample)
    }
}

/// Type of disturbance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DisturbanceKind {
    /// Reception degraded: satellites capped, HDOP raised.
    ///
    /// Expected detection: LOW_SATELLITE_COUNT and HIGH_HDOP
    Jamming { satellites: u32, hdop: f64 },

    /// Receiver loses lock but keeps reporting its last coordinates.
    ///
    /// Expected detection: none (detection paused)
    FixLoss,

    /// Receiver reports no coordinates at all.
    ///
    /// Expected detection: NO_VALID_DATA
    Dropout,

    /// Reported position displaced by a fixed offset.
    ///
    /// Expected detection: SUDDEN_JUMP on entry and on exit
    Teleport { offset_m: f64, bearing_deg: f64 },

    /// Reported position dragged away a little further every sample.
    ///
    /// Expected detection: none while the per-sample step stays under the
    /// jump threshold; SUDDEN_JUMP when the spoofer releases the receiver
    CreepingSpoof {
        meters_per_sample: f64,
        bearing_deg: f64,
    },
}

impl DisturbanceKind {
    pub fn name(&self) -> &'static str {
        match self {
            DisturbanceKind::Jamming { .. } => "jamming",
            DisturbanceKind::FixLoss => "fix_loss",
            DisturbanceKind::Dropout => "dropout",
            DisturbanceKind::Teleport { .. } => "teleport",
            DisturbanceKind::CreepingSpoof { .. } => "creeping_spoof",
        }
    }

    /// Spoofed displacement (meters, bearing in degrees) after `samples_since`
    /// samples, for the kinds that move the reported position.
    pub fn displacement(&self, samples_since: usize) -> Option<(f64, f64)> {
        match self {
            DisturbanceKind::Teleport {
                offset_m,
                bearing_deg,
            } => Some((*offset_m, *bearing_deg)),
            DisturbanceKind::CreepingSpoof {
                meters_per_sample,
                bearing_deg,
            } => Some((meters_per_sample * (samples_since + 1) as f64, *bearing_deg)),
            _ => None,
        }
    }
}
