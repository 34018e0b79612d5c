// GNSS Sentinel Testdata - Track generator
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Synthetic receiver tracks.
//!
//! A track is a slow walk along a fixed bearing with Gaussian position
//! noise and a healthy constellation. Disturbances are applied on top of
//! the nominal reports, so the true path stays continuous underneath.

use crate::dataset::{DatasetMetadata, FixDataset, FixRow};
use crate::disturbance::{DisturbanceConfig, DisturbanceKind};
use chrono::Utc;
use gnss_sentinel::EARTH_RADIUS_M;
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;
use serde::{Deserialize, Serialize};

/// Track generator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackConfig {
    /// Start timestamp in milliseconds.
    pub start_time_ms: u64,
    /// Interval between samples in milliseconds.
    pub sample_interval_ms: u64,
    /// Number of samples to generate.
    pub num_samples: usize,
    pub start_latitude: f64,
    pub start_longitude: f64,
    /// Direction of travel, degrees clockwise from north.
    pub bearing_deg: f64,
    pub speed_mps: f64,
    /// Standard deviation of per-axis position noise in meters.
    pub position_noise_m: f64,
    /// Satellites in view when nothing is wrong.
    pub nominal_satellites: u32,
    pub nominal_hdop: f64,
    /// Random seed for reproducibility.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            start_time_ms: 0,
            sample_interval_ms: 1_000,
            num_samples: 120,
            start_latitude: 59.3293,
            start_longitude: 18.0686,
            bearing_deg: 45.0,
            speed_mps: 1.5, // walking pace
            position_noise_m: 2.0,
            nominal_satellites: 9,
            nominal_hdop: 0.9,
            seed: None,
        }
    }
}

impl TrackConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_start(mut self, latitude: f64, longitude: f64) -> Self {
        self.start_latitude = latitude;
        self.start_longitude = longitude;
        self
    }

    pub fn with_num_samples(mut self, n: usize) -> Self {
        self.num_samples = n;
        self
    }

    pub fn with_sample_interval_ms(mut self, interval_ms: u64) -> Self {
        self.sample_interval_ms = interval_ms;
        self
    }

    pub fn with_motion(mut self, speed_mps: f64, bearing_deg: f64) -> Self {
        self.speed_mps = speed_mps;
        self.bearing_deg = bearing_deg;
        self
    }

    pub fn with_noise(mut self, std_m: f64) -> Self {
        self.position_noise_m = std_m;
        self
    }

    /// Set random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Get total duration in milliseconds.
    pub fn duration_ms(&self) -> u64 {
        self.sample_interval_ms * self.num_samples.saturating_sub(1) as u64
    }
}

/// Move a point by local north/east offsets in meters.
///
/// Flat-earth approximation; accurate to well under a meter for the
/// kilometer-scale offsets used here.
pub fn offset_position(latitude: f64, longitude: f64, north_m: f64, east_m: f64) -> (f64, f64) {
    let dlat = (north_m / EARTH_RADIUS_M).to_degrees();
    let dlon = (east_m / (EARTH_RADIUS_M * latitude.to_radians().cos())).to_degrees();
    (latitude + dlat, longitude + dlon)
}

/// Move a point `distance_m` along `bearing_deg`.
pub fn destination(latitude: f64, longitude: f64, distance_m: f64, bearing_deg: f64) -> (f64, f64) {
    let bearing = bearing_deg.to_radians();
    offset_position(
        latitude,
        longitude,
        distance_m * bearing.cos(),
        distance_m * bearing.sin(),
    )
}

/// Generate a track and apply the disturbances in order.
pub fn generate_track(config: &TrackConfig, disturbances: &[DisturbanceConfig]) -> FixDataset {
    let mut rng: Box<dyn RngCore> = match config.seed {
        Some(s) => Box::new(StdRng::seed_from_u64(s)),
        None => Box::new(StdRng::from_entropy()),
    };

    // Invalid std (negative or NaN) disables noise
    let noise = Normal::new(0.0, config.position_noise_m).ok();
    let hdop_noise = Normal::new(0.0, 0.1).ok();

    let mut dataset = FixDataset::new();
    dataset.metadata = DatasetMetadata {
        name: None,
        description: None,
        seed: config.seed,
        sample_interval_ms: Some(config.sample_interval_ms),
        generated_at: Some(Utc::now()),
    };

    let step_m = config.speed_mps * config.sample_interval_ms as f64 / 1000.0;

    for i in 0..config.num_samples {
        let timestamp_ms = config.start_time_ms + i as u64 * config.sample_interval_ms;

        let (true_lat, true_lon) = destination(
            config.start_latitude,
            config.start_longitude,
            step_m * i as f64,
            config.bearing_deg,
        );
        let (north, east) = match noise {
            Some(n) => (n.sample(&mut *rng), n.sample(&mut *rng)),
            None => (0.0, 0.0),
        };
        let (lat, lon) = offset_position(true_lat, true_lon, north, east);

        let spread = rng.gen_range(0..=2u32);
        let hdop = config.nominal_hdop + hdop_noise.map_or(0.0, |n| n.sample(&mut *rng));

        let mut row = FixRow {
            timestamp_ms,
            latitude: Some(lat),
            longitude: Some(lon),
            satellites: (config.nominal_satellites + spread).saturating_sub(1),
            hdop: Some(hdop.clamp(0.5, 2.0)),
            mode: 3,
        };

        for disturbance in disturbances.iter().filter(|d| d.is_active(i)) {
            apply_disturbance(&mut row, disturbance, i, &mut *rng);
        }

        dataset.add_row(row);
    }

    dataset
}

fn apply_disturbance(
    row: &mut FixRow,
    disturbance: &DisturbanceConfig,
    sample_idx: usize,
    rng: &mut dyn RngCore,
) {
    match &disturbance.kind {
        DisturbanceKind::Jamming { satellites, hdop } => {
            row.satellites = row.satellites.min(*satellites);
            row.hdop = Some(*hdop);
        }
        DisturbanceKind::FixLoss => {
            row.mode = 1;
            row.satellites = rng.gen_range(0..=3);
            row.hdop = None;
        }
        DisturbanceKind::Dropout => {
            row.latitude = None;
            row.longitude = None;
            row.satellites = 0;
            row.hdop = None;
            row.mode = 1;
        }
        kind @ (DisturbanceKind::Teleport { .. } | DisturbanceKind::CreepingSpoof { .. }) => {
            let since = disturbance.samples_since_start(sample_idx);
            if let (Some((distance_m, bearing_deg)), Some(lat), Some(lon)) =
                (kind.displacement(since), row.latitude, row.longitude)
            {
                let (lat, lon) = destination(lat, lon, distance_m, bearing_deg);
                row.latitude = Some(lat);
                row.longitude = Some(lon);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gnss_sentinel::distance;

    fn steps(dataset: &FixDataset) -> Vec<f64> {
        dataset
            .rows
            .windows(2)
            .filter_map(|w| match (w[0].latitude, w[0].longitude, w[1].latitude, w[1].longitude) {
                (Some(a), Some(b), Some(c), Some(d)) => Some(distance(a, b, c, d)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_offset_position() {
        let (lat, lon) = offset_position(45.0, 9.0, 100.0, 100.0);
        let d = distance(45.0, 9.0, lat, lon);
        assert!((d - 141.42).abs() < 0.5, "got {}", d);
    }

    #[test]
    fn test_destination_bearing() {
        let (lat, lon) = destination(10.0, 20.0, 1000.0, 90.0);
        assert!((lat - 10.0).abs() < 1e-9);
        assert!(lon > 20.0);
        assert!((distance(10.0, 20.0, lat, lon) - 1000.0).abs() < 1.0);
    }

    #[test]
    fn test_nominal_track() {
        let config = TrackConfig::new().with_seed(42);
        let dataset = generate_track(&config, &[]);

        assert_eq!(dataset.len(), 120);
        assert_eq!(dataset.duration_ms(), 119_000);
        assert!(dataset.metadata.generated_at.is_some());

        for row in &dataset.rows {
            assert_eq!(row.mode, 3);
            assert!((8..=10).contains(&row.satellites));
            assert!(row.hdop.unwrap() <= 2.0);
        }
        assert!(steps(&dataset).iter().all(|s| *s < 30.0));
    }

    #[test]
    fn test_seed_reproducible() {
        let config = TrackConfig::new().with_seed(7);
        let a = generate_track(&config, &[]);
        let b = generate_track(&config, &[]);
        assert_eq!(a.rows, b.rows);
    }

    #[test]
    fn test_zero_noise_straight_line() {
        let config = TrackConfig::new()
            .with_seed(1)
            .with_noise(0.0)
            .with_motion(10.0, 0.0)
            .with_num_samples(5);
        let dataset = generate_track(&config, &[]);

        for step in steps(&dataset) {
            assert!((step - 10.0).abs() < 0.01);
        }
    }

    #[test]
    fn test_dropout_clears_coordinates() {
        let config = TrackConfig::new().with_seed(3).with_num_samples(10);
        let dropout = DisturbanceConfig::new(DisturbanceKind::Dropout, 4).with_duration(2);
        let dataset = generate_track(&config, &[dropout]);

        assert!(dataset.rows[3].latitude.is_some());
        assert!(dataset.rows[4].latitude.is_none());
        assert!(dataset.rows[5].longitude.is_none());
        assert!(dataset.rows[6].latitude.is_some());
    }

    #[test]
    fn test_teleport_offsets_window() {
        let config = TrackConfig::new().with_seed(5).with_num_samples(10);
        let base = generate_track(&config, &[]);
        let teleport = DisturbanceConfig::new(
            DisturbanceKind::Teleport {
                offset_m: 2_000.0,
                bearing_deg: 180.0,
            },
            3,
        )
        .with_duration(3);
        let spoofed = generate_track(&config, &[teleport]);

        let shift = |i: usize| {
            distance(
                base.rows[i].latitude.unwrap(),
                base.rows[i].longitude.unwrap(),
                spoofed.rows[i].latitude.unwrap(),
                spoofed.rows[i].longitude.unwrap(),
            )
        };
        assert!(shift(2) < 1e-6);
        assert!((shift(4) - 2_000.0).abs() < 5.0);
        assert!(shift(6) < 1e-6);
    }
}
