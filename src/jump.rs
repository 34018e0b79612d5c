// GNSS Sentinel - Satellite fix anomaly detection
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Position jump detection with cooldown.

use crate::alert::AlertEvent;
use crate::config::DetectorConfig;
use crate::geodesic::Coordinates;
use serde::{Deserialize, Serialize};

/// Reference point and debounce state of a [`JumpDetector`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct JumpDetectorState {
    /// Coordinates of the most recent valid fix.
    pub last_position: Option<Coordinates>,
    /// Timestamp of the last jump alert (ms).
    pub last_alert_ms: Option<u64>,
}

/// Flags implausible relocation between consecutive valid fixes.
///
/// The reference point always advances to the latest valid fix, even one
/// just flagged as a jump. The detector tracks the last known position, not
/// the last trusted one.
#[derive(Debug, Clone, Default)]
pub struct JumpDetector {
    state: JumpDetectorState,
    /// Jumps detected inside the cooldown window and not reported.
    suppressed_jumps: u64,
    /// Distance measured on the last check, if any.
    last_distance_m: Option<f64>,
}

impl JumpDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume from a previously captured state.
    pub fn with_state(state: JumpDetectorState) -> Self {
        Self {
            state,
            ..Default::default()
        }
    }

    /// Check a valid-fix position taken at `now_ms`.
    pub fn check(
        &mut self,
        position: Coordinates,
        config: &DetectorConfig,
        now_ms: u64,
    ) -> Option<AlertEvent> {
        let alert = match self.state.last_position {
            None => {
                self.last_distance_m = None;
                None
            }
            Some(last) => {
                let dist = last.distance_to(&position);
                self.last_distance_m = Some(dist);

                if dist > config.max_jump_meters {
                    if self.cooldown_elapsed(config, now_ms) {
                        self.state.last_alert_ms = Some(now_ms);
                        Some(AlertEvent::sudden_jump(now_ms, dist, config.max_jump_meters))
                    } else {
                        self.suppressed_jumps += 1;
                        log::debug!(
                            "Jump of {:.1} m suppressed by cooldown at {} ms",
                            dist,
                            now_ms
                        );
                        None
                    }
                } else {
                    None
                }
            }
        };

        self.state.last_position = Some(position);
        alert
    }

    /// Strictly more than the cooldown must have passed since the last alert.
    /// A clock running backwards counts as no time elapsed.
    fn cooldown_elapsed(&self, config: &DetectorConfig, now_ms: u64) -> bool {
        match self.state.last_alert_ms {
            Some(last_ms) => now_ms.saturating_sub(last_ms) > config.cooldown_ms(),
            None => true,
        }
    }

    pub fn state(&self) -> &JumpDetectorState {
        &self.state
    }

    pub fn suppressed_jumps(&self) -> u64 {
        self.suppressed_jumps
    }

    pub fn last_distance_m(&self) -> Option<f64> {
        self.last_distance_m
    }

    /// Reset all state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::AlertKind;
    use crate::geodesic::EARTH_RADIUS_M;

    fn create_test_config() -> DetectorConfig {
        DetectorConfig::default()
            .with_max_jump_meters(100.0)
            .with_cooldown_secs(10)
    }

    /// Point `meters` north of `origin`.
    fn north_of(origin: Coordinates, meters: f64) -> Coordinates {
        let dlat = (meters / EARTH_RADIUS_M).to_degrees();
        Coordinates::new(origin.latitude + dlat, origin.longitude)
    }

    #[test]
    fn test_first_fix_sets_reference() {
        let config = create_test_config();
        let mut detector = JumpDetector::new();
        let origin = Coordinates::new(40.0, -3.0);

        assert!(detector.check(origin, &config, 0).is_none());
        assert_eq!(detector.state().last_position, Some(origin));
        assert_eq!(detector.state().last_alert_ms, None);
        assert!(detector.last_distance_m().is_none());
    }

    #[test]
    fn test_jump_over_threshold() {
        let config = create_test_config();
        let mut detector = JumpDetector::new();
        let origin = Coordinates::new(40.0, -3.0);

        detector.check(origin, &config, 0);
        let alert = detector.check(north_of(origin, 150.0), &config, 5_000).unwrap();

        assert_eq!(alert.kind, AlertKind::SuddenJump);
        assert_eq!(alert.timestamp_ms, 5_000);
        assert_eq!(detector.state().last_alert_ms, Some(5_000));
    }

    #[test]
    fn test_zero_distance_never_alerts() {
        let config = DetectorConfig::default().with_max_jump_meters(0.0);
        let mut detector = JumpDetector::new();
        let origin = Coordinates::new(40.0, -3.0);

        detector.check(origin, &config, 0);
        assert!(detector.check(origin, &config, 1_000).is_none());
        assert_eq!(detector.last_distance_m(), Some(0.0));
    }

    #[test]
    fn test_small_step_no_alert() {
        let config = create_test_config();
        let mut detector = JumpDetector::new();
        let origin = Coordinates::new(40.0, -3.0);

        detector.check(origin, &config, 0);
        assert!(detector.check(north_of(origin, 50.0), &config, 1_000).is_none());
    }

    #[test]
    fn test_cooldown_enforced() {
        let config = create_test_config();
        let mut detector = JumpDetector::new();
        let p0 = Coordinates::new(40.0, -3.0);
        let p1 = north_of(p0, 150.0);
        let p2 = north_of(p1, 150.0);
        let p3 = north_of(p2, 150.0);

        detector.check(p0, &config, 0);
        assert!(detector.check(p1, &config, 1_000).is_some());

        // Within cooldown
        assert!(detector.check(p2, &config, 6_000).is_none());
        assert_eq!(detector.suppressed_jumps(), 1);
        assert_eq!(detector.state().last_alert_ms, Some(1_000));

        // 11 s after the alert
        assert!(detector.check(p3, &config, 12_000).is_some());
        assert_eq!(detector.state().last_alert_ms, Some(12_000));
    }

    #[test]
    fn test_cooldown_boundary_suppressed() {
        let config = create_test_config();
        let mut detector = JumpDetector::new();
        let p0 = Coordinates::new(40.0, -3.0);
        let p1 = north_of(p0, 150.0);
        let p2 = north_of(p1, 150.0);
        let p3 = north_of(p2, 150.0);

        detector.check(p0, &config, 0);
        assert!(detector.check(p1, &config, 1_000).is_some());
        assert!(detector.check(p2, &config, 11_000).is_none());
        assert!(detector.check(p3, &config, 11_001).is_some());
    }

    #[test]
    fn test_reference_advances_after_jump() {
        let config = create_test_config();
        let mut detector = JumpDetector::new();
        let p0 = Coordinates::new(40.0, -3.0);
        let p1 = north_of(p0, 500.0);

        detector.check(p0, &config, 0);
        detector.check(p1, &config, 1_000);
        assert_eq!(detector.state().last_position, Some(p1));

        // Staying at the spoofed location is quiet
        assert!(detector.check(north_of(p1, 10.0), &config, 30_000).is_none());
    }

    #[test]
    fn test_backward_clock_stays_in_cooldown() {
        let config = create_test_config();
        let mut detector = JumpDetector::new();
        let p0 = Coordinates::new(40.0, -3.0);
        let p1 = north_of(p0, 150.0);
        let p2 = north_of(p1, 150.0);

        detector.check(p0, &config, 50_000);
        assert!(detector.check(p1, &config, 60_000).is_some());
        assert!(detector.check(p2, &config, 1_000).is_none());
    }

    #[test]
    fn test_with_state_resumes() {
        let config = create_test_config();
        let origin = Coordinates::new(40.0, -3.0);
        let state = JumpDetectorState {
            last_position: Some(origin),
            last_alert_ms: None,
        };

        let mut detector = JumpDetector::with_state(state);
        assert!(detector.check(north_of(origin, 200.0), &config, 0).is_some());
    }

    #[test]
    fn test_reset() {
        let config = create_test_config();
        let mut detector = JumpDetector::new();
        let p0 = Coordinates::new(40.0, -3.0);

        detector.check(p0, &config, 0);
        detector.check(north_of(p0, 150.0), &config, 1_000);
        detector.reset();

        assert_eq!(*detector.state(), JumpDetectorState::default());
        assert_eq!(detector.suppressed_jumps(), 0);
    }
}
