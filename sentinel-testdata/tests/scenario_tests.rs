// GNSS Sentinel Testdata - Scenario Tests
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Generated scenarios replayed through the detection engine.

use gnss_sentinel::{AlertKind, DetectorConfig};
use sentinel_testdata::*;

fn default_outcome(scenario: &SpoofScenario) -> ScenarioOutcome {
    scenario.run(&DetectorConfig::default())
}

#[test]
fn test_nominal_is_silent() {
    let outcome = default_outcome(&SpoofScenario::nominal());
    assert!(outcome.alerts.is_empty(), "{:?}", outcome.alerts);
}

#[test]
fn test_jamming_raises_quality_alerts_only() {
    let scenario = SpoofScenario::jamming();
    let outcome = default_outcome(&scenario);

    assert_eq!(outcome.observed, scenario.expected);
    for (idx, alert) in &outcome.alerts {
        assert!((60..80).contains(idx));
        assert_ne!(alert.kind, AlertKind::SuddenJump);
    }
}

#[test]
fn test_fix_loss_pauses_detection() {
    let outcome = default_outcome(&SpoofScenario::fix_loss());
    assert!(outcome.alerts.is_empty());
}

#[test]
fn test_dropout_reports_no_valid_data() {
    let scenario = SpoofScenario::dropout();
    let outcome = default_outcome(&scenario);

    assert!(outcome.matches(&scenario.expected));
    assert!(outcome
        .alerts
        .iter()
        .all(|(_, a)| a.kind == AlertKind::NoValidData));
}

#[test]
fn test_teleport_alerts_on_entry_and_exit() {
    let scenario = SpoofScenario::teleport();
    let outcome = default_outcome(&scenario);

    assert_eq!(outcome.observed.jump_samples, vec![60, 80]);
    assert!(outcome.matches(&scenario.expected));
}

#[test]
fn test_teleport_exit_suppressed_by_long_cooldown() {
    let config = DetectorConfig::default().with_cooldown_secs(30);
    let outcome = SpoofScenario::teleport().run(&config);

    assert_eq!(outcome.observed.jump_samples, vec![60]);
}

#[test]
fn test_creeping_spoof_only_caught_on_release() {
    let scenario = SpoofScenario::creeping_spoof();
    let outcome = default_outcome(&scenario);

    assert_eq!(outcome.observed.jump_samples, vec![100]);
    assert_eq!(outcome.observed.total(), 1);
}

#[test]
fn test_creeping_spoof_caught_with_tight_threshold() {
    let mut scenario = SpoofScenario::creeping_spoof();
    scenario.track = scenario.track.with_noise(0.0);
    let config = DetectorConfig::default().with_max_jump_meters(15.0);
    let outcome = scenario.run(&config);

    assert_eq!(outcome.observed.jump_samples.first(), Some(&60));
}

#[test]
fn test_all_presets_match_expectations() {
    for scenario in predefined_scenarios() {
        let outcome = default_outcome(&scenario);
        assert!(
            outcome.matches(&scenario.expected),
            "{}: expected {:?}, observed {:?}",
            scenario.name,
            scenario.expected,
            outcome.observed
        );
    }
}

#[test]
fn test_csv_replay_matches_in_memory() {
    let scenario = SpoofScenario::teleport();
    let dataset = scenario.generate();
    let file = tempfile::NamedTempFile::new().unwrap();

    dataset.to_csv(file.path()).unwrap();
    let loaded = FixDataset::from_csv(file.path()).unwrap();

    let config = DetectorConfig::default();
    let direct = replay_dataset(&dataset, &config);
    let replayed = replay_dataset(&loaded, &config);

    let kinds = |alerts: &[(usize, gnss_sentinel::AlertEvent)]| {
        alerts.iter().map(|(i, a)| (*i, a.kind)).collect::<Vec<_>>()
    };
    assert_eq!(kinds(&direct), kinds(&replayed));
}

#[test]
fn test_seeds_do_not_change_outcome() {
    for seed in [1, 7, 99, 2024] {
        let mut scenario = SpoofScenario::jamming();
        scenario.track = scenario.track.with_seed(seed);
        let outcome = default_outcome(&scenario);
        assert!(outcome.matches(&scenario.expected), "seed {}", seed);
    }
}
