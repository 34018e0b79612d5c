//! Example: Generate CSV tracks for every predefined scenario.
//!
//! Run with: cargo run -p sentinel-testdata --example generate_track [OUT_DIR]

use gnss_sentinel::DetectorConfig;
use sentinel_testdata::predefined_scenarios;
use std::path::PathBuf;

fn main() {
    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("datasets"));

    println!("GNSS Sentinel Track Generator");
    println!("=============================\n");

    if let Err(e) = std::fs::create_dir_all(&out_dir) {
        eprintln!("Could not create {}: {}", out_dir.display(), e);
        return;
    }

    let config = DetectorConfig::default();

    for scenario in predefined_scenarios() {
        let outcome = scenario.run(&config);

        let csv_path = out_dir.join(format!("{}.csv", scenario.name));
        if let Err(e) = outcome.dataset.to_csv(&csv_path) {
            eprintln!("  Warning: Could not save {}: {}", csv_path.display(), e);
            continue;
        }

        let scenario_path = out_dir.join(format!("{}.scenario.json", scenario.name));
        if let Err(e) = scenario.to_json_file(&scenario_path) {
            eprintln!("  Warning: Could not save scenario: {}", e);
        }

        println!(
            "  {:<16} {:>3} rows, {:>2} alerts, expected {}",
            scenario.name,
            outcome.dataset.len(),
            outcome.alerts.len(),
            if outcome.matches(&scenario.expected) {
                "OK"
            } else {
                "MISMATCH"
            }
        );
    }

    println!("\nTracks written to {}", out_dir.display());
}
