// GNSS Sentinel Monitor - Prometheus metrics definitions
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Prometheus metrics for receiver monitoring.

use gnss_sentinel::{AlertKind, Assessment, PositionSample};
use lazy_static::lazy_static;
use prometheus::{
    register_counter, register_counter_vec, register_gauge, Counter, CounterVec, Encoder, Gauge,
    TextEncoder,
};
use tracing::warn;

lazy_static! {
    // ============================================================
    // Detection counters
    // ============================================================

    /// Samples processed, labeled by how the engine treated them.
    pub static ref SAMPLES_TOTAL: CounterVec = register_counter_vec!(
        "gnss_samples_total",
        "Position samples processed by status (fix, no_fix, no_data)",
        &["status"]
    ).unwrap();

    /// Alerts emitted, labeled by kind.
    pub static ref ALERTS_TOTAL: CounterVec = register_counter_vec!(
        "gnss_alerts_total",
        "Alerts emitted by kind",
        &["kind"]
    ).unwrap();

    /// Jumps over threshold swallowed by the cooldown.
    pub static ref SUPPRESSED_JUMPS_TOTAL: Counter = register_counter!(
        "gnss_suppressed_jumps_total",
        "Sudden jumps suppressed by the alert cooldown"
    ).unwrap();

    // ============================================================
    // Receiver state
    // ============================================================

    pub static ref SATELLITES: Gauge = register_gauge!(
        "gnss_satellites",
        "Satellites used in the last solution"
    ).unwrap();

    /// NaN while the receiver reports no HDOP.
    pub static ref HDOP: Gauge = register_gauge!(
        "gnss_hdop",
        "Horizontal dilution of precision of the last sample"
    ).unwrap();

    pub static ref FIX_MODE: Gauge = register_gauge!(
        "gnss_fix_mode",
        "Fix mode of the last sample (1=none, 2=2D, 3=3D)"
    ).unwrap();

    /// NaN until two valid fixes have been seen since start or reset.
    pub static ref LAST_STEP_METERS: Gauge = register_gauge!(
        "gnss_last_step_meters",
        "Distance between the last two valid fixes in meters"
    ).unwrap();
}

/// Update all metrics after a sample has been assessed.
///
/// `newly_suppressed` is the number of jumps the cooldown swallowed on this
/// sample; engine resets never move the counter backwards.
pub fn record_assessment(
    sample: &PositionSample,
    assessment: &Assessment,
    newly_suppressed: u64,
    last_step_m: Option<f64>,
) {
    SAMPLES_TOTAL
        .with_label_values(&[assessment.status.as_str()])
        .inc();
    for alert in &assessment.alerts {
        record_alert(alert.kind);
    }
    if newly_suppressed > 0 {
        SUPPRESSED_JUMPS_TOTAL.inc_by(newly_suppressed as f64);
    }

    SATELLITES.set(sample.satellite_count as f64);
    HDOP.set(sample.hdop.unwrap_or(f64::NAN));
    FIX_MODE.set(sample.fix_mode.as_mode() as f64);
    LAST_STEP_METERS.set(last_step_m.unwrap_or(f64::NAN));
}

/// Increment the alert counter for one kind.
pub fn record_alert(kind: AlertKind) {
    ALERTS_TOTAL.with_label_values(&[kind.as_str()]).inc();
}

/// Pre-create every labeled series so dashboards see zeros before the first event.
pub fn init_metrics() {
    for status in ["fix", "no_fix", "no_data"] {
        SAMPLES_TOTAL.with_label_values(&[status]);
    }
    for kind in AlertKind::ALL {
        ALERTS_TOTAL.with_label_values(&[kind.as_str()]);
    }
}

/// Encode all metrics to Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        warn!("Failed to encode metrics: {}", e);
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

/// Serializes tests that write the process-wide registry.
#[cfg(test)]
pub(crate) fn lock_for_test() -> std::sync::MutexGuard<'static, ()> {
    static LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
    LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gnss_sentinel::{AlertEvent, SampleStatus};

    #[test]
    fn test_init_exposes_all_series() {
        init_metrics();
        let output = encode_metrics();

        assert!(output.contains("gnss_samples_total{status=\"no_data\"}"));
        assert!(output.contains("gnss_alerts_total{kind=\"SUDDEN_JUMP\"}"));
    }

    #[test]
    fn test_record_assessment() {
        let _guard = lock_for_test();
        let sample = PositionSample::new(0, 45.0, 9.0)
            .with_satellites(7)
            .with_hdop(1.4);
        let assessment = Assessment {
            status: SampleStatus::Fix,
            alerts: vec![AlertEvent::high_hdop(0, 1.4, 1.0)],
        };
        let before = ALERTS_TOTAL
            .with_label_values(&[AlertKind::HighHdop.as_str()])
            .get();

        record_assessment(&sample, &assessment, 0, Some(12.5));

        let after = ALERTS_TOTAL
            .with_label_values(&[AlertKind::HighHdop.as_str()])
            .get();
        assert_eq!(after - before, 1.0);
        assert_eq!(SATELLITES.get(), 7.0);
        assert_eq!(HDOP.get(), 1.4);
        assert_eq!(FIX_MODE.get(), 3.0);
        assert_eq!(LAST_STEP_METERS.get(), 12.5);

        let output = encode_metrics();
        assert!(output.contains("gnss_satellites"));
        assert!(output.contains("gnss_last_step_meters"));
    }

    #[test]
    fn test_missing_step_and_hdop_export_nan() {
        let _guard = lock_for_test();
        let sample = PositionSample::new(0, 45.0, 9.0).with_satellites(7);
        let assessment = Assessment {
            status: SampleStatus::Fix,
            alerts: Vec::new(),
        };

        record_assessment(&sample, &assessment, 0, Some(40.0));
        record_assessment(&sample, &assessment, 0, None);

        assert!(LAST_STEP_METERS.get().is_nan());
        assert!(HDOP.get().is_nan());
    }

    #[test]
    fn test_suppressed_jumps_only_increase() {
        let _guard = lock_for_test();
        let sample = PositionSample::new(0, 45.0, 9.0).with_satellites(7);
        let assessment = Assessment {
            status: SampleStatus::Fix,
            alerts: Vec::new(),
        };
        let before = SUPPRESSED_JUMPS_TOTAL.get();

        record_assessment(&sample, &assessment, 2, None);
        record_assessment(&sample, &assessment, 0, None);
        record_assessment(&sample, &assessment, 1, None);

        assert_eq!(SUPPRESSED_JUMPS_TOTAL.get() - before, 3.0);
    }
}
