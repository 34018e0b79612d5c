// GNSS Sentinel - Satellite fix anomaly detection
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Alert sinks and the source-to-sink driver.

use crate::alert::{AlertEvent, AlertSeverity};
use crate::engine::SpoofDetectionEngine;
use crate::source::PositionSource;

/// Consumer of emitted alerts.
pub trait AlertSink {
    fn emit(&mut self, alert: &AlertEvent);
}

/// Collects alerts in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    alerts: Vec<AlertEvent>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alerts(&self) -> &[AlertEvent] {
        &self.alerts
    }

    pub fn into_alerts(self) -> Vec<AlertEvent> {
        self.alerts
    }

    pub fn clear(&mut self) {
        self.alerts.clear();
    }
}

impl AlertSink for MemorySink {
    fn emit(&mut self, alert: &AlertEvent) {
        self.alerts.push(alert.clone());
    }
}

/// Forwards alerts to the `log` facade under the `gnss_sentinel::alert` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl AlertSink for LogSink {
    fn emit(&mut self, alert: &AlertEvent) {
        let level = match alert.severity {
            AlertSeverity::Warning => log::Level::Warn,
            AlertSeverity::Critical => log::Level::Error,
        };
        log::log!(
            target: "gnss_sentinel::alert",
            level,
            "{} {} at {} ms: {}",
            alert.kind.marker(),
            alert.kind.as_str(),
            alert.timestamp_ms,
            alert.message
        );
    }
}

impl<S: AlertSink + ?Sized> AlertSink for &mut S {
    fn emit(&mut self, alert: &AlertEvent) {
        (**self).emit(alert);
    }
}

impl<S: AlertSink + ?Sized> AlertSink for Box<S> {
    fn emit(&mut self, alert: &AlertEvent) {
        (**self).emit(alert);
    }
}

/// Drain a source through the engine into a sink until the source ends.
///
/// Returns the number of samples processed. Stops at the first source error.
pub fn run_to_end<S, K>(
    source: &mut S,
    engine: &mut SpoofDetectionEngine,
    sink: &mut K,
) -> Result<u64, S::Error>
where
    S: PositionSource + ?Sized,
    K: AlertSink + ?Sized,
{
    let mut processed = 0;
    while let Some(sample) = source.next_sample()? {
        for alert in engine.process(&sample) {
            sink.emit(&alert);
        }
        processed += 1;
    }
    Ok(processed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::AlertKind;
    use crate::config::DetectorConfig;
    use crate::sample::PositionSample;
    use crate::source::IterSource;

    #[test]
    fn test_memory_sink_collects() {
        let mut sink = MemorySink::new();
        sink.emit(&AlertEvent::no_valid_data(1));
        sink.emit(&AlertEvent::high_hdop(2, 7.0, 5.0));

        assert_eq!(sink.alerts().len(), 2);
        sink.clear();
        assert!(sink.alerts().is_empty());
    }

    #[test]
    fn test_log_sink_accepts_all_kinds() {
        let mut sink = LogSink;
        sink.emit(&AlertEvent::no_valid_data(1));
        sink.emit(&AlertEvent::sudden_jump(2, 500.0, 100.0));
    }

    #[test]
    fn test_run_to_end() {
        let mut source = IterSource::new(vec![
            PositionSample::new(0, 10.0, 10.0).with_satellites(8),
            PositionSample::new(1000, 10.01, 10.0).with_satellites(8),
            PositionSample::empty(2000),
        ]);
        let mut engine = SpoofDetectionEngine::new(DetectorConfig::default());
        let mut sink = MemorySink::new();

        let processed = run_to_end(&mut source, &mut engine, &mut sink).unwrap();

        assert_eq!(processed, 3);
        let kinds: Vec<_> = sink.alerts().iter().map(|a| a.kind).collect();
        assert_eq!(kinds, vec![AlertKind::SuddenJump, AlertKind::NoValidData]);
    }
}
