// GNSS Sentinel Monitor - Polling loop
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! The monitoring loop: acquire a sample, run the engine, report.

use crate::console::ConsoleSink;
use crate::gpsd::SharedFix;
use crate::metrics::record_assessment;
use crate::replay::ReplaySource;
use gnss_sentinel::{
    Assessment, DetectorConfig, EngineStats, PositionSample, PositionSource, SampleStatus,
    SpoofDetectionEngine,
};
use serde::Serialize;
use std::io::Write;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tokio::time::{interval, sleep, MissedTickBehavior};
use tracing::{debug, error, info};

/// State shared with the HTTP handlers.
#[derive(Debug, Default)]
pub struct MonitorState {
    pub running: AtomicBool,
    pub samples_processed: AtomicU64,
    pub alerts_emitted: AtomicU64,
    pub acquisition_errors: AtomicU64,
    last_sample: Mutex<Option<LastSample>>,
}

/// Last processed sample as exposed on `/status`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LastSample {
    pub timestamp_ms: u64,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    pub satellites: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hdop: Option<f64>,
    pub alerts: usize,
}

impl MonitorState {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn last_sample(&self) -> Option<LastSample> {
        self.last_sample
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, sample: &PositionSample, assessment: &Assessment) {
        self.samples_processed.fetch_add(1, Ordering::SeqCst);
        self.alerts_emitted
            .fetch_add(assessment.alerts.len() as u64, Ordering::SeqCst);

        let last = LastSample {
            timestamp_ms: sample.timestamp_ms,
            status: assessment.status.as_str(),
            latitude: sample.latitude,
            longitude: sample.longitude,
            satellites: sample.satellite_count,
            hdop: sample.hdop,
            alerts: assessment.alerts.len(),
        };
        *self.last_sample.lock().unwrap_or_else(PoisonError::into_inner) = Some(last);
    }
}

/// Owns the engine and routes every sample to the console, metrics, and status.
pub struct Monitor<W: Write> {
    engine: SpoofDetectionEngine,
    console: ConsoleSink<W>,
    state: Arc<MonitorState>,
}

impl<W: Write> Monitor<W> {
    pub fn new(config: DetectorConfig, console: ConsoleSink<W>, state: Arc<MonitorState>) -> Self {
        Self {
            engine: SpoofDetectionEngine::new(config),
            console,
            state,
        }
    }

    /// Run one sample through the engine and report it everywhere.
    pub fn handle(&mut self, sample: &PositionSample) -> Assessment {
        let suppressed_before = self.engine.stats().suppressed_jumps;
        let assessment = self.engine.assess(sample);
        let newly_suppressed = self
            .engine
            .stats()
            .suppressed_jumps
            .saturating_sub(suppressed_before);

        self.console.report(sample, &assessment);
        record_assessment(
            sample,
            &assessment,
            newly_suppressed,
            self.engine.last_step_m(),
        );
        self.state.record(sample, &assessment);

        if assessment.status == SampleStatus::NoFix {
            debug!("No fix at {} ms, detection paused", sample.timestamp_ms);
        }
        assessment
    }

    /// Report a failed acquisition; the loop carries on.
    pub fn acquisition_failed(&mut self, message: &str) {
        error!("Acquisition failed: {}", message);
        self.state.acquisition_errors.fetch_add(1, Ordering::SeqCst);
        self.console.error(message);
    }

    pub fn stats(&self) -> &EngineStats {
        self.engine.stats()
    }

    /// Clear detector state, e.g. before replaying a track again.
    pub fn reset(&mut self) {
        self.engine.reset();
    }

    #[allow(dead_code)]
    pub fn into_console(self) -> ConsoleSink<W> {
        self.console
    }

    /// Poll the gpsd snapshot every `period` until `shutdown` resolves.
    ///
    /// Samples are stamped with milliseconds elapsed since the loop started.
    pub async fn run_gpsd(
        &mut self,
        shared: &SharedFix,
        period: Duration,
        shutdown: impl std::future::Future<Output = ()>,
    ) {
        self.state.running.store(true, Ordering::SeqCst);
        let started = Instant::now();
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        info!("Polling gpsd every {:?}", period);
        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = ticker.tick() => {
                    let now_ms = started.elapsed().as_millis() as u64;
                    match shared.current() {
                        Ok(snapshot) => {
                            self.handle(&snapshot.to_sample(now_ms));
                        }
                        Err(e) => self.acquisition_failed(&e.to_string()),
                    }
                }
            }
        }

        self.state.running.store(false, Ordering::SeqCst);
        info!("Polling stopped");
    }

    /// Replay a track, pacing by recorded timestamps divided by `speed`.
    ///
    /// A non-positive or non-finite speed replays as fast as possible.
    pub async fn run_replay(
        &mut self,
        source: &mut ReplaySource,
        speed: f64,
        loop_replay: bool,
        shutdown: impl std::future::Future<Output = ()>,
    ) {
        self.state.running.store(true, Ordering::SeqCst);
        tokio::pin!(shutdown);

        info!(
            "Starting replay: {} samples, speed={}, loop={}",
            source.len(),
            speed,
            loop_replay
        );
        loop {
            let sample = match source.next_sample() {
                Ok(Some(sample)) => sample,
                Ok(None) if loop_replay => {
                    info!("Track complete, looping...");
                    source.rewind();
                    self.reset();
                    continue;
                }
                Ok(None) => {
                    info!("Track complete, stopping");
                    break;
                }
                Err(never) => match never {},
            };
            self.handle(&sample);
            debug!("Replay position {}/{}", source.position(), source.len());

            let delay = match source.next_gap_ms() {
                Some(gap) if speed.is_finite() && speed > 0.0 => {
                    Duration::from_millis((gap as f64 / speed) as u64)
                }
                _ => Duration::ZERO,
            };
            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                _ = sleep(delay) => {}
            }
        }

        self.state.running.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::OutputFormat;
    use crate::metrics::{self, lock_for_test};
    use gnss_sentinel::AlertKind;
    use std::sync::MutexGuard;

    fn create_monitor() -> (Monitor<Vec<u8>>, Arc<MonitorState>, MutexGuard<'static, ()>) {
        let guard = lock_for_test();
        let state = MonitorState::new();
        let console = ConsoleSink::new(Vec::new(), false, OutputFormat::Text);
        (
            Monitor::new(DetectorConfig::default(), console, Arc::clone(&state)),
            state,
            guard,
        )
    }

    fn track() -> Vec<PositionSample> {
        vec![
            PositionSample::new(0, 45.0, 9.0).with_satellites(8),
            PositionSample::empty(1000),
            PositionSample::new(2000, 45.1, 9.0).with_satellites(8),
        ]
    }

    #[test]
    fn test_handle_updates_state() {
        let (mut monitor, state, _guard) = create_monitor();

        for sample in track() {
            monitor.handle(&sample);
        }

        assert_eq!(state.samples_processed.load(Ordering::SeqCst), 3);
        assert_eq!(state.alerts_emitted.load(Ordering::SeqCst), 2);
        let last = state.last_sample().unwrap();
        assert_eq!(last.timestamp_ms, 2000);
        assert_eq!(last.status, "fix");
        assert_eq!(monitor.stats().alerts(AlertKind::SuddenJump), 1);
    }

    #[test]
    fn test_metrics_survive_reset() {
        let (mut monitor, _state, _guard) = create_monitor();
        let suppressed_before = metrics::SUPPRESSED_JUMPS_TOTAL.get();

        // Alert, then a second jump inside the cooldown
        monitor.handle(&PositionSample::new(0, 45.0, 9.0).with_satellites(8));
        monitor.handle(&PositionSample::new(1000, 45.1, 9.0).with_satellites(8));
        monitor.handle(&PositionSample::new(2000, 45.2, 9.0).with_satellites(8));
        assert_eq!(metrics::SUPPRESSED_JUMPS_TOTAL.get() - suppressed_before, 1.0);
        assert!(metrics::LAST_STEP_METERS.get() > 10_000.0);

        monitor.reset();
        monitor.handle(&PositionSample::new(3000, 45.0, 9.0).with_satellites(8));

        assert_eq!(metrics::SUPPRESSED_JUMPS_TOTAL.get() - suppressed_before, 1.0);
        assert!(metrics::LAST_STEP_METERS.get().is_nan());
    }

    #[test]
    fn test_acquisition_failure_reported() {
        let (mut monitor, state, _guard) = create_monitor();
        monitor.acquisition_failed("Not connected to gpsd");

        assert_eq!(state.acquisition_errors.load(Ordering::SeqCst), 1);
        let output = String::from_utf8(monitor.into_console().into_inner()).unwrap();
        assert!(output.contains("! Error: Not connected to gpsd"));
    }

    #[tokio::test]
    async fn test_replay_runs_to_end() {
        let (mut monitor, state, _guard) = create_monitor();
        let mut source = ReplaySource::new(track()).unwrap();

        monitor
            .run_replay(&mut source, 0.0, false, std::future::pending())
            .await;

        assert!(!state.running.load(Ordering::SeqCst));
        assert_eq!(monitor.stats().samples_processed, 3);
        assert_eq!(monitor.stats().total_alerts(), 2);
    }

    #[tokio::test]
    async fn test_replay_stops_on_shutdown() {
        let (mut monitor, _state, _guard) = create_monitor();
        // One hour between samples; shutdown fires first
        let samples = vec![
            PositionSample::new(0, 45.0, 9.0),
            PositionSample::new(3_600_000, 45.0, 9.0),
        ];
        let mut source = ReplaySource::new(samples).unwrap();

        monitor
            .run_replay(&mut source, 1.0, false, sleep(Duration::from_millis(50)))
            .await;

        assert_eq!(monitor.stats().samples_processed, 1);
    }

    #[tokio::test]
    async fn test_gpsd_loop_reports_disconnect() {
        let (mut monitor, state, _guard) = create_monitor();
        let shared = SharedFix::new();

        monitor
            .run_gpsd(
                &shared,
                Duration::from_millis(10),
                sleep(Duration::from_millis(35)),
            )
            .await;

        assert!(state.acquisition_errors.load(Ordering::SeqCst) >= 1);
        assert_eq!(state.samples_processed.load(Ordering::SeqCst), 0);
    }
}
