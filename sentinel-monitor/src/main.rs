// GNSS Sentinel Monitor - Jamming and spoofing monitor
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! # GNSS Sentinel Monitor
//!
//! Watches a receiver through gpsd, or replays a recorded track, and
//! reports jamming and spoofing alerts on the console and as Prometheus
//! metrics.
//!
//! ## Usage
//!
//! ```bash
//! # Live receiver via the local gpsd, polled every 5 seconds
//! sentinel-monitor
//!
//! # Replay a CSV track ten times faster, metrics on port 9100
//! sentinel-monitor --replay track.csv --speed 10 --metrics-port 9100
//!
//! # Replay a built-in scenario as JSON lines
//! sentinel-monitor --scenario teleport --speed 0 --json
//! ```

mod console;
mod gpsd;
mod metrics;
mod monitor;
mod replay;

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::get,
    Json, Router,
};
use clap::Parser;
use console::{ConsoleSink, OutputFormat};
use gnss_sentinel::{DetectorConfig, SentinelError};
use gpsd::{spawn_reader, SharedFix, DEFAULT_GPSD_ADDR};
use metrics::{encode_metrics, init_metrics};
use monitor::{LastSample, Monitor, MonitorState};
use replay::{ReplayError, ReplaySource};
use serde::Serialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

/// GNSS jamming and spoofing monitor
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// gpsd address (host:port)
    #[arg(long, default_value = DEFAULT_GPSD_ADDR)]
    gpsd: String,

    /// CSV track to replay instead of reading gpsd
    #[arg(short, long, conflicts_with = "scenario")]
    replay: Option<PathBuf>,

    /// Built-in scenario to replay (nominal, jamming, fix_loss, dropout, teleport, creeping_spoof)
    #[arg(long)]
    scenario: Option<String>,

    /// Detector configuration file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seconds between gpsd polls
    #[arg(long, default_value = "5", value_parser = clap::value_parser!(u64).range(1..))]
    interval_secs: u64,

    /// Replay speed multiplier (1.0 = real-time, 0 = as fast as possible)
    #[arg(short, long, default_value = "1.0")]
    speed: f64,

    /// Start the replay over when it reaches the end
    #[arg(long)]
    loop_replay: bool,

    /// Serve Prometheus metrics on this port
    #[arg(long)]
    metrics_port: Option<u16>,

    /// Print alerts as JSON lines
    #[arg(long)]
    json: bool,

    /// Disable colored alerts
    #[arg(long)]
    no_color: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Override max_jump_meters
    #[arg(long)]
    max_jump_meters: Option<f64>,

    /// Override max_hdop
    #[arg(long)]
    max_hdop: Option<f64>,

    /// Override min_satellites
    #[arg(long)]
    min_satellites: Option<u32>,

    /// Override spoof_cooldown_secs
    #[arg(long)]
    cooldown_secs: Option<u64>,
}

/// Startup errors.
#[derive(Debug, thiserror::Error)]
enum MonitorError {
    #[error("Configuration error: {0}")]
    Config(#[from] SentinelError),

    #[error("Replay error: {0}")]
    Replay(#[from] ReplayError),

    #[error("Failed to bind metrics server on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },
}

/// Application state shared across handlers.
struct AppState {
    monitor: Arc<MonitorState>,
    source: String,
    config: DetectorConfig,
    start_time: std::time::Instant,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = match args.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        };
        EnvFilter::from_default_env().add_directive(level.into())
    });

    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("GNSS Sentinel Monitor v{}", env!("CARGO_PKG_VERSION"));

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), MonitorError> {
    let config = build_config(&args)?;
    info!(
        "Thresholds: max_jump={} m, max_hdop={}, min_satellites={}, cooldown={} s",
        config.max_jump_meters, config.max_hdop, config.min_satellites, config.spoof_cooldown_secs
    );

    let mut replay_source = open_replay(&args)?;
    let source = match (&args.replay, &args.scenario) {
        (Some(path), _) => format!("replay:{}", path.display()),
        (None, Some(name)) => format!("scenario:{}", name),
        (None, None) => format!("gpsd:{}", args.gpsd),
    };

    let state = MonitorState::new();

    if let Some(port) = args.metrics_port {
        let app_state = Arc::new(AppState {
            monitor: Arc::clone(&state),
            source: source.clone(),
            config: config.clone(),
            start_time: std::time::Instant::now(),
        });
        serve_metrics(port, app_state).await?;
    }

    let format = if args.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };
    let console = ConsoleSink::stdout(!args.no_color, format);
    let mut monitor = Monitor::new(config, console, Arc::clone(&state));

    match replay_source.as_mut() {
        Some(replay) => {
            monitor
                .run_replay(replay, args.speed, args.loop_replay, shutdown_signal())
                .await;
        }
        None => {
            let shared = SharedFix::new();
            let reader = spawn_reader(args.gpsd.clone(), shared.clone());
            monitor
                .run_gpsd(
                    &shared,
                    Duration::from_secs(args.interval_secs),
                    shutdown_signal(),
                )
                .await;
            reader.abort();
        }
    }

    let stats = monitor.stats();
    info!(
        "Processed {} samples ({} fix, {} no fix, {} no data), {} alerts, {} jumps suppressed",
        stats.samples_processed,
        stats.fix_samples,
        stats.no_fix_samples,
        stats.no_data_samples,
        stats.total_alerts(),
        stats.suppressed_jumps
    );
    Ok(())
}

/// Config file (or defaults) with CLI overrides applied, validated.
fn build_config(args: &Args) -> Result<DetectorConfig, SentinelError> {
    let mut config = match &args.config {
        Some(path) => DetectorConfig::from_file(path)?,
        None => DetectorConfig::default(),
    };

    if let Some(v) = args.max_jump_meters {
        config.max_jump_meters = v;
    }
    if let Some(v) = args.max_hdop {
        config.max_hdop = v;
    }
    if let Some(v) = args.min_satellites {
        config.min_satellites = v;
    }
    if let Some(v) = args.cooldown_secs {
        config.spoof_cooldown_secs = v;
    }

    config.validate()?;
    Ok(config)
}

fn open_replay(args: &Args) -> Result<Option<ReplaySource>, ReplayError> {
    if let Some(path) = &args.replay {
        return ReplaySource::from_csv(path).map(Some);
    }

    #[cfg(feature = "replay")]
    if let Some(name) = &args.scenario {
        return ReplaySource::from_scenario(name).map(Some);
    }

    #[cfg(not(feature = "replay"))]
    if args.scenario.is_some() {
        tracing::warn!("Replay feature not enabled, ignoring --scenario argument");
    }

    Ok(None)
}

/// Resolves on Ctrl-C; never resolves if the handler cannot be installed.
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown requested"),
        Err(e) => {
            error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

async fn serve_metrics(port: u16, state: Arc<AppState>) -> Result<(), MonitorError> {
    // Build router
    let app = Router::new()
        .route("/", get(root_handler))
        .route("/metrics", get(metrics_handler))
        .route("/health", get(health_handler))
        .route("/status", get(status_handler))
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| MonitorError::Bind { addr, source })?;

    init_metrics();
    info!("Metrics endpoint: http://{}/metrics", addr);

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("Metrics server failed: {}", e);
        }
    });
    Ok(())
}

/// Root handler - shows a simple HTML page.
async fn root_handler() -> Html<&'static str> {
    Html(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>GNSS Sentinel Monitor</title>
    <style>
        body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; max-width: 800px; margin: 50px auto; padding: 20px; }
        h1 { color: #2c3e50; }
        a { color: #3498db; text-decoration: none; }
        code { background: #e9ecef; padding: 2px 6px; border-radius: 4px; }
    </style>
</head>
<body>
    <h1>GNSS Sentinel Monitor</h1>
    <p>Jamming and spoofing detection for satellite position fixes.</p>

    <h2>Endpoints</h2>
    <ul>
        <li><a href="/metrics">/metrics</a> - Prometheus metrics</li>
        <li><a href="/health">/health</a> - Health check</li>
        <li><a href="/status">/status</a> - Status information (JSON)</li>
    </ul>

    <h2>Metrics</h2>
    <ul>
        <li><code>gnss_samples_total{status}</code> - Samples by fix status</li>
        <li><code>gnss_alerts_total{kind}</code> - Alerts by kind</li>
        <li><code>gnss_suppressed_jumps_total</code> - Jumps swallowed by the cooldown</li>
        <li><code>gnss_satellites</code>, <code>gnss_hdop</code>, <code>gnss_fix_mode</code> - Receiver state</li>
        <li><code>gnss_last_step_meters</code> - Distance between the last two fixes</li>
    </ul>
</body>
</html>"#,
    )
}

/// Metrics handler - returns Prometheus text format.
async fn metrics_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("Content-Type", "text/plain; charset=utf-8")],
        encode_metrics(),
    )
}

/// Health check handler.
async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Status information response.
#[derive(Serialize)]
struct StatusResponse {
    version: String,
    uptime_secs: u64,
    source: String,
    running: bool,
    samples_processed: u64,
    alerts_emitted: u64,
    acquisition_errors: u64,
    config: DetectorConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_sample: Option<LastSample>,
}

/// Status handler - returns JSON status information.
async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let monitor = &state.monitor;
    Json(StatusResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        source: state.source.clone(),
        running: monitor.running.load(Ordering::SeqCst),
        samples_processed: monitor.samples_processed.load(Ordering::SeqCst),
        alerts_emitted: monitor.alerts_emitted.load(Ordering::SeqCst),
        acquisition_errors: monitor.acquisition_errors.load(Ordering::SeqCst),
        config: state.config.clone(),
        last_sample: monitor.last_sample(),
    })
}
