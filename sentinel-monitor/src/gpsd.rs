// GNSS Sentinel Monitor - gpsd client
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Minimal gpsd JSON client.
//!
//! Only the two report classes the detector needs are decoded:
//! - `TPV`: fix mode and coordinates
//! - `SKY`: HDOP and satellites used in the solution
//!
//! A background task keeps the latest view of the receiver in a
//! [`SharedFix`]; the polling loop samples it at its own pace.

use gnss_sentinel::{FixMode, PositionSample};
use serde::Deserialize;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Default gpsd address.
pub const DEFAULT_GPSD_ADDR: &str = "127.0.0.1:2947";

/// Command enabling JSON streaming.
pub const WATCH_COMMAND: &str = "?WATCH={\"enable\":true,\"json\":true}\n";

/// Delay before reconnecting after a lost connection.
const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// gpsd client errors.
#[derive(Debug, thiserror::Error)]
pub enum GpsdError {
    #[error("Failed to connect to gpsd at {addr}: {source}")]
    Connect {
        addr: String,
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed gpsd report: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Not connected to gpsd")]
    Disconnected,
}

/// Time-position-velocity report.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TpvReport {
    #[serde(default)]
    pub mode: u8,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

/// One satellite in a SKY report.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SkySatellite {
    #[serde(default)]
    pub used: bool,
}

/// Sky view report.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SkyReport {
    pub hdop: Option<f64>,
    #[serde(rename = "uSat")]
    pub used_satellites: Option<u32>,
    #[serde(default)]
    pub satellites: Vec<SkySatellite>,
}

impl SkyReport {
    /// Satellites used in the solution; `uSat` wins over counting the list.
    pub fn satellites_used(&self) -> u32 {
        self.used_satellites
            .unwrap_or_else(|| self.satellites.iter().filter(|s| s.used).count() as u32)
    }
}

/// A gpsd report, keyed by its `class` field.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "class")]
pub enum GpsdReport {
    #[serde(rename = "TPV")]
    Tpv(TpvReport),
    #[serde(rename = "SKY")]
    Sky(SkyReport),
    #[serde(other)]
    Other,
}

impl GpsdReport {
    pub fn parse(line: &str) -> Result<Self, GpsdError> {
        Ok(serde_json::from_str(line)?)
    }
}

/// Latest receiver state assembled from gpsd reports.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FixSnapshot {
    pub mode: u8,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub hdop: Option<f64>,
    pub satellites_used: u32,
    /// Whether a gpsd session is currently open.
    pub connected: bool,
}

impl FixSnapshot {
    pub fn apply(&mut self, report: &GpsdReport) {
        match report {
            GpsdReport::Tpv(tpv) => {
                self.mode = tpv.mode;
                self.latitude = tpv.lat;
                self.longitude = tpv.lon;
            }
            GpsdReport::Sky(sky) => {
                self.hdop = sky.hdop;
                self.satellites_used = sky.satellites_used();
            }
            GpsdReport::Other => {}
        }
    }

    /// Stamp the snapshot into an engine sample.
    pub fn to_sample(&self, timestamp_ms: u64) -> PositionSample {
        PositionSample {
            timestamp_ms,
            latitude: self.latitude,
            longitude: self.longitude,
            satellite_count: self.satellites_used,
            hdop: self.hdop,
            fix_mode: FixMode::from_mode(self.mode),
        }
    }
}

/// Snapshot shared between the reader task and the polling loop.
#[derive(Debug, Clone, Default)]
pub struct SharedFix {
    inner: Arc<Mutex<FixSnapshot>>,
}

impl SharedFix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the current snapshot, or an error while disconnected.
    pub fn current(&self) -> Result<FixSnapshot, GpsdError> {
        let snapshot = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if snapshot.connected {
            Ok(snapshot.clone())
        } else {
            Err(GpsdError::Disconnected)
        }
    }

    fn update(&self, f: impl FnOnce(&mut FixSnapshot)) {
        let mut snapshot = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut snapshot);
    }

    fn set_connected(&self, connected: bool) {
        self.update(|s| {
            if connected {
                s.connected = true;
            } else {
                *s = FixSnapshot::default();
            }
        });
    }
}

/// One gpsd session.
pub struct GpsdClient {
    addr: String,
    reader: BufReader<TcpStream>,
}

impl GpsdClient {
    /// Connect and enable JSON watch mode.
    pub async fn connect(addr: &str) -> Result<Self, GpsdError> {
        let mut stream = TcpStream::connect(addr)
            .await
            .map_err(|source| GpsdError::Connect {
                addr: addr.to_string(),
                source,
            })?;
        stream.write_all(WATCH_COMMAND.as_bytes()).await?;

        info!("Connected to gpsd at {}", addr);
        Ok(Self {
            addr: addr.to_string(),
            reader: BufReader::new(stream),
        })
    }

    /// Next report; `Ok(None)` once gpsd closes the connection.
    pub async fn next_report(&mut self) -> Result<Option<GpsdReport>, GpsdError> {
        let mut line = String::new();
        loop {
            line.clear();
            if self.reader.read_line(&mut line).await? == 0 {
                return Ok(None);
            }
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            return GpsdReport::parse(trimmed).map(Some);
        }
    }

    /// Apply reports to `shared` until the session ends.
    pub async fn pump(&mut self, shared: &SharedFix) -> Result<(), GpsdError> {
        shared.set_connected(true);
        loop {
            match self.next_report().await {
                Ok(Some(report)) => {
                    debug!("gpsd report: {:?}", report);
                    shared.update(|s| s.apply(&report));
                }
                Ok(None) => {
                    warn!("gpsd at {} closed the connection", self.addr);
                    return Err(GpsdError::Disconnected);
                }
                // A single garbled line does not end the session
                Err(GpsdError::Json(e)) => warn!("Skipping malformed gpsd report: {}", e),
                Err(e) => return Err(e),
            }
        }
    }
}

/// Keep a gpsd session alive in the background, reconnecting on failure.
pub fn spawn_reader(addr: String, shared: SharedFix) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let result = match GpsdClient::connect(&addr).await {
                Ok(mut client) => client.pump(&shared).await,
                Err(e) => Err(e),
            };
            shared.set_connected(false);
            if let Err(e) = result {
                warn!("gpsd session ended: {}", e);
            }
            sleep(RECONNECT_DELAY).await;
        }
    })
}
