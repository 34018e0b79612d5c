// GNSS Sentinel - Satellite fix anomaly detection
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! # GNSS Sentinel
//!
//! Streaming jamming and spoofing detection for satellite position fixes.
//!
//! The engine consumes one [`PositionSample`] per polling cycle and returns
//! the alerts it raises:
//! - **Fix quality**: too few satellites (jamming) or high HDOP (spoofing)
//! - **Sudden jumps**: implausible relocation between consecutive fixes,
//!   debounced by a cooldown window
//! - **No valid data**: samples without usable coordinates
//!
//! ## Quick Start
//!
//! ```rust
//! use gnss_sentinel::{AlertKind, DetectorConfig, PositionSample, SpoofDetectionEngine};
//!
//! let mut engine = SpoofDetectionEngine::new(DetectorConfig::default());
//!
//! // First fix sets the reference position
//! let first = PositionSample::new(0, 48.8566, 2.3522)
//!     .with_satellites(9)
//!     .with_hdop(0.8);
//! assert!(engine.process(&first).is_empty());
//!
//! // About 1.1 km further north one second later
//! let second = PositionSample::new(1_000, 48.8666, 2.3522)
//!     .with_satellites(9)
//!     .with_hdop(0.8);
//! let alerts = engine.process(&second);
//! assert_eq!(alerts.len(), 1);
//! assert_eq!(alerts[0].kind, AlertKind::SuddenJump);
//! ```
//!
//! ## Processing rules
//!
//! - A sample without latitude/longitude yields a single NoValidData alert
//!   and nothing else runs.
//! - A sample without at least a 2D fix yields nothing; detection pauses
//!   and the jump reference is left untouched.
//! - Otherwise quality alerts come first, then the jump alert.
//!
//! The jump reference always advances to the latest valid fix. A spoofer
//! that moves the reported position in steps below `max_jump_meters` is not
//! flagged after the first jump.
//!
//! ## Timestamps
//!
//! Cooldown arithmetic uses `timestamp_ms` from the samples. Feed the engine
//! from a monotonic clock; a wall clock stepping backwards extends the
//! cooldown and one stepping forwards cuts it short.

pub mod alert;
pub mod config;
pub mod engine;
pub mod error;
pub mod geodesic;
pub mod jump;
pub mod quality;
pub mod sample;
pub mod sink;
pub mod source;

// Re-exports for convenience
pub use alert::{AlertDetails, AlertEvent, AlertKind, AlertSeverity};
pub use config::DetectorConfig;
pub use engine::{Assessment, EngineStats, SampleStatus, SpoofDetectionEngine};
pub use error::{ConfigError, Result, SentinelError};
pub use geodesic::{distance, Coordinates, EARTH_RADIUS_M};
pub use jump::{JumpDetector, JumpDetectorState};
pub use quality::FixQualityEvaluator;
pub use sample::{FixMode, PositionSample};
pub use sink::{run_to_end, AlertSink, LogSink, MemorySink};
pub use source::{IterSource, PositionSource};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
