//! Structured logging with `tracing`.
//!
//! This module provides:
//! - [`init_subscriber`] for setting up the global `tracing` subscriber
//! - [`Verbosity`], the traffic detail level
//! - [`TrafficLog`], the per-connection sink every inbound and outbound event
//!   is reported to
//! - [`test_utils::capture_logs`] for asserting on log output in tests
//!
//! Nothing here is process-global except the subscriber itself. Each client
//! owns its own [`TrafficLog`], so two connections in one process can log at
//! different verbosities under different spans.

pub mod test_utils;
mod traffic;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use test_utils::{CapturedLogs, capture_logs};
pub use traffic::{TrafficDirection, TrafficLog};

/// Initialize the global tracing subscriber with stderr output.
///
/// Call once at application startup. Subsequent calls are no-ops.
/// `RUST_LOG`, when set, takes precedence over `level`.
pub fn init_subscriber(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .compact();

    // set_global_default is a no-op if already set
    let _ = subscriber.try_init();
}

/// How much of each event the traffic log records.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    /// Event types only.
    #[default]
    Normal = 1,
    /// Event types plus full payloads.
    Verbose = 2,
    /// Everything, including keepalive and frame-level detail.
    Debug = 3,
}

impl Verbosity {
    /// Map a numeric level (1..=3). Out-of-range values clamp.
    #[must_use]
    pub fn from_level(level: u8) -> Self {
        match level {
            0 | 1 => Self::Normal,
            2 => Self::Verbose,
            _ => Self::Debug,
        }
    }

    /// Numeric level.
    #[must_use]
    pub fn level(self) -> u8 {
        self as u8
    }

    /// Whether full payloads are logged.
    #[must_use]
    pub fn includes_payloads(self) -> bool {
        self >= Self::Verbose
    }

    /// Lowercase name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Verbose => "verbose",
            Self::Debug => "debug",
        }
    }
}

impl fmt::Display for Verbosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verbosity {
    type Err = String;

    /// Accepts a name (`normal`, `verbose`, `debug`) or a level (`1`..=`3`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" | "1" => Ok(Self::Normal),
            "verbose" | "2" => Ok(Self::Verbose),
            "debug" | "3" => Ok(Self::Debug),
            other => Err(format!("unknown verbosity: {other}")),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
