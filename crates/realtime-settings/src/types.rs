//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase")]` and `#[serde(default)]`
//! so a partial JSON file only overrides the fields it names.

use realtime_core::Verbosity;
use realtime_core::constants::{BETA_HEADER_VALUE, DEFAULT_ENDPOINT, DEFAULT_MODEL};
use serde::{Deserialize, Serialize};

use crate::errors::{Result, SettingsError};

/// Root settings type.
///
/// ```json
/// {
///   "connection": { "model": "gpt-4o-realtime-preview", "pingIntervalMs": 0 },
///   "logging": { "verbosity": "verbose" }
/// }
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RealtimeSettings {
    /// Settings schema version.
    pub version: String,
    /// Endpoint, credentials, and timeouts.
    pub connection: ConnectionSettings,
    /// Log level and traffic verbosity.
    pub logging: LoggingSettings,
}

impl Default for RealtimeSettings {
    fn default() -> Self {
        Self {
            version: "0.1.0".to_string(),
            connection: ConnectionSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl RealtimeSettings {
    /// Reject combinations the client cannot run with.
    pub fn validate(&self) -> Result<()> {
        self.connection.validate()
    }
}

/// Connection settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConnectionSettings {
    /// WebSocket endpoint (`ws://` or `wss://`).
    pub url: String,
    /// Model appended as the `model` query parameter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Bearer token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Value of the protocol opt-in header; omitted when `None`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beta_header: Option<String>,
    /// Handshake timeout in milliseconds.
    pub open_timeout_ms: u64,
    /// Close handshake timeout in milliseconds.
    pub close_timeout_ms: u64,
    /// Keepalive ping interval in milliseconds. `0` disables keepalive.
    pub ping_interval_ms: u64,
    /// Silence after which the peer is considered dead, in milliseconds.
    pub ping_timeout_ms: u64,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_ENDPOINT.to_string(),
            model: Some(DEFAULT_MODEL.to_string()),
            api_key: None,
            beta_header: Some(BETA_HEADER_VALUE.to_string()),
            open_timeout_ms: 60_000,
            close_timeout_ms: 30_000,
            ping_interval_ms: 30_000,
            ping_timeout_ms: 30_000,
        }
    }
}

impl ConnectionSettings {
    /// The configured API key, or [`SettingsError::MissingApiKey`].
    pub fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or(SettingsError::MissingApiKey)
    }

    /// Whether keepalive pings are enabled.
    pub fn keepalive_enabled(&self) -> bool {
        self.ping_interval_ms > 0
    }

    fn validate(&self) -> Result<()> {
        if !(self.url.starts_with("ws://") || self.url.starts_with("wss://")) {
            return Err(SettingsError::InvalidValue(format!(
                "connection.url must be a ws:// or wss:// URL, got {:?}",
                self.url
            )));
        }
        if self.open_timeout_ms == 0 || self.close_timeout_ms == 0 {
            return Err(SettingsError::InvalidValue(
                "connection timeouts must be greater than zero".to_string(),
            ));
        }
        if self.keepalive_enabled() && self.ping_timeout_ms < self.ping_interval_ms {
            return Err(SettingsError::InvalidValue(format!(
                "connection.pingTimeoutMs ({}) must be at least pingIntervalMs ({})",
                self.ping_timeout_ms, self.ping_interval_ms
            )));
        }
        Ok(())
    }
}

/// Logging settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// `EnvFilter` directive for the subscriber (e.g. `warn`, `realtime_client=debug`).
    pub level: String,
    /// Traffic log detail.
    pub verbosity: Verbosity,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            verbosity: Verbosity::Normal,
        }
    }
}
