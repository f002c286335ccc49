use std::time::Duration;

use realtime_core::constants::{BETA_HEADER_NAME, DEFAULT_ENDPOINT};
use realtime_settings::ConnectionSettings;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::tungstenite::http::header::{AUTHORIZATION, HeaderName, HeaderValue};

use crate::errors::TransportError;

/// Everything needed to open one connection.
#[derive(Clone, Debug)]
pub struct TransportConfig {
    /// WebSocket endpoint (`ws://` or `wss://`).
    pub endpoint: String,
    /// Appended as the `model` query parameter when set.
    pub model: Option<String>,
    /// Sent as `Authorization: Bearer <token>` when set.
    pub bearer_token: Option<String>,
    /// Additional handshake headers.
    pub headers: Vec<(String, String)>,
    /// Handshake deadline.
    pub open_timeout: Duration,
    /// Close handshake deadline.
    pub close_timeout: Duration,
    /// Keepalive ping interval; `None` disables keepalive.
    pub ping_interval: Option<Duration>,
    /// Silence after which the peer is considered dead.
    pub ping_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT)
    }
}

impl TransportConfig {
    /// Bare config: no model, no auth, no extra headers, no keepalive.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            model: None,
            bearer_token: None,
            headers: Vec::new(),
            open_timeout: Duration::from_secs(60),
            close_timeout: Duration::from_secs(30),
            ping_interval: None,
            ping_timeout: Duration::from_secs(30),
        }
    }

    /// Build from loaded settings. A missing API key is not an error here;
    /// the handshake simply goes out without `Authorization`.
    pub fn from_settings(settings: &ConnectionSettings) -> Self {
        let mut config = Self::new(settings.url.clone());
        config.model.clone_from(&settings.model);
        config.bearer_token = settings.api_key().ok().map(str::to_owned);
        if let Some(ref beta) = settings.beta_header {
            config
                .headers
                .push((BETA_HEADER_NAME.to_string(), beta.clone()));
        }
        config.open_timeout = Duration::from_millis(settings.open_timeout_ms);
        config.close_timeout = Duration::from_millis(settings.close_timeout_ms);
        config.ping_interval = settings
            .keepalive_enabled()
            .then(|| Duration::from_millis(settings.ping_interval_ms));
        config.ping_timeout = Duration::from_millis(settings.ping_timeout_ms);
        config
    }

    /// Set the model query parameter.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the bearer token.
    #[must_use]
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    /// Add a handshake header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Enable keepalive.
    #[must_use]
    pub fn with_keepalive(mut self, interval: Duration, timeout: Duration) -> Self {
        self.ping_interval = Some(interval);
        self.ping_timeout = timeout;
        self
    }

    /// Set the open and close deadlines.
    #[must_use]
    pub fn with_timeouts(mut self, open: Duration, close: Duration) -> Self {
        self.open_timeout = open;
        self.close_timeout = close;
        self
    }

    /// Full URL including the model query parameter.
    pub fn url(&self) -> String {
        match self.model {
            Some(ref model) => {
                let sep = if self.endpoint.contains('?') { '&' } else { '?' };
                format!("{}{sep}model={model}", self.endpoint)
            }
            None => self.endpoint.clone(),
        }
    }

    /// Build the handshake request.
    pub fn build_request(&self) -> Result<Request, TransportError> {
        if !(self.endpoint.starts_with("ws://") || self.endpoint.starts_with("wss://")) {
            return Err(TransportError::InvalidEndpoint(self.endpoint.clone()));
        }
        let mut request = self
            .url()
            .into_client_request()
            .map_err(|e| TransportError::InvalidEndpoint(e.to_string()))?;

        let headers = request.headers_mut();
        if let Some(ref token) = self.bearer_token {
            let value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|e| {
                TransportError::InvalidHeader {
                    name: AUTHORIZATION.to_string(),
                    reason: e.to_string(),
                }
            })?;
            let _ = headers.insert(AUTHORIZATION, value);
        }
        for (name, value) in &self.headers {
            let invalid = |reason: String| TransportError::InvalidHeader {
                name: name.clone(),
                reason,
            };
            let header_name =
                HeaderName::from_bytes(name.as_bytes()).map_err(|e| invalid(e.to_string()))?;
            let header_value = HeaderValue::from_str(value).map_err(|e| invalid(e.to_string()))?;
            let _ = headers.insert(header_name, header_value);
        }
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn url_appends_model() {
        let config = TransportConfig::new("wss://example.com/v1/realtime").with_model("m1");
        assert_eq!(config.url(), "wss://example.com/v1/realtime?model=m1");

        let config = TransportConfig::new("wss://example.com/rt?x=1").with_model("m1");
        assert_eq!(config.url(), "wss://example.com/rt?x=1&model=m1");

        assert_eq!(TransportConfig::new("ws://h").url(), "ws://h");
    }

    #[test]
    fn request_carries_auth_and_headers() {
        let request = TransportConfig::new("ws://127.0.0.1:9/rt")
            .with_bearer_token("sk-test")
            .with_header("OpenAI-Beta", "realtime=v1")
            .build_request()
            .unwrap();
        assert_eq!(request.headers()["authorization"], "Bearer sk-test");
        assert_eq!(request.headers()["openai-beta"], "realtime=v1");
        assert_eq!(request.uri().path(), "/rt");
    }

    #[test]
    fn non_websocket_endpoint_rejected() {
        let result = TransportConfig::new("https://example.com").build_request();
        assert_matches!(result, Err(TransportError::InvalidEndpoint(_)));
    }

    #[test]
    fn bad_header_rejected() {
        let result = TransportConfig::new("ws://h")
            .with_header("bad header", "v")
            .build_request();
        assert_matches!(result, Err(TransportError::InvalidHeader { .. }));

        let result = TransportConfig::new("ws://h")
            .with_bearer_token("line\nbreak")
            .build_request();
        assert_matches!(result, Err(TransportError::InvalidHeader { .. }));
    }

    #[test]
    fn from_settings_maps_fields() {
        let mut settings = ConnectionSettings::default();
        settings.api_key = Some("sk".into());
        settings.ping_interval_ms = 0;
        let config = TransportConfig::from_settings(&settings);
        assert_eq!(config.endpoint, "wss://api.openai.com/v1/realtime");
        assert_eq!(config.model.as_deref(), Some("gpt-4o-realtime-preview-2024-10-01"));
        assert_eq!(config.bearer_token.as_deref(), Some("sk"));
        assert_eq!(
            config.headers,
            vec![("OpenAI-Beta".to_string(), "realtime=v1".to_string())]
        );
        assert_eq!(config.open_timeout, Duration::from_secs(60));
        assert!(config.ping_interval.is_none());
    }
}
