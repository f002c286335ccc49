use std::fmt;

use serde::Serialize;
use tracing::Span;

use super::Verbosity;

/// Direction of a logged event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrafficDirection {
    /// Received from the server.
    Server,
    /// Sent by this client.
    Client,
}

impl TrafficDirection {
    /// Arrow label used in log lines.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Server => "↓ server",
            Self::Client => "↑ client",
        }
    }
}

impl fmt::Display for TrafficDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Per-connection event log.
///
/// Every event is logged at `DEBUG` under the log's span. At
/// [`Verbosity::Verbose`] and above the full JSON payload is attached.
#[derive(Clone, Debug)]
pub struct TrafficLog {
    verbosity: Verbosity,
    span: Span,
}

impl TrafficLog {
    /// Log under a fresh `realtime` span.
    pub fn new(verbosity: Verbosity) -> Self {
        Self::with_span(verbosity, tracing::info_span!("realtime"))
    }

    /// Log under a caller-provided span.
    pub fn with_span(verbosity: Verbosity, span: Span) -> Self {
        Self { verbosity, span }
    }

    /// Configured verbosity.
    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    /// Span every traffic line is recorded under.
    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Record one event. The payload is only serialized at
    /// [`Verbosity::Verbose`] and above.
    pub fn log_event<T>(&self, direction: TrafficDirection, event_type: &str, payload: &T)
    where
        T: Serialize + ?Sized,
    {
        if self.verbosity.includes_payloads() {
            let payload = serde_json::to_string(payload)
                .unwrap_or_else(|e| format!("<unserializable: {e}>"));
            tracing::debug!(
                parent: &self.span,
                %direction,
                event_type,
                payload = %payload,
                "{direction} {event_type}"
            );
        } else {
            tracing::debug!(parent: &self.span, %direction, event_type, "{direction} {event_type}");
        }
    }
}

impl Default for TrafficLog {
    fn default() -> Self {
        Self::new(Verbosity::default())
    }
}
