use std::fmt;

use serde::{Deserialize, Serialize};

/// Error details carried by the `error` server event.
///
/// Every field is optional on the wire; `param` and `event_id` are commonly
/// `null`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Error category (e.g. `invalid_request_error`).
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    /// Machine-readable error code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Human-readable message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Offending parameter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub param: Option<String>,
    /// Client event that caused the error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
}

impl fmt::Display for ErrorDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = self.error_type.as_deref().unwrap_or("error");
        let message = self.message.as_deref().unwrap_or("no message");
        match self.code.as_deref() {
            Some(code) => write!(f, "{kind} ({code}): {message}"),
            None => write!(f, "{kind}: {message}"),
        }
    }
}
