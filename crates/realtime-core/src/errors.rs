//! Decode errors for inbound frames.
//!
//! A frame that fails to decode is fatal for the listener: once one frame is
//! corrupt, ordering and integrity of the rest of the stream cannot be trusted.

use thiserror::Error;

/// Why an inbound frame could not be turned into a [`ServerEvent`].
///
/// [`ServerEvent`]: crate::events::ServerEvent
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The frame is not valid JSON.
    #[error("frame is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The frame is valid JSON but not an object.
    #[error("frame is not a JSON object (found {found})")]
    NotAnObject {
        /// JSON kind that was found instead (e.g. `"array"`).
        found: &'static str,
    },

    /// The object has no `type` discriminant.
    #[error("frame has no `type` field")]
    MissingType,

    /// A well-known envelope field has the wrong JSON kind.
    #[error("frame field `{field}` must be a string (found {found})")]
    InvalidField {
        /// Envelope field name (`type` or `event_id`).
        field: &'static str,
        /// JSON kind that was found instead.
        found: &'static str,
    },
}

/// Human-readable JSON kind for error messages.
pub(crate) fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
