//! Typed views over common server payloads.
//!
//! The router never decodes these. Handlers call
//! [`ServerEvent::payload`](super::ServerEvent::payload) when they want a
//! typed shape instead of the raw field map.

use serde::{Deserialize, Serialize};

use crate::models::ErrorDetail;

/// Payload of the `error` event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ErrorPayload {
    /// Error details.
    pub error: ErrorDetail,
}

/// Shared shape of the streaming `*.delta` events
/// (`response.text.delta`, `response.audio.delta`,
/// `response.audio_transcript.delta`, `response.function_call_arguments.delta`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeltaPayload {
    /// Response the delta belongs to.
    pub response_id: String,
    /// Output item the delta belongs to.
    pub item_id: String,
    /// Index of the output item in the response.
    #[serde(default)]
    pub output_index: u32,
    /// Index of the content part (absent for function call arguments).
    #[serde(default)]
    pub content_index: u32,
    /// The incremental text, transcript, arguments, or base64 audio.
    pub delta: String,
}

/// Payload of `response.text.done`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextDonePayload {
    /// Response the text belongs to.
    pub response_id: String,
    /// Output item the text belongs to.
    pub item_id: String,
    /// Index of the output item in the response.
    #[serde(default)]
    pub output_index: u32,
    /// Index of the content part.
    #[serde(default)]
    pub content_index: u32,
    /// Final text.
    pub text: String,
}
