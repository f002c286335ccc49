//! Decoded inbound events.
//!
//! [`ServerEvent::decode`] validates the envelope only: the `type`
//! discriminant and the optional `event_id`. Every other field stays an opaque
//! JSON map. The discriminant is classified against the closed
//! [`ServerEventType`] catalogue, but unrecognized values are kept (as
//! [`ServerEventType::Unknown`]) rather than rejected.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::macros::define_server_events;
use crate::errors::{DecodeError, json_kind};

define_server_events! {
    /// Server-side error; most are recoverable and the session stays open.
    Error => "error",
    /// Session established; first event after the handshake.
    SessionCreated => "session.created",
    /// Session configuration changed in response to `session.update`.
    SessionUpdated => "session.updated",
    /// Conversation created with the session.
    ConversationCreated => "conversation.created",
    /// Item added to the conversation.
    ConversationItemCreated => "conversation.item.created",
    /// Input audio transcription finished.
    ConversationItemInputAudioTranscriptionCompleted => "conversation.item.input_audio_transcription.completed",
    /// Input audio transcription failed.
    ConversationItemInputAudioTranscriptionFailed => "conversation.item.input_audio_transcription.failed",
    /// Assistant audio item truncated.
    ConversationItemTruncated => "conversation.item.truncated",
    /// Item removed from the conversation.
    ConversationItemDeleted => "conversation.item.deleted",
    /// Input audio buffer committed.
    InputAudioBufferCommitted => "input_audio_buffer.committed",
    /// Input audio buffer cleared.
    InputAudioBufferCleared => "input_audio_buffer.cleared",
    /// Server VAD detected the start of speech.
    InputAudioBufferSpeechStarted => "input_audio_buffer.speech_started",
    /// Server VAD detected the end of speech.
    InputAudioBufferSpeechStopped => "input_audio_buffer.speech_stopped",
    /// Response generation started.
    ResponseCreated => "response.created",
    /// Response finished (completed, cancelled, or failed).
    ResponseDone => "response.done",
    /// Output item added to a response.
    ResponseOutputItemAdded => "response.output_item.added",
    /// Output item finished streaming.
    ResponseOutputItemDone => "response.output_item.done",
    /// Content part added to an output item.
    ResponseContentPartAdded => "response.content_part.added",
    /// Content part finished streaming.
    ResponseContentPartDone => "response.content_part.done",
    /// Text delta.
    ResponseTextDelta => "response.text.delta",
    /// Text finished streaming.
    ResponseTextDone => "response.text.done",
    /// Audio transcript delta.
    ResponseAudioTranscriptDelta => "response.audio_transcript.delta",
    /// Audio transcript finished streaming.
    ResponseAudioTranscriptDone => "response.audio_transcript.done",
    /// Base64 audio delta.
    ResponseAudioDelta => "response.audio.delta",
    /// Audio finished streaming.
    ResponseAudioDone => "response.audio.done",
    /// Function call arguments delta.
    ResponseFunctionCallArgumentsDelta => "response.function_call_arguments.delta",
    /// Function call arguments finished streaming.
    ResponseFunctionCallArgumentsDone => "response.function_call_arguments.done",
    /// Rate limits refreshed after a response.
    RateLimitsUpdated => "rate_limits.updated",
}

impl ServerEventType {
    /// Domain prefix (e.g. `"response"`, `"input_audio_buffer"`).
    #[must_use]
    pub fn domain(self) -> &'static str {
        let wire = self.as_str();
        wire.split_once('.').map_or(wire, |(domain, _)| domain)
    }

    /// Whether this is a streaming delta event.
    #[must_use]
    pub fn is_delta(self) -> bool {
        self.as_str().ends_with(".delta")
    }

    /// Whether the discriminant is part of the catalogue.
    #[must_use]
    pub fn is_known(self) -> bool {
        self != Self::Unknown
    }
}

impl fmt::Display for ServerEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServerEventType {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_wire(s))
    }
}

/// One decoded inbound frame.
///
/// Serializes back to the original envelope: `type`, `event_id` when
/// present, then the remaining fields.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ServerEvent {
    #[serde(skip)]
    kind: ServerEventType,
    #[serde(rename = "type")]
    event_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    event_id: Option<String>,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

impl ServerEvent {
    /// Build an event from a discriminant and its payload fields.
    pub fn new(event_type: impl Into<String>, fields: Map<String, Value>) -> Self {
        let event_type = event_type.into();
        Self {
            kind: ServerEventType::from_wire(&event_type),
            event_type,
            event_id: None,
            fields,
        }
    }

    /// Attach a server event ID.
    #[must_use]
    pub fn with_event_id(mut self, event_id: impl Into<String>) -> Self {
        self.event_id = Some(event_id.into());
        self
    }

    /// Decode one text frame.
    pub fn decode(frame: &str) -> Result<Self, DecodeError> {
        let value: Value = serde_json::from_str(frame)?;
        Self::from_value(value)
    }

    /// Decode an already-parsed JSON value.
    pub fn from_value(value: Value) -> Result<Self, DecodeError> {
        let Value::Object(mut fields) = value else {
            return Err(DecodeError::NotAnObject {
                found: json_kind(&value),
            });
        };

        let event_type = match fields.remove("type") {
            Some(Value::String(event_type)) => event_type,
            Some(other) => {
                return Err(DecodeError::InvalidField {
                    field: "type",
                    found: json_kind(&other),
                });
            }
            None => return Err(DecodeError::MissingType),
        };

        let event_id = match fields.remove("event_id") {
            Some(Value::String(id)) => Some(id),
            None | Some(Value::Null) => None,
            Some(other) => {
                return Err(DecodeError::InvalidField {
                    field: "event_id",
                    found: json_kind(&other),
                });
            }
        };

        Ok(Self {
            kind: ServerEventType::from_wire(&event_type),
            event_type,
            event_id,
            fields,
        })
    }

    /// Catalogue classification of the discriminant.
    pub fn kind(&self) -> ServerEventType {
        self.kind
    }

    /// Raw `type` discriminant as received.
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// Server event ID, if the frame carried one.
    pub fn event_id(&self) -> Option<&str> {
        self.event_id.as_deref()
    }

    /// Type-specific fields (everything except `type` and `event_id`).
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Look up one payload field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Deserialize the payload fields into a typed view.
    pub fn payload<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(Value::Object(self.fields.clone()))
    }

    /// Reassemble the full envelope as JSON.
    pub fn to_value(&self) -> Value {
        let mut object = Map::with_capacity(self.fields.len() + 2);
        let _ = object.insert("type".into(), Value::String(self.event_type.clone()));
        if let Some(ref id) = self.event_id {
            let _ = object.insert("event_id".into(), Value::String(id.clone()));
        }
        for (key, value) in &self.fields {
            let _ = object.insert(key.clone(), value.clone());
        }
        Value::Object(object)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
