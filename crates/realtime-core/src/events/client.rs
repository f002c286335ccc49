//! Outbound commands.
//!
//! A [`ClientEvent`] wraps one [`ClientCommand`] with an optional
//! client-generated `event_id`. Serialization flattens both into the shared
//! envelope and omits every unset optional field.

use serde::{Deserialize, Serialize};

use crate::models::{Item, ResponseConfig, SessionConfig};

/// The commands a client may send.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientCommand {
    /// Update the session configuration. Only present fields change.
    #[serde(rename = "session.update")]
    SessionUpdate {
        /// New session configuration.
        session: SessionConfig,
    },

    /// Append base64-encoded audio to the input buffer.
    #[serde(rename = "input_audio_buffer.append")]
    InputAudioBufferAppend {
        /// Base64-encoded audio bytes.
        audio: String,
    },

    /// Commit the input buffer as a user message.
    #[serde(rename = "input_audio_buffer.commit")]
    InputAudioBufferCommit,

    /// Discard the input buffer.
    #[serde(rename = "input_audio_buffer.clear")]
    InputAudioBufferClear,

    /// Add an item to the conversation.
    #[serde(rename = "conversation.item.create")]
    ConversationItemCreate {
        /// Insert after this item; append when absent.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        previous_item_id: Option<String>,
        /// The item to add.
        item: Item,
    },

    /// Truncate assistant audio that was sent but not yet played.
    #[serde(rename = "conversation.item.truncate")]
    ConversationItemTruncate {
        /// Assistant message item to truncate.
        item_id: String,
        /// Content part index (currently always 0).
        content_index: u32,
        /// Inclusive audio duration to keep, in milliseconds.
        audio_end_ms: u64,
    },

    /// Remove an item from the conversation.
    #[serde(rename = "conversation.item.delete")]
    ConversationItemDelete {
        /// Item to remove.
        item_id: String,
    },

    /// Ask the server to generate a response.
    #[serde(rename = "response.create")]
    ResponseCreate {
        /// Per-response overrides of the session configuration.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        response: Option<ResponseConfig>,
    },

    /// Cancel the in-progress response.
    #[serde(rename = "response.cancel")]
    ResponseCancel,
}

impl ClientCommand {
    /// Wire discriminant of this command.
    #[must_use]
    pub fn command_type(&self) -> &'static str {
        match self {
            Self::SessionUpdate { .. } => "session.update",
            Self::InputAudioBufferAppend { .. } => "input_audio_buffer.append",
            Self::InputAudioBufferCommit => "input_audio_buffer.commit",
            Self::InputAudioBufferClear => "input_audio_buffer.clear",
            Self::ConversationItemCreate { .. } => "conversation.item.create",
            Self::ConversationItemTruncate { .. } => "conversation.item.truncate",
            Self::ConversationItemDelete { .. } => "conversation.item.delete",
            Self::ResponseCreate { .. } => "response.create",
            Self::ResponseCancel => "response.cancel",
        }
    }
}

/// Outbound envelope: an optional event ID plus one command.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClientEvent {
    /// Optional client-generated ID, echoed by server errors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    /// The command itself.
    #[serde(flatten)]
    pub command: ClientCommand,
}

impl ClientEvent {
    /// Wrap a command without an event ID.
    pub fn new(command: ClientCommand) -> Self {
        Self {
            event_id: None,
            command,
        }
    }

    /// Attach a client-generated event ID.
    #[must_use]
    pub fn with_event_id(mut self, event_id: impl Into<String>) -> Self {
        self.event_id = Some(event_id.into());
        self
    }

    /// Wire discriminant of the wrapped command.
    pub fn command_type(&self) -> &'static str {
        self.command.command_type()
    }

    /// Serialize to one text frame.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl From<ClientCommand> for ClientEvent {
    fn from(command: ClientCommand) -> Self {
        Self::new(command)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
