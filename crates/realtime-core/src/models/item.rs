//! Conversation items.

use serde::{Deserialize, Serialize};

/// Kind of conversation item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    /// A message from a user, assistant, or system.
    Message,
    /// A function call requested by the model.
    FunctionCall,
    /// The client's result for a function call.
    FunctionCallOutput,
}

/// Lifecycle status of an item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum ItemStatus {
    Completed,
    InProgress,
    Incomplete,
}

/// Message author.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[allow(missing_docs)]
pub enum Role {
    User,
    Assistant,
    System,
}

/// Kind of content part.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum ContentPartType {
    Text,
    Audio,
    InputText,
    InputAudio,
}

/// One piece of message content.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentPart {
    /// Content kind.
    #[serde(rename = "type")]
    pub part_type: ContentPartType,
    /// Text content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Base64-encoded audio.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<String>,
    /// Transcript of the audio.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
}

impl ContentPart {
    fn empty(part_type: ContentPartType) -> Self {
        Self {
            part_type,
            text: None,
            audio: None,
            transcript: None,
        }
    }

    /// User or system text input.
    pub fn input_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::empty(ContentPartType::InputText)
        }
    }

    /// User audio input (base64).
    pub fn input_audio(audio: impl Into<String>) -> Self {
        Self {
            audio: Some(audio.into()),
            ..Self::empty(ContentPartType::InputAudio)
        }
    }

    /// Assistant text.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::empty(ContentPartType::Text)
        }
    }
}

/// A conversation item, as sent with `conversation.item.create` or received
/// in `conversation.item.created`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Item ID; the server assigns one when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Item kind.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub item_type: Option<ItemType>,
    /// Item status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ItemStatus>,
    /// Message author.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    /// Message content.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<ContentPart>,
    /// Function call ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_id: Option<String>,
    /// Function name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Function call arguments (JSON text).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<String>,
    /// Function call output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

impl Item {
    fn message(role: Role, content: ContentPart) -> Self {
        Self {
            item_type: Some(ItemType::Message),
            role: Some(role),
            content: vec![content],
            ..Self::default()
        }
    }

    /// User message with one text part.
    pub fn user_text(text: impl Into<String>) -> Self {
        Self::message(Role::User, ContentPart::input_text(text))
    }

    /// System message with one text part.
    pub fn system_text(text: impl Into<String>) -> Self {
        Self::message(Role::System, ContentPart::input_text(text))
    }

    /// User message with one base64 audio part.
    pub fn user_audio(audio: impl Into<String>) -> Self {
        Self::message(Role::User, ContentPart::input_audio(audio))
    }

    /// Result of a function call.
    pub fn function_call_output(call_id: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            item_type: Some(ItemType::FunctionCallOutput),
            call_id: Some(call_id.into()),
            output: Some(output.into()),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn user_text_wire_shape() {
        let value = serde_json::to_value(Item::user_text("hi")).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "message",
                "role": "user",
                "content": [{"type": "input_text", "text": "hi"}],
            })
        );
    }

    #[test]
    fn function_call_output_wire_shape() {
        let value = serde_json::to_value(Item::function_call_output("call_1", "42")).unwrap();
        assert_eq!(
            value,
            json!({"type": "function_call_output", "call_id": "call_1", "output": "42"})
        );
    }

    #[test]
    fn server_item_deserializes() {
        let item: Item = serde_json::from_value(json!({
            "id": "item_9",
            "object": "realtime.item",
            "type": "message",
            "status": "completed",
            "role": "assistant",
            "content": [{"type": "text", "text": "Hello"}],
        }))
        .unwrap();
        assert_eq!(item.id.as_deref(), Some("item_9"));
        assert_eq!(item.status, Some(ItemStatus::Completed));
        assert_eq!(item.role, Some(Role::Assistant));
        assert_eq!(item.content, vec![ContentPart::text("Hello")]);
    }

    #[test]
    fn system_and_audio_helpers() {
        assert_eq!(Item::system_text("x").role, Some(Role::System));
        let audio = Item::user_audio("AAAA");
        assert_eq!(audio.content[0].part_type, ContentPartType::InputAudio);
        assert_eq!(audio.content[0].audio.as_deref(), Some("AAAA"));
    }
}
