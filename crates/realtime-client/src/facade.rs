//! Typed command methods, one per client command.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use realtime_core::ClientCommand;
use realtime_core::models::{Item, ResponseConfig, SessionConfig};

use crate::client::RealtimeClient;
use crate::errors::Result;

impl RealtimeClient {
    /// `session.update`: change only the fields set in `session`.
    pub async fn session_update(&self, session: SessionConfig) -> Result<()> {
        self.send(ClientCommand::SessionUpdate { session }).await
    }

    /// `input_audio_buffer.append` with already base64-encoded audio.
    pub async fn input_audio_buffer_append(&self, audio: impl Into<String>) -> Result<()> {
        self.send(ClientCommand::InputAudioBufferAppend {
            audio: audio.into(),
        })
        .await
    }

    /// `input_audio_buffer.append` with raw audio bytes (e.g. PCM16), encoded
    /// here.
    pub async fn input_audio_buffer_append_pcm(&self, pcm: &[u8]) -> Result<()> {
        self.input_audio_buffer_append(STANDARD.encode(pcm)).await
    }

    /// `input_audio_buffer.commit`.
    pub async fn input_audio_buffer_commit(&self) -> Result<()> {
        self.send(ClientCommand::InputAudioBufferCommit).await
    }

    /// `input_audio_buffer.clear`.
    pub async fn input_audio_buffer_clear(&self) -> Result<()> {
        self.send(ClientCommand::InputAudioBufferClear).await
    }

    /// `conversation.item.create`, appended or inserted after
    /// `previous_item_id`.
    pub async fn conversation_item_create(
        &self,
        item: Item,
        previous_item_id: Option<String>,
    ) -> Result<()> {
        self.send(ClientCommand::ConversationItemCreate {
            previous_item_id,
            item,
        })
        .await
    }

    /// `conversation.item.truncate`.
    pub async fn conversation_item_truncate(
        &self,
        item_id: impl Into<String>,
        content_index: u32,
        audio_end_ms: u64,
    ) -> Result<()> {
        self.send(ClientCommand::ConversationItemTruncate {
            item_id: item_id.into(),
            content_index,
            audio_end_ms,
        })
        .await
    }

    /// `conversation.item.delete`.
    pub async fn conversation_item_delete(&self, item_id: impl Into<String>) -> Result<()> {
        self.send(ClientCommand::ConversationItemDelete {
            item_id: item_id.into(),
        })
        .await
    }

    /// `response.create`, optionally overriding session settings for this
    /// response.
    pub async fn response_create(&self, response: Option<ResponseConfig>) -> Result<()> {
        self.send(ClientCommand::ResponseCreate { response }).await
    }

    /// `response.cancel`.
    pub async fn response_cancel(&self) -> Result<()> {
        self.send(ClientCommand::ResponseCancel).await
    }
}
