//! Payload models shared by commands and server events.

mod error_detail;
mod item;
mod session;

pub use error_detail::ErrorDetail;
pub use item::{ContentPart, ContentPartType, Item, ItemStatus, ItemType, Role};
pub use session::{
    AudioFormat, MaxOutputTokens, Modality, ResponseConfig, SessionConfig, ToolChoice,
    ToolChoiceMode, Voice,
};
