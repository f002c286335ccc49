//! Inbound and outbound event envelopes.
//!
//! Both directions share one envelope shape: a JSON object with a mandatory
//! string `type`, an optional string `event_id`, and type-specific fields.
//!
//! - [`server`]: [`ServerEvent`] and the [`ServerEventType`] catalogue
//! - [`client`]: [`ClientEvent`] and the [`ClientCommand`] variants
//! - [`payloads`]: typed views over a few common server payloads

mod macros;

pub mod client;
pub mod payloads;
pub mod server;

pub use client::{ClientCommand, ClientEvent};
pub use server::{ALL_SERVER_EVENT_TYPES, ServerEvent, ServerEventType};
