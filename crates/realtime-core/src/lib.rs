//! # realtime-core
//!
//! Shared vocabulary for the realtime event client.
//!
//! - **Events**: [`ServerEvent`] (decoded inbound frame), the closed
//!   [`ServerEventType`] catalogue with an `Unknown` fallback, and the outbound
//!   [`ClientEvent`] / [`ClientCommand`] envelope
//! - **Models**: optional-field payload shapes used by outbound commands
//!   (`SessionConfig`, `ResponseConfig`, `Item`, ...)
//! - **Errors**: [`DecodeError`] for frames that cannot be trusted
//! - **Logging**: subscriber bootstrap, the per-connection [`TrafficLog`], and
//!   in-memory log capture for tests

#![deny(unsafe_code)]

pub mod constants;
pub mod errors;
pub mod events;
pub mod logging;
pub mod models;

pub use errors::DecodeError;
pub use events::{ALL_SERVER_EVENT_TYPES, ClientCommand, ClientEvent, ServerEvent, ServerEventType};
pub use logging::{TrafficDirection, TrafficLog, Verbosity};
