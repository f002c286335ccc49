//! # realtime-client
//!
//! Client-side protocol layer for a bidirectional, event-based realtime API
//! carried over one WebSocket.
//!
//! - **Transport**: [`TransportSession`] owns the socket, serializes sends,
//!   hands out the inbound frame sequence once, and runs keepalive
//! - **Router**: [`EventRouter`] wakes one-shot waiters and runs handlers for
//!   each decoded event, in arrival order, isolating handler failures
//! - **Client**: [`RealtimeClient`] ties both together with a background
//!   listener and exposes `on` / `off` / `wait_for` / `send` plus one typed
//!   method per command
//!
//! ```no_run
//! # async fn demo(settings: realtime_settings::RealtimeSettings) -> realtime_client::Result<()> {
//! use realtime_client::RealtimeClient;
//! use realtime_core::models::{Item, SessionConfig};
//!
//! let client = RealtimeClient::from_settings(&settings);
//! client.connect().await?;
//! let done = client.waiter("response.done");
//! client.session_update(SessionConfig::text_only("Be brief.")).await?;
//! client.conversation_item_create(Item::user_text("Hello"), None).await?;
//! client.response_create(None).await?;
//! let _event = done.wait(None).await?;
//! client.disconnect().await?;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]

mod client;
pub mod errors;
mod facade;
pub mod router;
pub mod transport;

pub use client::RealtimeClient;
pub use errors::{ClientError, HandlerError, Result, TransportError};
pub use router::{
    DispatchOutcome, EventHandler, EventRouter, HandlerOutcome, ListenerExit, Waiter,
};
pub use transport::{ConnectionState, TransportConfig, TransportSession};
