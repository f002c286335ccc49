//! Transport session: the single WebSocket connection behind a client.
//!
//! - [`TransportConfig`]: endpoint, auth, headers, timeouts, keepalive
//! - [`TransportSession`]: connect / send / frames / close
//! - [`ConnectionState`]: the lifecycle state machine
//! - [`keepalive`]: ping/pong liveness loop

mod config;
pub mod keepalive;
mod session;
mod state;

pub use config::TransportConfig;
pub use session::{FrameStream, TransportSession};
pub use state::ConnectionState;
