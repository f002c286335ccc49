//! Client error types.

use std::time::Duration;

use thiserror::Error;

/// Failures of the transport session.
#[derive(Debug, Error)]
pub enum TransportError {
    /// `connect()` while a connection is already open or opening.
    #[error("already connected")]
    AlreadyConnected,
    /// Operation requires an open connection.
    #[error("not connected")]
    NotConnected,
    /// The connection was closed and cannot be reopened.
    #[error("connection closed; construct a new session to reconnect")]
    Closed,
    /// Network or handshake failure, including the open timeout.
    #[error("connect failed: {0}")]
    Connect(String),
    /// The endpoint is not a usable WebSocket URL.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),
    /// A handshake header could not be encoded.
    #[error("invalid header {name}: {reason}")]
    InvalidHeader {
        /// Header name.
        name: String,
        /// Why it was rejected.
        reason: String,
    },
    /// The inbound frame sequence was already handed out.
    #[error("frame sequence already taken")]
    FramesTaken,
    /// Writing a frame failed; the connection is now closed.
    #[error("send failed: {0}")]
    Send(String),
}

/// Errors surfaced by [`RealtimeClient`](crate::RealtimeClient).
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport failure.
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// An outbound command could not be serialized.
    #[error("serialize error: {0}")]
    Serialize(#[from] serde_json::Error),
    /// No matching event arrived before the deadline.
    #[error("timed out after {timeout:?} waiting for {event_type}")]
    WaitTimeout {
        /// Event type waited for.
        event_type: String,
        /// The deadline that elapsed.
        timeout: Duration,
    },
    /// The listener stopped before a matching event arrived.
    #[error("listener stopped while waiting for {event_type}")]
    ListenerStopped {
        /// Event type waited for.
        event_type: String,
    },
    /// A raw command was not a JSON object with a string `type`.
    #[error("invalid command: {0}")]
    InvalidCommand(String),
}

impl ClientError {
    /// Whether this is a "not connected" failure.
    pub fn is_not_connected(&self) -> bool {
        matches!(self, Self::Transport(TransportError::NotConnected))
    }
}

/// A failure inside a registered event handler.
///
/// Handler failures are logged by the router and never reach senders or
/// waiters.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Handler reported a failure.
    #[error("{0}")]
    Failed(String),
    /// Handler returned an arbitrary error.
    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync>),
    /// Handler panicked.
    #[error("handler panicked: {0}")]
    Panicked(String),
}

impl HandlerError {
    /// Failure with a message.
    pub fn msg(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }

    /// Wrap any error.
    pub fn other<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Other(Box::new(error))
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
