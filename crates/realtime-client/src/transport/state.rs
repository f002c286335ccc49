//! Connection lifecycle states.

use std::fmt;

/// Lifecycle of one connection.
///
/// `Disconnected → Connecting → Open → Closing → Closed`. A failed handshake
/// returns to `Disconnected`; `Closed` is terminal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    /// No socket yet.
    #[default]
    Disconnected,
    /// Handshake in progress.
    Connecting,
    /// Frames may be sent and received.
    Open,
    /// Close handshake in progress.
    Closing,
    /// Terminal.
    Closed,
}

impl ConnectionState {
    /// Lowercase name for logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Open => "open",
            Self::Closing => "closing",
            Self::Closed => "closed",
        }
    }

    /// Whether the state can never become `Open` again.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Closing | Self::Closed)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_disconnected() {
        assert_eq!(ConnectionState::default(), ConnectionState::Disconnected);
    }

    #[test]
    fn terminal_states() {
        assert!(!ConnectionState::Disconnected.is_terminal());
        assert!(!ConnectionState::Open.is_terminal());
        assert!(ConnectionState::Closing.is_terminal());
        assert!(ConnectionState::Closed.is_terminal());
        assert_eq!(ConnectionState::Closing.to_string(), "closing");
    }
}
