//! Package-level constants.

/// Current version of the client (sourced from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Package name, used as the default tracing span name.
pub const NAME: &str = "realtime";

/// Default realtime WebSocket endpoint.
pub const DEFAULT_ENDPOINT: &str = "wss://api.openai.com/v1/realtime";

/// Default realtime model identifier.
pub const DEFAULT_MODEL: &str = "gpt-4o-realtime-preview-2024-10-01";

/// Protocol opt-in header sent with the handshake.
pub const BETA_HEADER_NAME: &str = "OpenAI-Beta";

/// Value of [`BETA_HEADER_NAME`].
pub const BETA_HEADER_VALUE: &str = "realtime=v1";
