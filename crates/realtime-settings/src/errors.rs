//! Settings error types.

use thiserror::Error;

/// Errors that can occur when loading or using settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Failed to read the settings file from disk.
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),
    /// Failed to parse JSON in the settings file.
    #[error("failed to parse settings JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// A settings value was invalid (e.g., out of range).
    #[error("invalid settings value: {0}")]
    InvalidValue(String),
    /// No API key in the settings file or `OPENAI_API_KEY`.
    #[error("no API key configured (set OPENAI_API_KEY or connection.apiKey)")]
    MissingApiKey,
}

/// Result type for settings operations.
pub type Result<T> = std::result::Result<T, SettingsError>;
