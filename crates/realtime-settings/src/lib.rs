//! # realtime-settings
//!
//! Layered configuration for the realtime event client.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults**: [`RealtimeSettings::default()`]
//! 2. **User file**: `~/.realtime/settings.json` (deep-merged over defaults)
//! 3. **Environment variables**: `REALTIME_*` and `OPENAI_API_KEY`
//!
//! There is no global instance. Load once at startup and pass the result to
//! whatever needs it.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{deep_merge, load_settings, load_settings_from_path, settings_path};
pub use types::{ConnectionSettings, LoggingSettings, RealtimeSettings};

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn re_exports_work() {
        let _settings = RealtimeSettings::default();
        let path = settings_path();
        assert!(path.ends_with(".realtime/settings.json"));
    }

    #[test]
    fn deep_merge_re_exported() {
        let a = serde_json::json!({"x": 1});
        let b = serde_json::json!({"y": 2});
        let merged = deep_merge(a, b);
        assert_eq!(merged["x"], 1);
        assert_eq!(merged["y"], 2);
    }
}
