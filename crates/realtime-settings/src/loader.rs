//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`RealtimeSettings::default()`]
//! 2. If `~/.realtime/settings.json` exists, deep-merge user values over defaults
//! 3. Apply environment variable overrides (highest priority)
//! 4. Validate the result
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use realtime_core::Verbosity;
use serde_json::Value;
use tracing::debug;

use crate::errors::Result;
use crate::types::RealtimeSettings;

/// Resolve the path to the settings file (`~/.realtime/settings.json`).
pub fn settings_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".realtime").join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<RealtimeSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// A missing file yields defaults. Invalid JSON or an invalid final value is
/// an error.
pub fn load_settings_from_path(path: &Path) -> Result<RealtimeSettings> {
    load_with_lookup(path, |name| std::env::var(name).ok())
}

fn load_with_lookup<F>(path: &Path, lookup: F) -> Result<RealtimeSettings>
where
    F: Fn(&str) -> Option<String>,
{
    let defaults = serde_json::to_value(RealtimeSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    let mut settings: RealtimeSettings = serde_json::from_value(merged)?;
    apply_overrides(&mut settings, lookup);
    settings.validate()?;
    Ok(settings)
}

/// Recursive deep merge of two JSON values.
///
/// - Objects are merged recursively (source overrides target per-key)
/// - Arrays and primitives are replaced entirely by source
/// - Null values in source are skipped (preserving target)
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply environment variable overrides to loaded settings.
///
/// Invalid values are logged and ignored (the file/default value stays).
pub fn apply_env_overrides(settings: &mut RealtimeSettings) {
    apply_overrides(settings, |name| std::env::var(name).ok());
}

fn apply_overrides<F>(settings: &mut RealtimeSettings, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let env = EnvReader { lookup };

    // ── Connection ──────────────────────────────────────────────────
    if let Some(v) = env.string("REALTIME_URL") {
        settings.connection.url = v;
    }
    if let Some(v) = env.string("REALTIME_MODEL") {
        settings.connection.model = Some(v);
    }
    if let Some(v) = env.string("OPENAI_API_KEY") {
        settings.connection.api_key = Some(v);
    }
    if let Some(v) = env.u64("REALTIME_OPEN_TIMEOUT_MS", 100, 600_000) {
        settings.connection.open_timeout_ms = v;
    }
    if let Some(v) = env.u64("REALTIME_CLOSE_TIMEOUT_MS", 100, 600_000) {
        settings.connection.close_timeout_ms = v;
    }
    if let Some(v) = env.u64("REALTIME_PING_INTERVAL_MS", 0, 3_600_000) {
        settings.connection.ping_interval_ms = v;
    }
    if let Some(v) = env.u64("REALTIME_PING_TIMEOUT_MS", 100, 3_600_000) {
        settings.connection.ping_timeout_ms = v;
    }

    // ── Logging ─────────────────────────────────────────────────────
    if let Some(v) = env.string("REALTIME_LOG_LEVEL") {
        settings.logging.level = v;
    }
    if let Some(v) = env.verbosity("REALTIME_VERBOSITY") {
        settings.logging.verbosity = v;
    }
}

// ── Pure parsing functions (testable without env vars) ──────────────────────

/// Parse a string as a `u64` within an inclusive range.
pub fn parse_u64_range(val: &str, min: u64, max: u64) -> Option<u64> {
    let n: u64 = val.trim().parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

/// Parse a verbosity name (`normal`/`verbose`/`debug`) or level (`1`..=`3`).
pub fn parse_verbosity(val: &str) -> Option<Verbosity> {
    val.parse().ok()
}

// ── Env var readers (thin wrappers) ─────────────────────────────────────────

struct EnvReader<F> {
    lookup: F,
}

impl<F> EnvReader<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn string(&self, name: &str) -> Option<String> {
        (self.lookup)(name).filter(|v| !v.is_empty())
    }

    fn u64(&self, name: &str, min: u64, max: u64) -> Option<u64> {
        let val = self.string(name)?;
        let result = parse_u64_range(&val, min, max);
        if result.is_none() {
            tracing::warn!(key = name, value = %val, "invalid u64 env var, ignoring");
        }
        result
    }

    fn verbosity(&self, name: &str) -> Option<Verbosity> {
        let val = self.string(name)?;
        let result = parse_verbosity(&val);
        if result.is_none() {
            tracing::warn!(key = name, value = %val, "invalid verbosity env var, ignoring");
        }
        result
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
