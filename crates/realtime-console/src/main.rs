//! # realtime-console
//!
//! Sends one text prompt over the realtime event API and streams the reply
//! to stdout.

#![deny(unsafe_code)]

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use realtime_client::RealtimeClient;
use realtime_core::events::payloads::{DeltaPayload, ErrorPayload};
use realtime_core::models::{Item, Modality, SessionConfig};
use realtime_core::{ServerEvent, Verbosity};
use realtime_settings::RealtimeSettings;
use tracing::{info, warn};

/// One-shot text chat over the realtime API.
#[derive(Parser, Debug)]
#[command(name = "realtime-console", version, about = "One-shot text chat over the realtime API")]
struct Cli {
    /// Prompt to send as a user message.
    prompt: String,

    /// Session instructions (system prompt).
    #[arg(long)]
    instructions: Option<String>,

    /// Sampling temperature.
    #[arg(long)]
    temperature: Option<f64>,

    /// Seconds to wait for each server acknowledgement.
    #[arg(long, default_value = "60")]
    timeout_secs: u64,

    /// Settings file (defaults to `~/.realtime/settings.json`).
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Traffic log verbosity (`normal`, `verbose`, `debug` or 1-3).
    #[arg(long)]
    verbosity: Option<Verbosity>,
}

impl Cli {
    fn load_settings(&self) -> Result<RealtimeSettings> {
        let path = self
            .settings
            .clone()
            .unwrap_or_else(realtime_settings::settings_path);
        let mut settings = realtime_settings::load_settings_from_path(&path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?;
        if let Some(verbosity) = self.verbosity {
            settings.logging.verbosity = verbosity;
        }
        Ok(settings)
    }

    fn session(&self) -> SessionConfig {
        SessionConfig {
            modalities: Some(vec![Modality::Text]),
            instructions: self.instructions.clone(),
            temperature: self.temperature,
            ..SessionConfig::default()
        }
    }
}

async fn print_delta(event: ServerEvent) -> Result<(), realtime_client::HandlerError> {
    let delta: DeltaPayload = event.payload().map_err(realtime_client::HandlerError::other)?;
    let mut stdout = std::io::stdout().lock();
    write!(stdout, "{}", delta.delta).map_err(realtime_client::HandlerError::other)?;
    stdout.flush().map_err(realtime_client::HandlerError::other)
}

async fn report_error(event: ServerEvent) -> Result<(), realtime_client::HandlerError> {
    match event.payload::<ErrorPayload>() {
        Ok(payload) => warn!(error = %payload.error, "server reported an error"),
        Err(e) => warn!(error = %e, "server reported an unreadable error"),
    }
    Ok(())
}

async fn run(client: &RealtimeClient, cli: &Cli) -> Result<()> {
    let timeout = Some(Duration::from_secs(cli.timeout_secs));

    let updated = client.waiter("session.updated");
    client.session_update(cli.session()).await?;
    let _ = updated.wait(timeout).await.context("Session was not updated")?;
    info!("session configured");

    let done = client.waiter("response.done");
    client
        .conversation_item_create(Item::user_text(cli.prompt.as_str()), None)
        .await?;
    client.response_create(None).await?;
    let response = done.wait(timeout).await.context("No response received")?;
    println!();

    if let Some(status) = response
        .get("response")
        .and_then(|r| r.get("status"))
        .and_then(|s| s.as_str())
    {
        info!(status, "response finished");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = cli.load_settings()?;
    realtime_core::logging::init_subscriber(&settings.logging.level);

    if let Err(e) = settings.connection.api_key() {
        warn!(error = %e, "connecting without credentials");
    }

    let client = RealtimeClient::from_settings(&settings);
    client.on("response.text.delta", print_delta);
    client.on("error", report_error);

    client
        .connect()
        .await
        .with_context(|| format!("Failed to connect to {}", settings.connection.url))?;
    info!(url = %settings.connection.url, "connected");

    let outcome = tokio::select! {
        outcome = run(&client, &cli) => outcome,
        _ = tokio::signal::ctrl_c() => {
            info!("interrupted");
            Ok(())
        }
    };

    client.disconnect().await.context("Failed to disconnect")?;
    outcome
}
