//! The realtime client: one transport session, one router, one listener.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use realtime_core::{ClientEvent, ServerEvent, TrafficDirection, TrafficLog};
use realtime_settings::RealtimeSettings;
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{Instrument, Span, debug, info};

use crate::errors::{ClientError, HandlerError, Result};
use crate::router::{BoundHandler, EventHandler, EventRouter, FnHandler, ListenerExit, Waiter, listen};
use crate::transport::{ConnectionState, TransportConfig, TransportSession};

/// Client for a bidirectional realtime event API.
///
/// [`connect`](Self::connect) opens the socket and starts a background
/// listener that decodes every inbound frame and routes it to waiters and
/// handlers. [`disconnect`](Self::disconnect) tears down in order: clear
/// handlers, clear waiters, stop the listener, close the socket.
pub struct RealtimeClient {
    transport: Arc<TransportSession>,
    router: Arc<EventRouter>,
    listener: parking_lot::Mutex<Option<JoinHandle<ListenerExit>>>,
    span: Span,
}

impl RealtimeClient {
    /// Client with a default traffic log.
    pub fn new(config: TransportConfig) -> Self {
        Self::with_traffic_log(config, TrafficLog::default())
    }

    /// Client that reports traffic to `traffic`. The listener and transport
    /// log under the traffic log's span.
    pub fn with_traffic_log(config: TransportConfig, traffic: TrafficLog) -> Self {
        let span = traffic.span().clone();
        Self {
            transport: Arc::new(TransportSession::new(config)),
            router: Arc::new(EventRouter::new(traffic)),
            listener: parking_lot::Mutex::new(None),
            span,
        }
    }

    /// Client configured from loaded settings.
    pub fn from_settings(settings: &RealtimeSettings) -> Self {
        Self::with_traffic_log(
            TransportConfig::from_settings(&settings.connection),
            TrafficLog::new(settings.logging.verbosity),
        )
    }

    // ─── Lifecycle ───────────────────────────────────────────────────────

    /// Open the connection and start the listener.
    pub async fn connect(&self) -> Result<()> {
        self.transport.connect().instrument(self.span.clone()).await?;
        let frames = self.transport.frames()?;

        let router = Arc::clone(&self.router);
        let transport = Arc::clone(&self.transport);
        let handle = tokio::spawn(
            async move {
                let exit = listen(frames, &router).await;
                if let Err(e) = transport.shut_down().await {
                    debug!(error = %e, "close after listener exit");
                }
                router.shutdown();
                info!(?exit, "listener stopped");
                exit
            }
            .instrument(self.span.clone()),
        );
        *self.listener.lock() = Some(handle);
        Ok(())
    }

    /// Tear down: clear handlers, clear waiters, stop the listener, close
    /// the socket. Safe to call when never connected or already closed, and
    /// from inside a handler.
    pub async fn disconnect(&self) -> Result<()> {
        self.router.clear_handlers();
        self.router.clear_waiters();

        let listener = self.listener.lock().take();
        if let Some(handle) = listener {
            // Called from a handler: the listener is this task. It stops on
            // its own once the transport closes below.
            if tokio::task::try_id() == Some(handle.id()) {
                debug!("disconnect from inside the listener");
            } else {
                handle.abort();
                let _ = handle.await;
            }
        }
        self.router.shutdown();

        self.transport
            .shut_down()
            .instrument(self.span.clone())
            .await?;
        Ok(())
    }

    /// Whether the socket is open.
    pub fn is_connected(&self) -> bool {
        self.transport.is_open()
    }

    /// Whether the listener task is running.
    pub fn is_listening(&self) -> bool {
        self.listener
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Transport lifecycle state.
    pub fn state(&self) -> ConnectionState {
        self.transport.state()
    }

    /// The router, for callers that dispatch or inspect directly.
    pub fn router(&self) -> &EventRouter {
        &self.router
    }

    // ─── Handlers and waiters ────────────────────────────────────────────

    /// Register an async closure for an event type, replacing any existing
    /// handler for that type.
    pub fn on<F, Fut>(&self, event_type: impl Into<String>, handler: F)
    where
        F: Fn(ServerEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<(), HandlerError>> + Send + 'static,
    {
        self.router
            .register(event_type, Arc::new(FnHandler::new(handler)));
    }

    /// Register an async closure that also receives a clone of `args` on
    /// every call.
    pub fn on_with<F, A, Fut>(&self, event_type: impl Into<String>, handler: F, args: A)
    where
        F: Fn(ServerEvent, A) -> Fut + Send + Sync + 'static,
        A: Clone + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<(), HandlerError>> + Send + 'static,
    {
        self.router
            .register(event_type, Arc::new(BoundHandler::new(handler, args)));
    }

    /// Register an [`EventHandler`] implementation.
    pub fn on_handler(&self, event_type: impl Into<String>, handler: impl EventHandler + 'static) {
        self.router.register(event_type, Arc::new(handler));
    }

    /// Remove the handler for an event type; no-op if none.
    pub fn off(&self, event_type: &str) {
        self.router.unregister(event_type);
    }

    /// Register a waiter now and wait on it later. Use this to avoid
    /// missing a reply that arrives before the caller starts waiting.
    pub fn waiter(&self, event_type: &str) -> Waiter {
        self.router.waiter(event_type)
    }

    /// Wait for the next event of `event_type` received after this call.
    pub async fn wait_for(&self, event_type: &str, timeout: Option<Duration>) -> Result<ServerEvent> {
        self.router.wait_for(event_type, timeout).await
    }

    // ─── Sending ─────────────────────────────────────────────────────────

    /// Serialize and send one command.
    pub async fn send(&self, event: impl Into<ClientEvent>) -> Result<()> {
        let event = event.into();
        let text = event.to_json()?;
        self.transport.send(text).await?;
        self.router
            .traffic()
            .log_event(TrafficDirection::Client, event.command_type(), &event);
        Ok(())
    }

    /// Send a raw JSON command. It must be an object with a string `type`.
    pub async fn send_json(&self, command: Value) -> Result<()> {
        let Some(event_type) = command.get("type").and_then(Value::as_str) else {
            return Err(ClientError::InvalidCommand(
                "command must be a JSON object with a string \"type\"".to_string(),
            ));
        };
        let event_type = event_type.to_owned();
        let text = serde_json::to_string(&command)?;
        self.transport.send(text).await?;
        self.router
            .traffic()
            .log_event(TrafficDirection::Client, &event_type, &command);
        Ok(())
    }
}

impl Drop for RealtimeClient {
    fn drop(&mut self) {
        if let Some(handle) = self.listener.get_mut().take() {
            handle.abort();
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
