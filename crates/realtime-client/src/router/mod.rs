//! Event router: handler registry, one-shot waiters, and the listener loop.
//!
//! Dispatch of one event is a fixed two-step sequence. Waiters for the
//! event's exact `type` are woken first, then the registered handler (if
//! any) is awaited. Handler errors and panics are captured into the
//! [`DispatchOutcome`], logged, and never propagated.

mod handler;
mod listener;
mod registry;
mod waiters;

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use metrics::counter;
use realtime_core::{ServerEvent, TrafficDirection, TrafficLog};
use tracing::{debug, error, warn};

use crate::errors::{ClientError, HandlerError};

pub use handler::{BoundHandler, EventHandler, FnHandler};
pub use listener::{ListenerExit, listen};
pub use registry::HandlerRegistry;
pub use waiters::{Waiter, WaiterRegistry};

/// What happened to the handler step of one dispatch.
#[derive(Debug)]
pub enum HandlerOutcome {
    /// No handler registered for the type.
    NoHandler,
    /// The handler returned `Ok`.
    Completed,
    /// The handler returned an error or panicked.
    Failed(HandlerError),
}

/// Result of dispatching one event.
#[derive(Debug)]
pub struct DispatchOutcome {
    /// Waiters that received the event.
    pub waiters_woken: usize,
    /// Handler step result.
    pub handler: HandlerOutcome,
}

/// Routes decoded events to waiters and handlers.
pub struct EventRouter {
    handlers: HandlerRegistry,
    waiters: WaiterRegistry,
    traffic: TrafficLog,
}

impl EventRouter {
    /// Create a router that reports traffic to `traffic`.
    pub fn new(traffic: TrafficLog) -> Self {
        Self {
            handlers: HandlerRegistry::new(),
            waiters: WaiterRegistry::new(),
            traffic,
        }
    }

    /// The traffic log this router writes to.
    pub fn traffic(&self) -> &TrafficLog {
        &self.traffic
    }

    /// Register a handler, replacing any existing one for the type. The type
    /// is not checked against the catalogue.
    pub fn register(&self, event_type: impl Into<String>, handler: Arc<dyn EventHandler>) {
        let event_type = event_type.into();
        if self.handlers.register(event_type.clone(), handler) {
            debug!(event_type, "replaced handler");
        }
    }

    /// Remove the handler for a type; no-op if none.
    pub fn unregister(&self, event_type: &str) {
        let _ = self.handlers.unregister(event_type);
    }

    /// Whether a handler is registered for the type.
    pub fn has_handler(&self, event_type: &str) -> bool {
        self.handlers.contains(event_type)
    }

    /// Register a waiter for the next event of `event_type`.
    pub fn waiter(&self, event_type: &str) -> Waiter {
        self.waiters.register(event_type)
    }

    /// Register and immediately wait.
    pub async fn wait_for(
        &self,
        event_type: &str,
        timeout: Option<Duration>,
    ) -> Result<ServerEvent, ClientError> {
        self.waiter(event_type).wait(timeout).await
    }

    /// Number of waiters pending on a type.
    pub fn pending_waiters(&self, event_type: &str) -> usize {
        self.waiters.pending(event_type)
    }

    /// Remove every handler.
    pub fn clear_handlers(&self) {
        self.handlers.clear();
    }

    /// Fail every pending waiter with `ListenerStopped`.
    pub fn clear_waiters(&self) {
        self.waiters.clear();
    }

    /// The listener is gone: fail pending waiters and refuse new ones.
    pub fn shutdown(&self) {
        self.waiters.close();
    }

    /// Whether [`shutdown`](Self::shutdown) was called.
    pub fn is_shut_down(&self) -> bool {
        self.waiters.is_closed()
    }

    /// Dispatch one event: wake waiters, then run the handler.
    pub async fn dispatch(&self, event: ServerEvent) -> DispatchOutcome {
        let event_type = event.event_type().to_owned();
        self.traffic
            .log_event(TrafficDirection::Server, &event_type, &event);
        counter!("realtime_events_dispatched_total").increment(1);
        if !event.kind().is_known() {
            debug!(event_type, "event type outside catalogue");
        }

        let waiters_woken = self.waiters.notify(&event);
        if waiters_woken > 0 {
            debug!(event_type, waiters_woken, "waiters signalled");
        }

        let handler = match self.handlers.get(&event_type) {
            None => {
                debug!(event_type, "no handler registered");
                HandlerOutcome::NoHandler
            }
            Some(handler) => match AssertUnwindSafe(handler.handle(event)).catch_unwind().await {
                Ok(Ok(())) => HandlerOutcome::Completed,
                Ok(Err(err)) => {
                    counter!("realtime_handler_failures_total").increment(1);
                    warn!(event_type, error = %err, "handler failed");
                    HandlerOutcome::Failed(err)
                }
                Err(panic) => {
                    let message = panic_message(panic.as_ref());
                    counter!("realtime_handler_failures_total").increment(1);
                    error!(event_type, panic = %message, "handler panicked");
                    HandlerOutcome::Failed(HandlerError::Panicked(message))
                }
            },
        };

        DispatchOutcome {
            waiters_woken,
            handler,
        }
    }
}

impl Default for EventRouter {
    fn default() -> Self {
        Self::new(TrafficLog::default())
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_owned()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
