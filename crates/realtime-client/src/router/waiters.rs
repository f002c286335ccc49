//! One-shot waiters keyed by event type.
//!
//! Any number of waiters may be pending on the same type. A matching event
//! wakes every waiter pending at that moment, each with its own copy. A
//! waiter fires at most once and removes itself when it fires, times out,
//! or is dropped, so an expired wait is never resolved late.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use realtime_core::ServerEvent;
use tokio::sync::oneshot;

use crate::errors::ClientError;

#[derive(Default)]
struct Inner {
    pending: HashMap<String, Vec<(u64, oneshot::Sender<ServerEvent>)>>,
    next_id: u64,
    closed: bool,
}

/// Pending waiters, shared between the router and the [`Waiter`] handles.
#[derive(Clone, Default)]
pub struct WaiterRegistry {
    inner: Arc<Mutex<Inner>>,
}

impl WaiterRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a waiter for the next event of `event_type`.
    ///
    /// After [`close`](Self::close) the returned waiter fails immediately.
    pub fn register(&self, event_type: &str) -> Waiter {
        let (tx, rx) = oneshot::channel();
        let mut inner = self.inner.lock();
        let id = inner.next_id;
        inner.next_id += 1;
        if !inner.closed {
            inner
                .pending
                .entry(event_type.to_owned())
                .or_default()
                .push((id, tx));
        }
        Waiter {
            event_type: event_type.to_owned(),
            id,
            rx,
            registry: self.clone(),
        }
    }

    /// Wake every waiter pending on the event's type. Returns how many
    /// received it.
    pub fn notify(&self, event: &ServerEvent) -> usize {
        let Some(senders) = self.inner.lock().pending.remove(event.event_type()) else {
            return 0;
        };
        senders
            .into_iter()
            .map(|(_, tx)| tx.send(event.clone()).is_ok())
            .filter(|delivered| *delivered)
            .count()
    }

    /// Number of waiters pending on a type.
    pub fn pending(&self, event_type: &str) -> usize {
        self.inner.lock().pending.get(event_type).map_or(0, Vec::len)
    }

    /// Total number of pending waiters.
    pub fn len(&self) -> usize {
        self.inner.lock().pending.values().map(Vec::len).sum()
    }

    /// Whether nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every pending waiter. They fail with `ListenerStopped`.
    pub fn clear(&self) {
        self.inner.lock().pending.clear();
    }

    /// Drop every pending waiter and refuse new ones.
    pub fn close(&self) {
        let mut inner = self.inner.lock();
        inner.closed = true;
        inner.pending.clear();
    }

    /// Whether [`close`](Self::close) was called.
    pub fn is_closed(&self) -> bool {
        self.inner.lock().closed
    }

    fn remove(&self, event_type: &str, id: u64) {
        let mut inner = self.inner.lock();
        if let Some(list) = inner.pending.get_mut(event_type) {
            list.retain(|(pending_id, _)| *pending_id != id);
            if list.is_empty() {
                let _ = inner.pending.remove(event_type);
            }
        }
    }
}

/// A registered, not yet resolved wait for one event type.
///
/// Register before sending the command that triggers the reply, then
/// [`wait`](Self::wait).
pub struct Waiter {
    event_type: String,
    id: u64,
    rx: oneshot::Receiver<ServerEvent>,
    registry: WaiterRegistry,
}

impl Waiter {
    /// Event type this waiter resolves on.
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// Suspend until the event arrives, the timeout elapses, or the
    /// listener stops.
    pub async fn wait(mut self, timeout: Option<Duration>) -> Result<ServerEvent, ClientError> {
        let received = match timeout {
            Some(limit) => match tokio::time::timeout(limit, &mut self.rx).await {
                Ok(received) => received,
                Err(_) => {
                    return Err(ClientError::WaitTimeout {
                        event_type: self.event_type.clone(),
                        timeout: limit,
                    });
                }
            },
            None => (&mut self.rx).await,
        };
        received.map_err(|_| ClientError::ListenerStopped {
            event_type: self.event_type.clone(),
        })
    }
}

impl Drop for Waiter {
    fn drop(&mut self) {
        self.registry.remove(&self.event_type, self.id);
    }
}

impl std::fmt::Debug for Waiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Waiter")
            .field("event_type", &self.event_type)
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
