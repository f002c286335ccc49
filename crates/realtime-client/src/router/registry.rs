//! Handler registry: one handler per event type.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use super::handler::EventHandler;

/// Event type → handler map. At most one handler per type.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: RwLock<HashMap<String, Arc<dyn EventHandler>>>,
}

impl HandlerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler, replacing any existing one for the same type.
    /// Returns `true` if a handler was replaced.
    pub fn register(&self, event_type: impl Into<String>, handler: Arc<dyn EventHandler>) -> bool {
        self.handlers
            .write()
            .insert(event_type.into(), handler)
            .is_some()
    }

    /// Remove the handler for a type. Returns `true` if one was present.
    pub fn unregister(&self, event_type: &str) -> bool {
        self.handlers.write().remove(event_type).is_some()
    }

    /// Handler for a type. The lock is released before the caller awaits it.
    pub fn get(&self, event_type: &str) -> Option<Arc<dyn EventHandler>> {
        self.handlers.read().get(event_type).cloned()
    }

    /// Whether a handler is registered for the type.
    pub fn contains(&self, event_type: &str) -> bool {
        self.handlers.read().contains_key(event_type)
    }

    /// Remove every handler.
    pub fn clear(&self) {
        self.handlers.write().clear();
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.read().len()
    }

    /// Whether no handlers are registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.read().is_empty()
    }
}
