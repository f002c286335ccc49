//! Event handler trait and closure adapters.

use std::future::Future;

use async_trait::async_trait;
use realtime_core::ServerEvent;

use crate::errors::HandlerError;

/// A persistent callback bound to one event type.
///
/// The listener awaits `handle` before reading the next frame, so a slow
/// handler delays delivery of everything behind it.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Process one event.
    async fn handle(&self, event: ServerEvent) -> Result<(), HandlerError>;
}

/// Adapter for `Fn(ServerEvent) -> Future` closures.
pub struct FnHandler<F> {
    f: F,
}

impl<F> FnHandler<F> {
    /// Wrap a closure.
    pub fn new<Fut>(f: F) -> Self
    where
        F: Fn(ServerEvent) -> Fut,
        Fut: Future<Output = Result<(), HandlerError>>,
    {
        Self { f }
    }
}

#[async_trait]
impl<F, Fut> EventHandler for FnHandler<F>
where
    F: Fn(ServerEvent) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
{
    async fn handle(&self, event: ServerEvent) -> Result<(), HandlerError> {
        (self.f)(event).await
    }
}

/// Adapter for closures that take extra arguments bound at registration.
///
/// Each call receives a clone of the bound arguments.
pub struct BoundHandler<F, A> {
    f: F,
    args: A,
}

impl<F, A> BoundHandler<F, A> {
    /// Wrap a closure with its bound arguments.
    pub fn new<Fut>(f: F, args: A) -> Self
    where
        F: Fn(ServerEvent, A) -> Fut,
        Fut: Future<Output = Result<(), HandlerError>>,
    {
        Self { f, args }
    }
}

#[async_trait]
impl<F, A, Fut> EventHandler for BoundHandler<F, A>
where
    F: Fn(ServerEvent, A) -> Fut + Send + Sync + 'static,
    A: Clone + Send + Sync + 'static,
    Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
{
    async fn handle(&self, event: ServerEvent) -> Result<(), HandlerError> {
        (self.f)(event, self.args.clone()).await
    }
}
