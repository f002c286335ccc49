//! Ping/pong liveness monitoring.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::time;
use tokio_util::sync::CancellationToken;

/// Outcome of the keepalive loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeepaliveResult {
    /// The peer stayed silent for the whole timeout window.
    TimedOut,
    /// The loop was cancelled by a close.
    Cancelled,
    /// A ping could not be written.
    SinkClosed,
}

/// Ping the peer every `interval` until cancelled or the peer goes quiet.
///
/// Any inbound traffic sets `alive`. Each tick checks and clears it, then
/// calls `ping`. `timeout / interval` (at least 1) consecutive silent ticks
/// end the loop with [`KeepaliveResult::TimedOut`].
pub async fn run_keepalive<F, Fut>(
    alive: &AtomicBool,
    interval: Duration,
    timeout: Duration,
    cancel: CancellationToken,
    mut ping: F,
) -> KeepaliveResult
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let mut ticker = time::interval(interval);
    let mut missed: u32 = 0;
    let max_missed = max_missed(interval, timeout);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if alive.swap(false, Ordering::Relaxed) {
                    missed = 0;
                } else {
                    missed += 1;
                    if missed >= max_missed {
                        return KeepaliveResult::TimedOut;
                    }
                }
                if !ping().await {
                    return KeepaliveResult::SinkClosed;
                }
            }
            () = cancel.cancelled() => {
                return KeepaliveResult::Cancelled;
            }
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn max_missed(interval: Duration, timeout: Duration) -> u32 {
    let interval_ms = interval.as_millis().max(1);
    (timeout.as_millis() / interval_ms).clamp(1, u128::from(u32::MAX)) as u32
}
