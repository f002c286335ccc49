//! The listener loop: decode each inbound frame and dispatch it.

use futures::{Stream, StreamExt};
use metrics::counter;
use realtime_core::ServerEvent;
use tracing::{error, info};

use super::EventRouter;

/// Why the listener loop ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListenerExit {
    /// The frame sequence ended (peer close, transport error, or local close).
    PeerClosed,
    /// A frame could not be decoded. Nothing after it is trusted.
    DecodeFailed,
}

/// Decode and dispatch frames in arrival order until the sequence ends or
/// a frame fails to decode.
///
/// Each dispatch (waiters, then handler) completes before the next frame is
/// read.
pub async fn listen<S>(mut frames: S, router: &EventRouter) -> ListenerExit
where
    S: Stream<Item = String> + Unpin,
{
    while let Some(frame) = frames.next().await {
        match ServerEvent::decode(&frame) {
            Ok(event) => {
                let _ = router.dispatch(event).await;
            }
            Err(e) => {
                counter!("realtime_decode_failures_total").increment(1);
                error!(error = %e, frame_len = frame.len(), "undecodable frame, stopping listener");
                return ListenerExit::DecodeFailed;
            }
        }
    }
    info!("frame sequence ended");
    ListenerExit::PeerClosed
}
