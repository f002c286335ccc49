//! One WebSocket connection: open, send, receive, close.

use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, Stream, StreamExt};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, warn};

use super::config::TransportConfig;
use super::keepalive::{KeepaliveResult, run_keepalive};
use super::state::ConnectionState;
use crate::errors::TransportError;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type WsSource = SplitStream<WsStream>;
type SharedSink = Arc<tokio::sync::Mutex<Option<WsSink>>>;

/// Inbound text frames, in arrival order.
pub type FrameStream = Pin<Box<dyn Stream<Item = String> + Send>>;

struct Shared {
    state: parking_lot::Mutex<ConnectionState>,
    alive: AtomicBool,
    shutdown: CancellationToken,
}

impl Shared {
    fn state(&self) -> ConnectionState {
        *self.state.lock()
    }

    fn set_state(&self, next: ConnectionState) {
        let mut state = self.state.lock();
        if *state != next {
            debug!(from = %*state, to = %next, "connection state");
            *state = next;
        }
    }

    fn touch(&self) {
        self.alive.store(true, Ordering::Relaxed);
    }

    /// The connection is gone: stop keepalive, end the frame sequence.
    fn mark_closed(&self) {
        self.set_state(ConnectionState::Closed);
        self.shutdown.cancel();
    }
}

/// A single WebSocket connection.
///
/// Owns the socket exclusively. Writes are serialized through one async
/// mutex around the write half; reads are handed out once via
/// [`frames`](Self::frames). A session that reached
/// [`Closed`](ConnectionState::Closed) cannot be reopened.
pub struct TransportSession {
    config: TransportConfig,
    shared: Arc<Shared>,
    sink: SharedSink,
    source: parking_lot::Mutex<Option<WsSource>>,
    keepalive: parking_lot::Mutex<Option<JoinHandle<()>>>,
}

impl TransportSession {
    /// Create a disconnected session.
    pub fn new(config: TransportConfig) -> Self {
        Self {
            config,
            shared: Arc::new(Shared {
                state: parking_lot::Mutex::new(ConnectionState::Disconnected),
                alive: AtomicBool::new(false),
                shutdown: CancellationToken::new(),
            }),
            sink: Arc::new(tokio::sync::Mutex::new(None)),
            source: parking_lot::Mutex::new(None),
            keepalive: parking_lot::Mutex::new(None),
        }
    }

    /// Connection settings this session was built with.
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ConnectionState {
        self.shared.state()
    }

    /// Whether frames can be sent.
    pub fn is_open(&self) -> bool {
        self.state() == ConnectionState::Open
    }

    /// Open the socket.
    ///
    /// On failure the state returns to `Disconnected` and `connect` may be
    /// retried.
    pub async fn connect(&self) -> Result<(), TransportError> {
        {
            let mut state = self.shared.state.lock();
            match *state {
                ConnectionState::Open | ConnectionState::Connecting => {
                    return Err(TransportError::AlreadyConnected);
                }
                current if current.is_terminal() => return Err(TransportError::Closed),
                _ => *state = ConnectionState::Connecting,
            }
        }

        let ws = match self.open_socket().await {
            Ok(ws) => ws,
            Err(e) => {
                warn!(endpoint = %self.config.endpoint, error = %e, "connect failed");
                self.shared.set_state(ConnectionState::Disconnected);
                return Err(e);
            }
        };

        let (sink, source) = ws.split();
        *self.sink.lock().await = Some(sink);
        *self.source.lock() = Some(source);
        self.shared.touch();
        self.shared.set_state(ConnectionState::Open);
        info!(endpoint = %self.config.endpoint, "connected");

        if let Some(interval) = self.config.ping_interval {
            self.spawn_keepalive(interval);
        }
        Ok(())
    }

    async fn open_socket(&self) -> Result<WsStream, TransportError> {
        let request = self.config.build_request()?;
        // Already installed by another session or the host application.
        let _ = rustls::crypto::ring::default_provider().install_default();

        match tokio::time::timeout(self.config.open_timeout, connect_async(request)).await {
            Ok(Ok((ws, response))) => {
                debug!(status = %response.status(), "handshake complete");
                Ok(ws)
            }
            Ok(Err(e)) => Err(TransportError::Connect(e.to_string())),
            Err(_) => Err(TransportError::Connect(format!(
                "handshake timed out after {:?}",
                self.config.open_timeout
            ))),
        }
    }

    fn spawn_keepalive(&self, interval: std::time::Duration) {
        let shared = Arc::clone(&self.shared);
        let sink = Arc::clone(&self.sink);
        let timeout = self.config.ping_timeout;

        let handle = tokio::spawn(
            async move {
                let cancel = shared.shutdown.clone();
                let ping = move || {
                    let sink = Arc::clone(&sink);
                    async move { send_ping(&sink).await }
                };
                match run_keepalive(&shared.alive, interval, timeout, cancel, ping).await {
                    KeepaliveResult::TimedOut => {
                        warn!(?timeout, "peer stopped responding, closing connection");
                        shared.mark_closed();
                    }
                    KeepaliveResult::SinkClosed => {
                        debug!("keepalive stopped: ping could not be sent");
                    }
                    KeepaliveResult::Cancelled => {}
                }
            }
            .instrument(tracing::Span::current()),
        );
        *self.keepalive.lock() = Some(handle);
    }

    /// Take the inbound frame sequence. Can be called once per connection.
    ///
    /// Text frames are yielded as-is and UTF-8 binary frames as text. Ping
    /// and pong frames only refresh liveness. The sequence ends on a close
    /// frame, a transport error, or [`close`](Self::close), and the state
    /// moves to `Closed`.
    pub fn frames(&self) -> Result<FrameStream, TransportError> {
        let Some(mut source) = self.source.lock().take() else {
            return Err(match self.state() {
                ConnectionState::Disconnected | ConnectionState::Connecting => {
                    TransportError::NotConnected
                }
                _ => TransportError::FramesTaken,
            });
        };
        let shared = Arc::clone(&self.shared);

        let stream = async_stream::stream! {
            loop {
                let next = tokio::select! {
                    () = shared.shutdown.cancelled() => break,
                    next = source.next() => next,
                };
                match next {
                    Some(Ok(Message::Text(text))) => {
                        shared.touch();
                        metrics::counter!("realtime_frames_received_total").increment(1);
                        yield text.as_str().to_owned();
                    }
                    Some(Ok(Message::Binary(bytes))) => {
                        shared.touch();
                        match String::from_utf8(bytes.to_vec()) {
                            Ok(text) => {
                                metrics::counter!("realtime_frames_received_total").increment(1);
                                yield text;
                            }
                            Err(_) => warn!(len = bytes.len(), "skipping non-UTF-8 binary frame"),
                        }
                    }
                    Some(Ok(Message::Ping(_) | Message::Pong(_))) => shared.touch(),
                    Some(Ok(Message::Close(frame))) => {
                        info!(?frame, "peer closed connection");
                        break;
                    }
                    Some(Ok(Message::Frame(_))) => {}
                    Some(Err(e)) => {
                        warn!(error = %e, "transport error");
                        break;
                    }
                    None => {
                        debug!("socket stream ended");
                        break;
                    }
                }
            }
            shared.mark_closed();
        };
        Ok(Box::pin(stream))
    }

    /// Write one text frame.
    ///
    /// Concurrent calls are serialized. A failed write closes the session.
    pub async fn send(&self, text: String) -> Result<(), TransportError> {
        let mut guard = self.sink.lock().await;
        if !self.is_open() {
            return Err(TransportError::NotConnected);
        }
        let Some(sink) = guard.as_mut() else {
            return Err(TransportError::NotConnected);
        };
        if let Err(e) = sink.send(Message::Text(text.into())).await {
            warn!(error = %e, "send failed, closing connection");
            self.shared.mark_closed();
            return Err(TransportError::Send(e.to_string()));
        }
        metrics::counter!("realtime_frames_sent_total").increment(1);
        Ok(())
    }

    /// Close the connection.
    ///
    /// Stops keepalive, ends the frame sequence, and sends a close frame
    /// bounded by the close timeout. Fails with `NotConnected` unless the
    /// session is `Open`; callers that only want "closed" should check
    /// [`is_open`](Self::is_open) first.
    pub async fn close(&self) -> Result<(), TransportError> {
        {
            let mut state = self.shared.state.lock();
            if *state != ConnectionState::Open {
                return Err(TransportError::NotConnected);
            }
            *state = ConnectionState::Closing;
        }
        self.shared.shutdown.cancel();
        self.release().await;

        self.shared.set_state(ConnectionState::Closed);
        info!(endpoint = %self.config.endpoint, "connection closed");
        Ok(())
    }

    /// Give up the socket after the connection ended without
    /// [`close`](Self::close): peer close, keepalive timeout, or a failed
    /// write.
    ///
    /// Stops keepalive and closes the write half within the close timeout,
    /// which flushes any pending close reply. The socket itself is freed once
    /// the frame sequence has also been dropped. No-op once released.
    pub async fn release(&self) {
        if let Some(handle) = self.keepalive.lock().take() {
            handle.abort();
        }

        let sink = self.sink.lock().await.take();
        if let Some(mut sink) = sink {
            match tokio::time::timeout(self.config.close_timeout, sink.close()).await {
                Ok(Ok(())) => debug!("close frame sent"),
                Ok(Err(e)) => debug!(error = %e, "close frame not delivered"),
                Err(_) => warn!(timeout = ?self.config.close_timeout, "close handshake timed out"),
            }
        }
    }

    /// Close if open, otherwise release whatever the ended connection still
    /// holds. For teardown paths that only want the socket gone.
    pub async fn shut_down(&self) -> Result<(), TransportError> {
        if self.is_open() {
            self.close().await
        } else {
            self.release().await;
            Ok(())
        }
    }
}

impl Drop for TransportSession {
    fn drop(&mut self) {
        self.shared.shutdown.cancel();
        if let Some(handle) = self.keepalive.get_mut().take() {
            handle.abort();
        }
    }
}

async fn send_ping(sink: &SharedSink) -> bool {
    let mut guard = sink.lock().await;
    match guard.as_mut() {
        Some(sink) => sink.send(Message::Ping(Vec::<u8>::new().into())).await.is_ok(),
        None => false,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
