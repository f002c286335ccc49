//! Loopback WebSocket server for end-to-end tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};

pub const TIMEOUT: Duration = Duration::from_secs(5);

/// What the client sent during the handshake.
#[derive(Clone, Debug, Default)]
pub struct Handshake {
    pub uri: String,
    pub headers: Vec<(String, String)>,
}

impl Handshake {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Accepts exactly one client, pushes scripted frames to it, and records
/// everything it receives.
pub struct TestServer {
    pub url: String,
    to_client: mpsc::UnboundedSender<Message>,
    from_client: mpsc::UnboundedReceiver<Message>,
    handshake: Arc<Mutex<Option<Handshake>>>,
    _task: JoinHandle<()>,
}

impl TestServer {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (to_client, mut outgoing) = mpsc::unbounded_channel::<Message>();
        let (record, from_client) = mpsc::unbounded_channel::<Message>();
        let handshake = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&handshake);

        let task = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let callback = move |req: &Request, resp: Response| -> Result<Response, ErrorResponse> {
                *slot.lock() = Some(Handshake {
                    uri: req.uri().to_string(),
                    headers: req
                        .headers()
                        .iter()
                        .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or_default().to_string()))
                        .collect(),
                });
                Ok(resp)
            };
            let ws = tokio_tungstenite::accept_hdr_async(stream, callback)
                .await
                .unwrap();
            let (mut sink, mut source) = ws.split();
            loop {
                tokio::select! {
                    msg = outgoing.recv() => match msg {
                        Some(msg) => {
                            if sink.send(msg).await.is_err() {
                                break;
                            }
                        }
                        None => break,
                    },
                    msg = source.next() => match msg {
                        Some(Ok(msg)) => {
                            let _ = record.send(msg);
                        }
                        _ => break,
                    },
                }
            }
        });

        Self {
            url: format!("ws://{addr}/v1/realtime"),
            to_client,
            from_client,
            handshake,
            _task: task,
        }
    }

    /// Send a text frame to the client.
    pub fn push(&self, text: &str) {
        self.push_message(Message::Text(text.to_owned().into()));
    }

    pub fn push_message(&self, msg: Message) {
        self.to_client.send(msg).unwrap();
    }

    pub fn handshake(&self) -> Option<Handshake> {
        self.handshake.lock().clone()
    }

    /// Next text frame from the client, skipping control frames.
    pub async fn next_text_within(&mut self, limit: Duration) -> Option<String> {
        let deadline = tokio::time::Instant::now() + limit;
        loop {
            let msg = tokio::time::timeout_at(deadline, self.from_client.recv())
                .await
                .ok()??;
            if let Message::Text(text) = msg {
                return Some(text.as_str().to_owned());
            }
        }
    }

    pub async fn next_json(&mut self) -> Value {
        let text = self
            .next_text_within(TIMEOUT)
            .await
            .expect("client sent no frame");
        serde_json::from_str(&text).unwrap()
    }

    /// Wait for the client's close frame.
    pub async fn expect_close(&mut self) -> bool {
        let deadline = tokio::time::Instant::now() + TIMEOUT;
        loop {
            match tokio::time::timeout_at(deadline, self.from_client.recv()).await {
                Ok(Some(Message::Close(_))) => return true,
                Ok(Some(_)) => {}
                _ => return false,
            }
        }
    }

    /// Wait until the client answers a close or drops the socket.
    pub async fn expect_released(&mut self) -> bool {
        let deadline = tokio::time::Instant::now() + TIMEOUT;
        loop {
            match tokio::time::timeout_at(deadline, self.from_client.recv()).await {
                Ok(Some(Message::Close(_)) | None) => return true,
                Ok(Some(_)) => {}
                Err(_) => return false,
            }
        }
    }
}

/// Accepts one client, completes the handshake, then never reads again, so
/// pings go unanswered.
pub async fn start_unresponsive() -> (String, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let task = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let _ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        std::future::pending::<()>().await;
    });
    (format!("ws://{addr}/v1/realtime"), task)
}
