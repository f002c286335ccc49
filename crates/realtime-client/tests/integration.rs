//! End-to-end tests against a loopback WebSocket server.

mod common;

use std::sync::Arc;
use std::time::{Duration, Instant};

use assert_matches::assert_matches;
use async_trait::async_trait;
use parking_lot::Mutex;
use realtime_client::{
    ClientError, ConnectionState, EventHandler, HandlerError, RealtimeClient, TransportConfig,
    TransportError,
};
use realtime_core::ServerEvent;
use realtime_core::models::{Item, Modality, SessionConfig};
use serde_json::json;
use tokio_tungstenite::tungstenite::Message;

use common::{TIMEOUT, TestServer};

type Seen = Arc<Mutex<Vec<ServerEvent>>>;

async fn connected() -> (TestServer, RealtimeClient) {
    let server = TestServer::start().await;
    let client = RealtimeClient::new(TransportConfig::new(server.url.clone()));
    client.connect().await.unwrap();
    (server, client)
}

fn record(client: &RealtimeClient, event_type: &str) -> Seen {
    let seen: Seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    client.on(event_type, move |event| {
        let sink = Arc::clone(&sink);
        async move {
            sink.lock().push(event);
            Ok(())
        }
    });
    seen
}

/// Push a marker frame and wait for it. Dispatch is sequential, so every
/// handler for earlier frames has finished once this returns.
async fn sync(server: &TestServer, client: &RealtimeClient, id: &str) {
    let waiter = client.waiter("test.sync");
    server.push(&json!({"type": "test.sync", "event_id": id}).to_string());
    let _ = waiter.wait(Some(TIMEOUT)).await.unwrap();
}

// ── Scenario A ──────────────────────────────────────────────────────

#[tokio::test]
async fn handler_receives_decoded_greeting() {
    let (server, client) = connected().await;
    let seen = record(&client, "greeting");

    server.push(r#"{"type":"greeting","event_id":"1","text":"hi"}"#);
    sync(&server, &client, "s1").await;

    let seen = seen.lock();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].event_type(), "greeting");
    assert_eq!(seen[0].event_id(), Some("1"));
    assert_eq!(seen[0].get("text"), Some(&json!("hi")));
}

// ── Scenario B ──────────────────────────────────────────────────────

#[tokio::test]
async fn wait_for_times_out_without_matching_frame() {
    let (_server, client) = connected().await;

    let started = Instant::now();
    let result = client
        .wait_for("ready", Some(Duration::from_millis(10)))
        .await;
    let elapsed = started.elapsed();

    assert_matches!(result, Err(ClientError::WaitTimeout { .. }));
    assert!(elapsed >= Duration::from_millis(10), "resolved early: {elapsed:?}");
    assert!(elapsed < Duration::from_secs(1), "resolved late: {elapsed:?}");
    assert_eq!(client.router().pending_waiters("ready"), 0);
}

#[tokio::test]
async fn expired_wait_is_not_resolved_late() {
    let (server, client) = connected().await;
    let result = client
        .wait_for("ready", Some(Duration::from_millis(10)))
        .await;
    assert_matches!(result, Err(ClientError::WaitTimeout { .. }));

    server.push(r#"{"type":"ready","event_id":"late"}"#);
    sync(&server, &client, "s1").await;
    assert_eq!(client.router().pending_waiters("ready"), 0);
}

// ── Scenario C ──────────────────────────────────────────────────────

#[tokio::test]
async fn send_while_disconnected_writes_nothing() {
    let (mut server, client) = connected().await;
    client.disconnect().await.unwrap();
    assert!(!client.is_connected());

    let err = client.response_create(None).await.unwrap_err();
    assert!(err.is_not_connected());
    assert!(
        server
            .next_text_within(Duration::from_millis(100))
            .await
            .is_none()
    );
}

// ── Scenario D ──────────────────────────────────────────────────────

#[tokio::test]
async fn malformed_frame_stops_listener_and_closes() {
    let (mut server, client) = connected().await;
    let pending = client.waiter("never");

    server.push("not-json");

    assert_matches!(
        pending.wait(Some(TIMEOUT)).await,
        Err(ClientError::ListenerStopped { .. })
    );
    assert!(!client.is_connected());
    assert_eq!(client.state(), ConnectionState::Closed);

    let err = client.input_audio_buffer_commit().await.unwrap_err();
    assert!(err.is_not_connected());
    assert!(server.expect_close().await);
}

// ── Router guarantees ───────────────────────────────────────────────

#[tokio::test]
async fn handler_invoked_once_per_frame_in_order() {
    let (server, client) = connected().await;
    let seen = record(&client, "tick");

    for i in 0..20 {
        server.push(&json!({"type": "tick", "event_id": i.to_string()}).to_string());
    }
    sync(&server, &client, "s1").await;

    let ids: Vec<String> = seen
        .lock()
        .iter()
        .map(|e| e.event_id().unwrap_or_default().to_owned())
        .collect();
    let expected: Vec<String> = (0..20).map(|i| i.to_string()).collect();
    assert_eq!(ids, expected);
}

#[tokio::test]
async fn second_registration_replaces_first() {
    let (server, client) = connected().await;
    let first = record(&client, "greeting");
    let second = record(&client, "greeting");

    server.push(r#"{"type":"greeting","event_id":"1"}"#);
    sync(&server, &client, "s1").await;

    assert!(first.lock().is_empty());
    assert_eq!(second.lock().len(), 1);
}

#[tokio::test]
async fn off_stops_delivery() {
    let (server, client) = connected().await;
    let seen = record(&client, "greeting");
    client.off("greeting");

    server.push(r#"{"type":"greeting","event_id":"1"}"#);
    sync(&server, &client, "s1").await;
    assert!(seen.lock().is_empty());
}

#[tokio::test]
async fn failing_handler_is_isolated() {
    let (server, client) = connected().await;
    let handled = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&handled);
    client.on("tick", move |event| {
        let sink = Arc::clone(&sink);
        async move {
            let id = event.event_id().unwrap_or_default().to_owned();
            if id == "1" {
                return Err(HandlerError::msg("rejecting tick 1"));
            }
            sink.lock().push(id);
            Ok(())
        }
    });
    let unrelated = client.waiter("other");

    server.push(r#"{"type":"tick","event_id":"1"}"#);
    server.push(r#"{"type":"tick","event_id":"2"}"#);
    server.push(r#"{"type":"other","event_id":"3"}"#);

    let other = unrelated.wait(Some(TIMEOUT)).await.unwrap();
    assert_eq!(other.event_id(), Some("3"));
    assert_eq!(*handled.lock(), vec!["2".to_string()]);
    assert!(client.is_listening());
}

#[tokio::test]
async fn panicking_handler_is_isolated() {
    let (server, client) = connected().await;
    client.on("boom", |event| async move {
        assert_ne!(event.event_type(), "boom", "handler exploded");
        Ok(())
    });
    let seen = record(&client, "after");

    server.push(r#"{"type":"boom"}"#);
    server.push(r#"{"type":"after"}"#);
    sync(&server, &client, "s1").await;

    assert_eq!(seen.lock().len(), 1);
    assert!(client.is_connected());
}

#[tokio::test]
async fn concurrent_waiters_on_same_type_all_resolve() {
    let (server, client) = connected().await;
    let first = client.waiter("response.done");
    let second = client.waiter("response.done");

    server.push(r#"{"type":"response.done","event_id":"r1"}"#);

    let (a, b) = tokio::join!(first.wait(Some(TIMEOUT)), second.wait(Some(TIMEOUT)));
    assert_eq!(a.unwrap().event_id(), Some("r1"));
    assert_eq!(b.unwrap().event_id(), Some("r1"));
}

#[tokio::test]
async fn on_with_passes_bound_args() {
    let (server, client) = connected().await;
    let seen: Arc<Mutex<Vec<(String, String)>>> = Arc::new(Mutex::new(Vec::new()));
    client.on_with(
        "greeting",
        |event: ServerEvent, (sink, label): (Arc<Mutex<Vec<(String, String)>>>, String)| async move {
            sink.lock()
                .push((label, event.event_id().unwrap_or_default().to_owned()));
            Ok(())
        },
        (Arc::clone(&seen), "bound".to_string()),
    );

    server.push(r#"{"type":"greeting","event_id":"g1"}"#);
    sync(&server, &client, "s1").await;
    assert_eq!(*seen.lock(), vec![("bound".to_string(), "g1".to_string())]);
}

struct Counter(Arc<Mutex<usize>>);

#[async_trait]
impl EventHandler for Counter {
    async fn handle(&self, _event: ServerEvent) -> Result<(), HandlerError> {
        *self.0.lock() += 1;
        Ok(())
    }
}

#[tokio::test]
async fn trait_handlers_and_unknown_types() {
    let (server, client) = connected().await;
    let count = Arc::new(Mutex::new(0));
    client.on_handler("vendor.custom", Counter(Arc::clone(&count)));

    server.push(r#"{"type":"vendor.custom","payload":[1,2]}"#);
    server.push(r#"{"type":"vendor.custom"}"#);
    sync(&server, &client, "s1").await;
    assert_eq!(*count.lock(), 2);
}

#[tokio::test]
async fn utf8_binary_frames_are_dispatched() {
    let (server, client) = connected().await;
    let seen = record(&client, "greeting");

    server.push_message(Message::Binary(
        br#"{"type":"greeting","event_id":"b1"}"#.to_vec().into(),
    ));
    server.push_message(Message::Binary(vec![0xff, 0xfe, 0x00].into()));
    sync(&server, &client, "s1").await;

    assert_eq!(seen.lock().len(), 1);
    assert!(client.is_listening());
}

// ── Lifecycle ───────────────────────────────────────────────────────

#[tokio::test]
async fn connect_twice_fails() {
    let (_server, client) = connected().await;
    assert_matches!(
        client.connect().await,
        Err(ClientError::Transport(TransportError::AlreadyConnected))
    );
    assert!(client.is_connected());
}

#[tokio::test]
async fn closed_client_cannot_reconnect() {
    let (mut server, client) = connected().await;
    client.disconnect().await.unwrap();
    assert!(server.expect_close().await);
    assert_eq!(client.state(), ConnectionState::Closed);
    assert!(!client.is_listening());
    assert_matches!(
        client.connect().await,
        Err(ClientError::Transport(TransportError::Closed))
    );
    client.disconnect().await.unwrap();
}

#[tokio::test]
async fn disconnect_clears_handlers_and_fails_waiters() {
    let (_server, client) = connected().await;
    let _seen = record(&client, "greeting");
    let pending = client.waiter("ready");

    client.disconnect().await.unwrap();

    assert!(!client.router().has_handler("greeting"));
    assert_matches!(
        pending.wait(Some(TIMEOUT)).await,
        Err(ClientError::ListenerStopped { .. })
    );
}

#[tokio::test]
async fn peer_close_ends_listener() {
    let (server, client) = connected().await;
    let pending = client.waiter("ready");

    server.push_message(Message::Close(None));

    assert_matches!(
        pending.wait(Some(TIMEOUT)).await,
        Err(ClientError::ListenerStopped { .. })
    );
    assert!(!client.is_connected());
    assert!(client.send_json(json!({"type": "response.cancel"})).await.unwrap_err().is_not_connected());
}

#[tokio::test]
async fn peer_close_releases_socket() {
    let (mut server, client) = connected().await;
    let pending = client.waiter("ready");

    server.push_message(Message::Close(None));
    assert_matches!(
        pending.wait(Some(TIMEOUT)).await,
        Err(ClientError::ListenerStopped { .. })
    );
    client.disconnect().await.unwrap();

    assert!(server.expect_released().await);
    assert_eq!(client.state(), ConnectionState::Closed);
}

#[tokio::test]
async fn unanswered_pings_close_the_connection() {
    let (url, _server) = common::start_unresponsive().await;
    let config = TransportConfig::new(url)
        .with_keepalive(Duration::from_millis(50), Duration::from_millis(150))
        .with_timeouts(Duration::from_secs(5), Duration::from_millis(200));
    let client = RealtimeClient::new(config);
    client.connect().await.unwrap();
    let pending = client.waiter("response.done");

    assert_matches!(
        pending.wait(Some(TIMEOUT)).await,
        Err(ClientError::ListenerStopped { .. })
    );
    assert_eq!(client.state(), ConnectionState::Closed);
    assert!(client.response_cancel().await.unwrap_err().is_not_connected());
    client.disconnect().await.unwrap();
}

#[tokio::test]
async fn disconnect_from_inside_a_handler() {
    let (mut server, client) = connected().await;
    let client = Arc::new(client);
    let (done_tx, done_rx) = tokio::sync::oneshot::channel();
    let done_tx = Arc::new(Mutex::new(Some(done_tx)));

    let weak = Arc::downgrade(&client);
    client.on("session.end", move |_event| {
        let weak = weak.clone();
        let done_tx = Arc::clone(&done_tx);
        async move {
            if let Some(client) = weak.upgrade() {
                let result = client.disconnect().await;
                if let Some(tx) = done_tx.lock().take() {
                    let _ = tx.send(result.is_ok());
                }
            }
            Ok(())
        }
    });

    server.push(r#"{"type":"session.end"}"#);

    let disconnected = tokio::time::timeout(TIMEOUT, done_rx).await.unwrap().unwrap();
    assert!(disconnected);
    assert_eq!(client.state(), ConnectionState::Closed);
    assert!(!client.is_listening());
    assert!(server.expect_close().await);
}

#[tokio::test]
async fn connect_to_closed_port_fails_and_allows_retry_state() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let client = RealtimeClient::new(TransportConfig::new(format!("ws://127.0.0.1:{port}")));
    assert_matches!(
        client.connect().await,
        Err(ClientError::Transport(TransportError::Connect(_)))
    );
    assert_eq!(client.state(), ConnectionState::Disconnected);
    assert!(!client.is_listening());
}

// ── Wire format ─────────────────────────────────────────────────────

#[tokio::test]
async fn handshake_carries_model_auth_and_headers() {
    let server = TestServer::start().await;
    let config = TransportConfig::new(server.url.clone())
        .with_model("gpt-test")
        .with_bearer_token("sk-test")
        .with_header("OpenAI-Beta", "realtime=v1");
    let client = RealtimeClient::new(config);
    client.connect().await.unwrap();

    let handshake = server.handshake().unwrap();
    assert_eq!(handshake.uri, "/v1/realtime?model=gpt-test");
    assert_eq!(handshake.header("authorization"), Some("Bearer sk-test"));
    assert_eq!(handshake.header("openai-beta"), Some("realtime=v1"));
    client.disconnect().await.unwrap();
}

#[tokio::test]
async fn facade_commands_on_the_wire() {
    let (mut server, client) = connected().await;

    client
        .session_update(SessionConfig {
            modalities: Some(vec![Modality::Text]),
            turn_detection: Some(serde_json::Value::Null),
            ..SessionConfig::default()
        })
        .await
        .unwrap();
    assert_eq!(
        server.next_json().await,
        json!({"type": "session.update", "session": {"modalities": ["text"], "turn_detection": null}})
    );

    client
        .conversation_item_create(Item::user_text("Hello"), None)
        .await
        .unwrap();
    assert_eq!(
        server.next_json().await,
        json!({
            "type": "conversation.item.create",
            "item": {
                "type": "message",
                "role": "user",
                "content": [{"type": "input_text", "text": "Hello"}],
            },
        })
    );

    client.input_audio_buffer_append_pcm(&[0, 0, 255, 127]).await.unwrap();
    assert_eq!(
        server.next_json().await,
        json!({"type": "input_audio_buffer.append", "audio": "AAD/fw=="})
    );

    client.conversation_item_truncate("item_1", 0, 250).await.unwrap();
    assert_eq!(
        server.next_json().await,
        json!({"type": "conversation.item.truncate", "item_id": "item_1", "content_index": 0, "audio_end_ms": 250})
    );

    client.conversation_item_delete("item_1").await.unwrap();
    assert_eq!(
        server.next_json().await,
        json!({"type": "conversation.item.delete", "item_id": "item_1"})
    );

    client.input_audio_buffer_clear().await.unwrap();
    assert_eq!(server.next_json().await, json!({"type": "input_audio_buffer.clear"}));

    client.response_cancel().await.unwrap();
    assert_eq!(server.next_json().await, json!({"type": "response.cancel"}));
}

#[tokio::test]
async fn concurrent_sends_are_not_interleaved() {
    let (mut server, client) = connected().await;
    let client = Arc::new(client);

    let mut tasks = Vec::new();
    for i in 0..25 {
        let client = Arc::clone(&client);
        tasks.push(tokio::spawn(async move {
            client
                .send_json(json!({"type": "test.echo", "event_id": i.to_string(), "pad": "x".repeat(4096)}))
                .await
        }));
    }
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let mut ids = Vec::new();
    for _ in 0..25 {
        let frame = server.next_json().await;
        assert_eq!(frame["type"], "test.echo");
        assert_eq!(frame["pad"].as_str().map(str::len), Some(4096));
        ids.push(frame["event_id"].as_str().unwrap().parse::<u32>().unwrap());
    }
    ids.sort_unstable();
    assert_eq!(ids, (0..25).collect::<Vec<_>>());
}
