//! Live channel integration tests against an in-process WebSocket server.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::time::sleep;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

use drivedeck_client::{ChannelState, CloseReason, LiveChannel, LiveMessage, SubscriberRegistry};

/// Registry plus a log of everything dispatched to it.
fn recording_registry() -> (Arc<SubscriberRegistry>, Arc<Mutex<Vec<LiveMessage>>>) {
    let registry = Arc::new(SubscriberRegistry::new());
    let received = Arc::new(Mutex::new(Vec::new()));
    let sink = received.clone();
    registry.subscribe(move |message| {
        sink.lock().unwrap().push(message.clone());
    });
    (registry, received)
}

async fn bind_server() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}", listener.local_addr().unwrap());
    (listener, url)
}

async fn wait_for_closed(channel: &LiveChannel) -> ChannelState {
    let mut state = channel.watch_state();
    loop {
        if matches!(*state.borrow(), ChannelState::Closed(_)) {
            return state.borrow().clone();
        }
        state.changed().await.unwrap();
    }
}

#[tokio::test]
async fn frames_are_delivered_in_order_with_raw_text_fallback() {
    let (listener, url) = bind_server().await;

    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();
        ws.send(Message::Text(
            r#"{"device": "/dev/sda", "temperature": 41}"#.into(),
        ))
        .await
        .unwrap();
        ws.send(Message::Text("Heartbeat: update from backend".into()))
            .await
            .unwrap();
        ws.close(None).await.unwrap();
    });

    let (registry, received) = recording_registry();
    let channel = LiveChannel::connect(&url, registry).await.unwrap();

    let state = wait_for_closed(&channel).await;
    assert_eq!(state, ChannelState::Closed(CloseReason::ServerClosed));

    let messages = received.lock().unwrap().clone();
    assert_eq!(
        messages,
        vec![
            LiveMessage::Json(json!({"device": "/dev/sda", "temperature": 41})),
            LiveMessage::Text("Heartbeat: update from backend".to_string()),
        ]
    );

    server.await.unwrap();
}

#[tokio::test]
async fn close_is_a_dispatch_barrier() {
    let (listener, url) = bind_server().await;

    // Server streams frames until the client goes away.
    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();
        let mut n = 0u64;
        loop {
            n += 1;
            if ws
                .send(Message::Text(format!("{{\"seq\": {}}}", n).into()))
                .await
                .is_err()
            {
                return;
            }
            sleep(Duration::from_millis(5)).await;
        }
    });

    let (registry, received) = recording_registry();
    let channel = LiveChannel::connect(&url, registry).await.unwrap();

    // Let some traffic through first
    while received.lock().unwrap().is_empty() {
        sleep(Duration::from_millis(5)).await;
    }

    channel.close().await;
    let count_at_close = received.lock().unwrap().len();

    // Nothing may be dispatched after close() returns
    sleep(Duration::from_millis(100)).await;
    assert_eq!(received.lock().unwrap().len(), count_at_close);

    server.abort();
}

#[tokio::test]
async fn pings_are_answered_with_pongs() {
    let (listener, url) = bind_server().await;

    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();
        ws.send(Message::Ping(b"hb".as_slice().into())).await.unwrap();
        loop {
            match ws.next().await {
                Some(Ok(Message::Pong(payload))) => {
                    assert_eq!(payload.as_ref(), b"hb");
                    ws.close(None).await.unwrap();
                    return;
                }
                Some(Ok(_)) => {}
                _ => panic!("connection ended before pong"),
            }
        }
    });

    let (registry, _received) = recording_registry();
    let channel = LiveChannel::connect(&url, registry).await.unwrap();

    let state = wait_for_closed(&channel).await;
    assert_eq!(state, ChannelState::Closed(CloseReason::ServerClosed));

    server.await.unwrap();
}

#[tokio::test]
async fn connect_failure_is_returned_not_retried() {
    let registry = Arc::new(SubscriberRegistry::new());
    // Nothing listens here
    let result = LiveChannel::connect("ws://127.0.0.1:9", registry).await;
    assert!(result.is_err());
}
