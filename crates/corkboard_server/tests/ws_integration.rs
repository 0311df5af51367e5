//! Integration tests for the realtime channel.
//!
//! These start a real server on an ephemeral port and connect real
//! WebSocket clients, verifying the snapshot request/broadcast pipeline.

use std::sync::Arc;

use corkboard_core::{BoardRepo, init_database};
use corkboard_server::handlers::{self, api::ApiState, ws::WsState};
use corkboard_server::sync::BoardChannel;
use futures::{SinkExt, StreamExt};
use rusqlite::Connection;
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio::time::{Duration, timeout};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, tungstenite::Message};

type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Start a server on an ephemeral port; returns the ws url and the repo for
/// seeding board state. The TempDir keeps the database file alive.
async fn start_test_server() -> (String, Arc<BoardRepo>, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let conn = Connection::open(dir.path().join("board.db")).unwrap();
    init_database(&conn).unwrap();

    let repo = Arc::new(BoardRepo::new(conn));
    let channel = Arc::new(BoardChannel::new());

    let app = handlers::routes(
        ApiState {
            repo: repo.clone(),
            channel: channel.clone(),
        },
        WsState {
            repo: repo.clone(),
            channel: channel.clone(),
        },
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("ws://{addr}/ws"), repo, dir)
}

async fn connect(url: &str) -> WsClient {
    let (ws, _) = tokio_tungstenite::connect_async(url).await.unwrap();
    ws
}

/// Connect and complete a snapshot round-trip, so the server-side
/// subscription is in place before any later broadcast fires
async fn connect_synced(url: &str) -> WsClient {
    let mut ws = connect(url).await;
    send_json(&mut ws, json!({ "type": "request_snapshot" })).await;
    let event = recv_json(&mut ws).await;
    assert_eq!(event["type"], "initial_snapshot");
    ws
}

async fn send_json(ws: &mut WsClient, value: Value) {
    ws.send(Message::Text(value.to_string().into()))
        .await
        .unwrap();
}

async fn recv_json(ws: &mut WsClient) -> Value {
    let msg = timeout(Duration::from_secs(2), ws.next())
        .await
        .expect("timed out waiting for message")
        .expect("stream ended")
        .expect("websocket error");
    serde_json::from_str(msg.to_text().unwrap()).unwrap()
}

fn container_item_ids(board: &Value, container_id: &str) -> Vec<String> {
    board["containers"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["id"] == container_id)
        .map(|c| {
            c["items"]
                .as_array()
                .unwrap()
                .iter()
                .map(|i| i["id"].as_str().unwrap().to_string())
                .collect()
        })
        .unwrap_or_default()
}

#[tokio::test]
async fn test_snapshot_request_gets_initial_snapshot() {
    let (url, repo, _dir) = start_test_server().await;
    let container = repo.create_container("todo", None).unwrap();
    let item = repo.create_item(&container.id, "task").unwrap();

    let mut client = connect(&url).await;
    send_json(&mut client, json!({ "type": "request_snapshot" })).await;

    let event = recv_json(&mut client).await;
    assert_eq!(event["type"], "initial_snapshot");
    assert_eq!(
        container_item_ids(&event["board"], &container.id),
        vec![item.id]
    );
}

#[tokio::test]
async fn test_reorder_broadcast_reaches_all_clients() {
    let (url, repo, _dir) = start_test_server().await;
    let a = repo.create_container("a", None).unwrap();
    let b = repo.create_container("b", None).unwrap();
    let i1 = repo.create_item(&a.id, "i1").unwrap();
    let i2 = repo.create_item(&a.id, "i2").unwrap();
    let i3 = repo.create_item(&b.id, "i3").unwrap();

    // A passive client that never submits a reorder
    let mut passive = connect_synced(&url).await;
    let mut sender = connect_synced(&url).await;

    // Drag i3 to the top of container a
    send_json(
        &mut sender,
        json!({
            "type": "submit_reorder",
            "containers": [
                { "id": a.id, "items": [
                    { "id": i3.id, "position": 0 },
                    { "id": i1.id, "position": 1 },
                    { "id": i2.id, "position": 2 },
                ]},
                { "id": b.id, "items": [] },
            ],
        }),
    )
    .await;

    let expected = vec![i3.id.clone(), i1.id.clone(), i2.id.clone()];

    // Both clients converge on the broadcast, the originator included
    for client in [&mut passive, &mut sender] {
        let event = recv_json(client).await;
        assert_eq!(event["type"], "state_updated");
        assert_eq!(container_item_ids(&event["board"], &a.id), expected);
        assert!(container_item_ids(&event["board"], &b.id).is_empty());
    }
}

#[tokio::test]
async fn test_failed_reorder_sends_error_only_to_sender() {
    let (url, repo, _dir) = start_test_server().await;
    let a = repo.create_container("a", None).unwrap();
    let i1 = repo.create_item(&a.id, "i1").unwrap();

    let mut passive = connect_synced(&url).await;
    let mut sender = connect_synced(&url).await;

    // Well-formed id that does not exist
    send_json(
        &mut sender,
        json!({
            "type": "submit_reorder",
            "containers": [
                { "id": a.id, "items": [
                    { "id": i1.id, "position": 1 },
                    { "id": "zzzzzzzz", "position": 0 },
                ]},
            ],
        }),
    )
    .await;

    let event = recv_json(&mut sender).await;
    assert_eq!(event["type"], "error");

    // No broadcast happened and the board is untouched
    let silent = timeout(Duration::from_millis(300), passive.next()).await;
    assert!(silent.is_err(), "passive client should receive nothing");

    let snapshot = repo.snapshot().unwrap();
    assert_eq!(snapshot.containers[0].items[0].position, 0);
}

#[tokio::test]
async fn test_malformed_event_gets_error_reply() {
    let (url, _repo, _dir) = start_test_server().await;

    let mut client = connect(&url).await;
    client
        .send(Message::Text("not json".to_string().into()))
        .await
        .unwrap();

    let event = recv_json(&mut client).await;
    assert_eq!(event["type"], "error");
}
