//! End-to-end tests: the router served on an ephemeral port, driven by WebSocket clients.

use std::{net::SocketAddr, time::Duration};

use futures_util::{SinkExt, StreamExt};
use roka_server::{
    infrastructure::dto::{
        http::{RoomDetailDto, RoomSummaryDto},
        websocket::{ServerMessage, UserDto},
    },
    ui::{Server, ServerConfig},
};
use tokio::{net::TcpStream, time::timeout};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async,
    tungstenite::{Message, client::IntoClientRequest, http::HeaderValue},
};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

const ALLOWED_ORIGIN: &str = "http://localhost:3000";

/// Starts a relay on 127.0.0.1 with an ephemeral port.
async fn start_server() -> SocketAddr {
    let config = ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        allowed_origin: Some(ALLOWED_ORIGIN.to_string()),
    };
    let app = Server::in_memory()
        .router(&config)
        .expect("router should build");
    let listener = tokio::net::TcpListener::bind(config.bind_addr())
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("Failed to read local addr");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server error");
    });

    addr
}

async fn connect(addr: SocketAddr) -> WsStream {
    let (ws, _) = connect_async(format!("ws://{addr}/ws"))
        .await
        .expect("Failed to connect");
    ws
}

async fn send(ws: &mut WsStream, frame: serde_json::Value) {
    ws.send(Message::Text(frame.to_string().into()))
        .await
        .expect("Failed to send frame");
}

async fn join(ws: &mut WsStream, username: &str, room: Option<&str>) -> Vec<UserDto> {
    let data = match room {
        Some(room) => serde_json::json!({"username": username, "room": room}),
        None => serde_json::json!({"username": username}),
    };
    send(ws, serde_json::json!({"event": "join_room", "data": data})).await;
    match next_event(ws).await {
        ServerMessage::UsersOnline(users) => users,
        other => panic!("expected users_online, got {other:?}"),
    }
}

async fn say(ws: &mut WsStream, username: &str, message: &str) {
    send(
        ws,
        serde_json::json!({
            "event": "chat_message",
            "data": {"username": username, "message": message}
        }),
    )
    .await;
}

async fn next_event(ws: &mut WsStream) -> ServerMessage {
    loop {
        let msg = timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("Timed out waiting for an event")
            .expect("Stream ended")
            .expect("WebSocket error");
        if let Message::Text(text) = msg {
            return serde_json::from_str(text.as_str()).expect("Invalid server frame");
        }
    }
}

async fn assert_silent(ws: &mut WsStream) {
    let result = timeout(Duration::from_millis(200), ws.next()).await;
    assert!(result.is_err(), "expected no event, got {result:?}");
}

#[tokio::test]
async fn test_join_announces_presence() {
    // テスト項目: 参加すると既存参加者に user_joined、本人に users_online が届く
    // given (前提条件):
    let addr = start_server().await;
    let mut alice = connect(addr).await;
    let mut bob = connect(addr).await;
    let online = join(&mut alice, "alice", None).await;
    assert_eq!(online.len(), 1);

    // when (操作):
    let online = join(&mut bob, "bob", Some("general")).await;

    // then (期待する結果):
    let names: Vec<&str> = online.iter().map(|u| u.username.as_str()).collect();
    assert_eq!(names, vec!["alice", "bob"]);
    match next_event(&mut alice).await {
        ServerMessage::UserJoined(user) => {
            assert_eq!(user.username, "bob");
            assert!(user.is_online);
        }
        other => panic!("expected user_joined, got {other:?}"),
    }
}

#[tokio::test]
async fn test_chat_is_echoed_in_order_and_blank_messages_are_dropped() {
    // テスト項目: 送信者を含む全員に順序通り届き、空白のみのメッセージは届かない
    // given (前提条件):
    let addr = start_server().await;
    let mut alice = connect(addr).await;
    let mut bob = connect(addr).await;
    join(&mut alice, "alice", None).await;
    join(&mut bob, "bob", None).await;
    next_event(&mut alice).await; // user_joined(bob)

    // when (操作):
    say(&mut alice, "alice", "hi").await;
    say(&mut alice, "alice", "   ").await;
    say(&mut alice, "alice", "there").await;

    // then (期待する結果):
    for ws in [&mut alice, &mut bob] {
        let mut bodies = Vec::new();
        let mut ids = Vec::new();
        for _ in 0..2 {
            match next_event(ws).await {
                ServerMessage::ChatMessage(message) => {
                    assert_eq!(message.username, "alice");
                    bodies.push(message.message);
                    ids.push(message.id);
                }
                other => panic!("expected chat_message, got {other:?}"),
            }
        }
        assert_eq!(bodies, vec!["hi", "there"]);
        assert_ne!(ids[0], ids[1]);
    }
    assert_silent(&mut bob).await;
}

#[tokio::test]
async fn test_rooms_are_isolated() {
    // テスト項目: 別ルームのメッセージは届かない
    // given (前提条件):
    let addr = start_server().await;
    let mut alice = connect(addr).await;
    let mut carol = connect(addr).await;
    join(&mut alice, "alice", Some("general")).await;
    join(&mut carol, "carol", Some("rust")).await;

    // when (操作):
    say(&mut carol, "carol", "anyone here?").await;

    // then (期待する結果):
    assert!(matches!(
        next_event(&mut carol).await,
        ServerMessage::ChatMessage(_)
    ));
    assert_silent(&mut alice).await;
}

#[tokio::test]
async fn test_disconnect_announces_departure() {
    // テスト項目: 参加者が切断すると残りのメンバーに user_left が届く
    // given (前提条件):
    let addr = start_server().await;
    let mut alice = connect(addr).await;
    let mut bob = connect(addr).await;
    join(&mut alice, "alice", None).await;
    join(&mut bob, "bob", None).await;

    // when (操作):
    bob.close(None).await.expect("Failed to close");

    // then (期待する結果):
    next_event(&mut alice).await; // user_joined(bob)
    match next_event(&mut alice).await {
        ServerMessage::UserLeft(user) => {
            assert_eq!(user.username, "bob");
            assert!(!user.is_online);
        }
        other => panic!("expected user_left, got {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_frames_are_ignored() {
    // テスト項目: 不正なフレームや参加前の発言は無視され、接続は維持される
    // given (前提条件):
    let addr = start_server().await;
    let mut alice = connect(addr).await;

    // when (操作):
    alice
        .send(Message::Text("not json".to_string().into()))
        .await
        .expect("Failed to send");
    say(&mut alice, "alice", "too early").await;
    let online = join(&mut alice, "alice", None).await;

    // then (期待する結果):
    assert_eq!(online.len(), 1);
}

#[tokio::test]
async fn test_foreign_origin_is_rejected() {
    // テスト項目: 許可されていない Origin からのハンドシェイクは拒否される
    // given (前提条件):
    let addr = start_server().await;
    let mut request = format!("ws://{addr}/ws")
        .into_client_request()
        .expect("Invalid request");
    request
        .headers_mut()
        .insert("Origin", HeaderValue::from_static("http://evil.example"));

    // when (操作):
    let result = connect_async(request).await;

    // then (期待する結果):
    assert!(result.is_err());
}

#[tokio::test]
async fn test_http_api_reflects_presence() {
    // テスト項目: HTTP API でヘルスチェックとルームの状態が取得できる
    // given (前提条件):
    let addr = start_server().await;
    let mut alice = connect(addr).await;
    join(&mut alice, "alice", Some("rust")).await;
    let http = reqwest::Client::new();

    // when (操作):
    let health: serde_json::Value = http
        .get(format!("http://{addr}/api/health"))
        .send()
        .await
        .expect("request failed")
        .json()
        .await
        .expect("invalid json");
    let rooms: Vec<RoomSummaryDto> = http
        .get(format!("http://{addr}/api/rooms"))
        .send()
        .await
        .expect("request failed")
        .json()
        .await
        .expect("invalid json");
    let detail_json: serde_json::Value = http
        .get(format!("http://{addr}/api/rooms/rust"))
        .send()
        .await
        .expect("request failed")
        .json()
        .await
        .expect("invalid json");
    let missing = http
        .get(format!("http://{addr}/api/rooms/general"))
        .send()
        .await
        .expect("request failed");

    // then (期待する結果):
    assert_eq!(health, serde_json::json!({"status": "ok"}));
    assert_eq!(
        rooms,
        vec![RoomSummaryDto {
            room: "rust".to_string(),
            members: 1,
        }]
    );
    let participant = &detail_json["participants"][0];
    assert_eq!(detail_json["room"], "rust");
    assert_eq!(participant["username"], "alice");
    assert_eq!(participant["isOnline"], true);
    assert_eq!(participant["isTyping"], false);
    assert!(participant["joinedAt"].is_string());
    let detail: RoomDetailDto = serde_json::from_value(detail_json).expect("invalid detail");
    assert_eq!(detail.participants.len(), 1);
    assert_eq!(missing.status(), reqwest::StatusCode::NOT_FOUND);
}
