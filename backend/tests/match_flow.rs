//! Match Server Integration Tests
//!
//! Exercises the registry, the per-match task and the gateway together:
//! JSON frames go in through `gateway::dispatch` or a real WebSocket, and
//! the tests read what each connection's outbox receives.

use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use backend::actor::Outbox;
use backend::config::MatchSettings;
use backend::gateway::{self, AppState};
use backend::MatchRegistry;
use chess_engine::{Color, MatchResult};
use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use shared::protocol::ServerMessage;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tower::ServiceExt;
use uuid::Uuid;

fn test_registry() -> MatchRegistry {
    MatchRegistry::new(MatchSettings {
        game_over_grace: Duration::from_millis(50),
        ..MatchSettings::default()
    })
}

struct Client {
    conn: Uuid,
    outbox: Outbox,
    inbox: mpsc::UnboundedReceiver<ServerMessage>,
}

impl Client {
    fn new() -> Self {
        let (outbox, inbox) = mpsc::unbounded_channel();
        Self {
            conn: Uuid::new_v4(),
            outbox,
            inbox,
        }
    }

    async fn send(&self, state: &AppState, frame: Value) {
        gateway::dispatch(state, self.conn, &self.outbox, &frame.to_string()).await;
    }

    fn drain(&mut self) -> Vec<ServerMessage> {
        let mut messages = Vec::new();
        while let Ok(message) = self.inbox.try_recv() {
            messages.push(message);
        }
        messages
    }
}

/// Wait until the match task has handled everything sent so far
async fn settle(state: &AppState, code: &str) {
    if let Ok(handle) = state.registry.get(code) {
        let _ = handle.snapshot().await;
    }
}

async fn wait_for_removal(registry: &MatchRegistry, code: &str) {
    for _ in 0..100 {
        if !registry.contains(code) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("Match {code} was never removed");
}

async fn started_match(state: &AppState) -> (String, Client, Client) {
    let code = state.registry.create("5+3").expect("create");
    let mut white = Client::new();
    let mut black = Client::new();

    white
        .send(state, json!({"type": "joinGame", "code": code, "playerColor": "white"}))
        .await;
    black.send(state, json!({"type": "joinGame", "code": code})).await;
    white.send(state, json!({"type": "gameStarted", "code": code})).await;
    settle(state, &code).await;

    white.drain();
    black.drain();
    (code, white, black)
}

#[tokio::test]
async fn test_join_flow_assigns_colors_and_starts_intro() {
    let state = AppState {
        registry: test_registry(),
    };
    let code = state.registry.create("15+10").expect("create");
    let mut white = Client::new();
    let mut black = Client::new();

    white.send(&state, json!({"type": "joinGame", "code": code})).await;
    let messages = white.drain();
    assert_eq!(
        messages[0],
        ServerMessage::ColorAssigned {
            color: Color::White
        }
    );
    match &messages[1] {
        ServerMessage::GameState(snapshot) => {
            assert_eq!(snapshot.code, code);
            assert_eq!(snapshot.white_time, 900_000);
            assert!(!snapshot.game_started);
        }
        other => panic!("Expected gameState, got {other:?}"),
    }

    black.send(&state, json!({"type": "joinGame", "code": code})).await;
    settle(&state, &code).await;
    let to_white = white.drain();
    assert!(to_white.contains(&ServerMessage::PlayerJoined {
        white: true,
        black: true
    }));
    assert!(to_white.contains(&ServerMessage::IntroStart));
    assert!(black.drain().contains(&ServerMessage::ColorAssigned {
        color: Color::Black
    }));
}

#[tokio::test]
async fn test_moves_are_broadcast_to_room_and_spectators() {
    let state = AppState {
        registry: test_registry(),
    };
    let (code, mut white, mut black) = started_match(&state).await;
    let mut watcher = Client::new();
    watcher
        .send(&state, json!({"type": "joinSpectator", "code": code}))
        .await;
    settle(&state, &code).await;
    assert!(matches!(
        watcher.drain().as_slice(),
        [ServerMessage::GameState(_)]
    ));

    white
        .send(&state, json!({"type": "makeMove", "code": code, "move": "6,4->4,4"}))
        .await;
    settle(&state, &code).await;

    for client in [&mut white, &mut black, &mut watcher] {
        let messages = client.drain();
        assert!(
            matches!(
                messages.as_slice(),
                [ServerMessage::MoveMade { notation, side_to_move: Color::Black, .. }] if notation == "e4"
            ),
            "Unexpected broadcast {messages:?}"
        );
    }

    let snapshot = state
        .registry
        .get(&code)
        .expect("match")
        .snapshot()
        .await
        .expect("snapshot");
    assert_eq!(snapshot.move_history.len(), 1);
    assert_eq!(snapshot.white_time, 303_000);
}

#[tokio::test]
async fn test_unknown_code_and_bad_frames() {
    let state = AppState {
        registry: test_registry(),
    };
    let mut client = Client::new();

    client
        .send(&state, json!({"type": "joinGame", "code": "NOPE00"}))
        .await;
    assert_eq!(client.drain(), vec![ServerMessage::InvalidCode]);

    client
        .send(&state, json!({"type": "makeMove", "code": "NOPE00", "move": "6,4->4,4"}))
        .await;
    assert!(client.drain().is_empty(), "Non-join events for unknown codes are dropped");

    gateway::dispatch(&state, client.conn, &client.outbox, "{not json").await;
    assert!(matches!(
        client.drain().as_slice(),
        [ServerMessage::Error { .. }]
    ));
}

#[tokio::test]
async fn test_resignation_ends_and_removes_match() {
    let state = AppState {
        registry: test_registry(),
    };
    let (code, mut white, mut black) = started_match(&state).await;

    black
        .send(&state, json!({"type": "resign", "code": code, "color": "black"}))
        .await;
    settle(&state, &code).await;

    let expected = ServerMessage::GameOver {
        result: MatchResult::WhiteWins,
        reason: "black resigned".to_string(),
    };
    assert_eq!(white.drain(), vec![expected.clone()]);
    assert_eq!(black.drain(), vec![expected]);

    wait_for_removal(&state.registry, &code).await;
    white
        .send(&state, json!({"type": "joinGame", "code": code}))
        .await;
    assert_eq!(white.drain(), vec![ServerMessage::InvalidCode]);
}

#[tokio::test]
async fn test_draw_agreement_over_the_wire() {
    let state = AppState {
        registry: test_registry(),
    };
    let (code, mut white, mut black) = started_match(&state).await;

    white
        .send(&state, json!({"type": "drawOffer", "code": code, "from": "white"}))
        .await;
    black.send(&state, json!({"type": "acceptDraw", "code": code})).await;
    settle(&state, &code).await;

    assert_eq!(
        black.drain(),
        vec![
            ServerMessage::DrawOffer { from: Color::White },
            ServerMessage::DrawAccepted,
            ServerMessage::GameOver {
                result: MatchResult::Draw,
                reason: "Draw by agreement".to_string(),
            },
        ]
    );
    assert_eq!(white.drain().len(), 3);
}

#[tokio::test]
async fn test_cancel_before_start() {
    let state = AppState {
        registry: test_registry(),
    };
    let code = state.registry.create("2+1").expect("create");
    let mut host = Client::new();
    let mut outsider = Client::new();

    host.send(&state, json!({"type": "joinGame", "code": code})).await;
    outsider
        .send(&state, json!({"type": "joinSpectator", "code": code}))
        .await;
    outsider
        .send(&state, json!({"type": "cancelGame", "code": code}))
        .await;
    settle(&state, &code).await;
    host.drain();
    assert_eq!(
        outsider.drain().last(),
        Some(&ServerMessage::CancelGameError {
            message: "Only players can cancel the game".to_string(),
        })
    );

    host.send(&state, json!({"type": "cancelGame", "code": code})).await;
    wait_for_removal(&state.registry, &code).await;
    let cancelled = ServerMessage::GameCancelled {
        message: "Game cancelled by player".to_string(),
    };
    assert_eq!(host.drain(), vec![cancelled.clone()]);
    assert_eq!(outsider.drain(), vec![cancelled]);
}

#[tokio::test]
async fn test_disconnect_frees_seat_for_reconnection() {
    let state = AppState {
        registry: test_registry(),
    };
    let (code, white, mut black) = started_match(&state).await;

    let handle = state.registry.get(&code).expect("match");
    handle
        .send(backend::actor::Command::Disconnect { conn: white.conn })
        .expect("send");
    settle(&state, &code).await;
    assert_eq!(
        black.drain(),
        vec![ServerMessage::PlayerJoined {
            white: false,
            black: true
        }]
    );

    let mut returning = Client::new();
    returning
        .send(&state, json!({"type": "joinGame", "code": code}))
        .await;
    let messages = returning.drain();
    assert_eq!(
        messages.first(),
        Some(&ServerMessage::ColorAssigned {
            color: Color::White
        })
    );
    match messages.get(1) {
        Some(ServerMessage::GameState(snapshot)) => {
            assert!(snapshot.game_started, "Reconnection resumes the running match");
        }
        other => panic!("Expected gameState, got {other:?}"),
    }
}

#[tokio::test]
async fn test_create_game_endpoint() {
    let registry = test_registry();
    let app = gateway::router(registry.clone());

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/create-game")
                .header("content-type", "application/json")
                .body(Body::from(json!({"timeControl": "5+3"}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&body).unwrap();
    let code = body["code"].as_str().unwrap();
    assert_eq!(code.len(), 6);
    assert!(
        code.chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()),
        "Code should be upper-case alphanumeric"
    );
    assert!(registry.contains(code));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["matches"].as_u64(), Some(1));
}

#[tokio::test]
async fn test_create_game_rejects_unknown_time_control() {
    let registry = test_registry();
    let app = gateway::router(registry.clone());

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/create-game")
                .header("content-type", "application/json")
                .body(Body::from(json!({"timeControl": "10+0"}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert!(body["error"].as_str().unwrap().contains("10+0"));
    assert!(registry.is_empty(), "Nothing registered on failure");
}

#[tokio::test]
async fn test_websocket_round_trip() {
    let registry = test_registry();
    let code = registry.create("5+3").expect("create");
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, gateway::router(registry)).await.unwrap();
    });

    let (mut socket, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/ws"))
        .await
        .expect("Should connect");
    socket
        .send(Message::text(
            json!({"type": "joinGame", "code": code}).to_string(),
        ))
        .await
        .unwrap();

    let mut types = Vec::new();
    while types.len() < 4 {
        let frame = tokio::time::timeout(Duration::from_secs(5), socket.next())
            .await
            .expect("Frame should arrive")
            .expect("Socket open")
            .unwrap();
        let value: Value = serde_json::from_str(frame.to_text().unwrap()).unwrap();
        types.push(value["type"].as_str().unwrap().to_string());
        if value["type"] == "colorAssigned" {
            assert_eq!(value["color"], "white");
        }
    }
    assert_eq!(
        types,
        ["colorAssigned", "gameState", "playerJoined", "gameState"]
    );
}
