//! HTTP and WebSocket front door
//!
//! - `POST /create-game` mints a match for a time-control selector
//! - `GET /ws` upgrades to a socket speaking [`ClientMessage`]/[`ServerMessage`] JSON
//! - `GET /health` reports liveness and the number of running matches
//!
//! Each socket gets a connection id and an outbox drained by a writer task.
//! Inbound messages are resolved to a match by code and forwarded to its task.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Json, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use futures::{SinkExt, StreamExt};
use serde_json::json;
use shared::protocol::{ClientMessage, CreateGameRequest, CreateGameResponse, ServerMessage};
use tokio::sync::mpsc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::actor::{Command, Outbox};
use crate::error::MatchError;
use crate::registry::MatchRegistry;
use crate::session::ConnId;

#[derive(Clone)]
pub struct AppState {
    pub registry: MatchRegistry,
}

pub fn router(registry: MatchRegistry) -> Router {
    Router::new()
        .route("/create-game", post(create_game))
        .route("/ws", get(ws_handler))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(AppState { registry })
}

impl IntoResponse for MatchError {
    fn into_response(self) -> Response {
        let status = match self {
            MatchError::InvalidCode(_) => StatusCode::NOT_FOUND,
            MatchError::ActorUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::BAD_REQUEST,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

async fn create_game(
    State(state): State<AppState>,
    Json(request): Json<CreateGameRequest>,
) -> Result<Json<CreateGameResponse>, MatchError> {
    let code = state.registry.create(&request.time_control)?;
    Ok(Json(CreateGameResponse { code }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({ "status": "ok", "matches": state.registry.len() }))
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let conn = Uuid::new_v4();
    let (mut sender, mut receiver) = socket.split();
    let (outbox, mut inbox) = mpsc::unbounded_channel::<ServerMessage>();
    debug!(%conn, "Socket opened");

    let writer = tokio::spawn(async move {
        while let Some(message) = inbox.recv().await {
            let text = match serde_json::to_string(&message) {
                Ok(text) => text,
                Err(err) => {
                    warn!(%err, "Failed to encode server message");
                    continue;
                }
            };
            if sender.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(Ok(message)) = receiver.next().await {
        match message {
            Message::Text(text) => dispatch(&state, conn, &outbox, text.as_str()).await,
            Message::Close(_) => break,
            _ => {}
        }
    }

    if let Some(code) = state.registry.unbind_connection(conn) {
        disconnect_from(&state.registry, conn, &code);
    }
    writer.abort();
    debug!(%conn, "Socket closed");
}

fn disconnect_from(registry: &MatchRegistry, conn: ConnId, code: &str) {
    if let Ok(handle) = registry.get(code) {
        let _ = handle.send(Command::Disconnect { conn });
    }
}

/// Route one inbound frame to its match
pub async fn dispatch(state: &AppState, conn: ConnId, outbox: &Outbox, text: &str) {
    let message: ClientMessage = match serde_json::from_str(text) {
        Ok(message) => message,
        Err(err) => {
            warn!(%conn, %err, "Unrecognised client message");
            let _ = outbox.send(ServerMessage::Error {
                message: format!("Unrecognised message: {err}"),
            });
            return;
        }
    };

    let code = message.code().to_string();
    let handle = match state.registry.get(&code) {
        Ok(handle) => handle,
        Err(_) => {
            if matches!(
                message,
                ClientMessage::JoinGame { .. } | ClientMessage::JoinSpectator { .. }
            ) {
                let _ = outbox.send(ServerMessage::InvalidCode);
            } else {
                debug!(%conn, %code, "Event for unknown match dropped");
            }
            return;
        }
    };

    let command = match message {
        ClientMessage::JoinGame { player_color, .. } => {
            match handle.join(conn, player_color, outbox.clone()).await {
                Ok(color) => {
                    info!(%conn, %code, %color, "Joined match");
                    rebind(state, conn, &code);
                }
                Err(MatchError::MatchOver | MatchError::ActorUnavailable(_)) => {
                    let _ = outbox.send(ServerMessage::InvalidCode);
                }
                Err(err) => {
                    let _ = outbox.send(ServerMessage::Error {
                        message: err.to_string(),
                    });
                }
            }
            return;
        }
        ClientMessage::JoinSpectator { .. } => {
            rebind(state, conn, &code);
            Command::JoinSpectator {
                conn,
                outbox: outbox.clone(),
            }
        }
        ClientMessage::GameStarted { .. } => Command::BeginPlay { conn },
        ClientMessage::MakeMove { mv, fen, .. } => Command::SubmitMove { conn, mv, fen },
        ClientMessage::IllegalMove { color, .. } => Command::IllegalMove { conn, color },
        ClientMessage::TimerUpdate {
            white_time,
            black_time,
            ..
        } => Command::TimerUpdate {
            conn,
            white_ms: white_time,
            black_ms: black_time,
        },
        ClientMessage::Resign { color, .. } => Command::Resign { conn, color },
        ClientMessage::DrawOffer { from, .. } => Command::OfferDraw { conn, from },
        ClientMessage::AcceptDraw { .. } => Command::AcceptDraw { conn },
        ClientMessage::DeclineDraw { .. } => Command::DeclineDraw { conn },
        ClientMessage::GameOver { result, reason, .. } => Command::ReportGameOver {
            conn,
            result,
            reason,
        },
        ClientMessage::CancelGame { .. } => Command::Cancel { conn },
    };

    if let Err(err) = handle.send(command) {
        debug!(%conn, %err, "Match task gone");
    }
}

/// Bind `conn` to `code`, leaving any match it was in before
fn rebind(state: &AppState, conn: ConnId, code: &str) {
    if let Some(previous) = state.registry.bind_connection(conn, code) {
        disconnect_from(&state.registry, conn, &previous);
    }
}
