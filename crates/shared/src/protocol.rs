use chess_engine::{Color, MatchResult, Square};
use serde::{Deserialize, Serialize};

/// Messages sent by a connected client
///
/// JSON text frames tagged by `type`, e.g.
/// `{"type":"makeMove","code":"AB12CD","move":"6,4->4,4"}`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    JoinGame {
        code: String,
        #[serde(default)]
        player_color: Option<Color>,
    },
    JoinSpectator {
        code: String,
    },
    /// Introduction finished on the client; start the clock
    GameStarted {
        code: String,
    },
    MakeMove {
        code: String,
        #[serde(rename = "move")]
        mv: String,
        /// Board serialization the client computed after the move (advisory)
        #[serde(default)]
        fen: Option<String>,
    },
    IllegalMove {
        code: String,
        color: Color,
    },
    /// Client-measured remaining time in milliseconds
    TimerUpdate {
        code: String,
        white_time: i64,
        black_time: i64,
    },
    Resign {
        code: String,
        color: Color,
    },
    DrawOffer {
        code: String,
        from: Color,
    },
    AcceptDraw {
        code: String,
    },
    DeclineDraw {
        code: String,
    },
    GameOver {
        code: String,
        result: MatchResult,
        reason: String,
    },
    CancelGame {
        code: String,
    },
}

impl ClientMessage {
    /// Match code the message is addressed to
    pub fn code(&self) -> &str {
        match self {
            ClientMessage::JoinGame { code, .. }
            | ClientMessage::JoinSpectator { code }
            | ClientMessage::GameStarted { code }
            | ClientMessage::MakeMove { code, .. }
            | ClientMessage::IllegalMove { code, .. }
            | ClientMessage::TimerUpdate { code, .. }
            | ClientMessage::Resign { code, .. }
            | ClientMessage::DrawOffer { code, .. }
            | ClientMessage::AcceptDraw { code }
            | ClientMessage::DeclineDraw { code }
            | ClientMessage::GameOver { code, .. }
            | ClientMessage::CancelGame { code } => code,
        }
    }
}

/// Messages sent by the server, either to one connection or to a whole room
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    ColorAssigned {
        color: Color,
    },
    GameState(GameSnapshot),
    PlayerJoined {
        white: bool,
        black: bool,
    },
    /// Both seats are filled; clients run their introduction and reply `gameStarted`
    IntroStart,
    MoveMade {
        #[serde(rename = "move")]
        mv: String,
        notation: String,
        fen: String,
        white_time: u64,
        black_time: u64,
        side_to_move: Color,
        in_check: bool,
    },
    IllegalMovePenalty {
        color: Color,
        /// Illegal moves left before forfeit
        remaining: u32,
    },
    TimerSync {
        white_time: u64,
        black_time: u64,
    },
    DrawOffer {
        from: Color,
    },
    DrawAccepted,
    DrawDeclined,
    GameOver {
        result: MatchResult,
        reason: String,
    },
    GameCancelled {
        message: String,
    },
    CancelGameError {
        message: String,
    },
    InvalidCode,
    Error {
        message: String,
    },
}

/// Full match state sent on join, on start and to spectators
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    pub code: String,
    /// Board serialization, see `chess_engine::board`
    pub fen: String,
    pub time_control: String,
    pub side_to_move: Color,
    pub game_started: bool,
    pub timer_active: bool,
    pub white_time: u64,
    pub black_time: u64,
    /// Increment in milliseconds
    pub increment: u64,
    pub move_history: Vec<HistoryEntry>,
    pub captured_pieces: CapturedPieces,
    pub in_check: bool,
    pub check_square: Option<Square>,
    pub game_over: bool,
    pub game_result: Option<GameResultInfo>,
    pub draw_offer: Option<Color>,
    pub white: bool,
    pub black: bool,
    pub illegal_moves: IllegalMoveCounts,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    #[serde(rename = "move")]
    pub mv: String,
    pub notation: String,
    pub color: Color,
}

/// Pieces lost by each side, as piece codes (`wN`, `bQ`, ...)
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct CapturedPieces {
    pub white: Vec<String>,
    pub black: Vec<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct GameResultInfo {
    pub result: MatchResult,
    pub reason: String,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IllegalMoveCounts {
    pub white: u32,
    pub black: u32,
}

/// Body of `POST /create-game`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateGameRequest {
    pub time_control: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CreateGameResponse {
    pub code: String,
}
