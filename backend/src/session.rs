//! Match session: the state machine behind one match code
//!
//! A session owns the authoritative board, turn, clocks, illegal-move counts,
//! seat bindings and lifecycle of a single match. It is synchronous and does
//! no I/O. Every operation returns the messages that should go out, addressed
//! either to the whole room or to one connection, and the owning actor
//! delivers them.
//!
//! ## Lifecycle
//!
//! `Waiting` (seats filling, introduction not yet acknowledged) → `Active`
//! (clock running, moves accepted) → `Over` (result fixed). Once `Over`,
//! every mutating operation is a no-op.
//!
//! ## Rejections
//!
//! Events that arrive in the wrong state or from the wrong connection are
//! dropped without a reply and logged at `debug`. Malformed or rule-illegal
//! moves from the side to move are not dropped; they take the illegal-move
//! penalty path.

use chess_engine::{
    adjudicate, in_check, is_legal_move, move_notation, Board, Color, MatchResult, Move,
    RepetitionTracker, Termination,
};
use shared::protocol::{
    CapturedPieces, GameResultInfo, GameSnapshot, HistoryEntry, IllegalMoveCounts, ServerMessage,
};
use shared::TimeControl;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::clock::{Clock, ClockMode, DRIFT_SLACK_MS};
use crate::error::{MatchError, ServerResult};

pub type ConnId = Uuid;

/// Confirmed illegal moves after which a side forfeits
pub const ILLEGAL_MOVE_LIMIT: u32 = 9;

pub const REASON_ILLEGAL_MOVE_FORFEIT: &str = "Illegal move forfeit";
pub const REASON_DRAW_AGREEMENT: &str = "Draw by agreement";

const CANCEL_AFTER_START: &str = "Cannot cancel game that has already started";
const CANCEL_NOT_A_PLAYER: &str = "Only players can cancel the game";
const CANCELLED_BY_PLAYER: &str = "Game cancelled by player";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    Room,
    Conn(ConnId),
}

/// A message together with who should receive it
#[derive(Debug, Clone, PartialEq)]
pub struct Outbound {
    pub audience: Audience,
    pub message: ServerMessage,
}

impl Outbound {
    pub fn room(message: ServerMessage) -> Self {
        Self {
            audience: Audience::Room,
            message,
        }
    }

    pub fn to(conn: ConnId, message: ServerMessage) -> Self {
        Self {
            audience: Audience::Conn(conn),
            message,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Waiting,
    Active,
    Over,
}

/// A colour's seat. Once claimed it stays claimed; a disconnect only clears
/// the live connection so the same colour can be reclaimed on reconnect.
#[derive(Debug, Clone, Copy, Default)]
struct Seat {
    conn: Option<ConnId>,
    claimed: bool,
}

impl Seat {
    fn is_open(&self) -> bool {
        self.conn.is_none()
    }

    fn is_stale(&self) -> bool {
        self.claimed && self.conn.is_none()
    }
}

#[derive(Debug)]
pub struct MatchSession {
    code: String,
    time_control: TimeControl,
    clock_mode: ClockMode,
    board: Board,
    side_to_move: Color,
    seats: [Seat; 2],
    players_joined: u32,
    phase: Phase,
    termination: Option<Termination>,
    halfmove_clock: u32,
    illegal_counts: [u32; 2],
    clock: Clock,
    history: Vec<HistoryEntry>,
    captured: CapturedPieces,
    repetitions: RepetitionTracker,
    draw_offer: Option<Color>,
}

impl MatchSession {
    pub fn new(code: impl Into<String>, time_control: TimeControl, clock_mode: ClockMode) -> Self {
        Self {
            code: code.into(),
            time_control,
            clock_mode,
            board: Board::starting_position(),
            side_to_move: Color::White,
            seats: [Seat::default(); 2],
            players_joined: 0,
            phase: Phase::Waiting,
            termination: None,
            halfmove_clock: 0,
            illegal_counts: [0; 2],
            clock: Clock::new(time_control),
            history: Vec::new(),
            captured: CapturedPieces::default(),
            repetitions: RepetitionTracker::new(),
            draw_offer: None,
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_over(&self) -> bool {
        self.phase == Phase::Over
    }

    pub fn termination(&self) -> Option<&Termination> {
        self.termination.as_ref()
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn illegal_count(&self, color: Color) -> u32 {
        self.illegal_counts[color.idx()]
    }

    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn repetitions(&self) -> &RepetitionTracker {
        &self.repetitions
    }

    pub fn draw_offer(&self) -> Option<Color> {
        self.draw_offer
    }

    /// Distinct colours ever assigned; reconnections do not count again
    pub fn players_joined(&self) -> u32 {
        self.players_joined
    }

    /// Colour bound to a live connection
    pub fn seat_of(&self, conn: ConnId) -> Option<Color> {
        Color::ALL
            .into_iter()
            .find(|c| self.seats[c.idx()].conn == Some(conn))
    }

    fn seat(&self, color: Color) -> &Seat {
        &self.seats[color.idx()]
    }

    fn seat_mut(&mut self, color: Color) -> &mut Seat {
        &mut self.seats[color.idx()]
    }

    fn both_seats_live(&self) -> bool {
        self.seats.iter().all(|s| s.conn.is_some())
    }

    /// Seat a player connection
    ///
    /// A connection that already holds a seat gets its colour back. A
    /// requested colour is used when its seat has no live connection,
    /// otherwise the other colour is tried. Without a request a stale seat is
    /// reclaimed first, then White, then Black.
    pub fn join(
        &mut self,
        conn: ConnId,
        requested: Option<Color>,
    ) -> ServerResult<(Color, Vec<Outbound>)> {
        if self.is_over() {
            return Err(MatchError::MatchOver);
        }

        if let Some(color) = self.seat_of(conn) {
            debug!(code = %self.code, %conn, %color, "Duplicate join");
            return Ok((color, self.seat_messages(conn, color)));
        }

        let color = match requested {
            Some(wanted) => [wanted, wanted.other()]
                .into_iter()
                .find(|&c| self.seat(c).is_open()),
            None => Color::ALL
                .into_iter()
                .find(|&c| self.seat(c).is_stale())
                .or_else(|| Color::ALL.into_iter().find(|&c| !self.seat(c).claimed)),
        }
        .ok_or(MatchError::MatchFull)?;

        let reconnection = self.seat(color).claimed;
        let seat = self.seat_mut(color);
        seat.conn = Some(conn);
        seat.claimed = true;
        if !reconnection {
            self.players_joined += 1;
        }
        info!(code = %self.code, %conn, %color, reconnection, "Player seated");

        let mut out = self.seat_messages(conn, color);
        out.push(Outbound::room(self.presence()));
        out.push(Outbound::room(ServerMessage::GameState(self.snapshot())));
        if self.phase == Phase::Waiting && self.both_seats_live() {
            out.push(Outbound::room(ServerMessage::IntroStart));
        }
        Ok((color, out))
    }

    fn seat_messages(&self, conn: ConnId, color: Color) -> Vec<Outbound> {
        vec![
            Outbound::to(conn, ServerMessage::ColorAssigned { color }),
            Outbound::to(conn, ServerMessage::GameState(self.snapshot())),
        ]
    }

    fn presence(&self) -> ServerMessage {
        ServerMessage::PlayerJoined {
            white: self.seat(Color::White).conn.is_some(),
            black: self.seat(Color::Black).conn.is_some(),
        }
    }

    pub fn join_spectator(&self, conn: ConnId) -> Vec<Outbound> {
        debug!(code = %self.code, %conn, "Spectator joined");
        vec![Outbound::to(conn, ServerMessage::GameState(self.snapshot()))]
    }

    /// Introduction acknowledged: start the clock
    pub fn begin_play(&mut self, conn: ConnId, now: Instant) -> Vec<Outbound> {
        if self.phase != Phase::Waiting {
            debug!(code = %self.code, phase = ?self.phase, "Start ignored");
            return Vec::new();
        }
        if self.seat_of(conn).is_none() || self.players_joined < 2 {
            debug!(code = %self.code, %conn, players = self.players_joined, "Start rejected");
            return Vec::new();
        }

        self.phase = Phase::Active;
        self.clock.start(now);
        info!(code = %self.code, time_control = %self.time_control, "Match started");
        vec![Outbound::room(ServerMessage::GameState(self.snapshot()))]
    }

    /// Seated player on move, in a running match; `None` drops the event
    fn mover(&self, conn: ConnId, event: &'static str) -> Option<Color> {
        if self.phase != Phase::Active || self.players_joined < 2 {
            debug!(code = %self.code, %conn, phase = ?self.phase, event, "Not active");
            return None;
        }
        let Some(color) = self.seat_of(conn) else {
            debug!(code = %self.code, %conn, event, "Not a seated player");
            return None;
        };
        Some(color)
    }

    /// A move in wire form from a player connection
    ///
    /// `fen` is the client's own serialization of the resulting board. It is
    /// compared with the server's result and otherwise ignored.
    pub fn submit_move(
        &mut self,
        conn: ConnId,
        wire: &str,
        fen: Option<&str>,
        now: Instant,
    ) -> Vec<Outbound> {
        let Some(color) = self.mover(conn, "move") else {
            return Vec::new();
        };
        if color != self.side_to_move {
            debug!(code = %self.code, %color, "Move out of turn");
            return Vec::new();
        }

        if self.clock_mode == ClockMode::Server && self.clock.tick(color, now) {
            return self.flag_fall(color);
        }

        let mv: Move = match wire.parse() {
            Ok(mv) => mv,
            Err(err) => {
                warn!(code = %self.code, %color, %err, "Malformed move");
                return self.penalize(color);
            }
        };
        if !is_legal_move(&self.board, mv, color) {
            warn!(code = %self.code, %color, %mv, "Illegal move");
            return self.penalize(color);
        }

        self.apply_move(color, mv, fen)
    }

    fn apply_move(&mut self, mover: Color, mv: Move, fen: Option<&str>) -> Vec<Outbound> {
        let notation = move_notation(&self.board, mv);
        if let Some(taken) = self.board.piece_at(mv.to) {
            let lost = match taken.color {
                Color::White => &mut self.captured.white,
                Color::Black => &mut self.captured.black,
            };
            lost.push(taken.code());
        }

        let next = self.board.apply_move(mv);
        if let Some(fen) = fen {
            match fen.parse::<Board>() {
                Ok(client) if client == next => {}
                Ok(_) => warn!(code = %self.code, %mv, "Client board disagrees with server"),
                Err(err) => warn!(code = %self.code, %err, "Unparsable client board"),
            }
        }

        self.board = next;
        self.side_to_move = mover.other();
        self.halfmove_clock += 1;
        self.repetitions.record(&self.board);
        self.clock.credit_increment(mover);
        self.draw_offer = None;
        self.history.push(HistoryEntry {
            mv: mv.to_string(),
            notation: notation.clone(),
            color: mover,
        });
        debug!(code = %self.code, %mover, %notation, ply = self.halfmove_clock, "Move applied");

        let fen = self.board.to_string();
        let mut out = vec![Outbound::room(ServerMessage::MoveMade {
            mv: mv.to_string(),
            notation,
            fen,
            white_time: self.clock.remaining(Color::White),
            black_time: self.clock.remaining(Color::Black),
            side_to_move: self.side_to_move,
            in_check: in_check(&self.board, self.side_to_move),
        })];

        if let Some(termination) = adjudicate(
            &self.board,
            self.side_to_move,
            &self.repetitions,
            self.halfmove_clock,
        ) {
            out.extend(self.finish(termination));
        }
        out
    }

    /// Shared illegal-move path: count, penalise, maybe forfeit
    fn penalize(&mut self, color: Color) -> Vec<Outbound> {
        let slot = &mut self.illegal_counts[color.idx()];
        *slot += 1;
        let count = *slot;
        let remaining_ms = self.clock.apply_penalty(color);
        info!(code = %self.code, %color, count, remaining_ms, "Illegal move penalty");

        let mut out = vec![
            Outbound::room(ServerMessage::IllegalMovePenalty {
                color,
                remaining: ILLEGAL_MOVE_LIMIT.saturating_sub(count),
            }),
            Outbound::room(self.timer_sync()),
        ];
        if count >= ILLEGAL_MOVE_LIMIT {
            out.extend(self.finish(Termination::win_for(
                color.other(),
                REASON_ILLEGAL_MOVE_FORFEIT,
            )));
        }
        out
    }

    /// Client-detected illegal move attempt by its own side
    pub fn report_illegal_move(&mut self, conn: ConnId, color: Color) -> Vec<Outbound> {
        match self.mover(conn, "illegalMove") {
            Some(seat) if seat == color => self.penalize(color),
            Some(seat) => {
                debug!(code = %self.code, %seat, %color, "Illegal move report for other side");
                Vec::new()
            }
            None => Vec::new(),
        }
    }

    fn timer_sync(&self) -> ServerMessage {
        ServerMessage::TimerSync {
            white_time: self.clock.remaining(Color::White),
            black_time: self.clock.remaining(Color::Black),
        }
    }

    /// Periodic client push of measured remaining time
    pub fn timer_update(&mut self, conn: ConnId, white_ms: i64, black_ms: i64) -> Vec<Outbound> {
        if self.mover(conn, "timerUpdate").is_none() {
            return Vec::new();
        }

        match self.clock_mode {
            ClockMode::Client => {
                if self.clock.sync_from_client(white_ms, black_ms) {
                    debug!(code = %self.code, white_ms, black_ms, "Adopted client clock");
                }
            }
            ClockMode::Server => {
                let drift = self.clock.drift_ms(white_ms, black_ms);
                if drift > DRIFT_SLACK_MS {
                    warn!(code = %self.code, %conn, drift, "Client clock drift");
                }
            }
        }
        vec![Outbound::room(self.timer_sync())]
    }

    /// Server clock mode: charge the side to move and detect flag fall
    pub fn tick(&mut self, now: Instant) -> Vec<Outbound> {
        if self.clock_mode != ClockMode::Server || self.phase != Phase::Active {
            return Vec::new();
        }
        let side = self.side_to_move;
        if self.clock.tick(side, now) {
            return self.flag_fall(side);
        }
        Vec::new()
    }

    fn flag_fall(&mut self, color: Color) -> Vec<Outbound> {
        let mut out = vec![Outbound::room(self.timer_sync())];
        out.extend(self.finish(Termination::win_for(
            color.other(),
            format!("{color} ran out of time"),
        )));
        out
    }

    pub fn resign(&mut self, conn: ConnId, color: Color) -> Vec<Outbound> {
        match self.mover(conn, "resign") {
            Some(seat) if seat == color => {
                self.finish(Termination::win_for(color.other(), format!("{color} resigned")))
            }
            _ => Vec::new(),
        }
    }

    pub fn offer_draw(&mut self, conn: ConnId, from: Color) -> Vec<Outbound> {
        match self.mover(conn, "drawOffer") {
            Some(seat) if seat == from => {
                self.draw_offer = Some(from);
                info!(code = %self.code, %from, "Draw offered");
                vec![Outbound::room(ServerMessage::DrawOffer { from })]
            }
            _ => Vec::new(),
        }
    }

    /// Opponent of the pending offer, if `conn` is that player
    fn draw_responder(&self, conn: ConnId, event: &'static str) -> bool {
        let Some(seat) = self.mover(conn, event) else {
            return false;
        };
        match self.draw_offer {
            Some(offerer) if offerer != seat => true,
            _ => {
                debug!(code = %self.code, %seat, event, "No draw offer to answer");
                false
            }
        }
    }

    pub fn accept_draw(&mut self, conn: ConnId) -> Vec<Outbound> {
        if !self.draw_responder(conn, "acceptDraw") {
            return Vec::new();
        }
        self.draw_offer = None;
        let mut out = vec![Outbound::room(ServerMessage::DrawAccepted)];
        out.extend(self.finish(Termination::draw(REASON_DRAW_AGREEMENT)));
        out
    }

    pub fn decline_draw(&mut self, conn: ConnId) -> Vec<Outbound> {
        if !self.draw_responder(conn, "declineDraw") {
            return Vec::new();
        }
        self.draw_offer = None;
        vec![Outbound::room(ServerMessage::DrawDeclined)]
    }

    /// Terminal result computed elsewhere, e.g. a client-observed flag fall
    ///
    /// Only seated players may report. Ignored once the match is over.
    pub fn report_game_over(
        &mut self,
        conn: ConnId,
        result: MatchResult,
        reason: &str,
    ) -> Vec<Outbound> {
        if self.seat_of(conn).is_none() {
            debug!(code = %self.code, %conn, "Game over report from non-player");
            return Vec::new();
        }
        self.finish(Termination::new(result, reason))
    }

    /// Transport-level disconnect of a player; the seat stays claimed
    pub fn disconnect(&mut self, conn: ConnId) -> Vec<Outbound> {
        let Some(color) = self.seat_of(conn) else {
            return Vec::new();
        };
        self.seat_mut(color).conn = None;
        info!(code = %self.code, %conn, %color, "Player disconnected");
        if self.is_over() {
            return Vec::new();
        }
        vec![Outbound::room(self.presence())]
    }

    /// Validate a pre-start cancel; the caller removes the match on success
    pub fn cancel(&self, conn: ConnId) -> ServerResult<Vec<Outbound>> {
        if self.phase != Phase::Waiting {
            return Err(MatchError::CancelRejected(CANCEL_AFTER_START.to_string()));
        }
        if self.seat_of(conn).is_none() {
            return Err(MatchError::CancelRejected(CANCEL_NOT_A_PLAYER.to_string()));
        }
        info!(code = %self.code, %conn, "Match cancelled");
        Ok(vec![Outbound::room(ServerMessage::GameCancelled {
            message: CANCELLED_BY_PLAYER.to_string(),
        })])
    }

    /// First transition to `Over` wins; later calls return nothing
    fn finish(&mut self, termination: Termination) -> Vec<Outbound> {
        if self.is_over() {
            debug!(code = %self.code, reason = %termination.reason, "Already over");
            return Vec::new();
        }
        self.phase = Phase::Over;
        self.clock.stop();
        self.draw_offer = None;
        info!(
            code = %self.code,
            result = %termination.result,
            reason = %termination.reason,
            "Match over"
        );

        let message = ServerMessage::GameOver {
            result: termination.result,
            reason: termination.reason.clone(),
        };
        self.termination = Some(termination);
        vec![Outbound::room(message)]
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let in_check = in_check(&self.board, self.side_to_move);
        GameSnapshot {
            code: self.code.clone(),
            fen: self.board.to_string(),
            time_control: self.time_control.to_string(),
            side_to_move: self.side_to_move,
            game_started: self.phase != Phase::Waiting,
            timer_active: self.clock.is_running(),
            white_time: self.clock.remaining(Color::White),
            black_time: self.clock.remaining(Color::Black),
            increment: self.clock.increment_ms(),
            move_history: self.history.clone(),
            captured_pieces: self.captured.clone(),
            in_check,
            check_square: in_check
                .then(|| self.board.find_king(self.side_to_move))
                .flatten(),
            game_over: self.is_over(),
            game_result: self.termination.as_ref().map(|t| GameResultInfo {
                result: t.result,
                reason: t.reason.clone(),
            }),
            draw_offer: self.draw_offer,
            white: self.seat(Color::White).conn.is_some(),
            black: self.seat(Color::Black).conn.is_some(),
            illegal_moves: IllegalMoveCounts {
                white: self.illegal_counts[0],
                black: self.illegal_counts[1],
            },
        }
    }
}
