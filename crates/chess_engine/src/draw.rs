//! Draw evaluation
//!
//! Stateless checks (stalemate, insufficient material) plus the one piece of
//! per-match state the rules need: a count of how often each position has
//! been reached.
//!
//! The no-progress counter is a plain half-move count owned by the match. It
//! is never reset by captures or pawn moves, so [`NO_PROGRESS_HALFMOVE_LIMIT`]
//! is reached after exactly 150 applied moves.

use std::collections::HashMap;

use crate::board::Board;
use crate::move_gen::{has_legal_move, in_check};
use crate::types::*;

/// Half-moves after which the match is drawn (75 full moves)
pub const NO_PROGRESS_HALFMOVE_LIMIT: u32 = 150;

/// Occurrences of one position that trigger a repetition draw
pub const REPETITION_LIMIT: u32 = 3;

/// Not in check and no legal move for any own piece
pub fn is_stalemate(board: &Board, side: Color) -> bool {
    !in_check(board, side) && !has_legal_move(board, side)
}

/// Bare kings, or king and a single knight or bishop against a bare king
///
/// No other material combination is treated as a dead position.
pub fn is_insufficient_material(board: &Board) -> bool {
    let mut minors = 0;
    for (_, piece) in board.pieces() {
        match piece.kind {
            PieceKind::King => {}
            kind if kind.is_minor() => minors += 1,
            _ => return false,
        }
    }
    minors <= 1
}

/// Per-match position occurrence counts
///
/// Positions are keyed by [`Board::fingerprint`]. The match records a board
/// once per applied move; the starting position is not recorded.
#[derive(Debug, Clone, Default)]
pub struct RepetitionTracker {
    counts: HashMap<String, u32>,
    max: u32,
}

impl RepetitionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one more occurrence of `board`, returning the updated total
    pub fn record(&mut self, board: &Board) -> u32 {
        let count = self.counts.entry(board.fingerprint()).or_insert(0);
        *count += 1;
        self.max = self.max.max(*count);
        *count
    }

    pub fn occurrences(&self, board: &Board) -> u32 {
        self.counts.get(&board.fingerprint()).copied().unwrap_or(0)
    }

    /// True once any position has been seen [`REPETITION_LIMIT`] times
    pub fn is_threefold(&self) -> bool {
        self.max >= REPETITION_LIMIT
    }

    pub fn reset(&mut self) {
        self.counts.clear();
        self.max = 0;
    }
}
