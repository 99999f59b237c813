//! Position status and post-move adjudication
//!
//! After every applied move the match asks [`adjudicate`] whether the game is
//! over. Rules are checked in a fixed order and the first hit wins:
//!
//! 1. Checkmate of the side now to move (the mover wins)
//! 2. Threefold repetition
//! 3. Insufficient material
//! 4. Stalemate
//! 5. 75-move rule

use crate::board::Board;
use crate::draw::{is_insufficient_material, RepetitionTracker, NO_PROGRESS_HALFMOVE_LIMIT};
use crate::move_gen::{has_legal_move, in_check};
use crate::types::*;

pub const REASON_CHECKMATE: &str = "Checkmate";
pub const REASON_STALEMATE: &str = "Stalemate";
pub const REASON_THREEFOLD: &str = "Threefold repetition";
pub const REASON_INSUFFICIENT_MATERIAL: &str = "Insufficient material";
pub const REASON_SEVENTY_FIVE_MOVE: &str = "75-move rule";

/// Whether the side to move can still play
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionStatus {
    Playing,
    Checkmate,
    Stalemate,
}

pub fn position_status(board: &Board, side_to_move: Color) -> PositionStatus {
    if has_legal_move(board, side_to_move) {
        PositionStatus::Playing
    } else if in_check(board, side_to_move) {
        PositionStatus::Checkmate
    } else {
        PositionStatus::Stalemate
    }
}

/// A fixed result with its human-readable reason
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Termination {
    pub result: MatchResult,
    pub reason: String,
}

impl Termination {
    pub fn new(result: MatchResult, reason: impl Into<String>) -> Self {
        Self {
            result,
            reason: reason.into(),
        }
    }

    pub fn draw(reason: impl Into<String>) -> Self {
        Self::new(MatchResult::Draw, reason)
    }

    pub fn win_for(color: Color, reason: impl Into<String>) -> Self {
        Self::new(MatchResult::win_for(color), reason)
    }
}

/// Decide whether the position reached after a move ends the match
///
/// `board` is the position after the move, `side_to_move` the side that must
/// reply, `repetitions` already includes `board`, and `halfmove_clock` counts
/// the move just applied.
pub fn adjudicate(
    board: &Board,
    side_to_move: Color,
    repetitions: &RepetitionTracker,
    halfmove_clock: u32,
) -> Option<Termination> {
    let status = position_status(board, side_to_move);
    if status == PositionStatus::Checkmate {
        return Some(Termination::win_for(side_to_move.other(), REASON_CHECKMATE));
    }

    if repetitions.is_threefold() {
        return Some(Termination::draw(REASON_THREEFOLD));
    }
    if is_insufficient_material(board) {
        return Some(Termination::draw(REASON_INSUFFICIENT_MATERIAL));
    }
    if status == PositionStatus::Stalemate {
        return Some(Termination::draw(REASON_STALEMATE));
    }
    if halfmove_clock >= NO_PROGRESS_HALFMOVE_LIMIT {
        return Some(Termination::draw(REASON_SEVENTY_FIVE_MOVE));
    }
    None
}
