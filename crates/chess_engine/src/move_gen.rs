//! Legal move generation
//!
//! Per-piece generators in the submodules produce *pseudo-legal* destinations
//! (geometry and occupancy only). This module filters them by playing each
//! candidate on a copy of the board and discarding any that leave the mover's
//! own king attacked.
//!
//! A request for a square that is empty, or that holds a piece of the side not
//! to move, yields no moves. Callers treat that as an illegal move.

mod attack;
mod king;
mod knight;
mod pawn;
mod sliding;

pub use attack::{in_check, is_square_attacked};
pub use sliding::is_path_clear;

use crate::board::Board;
use crate::types::*;

/// Destinations reachable by the piece on `from` before the king-safety filter
pub fn pseudo_legal_moves(board: &Board, from: Square) -> Vec<Square> {
    let mut moves = Vec::new();
    let Some(piece) = board.piece_at(from) else {
        return moves;
    };

    match piece.kind {
        PieceKind::Pawn => pawn::generate_pawn_moves(board, from, piece.color, &mut moves),
        PieceKind::Knight => knight::generate_knight_moves(board, from, piece.color, &mut moves),
        PieceKind::Bishop => sliding::generate_bishop_moves(board, from, piece.color, &mut moves),
        PieceKind::Rook => sliding::generate_rook_moves(board, from, piece.color, &mut moves),
        PieceKind::Queen => sliding::generate_queen_moves(board, from, piece.color, &mut moves),
        PieceKind::King => king::generate_king_moves(board, from, piece.color, &mut moves),
    }
    moves
}

/// Legal destinations for the piece on `from` when `side_to_move` is on move
pub fn legal_moves(board: &Board, from: Square, side_to_move: Color) -> Vec<Square> {
    if board.color_at(from) != Some(side_to_move) {
        return Vec::new();
    }

    pseudo_legal_moves(board, from)
        .into_iter()
        .filter(|&to| !leaves_king_in_check(board, Move::new(from, to), side_to_move))
        .collect()
}

/// Every legal move for `side`
pub fn all_legal_moves(board: &Board, side: Color) -> Vec<Move> {
    board
        .pieces_of(side)
        .flat_map(|(from, _)| {
            legal_moves(board, from, side)
                .into_iter()
                .map(move |to| Move::new(from, to))
        })
        .collect()
}

/// Short-circuiting variant of `!all_legal_moves(..).is_empty()`
pub fn has_legal_move(board: &Board, side: Color) -> bool {
    board
        .pieces_of(side)
        .any(|(from, _)| !legal_moves(board, from, side).is_empty())
}

pub fn is_legal_move(board: &Board, mv: Move, side_to_move: Color) -> bool {
    legal_moves(board, mv.from, side_to_move).contains(&mv.to)
}

/// In check with no legal move
pub fn is_checkmate(board: &Board, side: Color) -> bool {
    in_check(board, side) && !has_legal_move(board, side)
}

fn leaves_king_in_check(board: &Board, mv: Move, mover: Color) -> bool {
    in_check(&board.apply_move(mv), mover)
}
