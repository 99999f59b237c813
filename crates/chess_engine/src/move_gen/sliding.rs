//! Sliding piece move generation
//!
//! Common functionality for sliding pieces (bishops, rooks, queens).
//!
//! ## Algorithm
//!
//! Walk each direction one square at a time:
//! 1. Empty square: valid destination, keep going
//! 2. Enemy piece: valid capture, stop this direction
//! 3. Own piece: not a destination, stop this direction

use crate::board::Board;
use crate::constants::{BISHOP_DIRS, QUEEN_DIRS, ROOK_DIRS};
use crate::types::*;

pub fn generate_bishop_moves(board: &Board, from: Square, color: Color, moves: &mut Vec<Square>) {
    generate_sliding_moves(board, from, color, &BISHOP_DIRS, moves);
}

pub fn generate_rook_moves(board: &Board, from: Square, color: Color, moves: &mut Vec<Square>) {
    generate_sliding_moves(board, from, color, &ROOK_DIRS, moves);
}

pub fn generate_queen_moves(board: &Board, from: Square, color: Color, moves: &mut Vec<Square>) {
    generate_sliding_moves(board, from, color, &QUEEN_DIRS, moves);
}

/// Ray-cast along every direction in `dirs`
pub fn generate_sliding_moves(
    board: &Board,
    from: Square,
    color: Color,
    dirs: &[(i8, i8)],
    moves: &mut Vec<Square>,
) {
    for &(dr, dc) in dirs {
        let mut current = from;
        while let Some(next) = current.offset(dr, dc) {
            match board.color_at(next) {
                None => moves.push(next),
                Some(c) if c != color => {
                    moves.push(next);
                    break;
                }
                Some(_) => break,
            }
            current = next;
        }
    }
}

/// True if every square strictly between `from` and `to` is empty
///
/// `from` and `to` must share a row, column or diagonal.
pub fn is_path_clear(board: &Board, from: Square, to: Square) -> bool {
    let dr = (to.row as i8 - from.row as i8).signum();
    let dc = (to.col as i8 - from.col as i8).signum();

    let mut current = from;
    while let Some(next) = current.offset(dr, dc) {
        if next == to {
            return true;
        }
        if !board.is_empty(next) {
            return false;
        }
        current = next;
    }
    false
}
