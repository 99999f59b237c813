//! Pawn move generation
//!
//! ## Pawn Movement Rules
//!
//! - **Forward push**: one square forward onto an empty square
//! - **Double push**: two squares from the starting row, both squares empty
//! - **Captures**: one square diagonally forward, only onto an enemy piece
//! - **Promotion**: always to a queen, applied by [`crate::board::Board::apply_move`]
//!
//! En passant is not supported.

use crate::board::Board;
use crate::constants::PAWN_CAPTURE_COLS;
use crate::types::*;

/// Generate pawn destinations from `from`
///
/// # Arguments
///
/// * `board` - Position to generate on
/// * `from` - Square holding the pawn
/// * `color` - Colour of the pawn
/// * `moves` - Output vector to append destinations to
pub fn generate_pawn_moves(board: &Board, from: Square, color: Color, moves: &mut Vec<Square>) {
    let dir = color.pawn_direction();

    if let Some(one) = from.offset(dir, 0) {
        if board.is_empty(one) {
            moves.push(one);

            if from.row == color.pawn_start_row() {
                if let Some(two) = from.offset(2 * dir, 0) {
                    if board.is_empty(two) {
                        moves.push(two);
                    }
                }
            }
        }
    }

    for target in pawn_attacks(from, color) {
        if board.color_at(target) == Some(color.other()) {
            moves.push(target);
        }
    }
}

/// Squares a pawn on `from` attacks, regardless of occupancy
pub fn pawn_attacks(from: Square, color: Color) -> impl Iterator<Item = Square> {
    let dir = color.pawn_direction();
    PAWN_CAPTURE_COLS
        .into_iter()
        .filter_map(move |dc| from.offset(dir, dc))
}
