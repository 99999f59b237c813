//! Knight move generation
//!
//! Knights jump in an L-shape and ignore anything standing in between. A
//! destination is valid when it is empty or holds an enemy piece.

use crate::board::Board;
use crate::constants::KNIGHT_OFFSETS;
use crate::types::*;

pub fn generate_knight_moves(board: &Board, from: Square, color: Color, moves: &mut Vec<Square>) {
    generate_step_moves(board, from, color, &KNIGHT_OFFSETS, moves);
}

/// Shared by knights and kings: single-step jumps to a fixed offset set
pub(crate) fn generate_step_moves(
    board: &Board,
    from: Square,
    color: Color,
    offsets: &[(i8, i8)],
    moves: &mut Vec<Square>,
) {
    for &(dr, dc) in offsets {
        if let Some(to) = from.offset(dr, dc) {
            if board.color_at(to) != Some(color) {
                moves.push(to);
            }
        }
    }
}
