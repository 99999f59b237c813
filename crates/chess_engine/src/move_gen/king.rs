//! King move generation
//!
//! Kings move one square in any direction. Whether the destination is attacked
//! is not checked here; the legality filter in [`crate::move_gen`] rejects any
//! move that leaves the king in check. Castling is not supported.

use super::knight::generate_step_moves;
use crate::board::Board;
use crate::constants::KING_OFFSETS;
use crate::types::*;

pub fn generate_king_moves(board: &Board, from: Square, color: Color, moves: &mut Vec<Square>) {
    generate_step_moves(board, from, color, &KING_OFFSETS, moves);
}
