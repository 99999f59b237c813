//! Short algebraic notation for the move history
//!
//! Piece letter (none for pawns), `x` on capture with the origin file for pawn
//! captures, the destination square, `=Q` on promotion and `+`/`#` when the
//! opponent is left in check or mated. Disambiguation between identical pieces
//! is not attempted.

use crate::board::Board;
use crate::move_gen::{has_legal_move, in_check};
use crate::types::*;

/// Notation for `mv` played on `before`
///
/// The move is assumed to be legal; an empty origin yields an empty string.
pub fn move_notation(before: &Board, mv: Move) -> String {
    let Some(piece) = before.piece_at(mv.from) else {
        return String::new();
    };
    let capture = before.piece_at(mv.to).is_some();
    let after = before.apply_move(mv);

    let mut notation = String::new();
    if piece.kind == PieceKind::Pawn {
        if capture {
            notation.push(mv.from.file_char());
        }
    } else {
        notation.push(piece.kind.code());
    }
    if capture {
        notation.push('x');
    }
    notation.push_str(&mv.to.algebraic());

    if piece.kind == PieceKind::Pawn && mv.to.row == piece.color.promotion_row() {
        notation.push_str("=Q");
    }

    let opponent = piece.color.other();
    if in_check(&after, opponent) {
        notation.push(if has_legal_move(&after, opponent) { '+' } else { '#' });
    }
    notation
}
