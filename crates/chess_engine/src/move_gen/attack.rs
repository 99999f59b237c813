//! Attack detection and check queries
//!
//! A square is attacked when any enemy piece's *unfiltered* attack pattern
//! covers it. Pawns attack along their capture diagonals (never along their
//! push), sliding pieces need a clear ray, knights and kings use fixed offsets.
//!
//! ## Algorithm
//!
//! Iterate over the attacker's pieces and ask whether each one can reach the
//! target square. With at most 16 attackers this is cheaper than generating
//! every move and searching the result.

use super::pawn::pawn_attacks;
use super::sliding::is_path_clear;
use crate::board::Board;
use crate::types::*;

/// Check if `square` is under attack by pieces of `by_color`
///
/// # Examples
///
/// ```rust,ignore
/// // Is e4 covered by Black?
/// let attacked = is_square_attacked(&board, Square { row: 4, col: 4 }, Color::Black);
/// ```
pub fn is_square_attacked(board: &Board, square: Square, by_color: Color) -> bool {
    board
        .pieces_of(by_color)
        .any(|(from, piece)| can_attack(board, from, piece, square))
}

/// Check if the king of `color` is currently attacked
///
/// A position without a king of that colour is never "in check"; the engine
/// does not reconstruct missing kings.
pub fn in_check(board: &Board, color: Color) -> bool {
    board
        .find_king(color)
        .is_some_and(|king| is_square_attacked(board, king, color.other()))
}

fn can_attack(board: &Board, from: Square, piece: Piece, target: Square) -> bool {
    if from == target {
        return false;
    }

    let dr = (target.row as i8 - from.row as i8).abs();
    let dc = (target.col as i8 - from.col as i8).abs();

    match piece.kind {
        PieceKind::Pawn => pawn_attacks(from, piece.color).any(|sq| sq == target),
        PieceKind::Knight => (dr == 2 && dc == 1) || (dr == 1 && dc == 2),
        PieceKind::King => dr <= 1 && dc <= 1,
        PieceKind::Bishop => dr == dc && is_path_clear(board, from, target),
        PieceKind::Rook => (dr == 0 || dc == 0) && is_path_clear(board, from, target),
        PieceKind::Queen => {
            (dr == dc || dr == 0 || dc == 0) && is_path_clear(board, from, target)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(row: u8, col: u8) -> Square {
        Square { row, col }
    }

    fn piece(color: Color, kind: PieceKind) -> Piece {
        Piece::new(color, kind)
    }

    #[test]
    fn test_pawn_attacks_diagonally_not_forward() {
        let board = Board::from_placements(&[(sq(4, 4), piece(Color::White, PieceKind::Pawn))]);

        assert!(is_square_attacked(&board, sq(3, 3), Color::White));
        assert!(is_square_attacked(&board, sq(3, 5), Color::White));
        assert!(
            !is_square_attacked(&board, sq(3, 4), Color::White),
            "Pawn push square is not attacked"
        );
        assert!(
            !is_square_attacked(&board, sq(5, 3), Color::White),
            "Pawns do not attack backwards"
        );
    }

    #[test]
    fn test_black_pawn_attacks_towards_white() {
        let board = Board::from_placements(&[(sq(1, 4), piece(Color::Black, PieceKind::Pawn))]);
        assert!(is_square_attacked(&board, sq(2, 3), Color::Black));
        assert!(!is_square_attacked(&board, sq(0, 3), Color::Black));
    }

    #[test]
    fn test_rook_attack_blocked_by_any_piece() {
        let board = Board::from_placements(&[
            (sq(7, 0), piece(Color::Black, PieceKind::Rook)),
            (sq(4, 0), piece(Color::Black, PieceKind::Pawn)),
        ]);
        assert!(is_square_attacked(&board, sq(5, 0), Color::Black));
        assert!(is_square_attacked(&board, sq(4, 0), Color::Black));
        assert!(
            !is_square_attacked(&board, sq(3, 0), Color::Black),
            "Ray stops at the blocker"
        );
    }

    #[test]
    fn test_knight_jumps_over_pieces() {
        let mut placements = vec![(sq(7, 1), piece(Color::White, PieceKind::Knight))];
        for col in 0..3 {
            placements.push((sq(6, col), piece(Color::White, PieceKind::Pawn)));
        }
        let board = Board::from_placements(&placements);
        assert!(is_square_attacked(&board, sq(5, 2), Color::White));
        assert!(is_square_attacked(&board, sq(5, 0), Color::White));
    }

    #[test]
    fn test_in_check_from_queen_diagonal() {
        let board = Board::from_placements(&[
            (sq(7, 4), piece(Color::White, PieceKind::King)),
            (sq(4, 7), piece(Color::Black, PieceKind::Queen)),
            (sq(0, 4), piece(Color::Black, PieceKind::King)),
        ]);
        assert!(in_check(&board, Color::White));
        assert!(!in_check(&board, Color::Black));
    }

    #[test]
    fn test_missing_king_is_not_in_check() {
        let board = Board::from_placements(&[(sq(0, 0), piece(Color::Black, PieceKind::Queen))]);
        assert!(!in_check(&board, Color::White));
    }
}
