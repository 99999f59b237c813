//! Board representation and serialization
//!
//! The board is a plain 8x8 grid of optional pieces. It is `Copy`, and
//! [`Board::apply_move`] returns a fresh board instead of mutating in place, so
//! every position a match passes through is an independent snapshot.
//!
//! ## Serialization
//!
//! Rows are written top (row 0, rank 8) to bottom and joined with `/`. Each
//! cell is either `1` (empty) or a two-character piece code such as `wP` or
//! `bK`. The starting position serializes as:
//!
//! ```text
//! bRbNbBbQbKbBbNbR/bPbPbPbPbPbPbPbP/11111111/11111111/11111111/11111111/wPwPwPwPwPwPwPwP/wRwNwBwQwKwBwNwR
//! ```
//!
//! The same string doubles as the position fingerprint used for repetition
//! detection (side to move and counters are not part of it).

use std::fmt;
use std::str::FromStr;

use crate::error::{ChessEngineError, ChessEngineResult};
use crate::types::*;

pub const BOARD_SIZE: usize = 8;

const BACK_RANK: [PieceKind; BOARD_SIZE] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Board {
    cells: [[Option<Piece>; BOARD_SIZE]; BOARD_SIZE],
}

impl Default for Board {
    fn default() -> Self {
        Self::starting_position()
    }
}

impl Board {
    pub fn empty() -> Self {
        Self {
            cells: [[None; BOARD_SIZE]; BOARD_SIZE],
        }
    }

    /// Standard initial position
    pub fn starting_position() -> Self {
        let mut cells = [[None; BOARD_SIZE]; BOARD_SIZE];
        for (col, &kind) in BACK_RANK.iter().enumerate() {
            cells[0][col] = Some(Piece::new(Color::Black, kind));
            cells[1][col] = Some(Piece::new(Color::Black, PieceKind::Pawn));
            cells[6][col] = Some(Piece::new(Color::White, PieceKind::Pawn));
            cells[7][col] = Some(Piece::new(Color::White, kind));
        }
        Self { cells }
    }

    /// Build a position from explicit placements, later entries winning
    ///
    /// Squares off the board are skipped.
    pub fn from_placements(placements: &[(Square, Piece)]) -> Self {
        let mut board = Self::empty();
        for &(square, piece) in placements {
            if let Some(cell) = board.cell_mut(square) {
                *cell = Some(piece);
            }
        }
        board
    }

    fn cell_mut(&mut self, square: Square) -> Option<&mut Option<Piece>> {
        self.cells
            .get_mut(square.row as usize)?
            .get_mut(square.col as usize)
    }

    /// Piece on `square`; `None` for empty or off-board squares
    #[inline]
    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.cells
            .get(square.row as usize)
            .and_then(|row| row.get(square.col as usize))
            .copied()
            .flatten()
    }

    #[inline]
    pub fn is_empty(&self, square: Square) -> bool {
        self.piece_at(square).is_none()
    }

    /// Colour of the piece on `square`, if any
    #[inline]
    pub fn color_at(&self, square: Square) -> Option<Color> {
        self.piece_at(square).map(|p| p.color)
    }

    /// Every occupied square in row-major order
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.cells.iter().enumerate().flat_map(|(row, cells)| {
            cells.iter().enumerate().filter_map(move |(col, cell)| {
                cell.map(|piece| {
                    (
                        Square {
                            row: row as u8,
                            col: col as u8,
                        },
                        piece,
                    )
                })
            })
        })
    }

    pub fn pieces_of(&self, color: Color) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.pieces().filter(move |(_, p)| p.color == color)
    }

    pub fn find_king(&self, color: Color) -> Option<Square> {
        self.pieces_of(color)
            .find(|(_, p)| p.kind == PieceKind::King)
            .map(|(sq, _)| sq)
    }

    /// Produce the board after relocating the piece on `mv.from`
    ///
    /// The origin is cleared, whatever stood on the destination is replaced,
    /// and a pawn reaching its far rank becomes a queen. No legality checks are
    /// made here; callers validate with [`crate::move_gen::is_legal_move`]. An
    /// empty or off-board origin, or an off-board destination, yields an
    /// unchanged copy.
    pub fn apply_move(&self, mv: Move) -> Board {
        let mut next = *self;
        if next.cell_mut(mv.to).is_none() {
            return next;
        }
        let Some(mut piece) = next.cell_mut(mv.from).and_then(Option::take) else {
            return next;
        };

        if piece.kind == PieceKind::Pawn && mv.to.row == piece.color.promotion_row() {
            piece.kind = PieceKind::Queen;
        }
        if let Some(cell) = next.cell_mut(mv.to) {
            *cell = Some(piece);
        }
        next
    }

    /// Canonical position key for repetition tracking
    pub fn fingerprint(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (row, cells) in self.cells.iter().enumerate() {
            if row > 0 {
                f.write_str("/")?;
            }
            for cell in cells {
                match cell {
                    Some(piece) => write!(f, "{}{}", piece.color.code(), piece.kind.code())?,
                    None => f.write_str("1")?,
                }
            }
        }
        Ok(())
    }
}

impl FromStr for Board {
    type Err = ChessEngineError;

    fn from_str(text: &str) -> ChessEngineResult<Self> {
        let rows: Vec<&str> = text.trim().split('/').collect();
        if rows.len() != BOARD_SIZE {
            return Err(ChessEngineError::BoardRowCount { found: rows.len() });
        }

        let mut board = Board::empty();
        for (row, row_text) in rows.iter().enumerate() {
            let mut col = 0usize;
            let mut chars = row_text.chars();
            while let Some(ch) = chars.next() {
                let cell = match ch {
                    '1' => None,
                    _ => {
                        let kind_ch = chars.next();
                        let piece = Color::from_code(ch).zip(kind_ch.and_then(PieceKind::from_code));
                        match piece {
                            Some((color, kind)) => Some(Piece::new(color, kind)),
                            None => {
                                let mut code = ch.to_string();
                                code.extend(kind_ch);
                                return Err(ChessEngineError::UnknownPieceCode { row, code });
                            }
                        }
                    }
                };
                if col < BOARD_SIZE {
                    board.cells[row][col] = cell;
                }
                col += 1;
            }
            if col != BOARD_SIZE {
                return Err(ChessEngineError::BoardRowWidth { row, found: col });
            }
        }
        Ok(board)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const START: &str = "bRbNbBbQbKbBbNbR/bPbPbPbPbPbPbPbP/11111111/11111111/11111111/11111111/wPwPwPwPwPwPwPwP/wRwNwBwQwKwBwNwR";

    fn sq(row: u8, col: u8) -> Square {
        Square { row, col }
    }

    #[test]
    fn test_off_board_squares_are_ignored() {
        let king = Piece::new(Color::White, PieceKind::King);
        let board = Board::from_placements(&[(sq(9, 0), king), (sq(0, 8), king), (sq(7, 4), king)]);
        assert_eq!(board.pieces().count(), 1, "Only the on-board king is placed");
        assert_eq!(board.piece_at(sq(9, 0)), None);

        let off = Move::new(sq(7, 4), sq(8, 4));
        assert_eq!(board.apply_move(off), board, "Off-board destination changes nothing");
        let from_off = Move::new(sq(12, 4), sq(6, 4));
        assert_eq!(board.apply_move(from_off), board);
    }

    #[test]
    fn test_starting_position_serialization() {
        assert_eq!(Board::starting_position().to_string(), START);
    }

    #[test]
    fn test_parse_starting_position() {
        let board: Board = START.parse().expect("Should parse");
        assert_eq!(board, Board::starting_position());
    }

    #[test]
    fn test_kings_on_expected_squares() {
        let board = Board::starting_position();
        assert_eq!(board.find_king(Color::White), Some(sq(7, 4)));
        assert_eq!(board.find_king(Color::Black), Some(sq(0, 4)));
    }

    #[test]
    fn test_apply_move_leaves_original_untouched() {
        let board = Board::starting_position();
        let next = board.apply_move(Move::new(sq(6, 4), sq(4, 4)));

        assert_eq!(board, Board::starting_position(), "Original must not change");
        assert!(next.is_empty(sq(6, 4)), "Origin should be cleared");
        assert_eq!(
            next.piece_at(sq(4, 4)),
            Some(Piece::new(Color::White, PieceKind::Pawn))
        );
    }

    #[test]
    fn test_apply_move_promotes_to_queen() {
        let board = Board::from_placements(&[
            (sq(1, 0), Piece::new(Color::White, PieceKind::Pawn)),
            (sq(6, 7), Piece::new(Color::Black, PieceKind::Pawn)),
        ]);

        let white = board.apply_move(Move::new(sq(1, 0), sq(0, 0)));
        assert_eq!(
            white.piece_at(sq(0, 0)),
            Some(Piece::new(Color::White, PieceKind::Queen))
        );

        let black = board.apply_move(Move::new(sq(6, 7), sq(7, 7)));
        assert_eq!(
            black.piece_at(sq(7, 7)),
            Some(Piece::new(Color::Black, PieceKind::Queen))
        );
    }

    #[test]
    fn test_apply_move_from_empty_square_is_noop() {
        let board = Board::starting_position();
        assert_eq!(board.apply_move(Move::new(sq(4, 4), sq(3, 4))), board);
    }

    #[test]
    fn test_parse_rejects_bad_row_count() {
        assert_eq!(
            "11111111/11111111".parse::<Board>(),
            Err(ChessEngineError::BoardRowCount { found: 2 })
        );
    }

    #[test]
    fn test_parse_rejects_bad_row_width() {
        let text = "1111111/11111111/11111111/11111111/11111111/11111111/11111111/11111111";
        assert_eq!(
            text.parse::<Board>(),
            Err(ChessEngineError::BoardRowWidth { row: 0, found: 7 })
        );
    }

    #[test]
    fn test_parse_rejects_unknown_piece() {
        let text = "wX111111/11111111/11111111/11111111/11111111/11111111/11111111/11111111";
        assert!(matches!(
            text.parse::<Board>(),
            Err(ChessEngineError::UnknownPieceCode { row: 0, .. })
        ));
    }
}
