//! Core chess types shared by the board, move generation and the match server
//!
//! ## Coordinates
//!
//! Squares are addressed as `(row, col)` pairs in `0..8`. Row 0 is Black's back
//! rank (rank 8) and row 7 is White's back rank (rank 1), so White pawns travel
//! towards row 0 and Black pawns towards row 7. Column 0 is the a-file.
//!
//! ## Wire form
//!
//! A [`Move`] travels over the network as `"fromRow,fromCol->toRow,toCol"`,
//! e.g. `"6,4->4,4"` for e2-e4. Parsing is strict: anything that is not two
//! comma-separated integer pairs joined by `->` is rejected, as is any
//! coordinate outside `0..8`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ChessEngineError, ChessEngineResult};

/// Side of the board
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub const ALL: [Color; 2] = [Color::White, Color::Black];

    pub fn other(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    pub fn idx(self) -> usize {
        match self {
            Color::White => 0,
            Color::Black => 1,
        }
    }

    /// Row delta of a single pawn step
    pub fn pawn_direction(self) -> i8 {
        match self {
            Color::White => -1,
            Color::Black => 1,
        }
    }

    /// Row on which this side's pawns start (double push allowed from here)
    pub fn pawn_start_row(self) -> u8 {
        match self {
            Color::White => 6,
            Color::Black => 1,
        }
    }

    /// Far rank where this side's pawns promote
    pub fn promotion_row(self) -> u8 {
        match self {
            Color::White => 0,
            Color::Black => 7,
        }
    }

    /// Single-letter prefix used in board serialization (`w` / `b`)
    pub fn code(self) -> char {
        match self {
            Color::White => 'w',
            Color::Black => 'b',
        }
    }

    pub fn from_code(code: char) -> Option<Color> {
        match code {
            'w' => Some(Color::White),
            'b' => Some(Color::Black),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Color::White => "white",
            Color::Black => "black",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    pub fn code(self) -> char {
        match self {
            PieceKind::Pawn => 'P',
            PieceKind::Knight => 'N',
            PieceKind::Bishop => 'B',
            PieceKind::Rook => 'R',
            PieceKind::Queen => 'Q',
            PieceKind::King => 'K',
        }
    }

    pub fn from_code(code: char) -> Option<PieceKind> {
        match code {
            'P' => Some(PieceKind::Pawn),
            'N' => Some(PieceKind::Knight),
            'B' => Some(PieceKind::Bishop),
            'R' => Some(PieceKind::Rook),
            'Q' => Some(PieceKind::Queen),
            'K' => Some(PieceKind::King),
            _ => None,
        }
    }

    /// Knights and bishops
    pub fn is_minor(self) -> bool {
        matches!(self, PieceKind::Knight | PieceKind::Bishop)
    }
}

/// A coloured piece occupying a square
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub color: Color,
    pub kind: PieceKind,
}

impl Piece {
    pub const fn new(color: Color, kind: PieceKind) -> Self {
        Self { color, kind }
    }

    /// Two-character code such as `wP` or `bK`
    pub fn code(self) -> String {
        let mut code = String::with_capacity(2);
        code.push(self.color.code());
        code.push(self.kind.code());
        code
    }
}

/// A cell on the 8x8 grid
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Square {
    pub row: u8,
    pub col: u8,
}

impl Square {
    /// Returns `None` when either coordinate falls outside the board
    pub fn new(row: u8, col: u8) -> Option<Square> {
        (row < 8 && col < 8).then_some(Square { row, col })
    }

    /// Step by a signed delta, staying on the board
    pub fn offset(self, d_row: i8, d_col: i8) -> Option<Square> {
        let row = self.row as i8 + d_row;
        let col = self.col as i8 + d_col;
        if (0..8).contains(&row) && (0..8).contains(&col) {
            Some(Square {
                row: row as u8,
                col: col as u8,
            })
        } else {
            None
        }
    }

    /// Algebraic name, e.g. `e4`
    pub fn algebraic(self) -> String {
        let file = (b'a' + self.col) as char;
        let rank = (b'8' - self.row) as char;
        format!("{file}{rank}")
    }

    pub fn file_char(self) -> char {
        (b'a' + self.col) as char
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.row, self.col)
    }
}

/// A move as submitted by a player
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub from: Square,
    pub to: Square,
}

impl Move {
    pub fn new(from: Square, to: Square) -> Self {
        Self { from, to }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}", self.from, self.to)
    }
}

impl FromStr for Move {
    type Err = ChessEngineError;

    fn from_str(input: &str) -> ChessEngineResult<Self> {
        let malformed = || ChessEngineError::MalformedMove {
            input: input.to_string(),
        };

        let (from, to) = input.split_once("->").ok_or_else(malformed)?;
        if to.contains("->") {
            return Err(malformed());
        }

        let from = parse_square(from).ok_or_else(malformed)??;
        let to = parse_square(to).ok_or_else(malformed)??;
        Ok(Move { from, to })
    }
}

/// Outer `None` means the text is not an integer pair at all; the inner
/// result reports out-of-range coordinates.
fn parse_square(text: &str) -> Option<ChessEngineResult<Square>> {
    let (row, col) = text.split_once(',')?;
    let row: i64 = row.trim().parse().ok()?;
    let col: i64 = col.trim().parse().ok()?;

    for value in [row, col] {
        if !(0..8).contains(&value) {
            return Some(Err(ChessEngineError::CoordinateOutOfRange { value }));
        }
    }
    Some(Ok(Square {
        row: row as u8,
        col: col as u8,
    }))
}

/// Final score of a match
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchResult {
    #[serde(rename = "1-0")]
    WhiteWins,
    #[serde(rename = "0-1")]
    BlackWins,
    #[serde(rename = "1/2-1/2")]
    Draw,
}

impl MatchResult {
    pub fn win_for(color: Color) -> MatchResult {
        match color {
            Color::White => MatchResult::WhiteWins,
            Color::Black => MatchResult::BlackWins,
        }
    }

    pub fn winner(self) -> Option<Color> {
        match self {
            MatchResult::WhiteWins => Some(Color::White),
            MatchResult::BlackWins => Some(Color::Black),
            MatchResult::Draw => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MatchResult::WhiteWins => "1-0",
            MatchResult::BlackWins => "0-1",
            MatchResult::Draw => "1/2-1/2",
        }
    }
}

impl fmt::Display for MatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
