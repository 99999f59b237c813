//! Error types for the chess engine
//!
//! Covers the two pieces of untrusted input the engine parses: move wire
//! strings and board serializations.

use thiserror::Error;

/// Errors that can occur in the chess engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChessEngineError {
    /// Move string is not of the form `r,c->r,c`
    #[error("Malformed move: {input:?} (expected \"row,col->row,col\")")]
    MalformedMove { input: String },

    /// A coordinate parsed as an integer but lies outside the board
    #[error("Coordinate {value} out of range (must be 0-7)")]
    CoordinateOutOfRange { value: i64 },

    /// Board serialization does not contain 8 rows
    #[error("Board serialization has {found} rows (expected 8)")]
    BoardRowCount { found: usize },

    /// A serialized row does not describe exactly 8 cells
    #[error("Board row {row} describes {found} cells (expected 8)")]
    BoardRowWidth { row: usize, found: usize },

    /// Unknown piece code in a board serialization
    #[error("Unknown piece code {code:?} in board row {row}")]
    UnknownPieceCode { row: usize, code: String },
}

/// Result type alias for chess engine operations
pub type ChessEngineResult<T> = Result<T, ChessEngineError>;
