//! Rule engine for the match server
//!
//! Pure functions over an immutable [`Board`] value: per-piece move
//! generation with king-safety filtering, check and mate detection, draw
//! rules, short algebraic notation and the board wire format. Nothing here
//! performs I/O or holds shared state; the only mutable piece is the
//! per-match [`RepetitionTracker`], which its owner updates once per move.
//!
//! ## Module Organization
//!
//! - `types` - Colours, pieces, squares, moves and results
//! - `board` - The 8x8 grid, move application and serialization
//! - `move_gen` - Legal moves, attack detection, check and checkmate
//! - `draw` - Stalemate, insufficient material, repetition tracking
//! - `outcome` - Post-move adjudication in rule order
//! - `notation` - Move history text

pub mod board;
pub mod constants;
pub mod draw;
pub mod error;
pub mod move_gen;
pub mod notation;
pub mod outcome;
pub mod types;

pub use board::Board;
pub use draw::{
    is_insufficient_material, is_stalemate, RepetitionTracker, NO_PROGRESS_HALFMOVE_LIMIT,
    REPETITION_LIMIT,
};
pub use error::{ChessEngineError, ChessEngineResult};
pub use move_gen::{
    all_legal_moves, has_legal_move, in_check, is_checkmate, is_legal_move, is_square_attacked,
    legal_moves,
};
pub use notation::move_notation;
pub use outcome::{adjudicate, position_status, PositionStatus, Termination};
pub use types::{Color, MatchResult, Move, Piece, PieceKind, Square};
