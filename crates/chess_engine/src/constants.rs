//! Movement direction vectors
//!
//! Offsets are `(row_delta, col_delta)` pairs on the 8x8 grid. Row deltas are
//! negative towards Black's back rank (row 0).

/// The eight L-shaped knight jumps
pub const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (-2, -1),
    (-2, 1),
    (2, -1),
    (2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
];

/// The eight squares surrounding a king
pub const KING_OFFSETS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Rook rays: north, south, west, east
pub const ROOK_DIRS: [(i8, i8); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Bishop rays: the four diagonals
pub const BISHOP_DIRS: [(i8, i8); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];

/// Queen rays: rook and bishop combined
pub const QUEEN_DIRS: [(i8, i8); 8] = KING_OFFSETS;

/// Columns a pawn captures towards
pub const PAWN_CAPTURE_COLS: [i8; 2] = [-1, 1];
