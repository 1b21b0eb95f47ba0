//! Chess board representation and game logic.
//!
//! One bitboard [`Position`] serves every supported [`Variant`]: standard
//! chess (including Chess960), atomic, seirawan and eightpiece.
//!
//! # Example
//! ```
//! use variant_chess_engine::board::{Position, Variant};
//!
//! let mut pos = Position::start(Variant::Standard);
//! let moves = pos.legal_moves();
//! println!("Starting position has {} legal moves", moves.len());
//! ```

mod attack_tables;
mod error;
pub mod eval;
mod fen;
mod make_unmake;
mod movegen;
mod san;
pub mod search;
mod state;
mod types;

#[cfg(test)]
mod tests;

pub use error::{FenError, MoveParseError, OptionError, SanError, SquareError, VariantError};
pub use state::{GameStatus, Position};
pub use types::{
    Bitboard, BitboardIter, CastleSide, CastlingRights, Color, Direction, Figure, Move, MoveKind,
    MoveType, Piece, Square, Variant, EIGHTPIECE_START_FEN, MAX_PLY, SEIRAWAN_START_FEN,
    STANDARD_START_FEN,
};
