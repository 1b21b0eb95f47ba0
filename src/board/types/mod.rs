//! Core value types.
//!
//! - `Square` and `Bitboard` - board geometry
//! - `Color`, `Figure`, `Piece` and lancer `Direction`
//! - `Move` - packed move value and generator categories
//! - `CastlingRights` - castling state
//! - `Variant` - rule set selector

mod bitboard;
mod castling;
mod moves;
mod piece;
mod square;
mod variant;

pub use bitboard::{Bitboard, BitboardIter};
pub use castling::{CastleSide, CastlingRights};
pub use moves::{Move, MoveKind, MoveType, MAX_PLY};
pub use piece::{Color, Direction, Figure, Piece};
pub use square::Square;
pub use variant::{Variant, EIGHTPIECE_START_FEN, SEIRAWAN_START_FEN, STANDARD_START_FEN};
