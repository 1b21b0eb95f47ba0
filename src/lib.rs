//! Bitboard chess engine core for standard chess, Chess960, atomic,
//! seirawan and eightpiece.
//!
//! - [`board`] - position, move generation, notation, evaluation and search
//! - [`engine`] - options, time management and the [`Engine`] facade
//! - [`tt`] and [`pawn_hash`] - search caches

pub mod board;
pub mod engine;
pub mod pawn_hash;
pub mod sync;
pub mod tt;
mod zobrist;

pub use board::search::{SearchResult, Searcher};
pub use board::{Color, Figure, GameStatus, Move, Piece, Position, Square, Variant};
pub use engine::Engine;
pub use tt::TranspositionTable;
