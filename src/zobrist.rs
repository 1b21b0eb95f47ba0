//! Zobrist keys for position hashing.
//!
//! Keys are generated once from a fixed seed so hashes are reproducible
//! across runs. Every hashed feature has its own key table; a feature with
//! no value (empty hand, no en passant file) contributes nothing.

use once_cell::sync::Lazy;
use rand::prelude::*;

use crate::board::{Color, Figure, Piece, Square};

/// Substituted when a position hashes to zero, so zero can mean "no hash".
pub(crate) const ZERO_SUBSTITUTE: u64 = 0x7A3B_9C4D_1E5F_6071;

/// Largest hand count that gets a key (seirawan starts with one of each).
pub(crate) const MAX_HAND: usize = 4;

pub(crate) struct ZobristKeys {
    pub(crate) pieces: [[u64; 64]; Piece::COUNT],
    pub(crate) black_to_move: u64,
    /// Indexed by the full 4-bit castling mask.
    pub(crate) castling: [u64; 16],
    pub(crate) en_passant: [u64; 8],
    /// `hands[color][hawk=0 | elephant=1][count]`, count 0 has key 0.
    pub(crate) hands: [[[u64; MAX_HAND + 1]; 2]; 2],
    pub(crate) gates: [u64; 64],
    pub(crate) disabled_from: [u64; 64],
    pub(crate) disabled_to: [u64; 64],
}

impl ZobristKeys {
    fn new() -> Self {
        let mut rng = StdRng::seed_from_u64(1234567890_u64);
        let mut keys = ZobristKeys {
            pieces: [[0; 64]; Piece::COUNT],
            black_to_move: 0,
            castling: [0; 16],
            en_passant: [0; 8],
            hands: [[[0; MAX_HAND + 1]; 2]; 2],
            gates: [0; 64],
            disabled_from: [0; 64],
            disabled_to: [0; 64],
        };

        for piece in &mut keys.pieces {
            for key in piece.iter_mut() {
                *key = rng.gen();
            }
        }
        keys.black_to_move = rng.gen();

        // Castling keys are XOR-combined from one key per right.
        let rights: [u64; 4] = rng.gen();
        for (mask, key) in keys.castling.iter_mut().enumerate() {
            *key = (0..4)
                .filter(|bit| mask & (1 << bit) != 0)
                .fold(0, |acc, bit| acc ^ rights[bit]);
        }

        for key in &mut keys.en_passant {
            *key = rng.gen();
        }
        for color in &mut keys.hands {
            for figure in color.iter_mut() {
                for key in figure.iter_mut().skip(1) {
                    *key = rng.gen();
                }
            }
        }
        for sq in 0..64 {
            keys.gates[sq] = rng.gen();
            keys.disabled_from[sq] = rng.gen();
            keys.disabled_to[sq] = rng.gen();
        }
        keys
    }
}

pub(crate) static ZOBRIST: Lazy<ZobristKeys> = Lazy::new(ZobristKeys::new);

#[inline]
pub(crate) fn piece_key(piece: Piece, sq: Square) -> u64 {
    ZOBRIST.pieces[piece.index()][sq.index()]
}

/// Key for holding `count` of `figure` in hand. Only hawks and elephants are held.
#[inline]
pub(crate) fn hand_key(color: Color, figure: Figure, count: u8) -> u64 {
    let slot = match figure {
        Figure::Hawk => 0,
        Figure::Elephant => 1,
        _ => return 0,
    };
    ZOBRIST.hands[color.index()][slot][usize::from(count).min(MAX_HAND)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_deterministic_and_distinct() {
        let a = ZobristKeys::new();
        let b = ZobristKeys::new();
        assert_eq!(a.pieces[3][17], b.pieces[3][17]);
        assert_ne!(a.pieces[0][0], a.pieces[0][1]);
        assert_ne!(a.black_to_move, 0);
    }

    #[test]
    fn castling_keys_compose() {
        let k = &ZOBRIST.castling;
        assert_eq!(k[0], 0);
        assert_eq!(k[0b1111], k[0b0011] ^ k[0b1100]);
    }

    #[test]
    fn empty_hand_has_no_key() {
        assert_eq!(hand_key(Color::White, Figure::Hawk, 0), 0);
        assert_ne!(hand_key(Color::White, Figure::Hawk, 1), 0);
        assert_ne!(
            hand_key(Color::White, Figure::Hawk, 1),
            hand_key(Color::Black, Figure::Hawk, 1)
        );
        assert_eq!(hand_key(Color::White, Figure::Queen, 1), 0);
    }
}
