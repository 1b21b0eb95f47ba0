//! Board module tests.
//!
//! Tests are organized into separate files by category:
//! - `perft.rs` - Move generator node counts
//! - `draw.rs` - Draw detection (50-move, repetition, insufficient material)
//! - `make_unmake.rs` - Make/unmake move correctness on random games
//! - `edge_cases.rs` - Special positions and edge cases
//! - `variants.rs` - Atomic, seirawan and eightpiece rules
//! - `proptest.rs` - Property-based tests

mod edge_cases;
mod make_unmake;
mod perft;

use rand::prelude::*;

use crate::board::{Move, Position, Variant};

pub(super) fn fen(s: &str) -> Position {
    Position::from_fen(s, Variant::Standard).expect("valid test FEN")
}

pub(super) fn play(pos: &mut Position, moves: &[&str]) {
    for uci in moves {
        let m = pos
            .parse_uci(uci)
            .unwrap_or_else(|e| panic!("{uci} in {}: {e}", pos.to_fen()));
        pos.do_move(m);
    }
}

pub(super) fn find(pos: &mut Position, uci: &str) -> Move {
    pos.legal_moves()
        .into_iter()
        .find(|m| m.uci(pos.is_chess960()) == uci)
        .unwrap_or_else(|| panic!("{uci} not legal in {}", pos.to_fen()))
}

/// Play up to `plies` random legal moves. Returns the number played.
pub(super) fn random_playout(pos: &mut Position, rng: &mut StdRng, plies: usize) -> usize {
    for played in 0..plies {
        let moves = pos.legal_moves();
        let Some(&m) = moves.choose(rng) else {
            return played;
        };
        pos.do_move(m);
    }
    plies
}
