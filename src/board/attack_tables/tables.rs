//! Precomputed attack tables for leapers, rays and king distance.

use once_cell::sync::Lazy;

use crate::board::types::{Bitboard, Color, Direction, Square};

const KNIGHT_DELTAS: [(i32, i32); 8] = [
    (2, 1),
    (1, 2),
    (-1, 2),
    (-2, 1),
    (-2, -1),
    (-1, -2),
    (1, -2),
    (2, -1),
];

const KING_DELTAS: [(i32, i32); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

fn leaper_table(deltas: &[(i32, i32)]) -> [Bitboard; 64] {
    let mut table = [Bitboard::EMPTY; 64];
    for sq in Square::all() {
        for &(dr, df) in deltas {
            if let Some(to) = sq.offset(dr, df) {
                table[sq.index()] |= to.bitboard();
            }
        }
    }
    table
}

pub(crate) static KNIGHT_ATTACKS: Lazy<[Bitboard; 64]> = Lazy::new(|| leaper_table(&KNIGHT_DELTAS));

pub(crate) static KING_ATTACKS: Lazy<[Bitboard; 64]> = Lazy::new(|| leaper_table(&KING_DELTAS));

/// `PAWN_ATTACKS[color][sq]`: squares a pawn of `color` on `sq` attacks.
pub(crate) static PAWN_ATTACKS: Lazy<[[Bitboard; 64]; 2]> = Lazy::new(|| {
    [
        leaper_table(&[(1, -1), (1, 1)]),
        leaper_table(&[(-1, -1), (-1, 1)]),
    ]
});

/// `RAYS[dir][sq]`: squares strictly beyond `sq` in `dir` up to the edge.
pub(crate) static RAYS: Lazy<[[Bitboard; 64]; 8]> = Lazy::new(|| {
    let mut rays = [[Bitboard::EMPTY; 64]; 8];
    for dir in Direction::ALL {
        let (dr, df) = dir.delta();
        for sq in Square::all() {
            let mut cur = sq.offset(dr, df);
            while let Some(s) = cur {
                rays[dir.index()][sq.index()] |= s.bitboard();
                cur = s.offset(dr, df);
            }
        }
    }
    rays
});

/// King-step (Chebyshev) distance between every pair of squares.
pub(crate) static DISTANCE: Lazy<[[u8; 64]; 64]> = Lazy::new(|| {
    let mut dist = [[0u8; 64]; 64];
    for a in Square::all() {
        for b in Square::all() {
            let dr = a.rank().abs_diff(b.rank());
            let df = a.file().abs_diff(b.file());
            dist[a.index()][b.index()] = dr.max(df) as u8;
        }
    }
    dist
});

#[inline]
pub(crate) fn pawn_attacks(color: Color, sq: Square) -> Bitboard {
    PAWN_ATTACKS[color.index()][sq.index()]
}

#[inline]
pub(crate) fn knight_attacks(sq: Square) -> Bitboard {
    KNIGHT_ATTACKS[sq.index()]
}

#[inline]
pub(crate) fn king_attacks(sq: Square) -> Bitboard {
    KING_ATTACKS[sq.index()]
}

#[inline]
pub(crate) fn distance(a: Square, b: Square) -> i32 {
    i32::from(DISTANCE[a.index()][b.index()])
}
