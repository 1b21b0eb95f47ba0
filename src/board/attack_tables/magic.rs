//! Magic bitboards for bishop and rook attacks.
//!
//! Magics are searched at first use with a seeded generator, so the tables
//! are identical on every run. Each square's relevant-occupancy mask is
//! multiplied by its magic and shifted down to index a dense attack slice.

use once_cell::sync::Lazy;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::tables::RAYS;
use crate::board::types::{Bitboard, Direction, Square};

const MAGIC_SEED: u64 = 0x5EED_0F_B1_7B0A_4D;

const ROOK_DIRECTIONS: [Direction; 4] = [
    Direction::North,
    Direction::East,
    Direction::South,
    Direction::West,
];

const BISHOP_DIRECTIONS: [Direction; 4] = [
    Direction::NorthEast,
    Direction::SouthEast,
    Direction::SouthWest,
    Direction::NorthWest,
];

#[derive(Clone, Copy, Default)]
struct Magic {
    mask: u64,
    magic: u64,
    shift: u32,
    offset: usize,
}

pub(crate) struct MagicTable {
    entries: [Magic; 64],
    attacks: Vec<Bitboard>,
}

impl MagicTable {
    #[inline]
    pub(crate) fn attacks(&self, sq: Square, occupied: Bitboard) -> Bitboard {
        let m = &self.entries[sq.index()];
        let index = ((occupied.0 & m.mask).wrapping_mul(m.magic) >> m.shift) as usize;
        self.attacks[m.offset + index]
    }

    fn build(directions: &[Direction; 4], rng: &mut StdRng) -> Self {
        let mut entries = [Magic::default(); 64];
        let mut attacks = Vec::new();

        for sq in Square::all() {
            let mask = relevant_mask(sq, directions);
            let bits = mask.count_ones();
            let shift = 64 - bits;

            let occupancies = enumerate_subsets(mask);
            let reference: Vec<Bitboard> = occupancies
                .iter()
                .map(|&occ| slow_attacks(sq, Bitboard(occ), directions))
                .collect();

            let size = 1usize << bits;
            let mut table = vec![Bitboard::EMPTY; size];
            let mut epoch = vec![0u32; size];
            let mut attempt = 0u32;

            let magic = loop {
                let candidate = rng.gen::<u64>() & rng.gen::<u64>() & rng.gen::<u64>();
                if (mask.wrapping_mul(candidate) >> 56).count_ones() < 6 {
                    continue;
                }
                attempt += 1;
                let mut ok = true;
                for (occ, attack) in occupancies.iter().zip(&reference) {
                    let idx = (occ.wrapping_mul(candidate) >> shift) as usize;
                    if epoch[idx] < attempt {
                        epoch[idx] = attempt;
                        table[idx] = *attack;
                    } else if table[idx] != *attack {
                        ok = false;
                        break;
                    }
                }
                if ok {
                    break candidate;
                }
            };

            entries[sq.index()] = Magic {
                mask,
                magic,
                shift,
                offset: attacks.len(),
            };
            attacks.extend_from_slice(&table);
        }

        MagicTable { entries, attacks }
    }
}

/// Squares whose occupancy can change the attack set, board edges excluded.
fn relevant_mask(sq: Square, directions: &[Direction; 4]) -> u64 {
    let mut mask = 0u64;
    for &dir in directions {
        let ray = RAYS[dir.index()][sq.index()];
        let edge = match dir {
            Direction::North => Bitboard::RANK_8,
            Direction::South => Bitboard::RANK_1,
            Direction::East => Bitboard::FILE_H,
            Direction::West => Bitboard::FILE_A,
            _ => Bitboard::RANK_1 | Bitboard::RANK_8 | Bitboard::FILE_A | Bitboard::FILE_H,
        };
        mask |= (ray & !edge).0;
    }
    mask
}

/// Every subset of `mask` (Carry-Rippler enumeration).
fn enumerate_subsets(mask: u64) -> Vec<u64> {
    let mut subsets = Vec::with_capacity(1 << mask.count_ones());
    let mut subset = 0u64;
    loop {
        subsets.push(subset);
        subset = subset.wrapping_sub(mask) & mask;
        if subset == 0 {
            break;
        }
    }
    subsets
}

/// Attacks along one direction up to and including the first blocker.
#[inline]
pub(crate) fn ray_attacks(dir: Direction, sq: Square, occupied: Bitboard) -> Bitboard {
    let ray = RAYS[dir.index()][sq.index()];
    let blockers = ray & occupied;
    let first = if dir.is_increasing() {
        blockers.lsb()
    } else {
        blockers.msb()
    };
    match first {
        Some(b) => ray ^ RAYS[dir.index()][b.index()],
        None => ray,
    }
}

/// Ray-cast reference for sliders.
pub(crate) fn slow_attacks(sq: Square, occupied: Bitboard, directions: &[Direction; 4]) -> Bitboard {
    directions
        .iter()
        .fold(Bitboard::EMPTY, |acc, &dir| acc | ray_attacks(dir, sq, occupied))
}

pub(crate) fn slow_rook_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    slow_attacks(sq, occupied, &ROOK_DIRECTIONS)
}

pub(crate) fn slow_bishop_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    slow_attacks(sq, occupied, &BISHOP_DIRECTIONS)
}

struct Magics {
    rook: MagicTable,
    bishop: MagicTable,
}

static MAGICS: Lazy<Magics> = Lazy::new(|| {
    let mut rng = StdRng::seed_from_u64(MAGIC_SEED);
    let rook = MagicTable::build(&ROOK_DIRECTIONS, &mut rng);
    let bishop = MagicTable::build(&BISHOP_DIRECTIONS, &mut rng);
    Magics { rook, bishop }
});

#[inline]
pub(crate) fn rook_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    MAGICS.rook.attacks(sq, occupied)
}

#[inline]
pub(crate) fn bishop_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    MAGICS.bishop.attacks(sq, occupied)
}
