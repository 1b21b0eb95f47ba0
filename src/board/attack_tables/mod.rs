//! Attack tables for move generation.
//!
//! Leapers use plain lookup tables. Bishop and rook attacks use magic
//! bitboards; single-direction rays (lancers) are cast against `RAYS`.

mod magic;
mod tables;

pub(crate) use magic::{ray_attacks, slow_bishop_attacks, slow_rook_attacks};
pub(crate) use tables::{distance, king_attacks, knight_attacks, pawn_attacks, RAYS};

use crate::board::types::{Bitboard, Square};

#[inline]
pub(crate) fn bishop_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    magic::bishop_attacks(sq, occupied)
}

#[inline]
pub(crate) fn rook_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    magic::rook_attacks(sq, occupied)
}

#[inline]
pub(crate) fn queen_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    bishop_attacks(sq, occupied) | rook_attacks(sq, occupied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::types::Direction;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn sliders_match_ray_cast_on_random_boards() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..2000 {
            let occ = Bitboard(rng.gen::<u64>() & rng.gen::<u64>());
            let sq = Square::from_index(rng.gen_range(0..64));
            assert_eq!(rook_attacks(sq, occ), slow_rook_attacks(sq, occ));
            assert_eq!(bishop_attacks(sq, occ), slow_bishop_attacks(sq, occ));
        }
    }

    #[test]
    fn queen_on_empty_board() {
        let d4 = Square::new(3, 3);
        assert_eq!(queen_attacks(d4, Bitboard::EMPTY).popcount(), 27);
        assert_eq!(queen_attacks(Square::A1, Bitboard::EMPTY).popcount(), 21);
    }

    #[test]
    fn leapers() {
        assert_eq!(knight_attacks(Square::A1).popcount(), 2);
        assert_eq!(king_attacks(Square::new(3, 3)).popcount(), 8);
        assert_eq!(distance(Square::A1, Square::H8), 7);
        assert_eq!(distance(Square::E1, Square::E8), 7);
        assert_eq!(RAYS[Direction::North.index()][Square::A1.index()].popcount(), 7);
    }
}
