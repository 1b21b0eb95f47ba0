//! Square type.

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::bitboard::Bitboard;
use super::piece::Color;
use crate::board::error::SquareError;

/// A square on the board, `0..64` with a1 = 0, h1 = 7 and h8 = 63.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Square(u8);

impl Square {
    pub const A1: Square = Square(0);
    pub const B1: Square = Square(1);
    pub const C1: Square = Square(2);
    pub const D1: Square = Square(3);
    pub const E1: Square = Square(4);
    pub const F1: Square = Square(5);
    pub const G1: Square = Square(6);
    pub const H1: Square = Square(7);
    pub const A8: Square = Square(56);
    pub const B8: Square = Square(57);
    pub const C8: Square = Square(58);
    pub const D8: Square = Square(59);
    pub const E8: Square = Square(60);
    pub const F8: Square = Square(61);
    pub const G8: Square = Square(62);
    pub const H8: Square = Square(63);

    /// Create a square from rank and file (both `0..8`).
    #[inline]
    #[must_use]
    pub const fn new(rank: usize, file: usize) -> Self {
        debug_assert!(rank < 8 && file < 8);
        Square((rank * 8 + file) as u8)
    }

    /// Create a square from a `0..64` index.
    #[inline]
    #[must_use]
    pub const fn from_index(index: usize) -> Self {
        debug_assert!(index < 64);
        Square(index as u8)
    }

    /// Square at `(rank, file)` if both are on the board.
    #[inline]
    #[must_use]
    pub const fn try_new(rank: i32, file: i32) -> Option<Self> {
        if rank >= 0 && rank < 8 && file >= 0 && file < 8 {
            Some(Square((rank * 8 + file) as u8))
        } else {
            None
        }
    }

    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Rank, 0 = rank 1.
    #[inline]
    #[must_use]
    pub const fn rank(self) -> usize {
        (self.0 >> 3) as usize
    }

    /// File, 0 = file a.
    #[inline]
    #[must_use]
    pub const fn file(self) -> usize {
        (self.0 & 7) as usize
    }

    /// Rank as seen from `color`'s side of the board.
    #[inline]
    #[must_use]
    pub const fn relative_rank(self, color: Color) -> usize {
        match color {
            Color::White => self.rank(),
            Color::Black => 7 - self.rank(),
        }
    }

    #[inline]
    #[must_use]
    pub const fn bitboard(self) -> Bitboard {
        Bitboard(1u64 << self.0)
    }

    /// The square `dr` ranks and `df` files away, if it exists.
    #[inline]
    #[must_use]
    pub const fn offset(self, dr: i32, df: i32) -> Option<Square> {
        Square::try_new(self.rank() as i32 + dr, self.file() as i32 + df)
    }

    /// Mirror across the horizontal axis (a1 <-> a8).
    #[inline]
    #[must_use]
    pub const fn flip(self) -> Square {
        Square(self.0 ^ 56)
    }

    /// All 64 squares in index order.
    pub fn all() -> impl Iterator<Item = Square> {
        (0..64u8).map(Square)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file = (b'a' + self.file() as u8) as char;
        let rank = (b'1' + self.rank() as u8) as char;
        write!(f, "{file}{rank}")
    }
}

impl FromStr for Square {
    type Err = SquareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return Err(SquareError::InvalidLength { len: s.len() });
        }
        let file = bytes[0];
        let rank = bytes[1];
        if !(b'a'..=b'h').contains(&file) {
            return Err(SquareError::InvalidFile { char: file as char });
        }
        if !(b'1'..=b'8').contains(&rank) {
            return Err(SquareError::InvalidRank { char: rank as char });
        }
        Ok(Square::new((rank - b'1') as usize, (file - b'a') as usize))
    }
}

impl TryFrom<&str> for Square {
    type Error = SquareError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        s.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_layout() {
        assert_eq!(Square::new(0, 0).index(), 0);
        assert_eq!(Square::new(3, 4).index(), 28);
        assert_eq!(Square::from_index(63).rank(), 7);
        assert_eq!(Square::from_index(63).file(), 7);
    }

    #[test]
    fn parse_and_display() {
        let sq: Square = "e4".parse().unwrap();
        assert_eq!(sq, Square::new(3, 4));
        assert_eq!(sq.to_string(), "e4");
        assert_eq!("i1".parse::<Square>(), Err(SquareError::InvalidFile { char: 'i' }));
        assert_eq!("a9".parse::<Square>(), Err(SquareError::InvalidRank { char: '9' }));
        assert_eq!("a".parse::<Square>(), Err(SquareError::InvalidLength { len: 1 }));
    }

    #[test]
    fn offsets_stay_on_board() {
        assert_eq!(Square::A1.offset(-1, 0), None);
        assert_eq!(Square::H1.offset(0, 1), None);
        assert_eq!(Square::A1.offset(2, 1), Some(Square::new(2, 1)));
        assert_eq!(Square::E1.flip(), Square::E8);
    }

    #[test]
    fn relative_rank_mirrors_for_black() {
        let sq = Square::new(1, 3);
        assert_eq!(sq.relative_rank(Color::White), 1);
        assert_eq!(sq.relative_rank(Color::Black), 6);
    }
}
