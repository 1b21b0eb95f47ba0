//! Castling rights type.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::piece::Color;

/// Which wing a castling move goes to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CastleSide {
    King,
    Queen,
}

impl CastleSide {
    pub const ALL: [CastleSide; 2] = [CastleSide::King, CastleSide::Queen];

    /// Destination files of king and rook.
    #[inline]
    #[must_use]
    pub const fn destination_files(self) -> (usize, usize) {
        match self {
            CastleSide::King => (6, 5),
            CastleSide::Queen => (2, 3),
        }
    }
}

/// Castling rights represented as a 4-bit mask
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CastlingRights(u8);

impl CastlingRights {
    pub const NONE: CastlingRights = CastlingRights(0);
    pub const WHITE_OO: CastlingRights = CastlingRights(1 << 0);
    pub const WHITE_OOO: CastlingRights = CastlingRights(1 << 1);
    pub const BLACK_OO: CastlingRights = CastlingRights(1 << 2);
    pub const BLACK_OOO: CastlingRights = CastlingRights(1 << 3);
    pub const ALL: CastlingRights = CastlingRights(0xF);

    /// The single right for `color` castling to `side`.
    #[inline]
    #[must_use]
    pub const fn right(color: Color, side: CastleSide) -> Self {
        CastlingRights(1 << Self::slot(color, side))
    }

    /// Index `0..4` of a single right, used for per-right tables.
    #[inline]
    #[must_use]
    pub const fn slot(color: Color, side: CastleSide) -> usize {
        color.index() * 2
            + match side {
                CastleSide::King => 0,
                CastleSide::Queen => 1,
            }
    }

    /// Both rights of `color`.
    #[inline]
    #[must_use]
    pub const fn color(color: Color) -> Self {
        CastlingRights(0b11 << (color.index() * 2))
    }

    #[inline]
    #[must_use]
    pub const fn contains(self, other: CastlingRights) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    #[must_use]
    pub const fn intersects(self, other: CastlingRights) -> bool {
        self.0 & other.0 != 0
    }

    #[inline]
    #[must_use]
    pub const fn union(self, other: CastlingRights) -> Self {
        CastlingRights(self.0 | other.0)
    }

    #[inline]
    #[must_use]
    pub const fn without(self, other: CastlingRights) -> Self {
        CastlingRights(self.0 & !other.0)
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Raw mask value, `0..16`.
    #[inline]
    #[must_use]
    pub const fn bits(self) -> usize {
        self.0 as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rights_compose() {
        let r = CastlingRights::WHITE_OO.union(CastlingRights::BLACK_OOO);
        assert!(r.contains(CastlingRights::right(Color::White, CastleSide::King)));
        assert!(!r.contains(CastlingRights::WHITE_OOO));
        assert!(r.intersects(CastlingRights::color(Color::Black)));
        assert_eq!(r.without(CastlingRights::color(Color::White)), CastlingRights::BLACK_OOO);
        assert_eq!(CastlingRights::ALL.bits(), 15);
    }
}
