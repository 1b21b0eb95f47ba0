//! Colors, figures and pieces.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Side color.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub const ALL: [Color; 2] = [Color::White, Color::Black];

    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Color::White => 0,
            Color::Black => 1,
        }
    }

    #[inline]
    #[must_use]
    pub const fn opponent(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// `1` for White, `-1` for Black.
    #[inline]
    #[must_use]
    pub const fn multiplier(self) -> i32 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }

    /// The color's first rank (0 or 7).
    #[inline]
    #[must_use]
    pub const fn back_rank(self) -> usize {
        match self {
            Color::White => 0,
            Color::Black => 7,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Color::White => "w",
            Color::Black => "b",
        })
    }
}

/// One of the eight compass directions a lancer can face.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// `(rank, file)` step.
    #[inline]
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::North => (1, 0),
            Direction::NorthEast => (1, 1),
            Direction::East => (0, 1),
            Direction::SouthEast => (-1, 1),
            Direction::South => (-1, 0),
            Direction::SouthWest => (-1, -1),
            Direction::West => (0, -1),
            Direction::NorthWest => (1, -1),
        }
    }

    #[inline]
    #[must_use]
    pub const fn opposite(self) -> Direction {
        Direction::ALL[(self as usize + 4) & 7]
    }

    /// True if stepping in this direction increases the square index.
    #[inline]
    #[must_use]
    pub const fn is_increasing(self) -> bool {
        matches!(
            self,
            Direction::North | Direction::NorthEast | Direction::East | Direction::NorthWest
        )
    }

    /// Lowercase compass token: `n`, `ne`, ..., `nw`.
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Direction::North => "n",
            Direction::NorthEast => "ne",
            Direction::East => "e",
            Direction::SouthEast => "se",
            Direction::South => "s",
            Direction::SouthWest => "sw",
            Direction::West => "w",
            Direction::NorthWest => "nw",
        }
    }

    #[must_use]
    pub fn from_token(token: &str) -> Option<Direction> {
        Direction::ALL
            .into_iter()
            .find(|d| d.token().eq_ignore_ascii_case(token))
    }
}

/// A figure independent of color. Lancers carry their facing.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Figure {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
    Hawk,
    Elephant,
    Sentry,
    Jailer,
    LancerN,
    LancerNE,
    LancerE,
    LancerSE,
    LancerS,
    LancerSW,
    LancerW,
    LancerNW,
}

impl Figure {
    pub const COUNT: usize = 18;

    pub const ALL: [Figure; Figure::COUNT] = [
        Figure::Pawn,
        Figure::Knight,
        Figure::Bishop,
        Figure::Rook,
        Figure::Queen,
        Figure::King,
        Figure::Hawk,
        Figure::Elephant,
        Figure::Sentry,
        Figure::Jailer,
        Figure::LancerN,
        Figure::LancerNE,
        Figure::LancerE,
        Figure::LancerSE,
        Figure::LancerS,
        Figure::LancerSW,
        Figure::LancerW,
        Figure::LancerNW,
    ];

    const LANCER_BASE: usize = 10;

    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[inline]
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Figure> {
        if index < Figure::COUNT {
            Some(Figure::ALL[index])
        } else {
            None
        }
    }

    /// The lancer facing `dir`.
    #[inline]
    #[must_use]
    pub const fn lancer(dir: Direction) -> Figure {
        Figure::ALL[Self::LANCER_BASE + dir.index()]
    }

    #[inline]
    #[must_use]
    pub const fn is_lancer(self) -> bool {
        self.index() >= Self::LANCER_BASE
    }

    /// Facing of a lancer, `None` for every other figure.
    #[inline]
    #[must_use]
    pub const fn direction(self) -> Option<Direction> {
        if self.is_lancer() {
            Some(Direction::ALL[self.index() - Self::LANCER_BASE])
        } else {
            None
        }
    }

    /// The figure with any lancer facing masked off.
    #[inline]
    #[must_use]
    pub const fn base(self) -> Figure {
        if self.is_lancer() {
            Figure::LancerN
        } else {
            self
        }
    }

    /// Uppercase letter used in FEN and SAN.
    #[must_use]
    pub const fn letter(self) -> char {
        match self {
            Figure::Pawn => 'P',
            Figure::Knight => 'N',
            Figure::Bishop => 'B',
            Figure::Rook => 'R',
            Figure::Queen => 'Q',
            Figure::King => 'K',
            Figure::Hawk => 'H',
            Figure::Elephant => 'E',
            Figure::Sentry => 'S',
            Figure::Jailer => 'J',
            _ => 'L',
        }
    }

    /// Parse a letter in either case. `L` yields the north-facing lancer.
    #[must_use]
    pub fn from_letter(c: char) -> Option<Figure> {
        Some(match c.to_ascii_uppercase() {
            'P' => Figure::Pawn,
            'N' => Figure::Knight,
            'B' => Figure::Bishop,
            'R' => Figure::Rook,
            'Q' => Figure::Queen,
            'K' => Figure::King,
            'H' => Figure::Hawk,
            'E' => Figure::Elephant,
            'S' => Figure::Sentry,
            'J' => Figure::Jailer,
            'L' => Figure::LancerN,
            _ => return None,
        })
    }

    /// Rough strength order used for MVV-LVA (pawn = 1, king highest).
    #[inline]
    #[must_use]
    pub const fn order(self) -> i32 {
        match self {
            Figure::Pawn => 1,
            Figure::Knight | Figure::Bishop | Figure::Sentry | Figure::Jailer => 2,
            Figure::Rook => 4,
            Figure::Hawk => 5,
            Figure::Elephant => 6,
            Figure::Queen => 7,
            Figure::King => 8,
            _ => 2,
        }
    }
}

/// A colored figure.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Piece {
    pub color: Color,
    pub figure: Figure,
}

impl Piece {
    pub const COUNT: usize = 2 * Figure::COUNT;

    #[inline]
    #[must_use]
    pub const fn new(color: Color, figure: Figure) -> Self {
        Piece { color, figure }
    }

    /// Dense index in `0..Piece::COUNT`, unique per (color, figure).
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.color.index() * Figure::COUNT + self.figure.index()
    }

    #[inline]
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Piece> {
        if index >= Piece::COUNT {
            return None;
        }
        let color = if index < Figure::COUNT {
            Color::White
        } else {
            Color::Black
        };
        match Figure::from_index(index % Figure::COUNT) {
            Some(figure) => Some(Piece { color, figure }),
            None => None,
        }
    }

    /// FEN letter: uppercase for White. Lancers drop their facing.
    #[must_use]
    pub const fn to_char(self) -> char {
        let c = self.figure.letter();
        match self.color {
            Color::White => c,
            Color::Black => c.to_ascii_lowercase(),
        }
    }

    #[must_use]
    pub fn from_char(c: char) -> Option<Piece> {
        let figure = Figure::from_letter(c)?;
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        Some(Piece::new(color, figure))
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.figure.direction() {
            Some(dir) => write!(f, "{}({})", self.to_char(), dir.token()),
            None => write!(f, "{}", self.to_char()),
        }
    }
}
