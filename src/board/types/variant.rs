//! Supported rule sets.

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::board::error::VariantError;

/// Rule set a position is played under.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Variant {
    #[default]
    Standard,
    /// Captures explode; the game is won by destroying the enemy king.
    Atomic,
    /// Hawks and elephants are gated in from the hand.
    Seirawan,
    /// Adds lancers, sentries and jailers.
    EightPiece,
}

pub const STANDARD_START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
pub const SEIRAWAN_START_FEN: &str =
    "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR[HEhe] w KQBCDFGkqbcdfg - 0 1";
pub const EIGHTPIECE_START_FEN: &str =
    "jl(s)sqkbnr/pppppppp/8/8/8/8/PPPPPPPP/JL(n)SQKBNR w Kk - 0 1 -";

impl Variant {
    pub const ALL: [Variant; 4] = [
        Variant::Standard,
        Variant::Atomic,
        Variant::Seirawan,
        Variant::EightPiece,
    ];

    /// Name as used by the `UCI_Variant` option.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Variant::Standard => "standard",
            Variant::Atomic => "atomic",
            Variant::Seirawan => "seirawan",
            Variant::EightPiece => "eightpiece",
        }
    }

    #[must_use]
    pub const fn start_fen(self) -> &'static str {
        match self {
            Variant::Standard | Variant::Atomic => STANDARD_START_FEN,
            Variant::Seirawan => SEIRAWAN_START_FEN,
            Variant::EightPiece => EIGHTPIECE_START_FEN,
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Variant {
    type Err = VariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "standard" | "chess" | "normal" => Ok(Variant::Standard),
            "atomic" => Ok(Variant::Atomic),
            "seirawan" | "s-chess" => Ok(Variant::Seirawan),
            "eightpiece" | "8piece" => Ok(Variant::EightPiece),
            _ => Err(VariantError::Unknown {
                name: s.to_string(),
            }),
        }
    }
}
