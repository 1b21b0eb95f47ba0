//! Packed move value.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::castling::CastleSide;
use super::piece::{Figure, Piece};
use super::square::Square;

/// Maximum search depth in plies.
pub const MAX_PLY: usize = 128;

/// What a move does besides moving a piece from one square to another.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MoveType {
    Normal,
    Promotion,
    /// Encoded king square to rook origin.
    Castling,
    Enpassant,
    /// Sentry lands on an enemy piece and relocates it.
    SentryPush,
    /// A jailed king stays put.
    Pass,
}

impl MoveType {
    const ALL: [MoveType; 6] = [
        MoveType::Normal,
        MoveType::Promotion,
        MoveType::Castling,
        MoveType::Enpassant,
        MoveType::SentryPush,
        MoveType::Pass,
    ];
}

/// Category of moves requested from the generator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveKind {
    /// Captures, queen promotions, en passant, sentry pushes and passes.
    Violent,
    /// Everything else.
    Quiet,
    All,
}

impl MoveKind {
    #[inline]
    #[must_use]
    pub const fn violent(self) -> bool {
        matches!(self, MoveKind::Violent | MoveKind::All)
    }

    #[inline]
    #[must_use]
    pub const fn quiet(self) -> bool {
        matches!(self, MoveKind::Quiet | MoveKind::All)
    }
}

// Bit layout of the packed value.
const FROM_SHIFT: u32 = 0;
const TO_SHIFT: u32 = 6;
const TYPE_SHIFT: u32 = 12;
const CAPTURE_SHIFT: u32 = 15;
const TARGET_SHIFT: u32 = 21;
const PIECE_SHIFT: u32 = 27;
const AUX_SHIFT: u32 = 33;
const GATE_SHIFT: u32 = 39;
const GATE_ROOK_SHIFT: u32 = 41;

const SQ_MASK: u64 = 0x3F;
const TYPE_MASK: u64 = 0x7;
const PIECE_MASK: u64 = 0x3F;
const GATE_MASK: u64 = 0x3;

/// A move packed into 64 bits.
///
/// - bits 0-5:   from square
/// - bits 6-11:  to square
/// - bits 12-14: [`MoveType`]
/// - bits 15-20: captured piece (0 = none, else piece index + 1)
/// - bits 21-26: piece standing on the destination after the move
/// - bits 27-32: moving piece
/// - bits 33-38: auxiliary square (sentry push destination)
/// - bits 39-40: gated figure (0 = none, 1 = hawk, 2 = elephant)
/// - bit 41:     gate on the castling rook's origin instead of the king's
///
/// The zero value is the null move. Real moves always carry a moving piece,
/// so they are never zero.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Move(u64);

const fn piece_code(piece: Piece) -> u64 {
    piece.index() as u64 + 1
}

const fn decode_piece(code: u64) -> Option<Piece> {
    if code == 0 {
        None
    } else {
        Piece::from_index(code as usize - 1)
    }
}

impl Move {
    pub const NULL: Move = Move(0);

    #[inline]
    #[must_use]
    pub const fn new(
        kind: MoveType,
        from: Square,
        to: Square,
        capture: Option<Piece>,
        target: Piece,
        piece: Piece,
    ) -> Self {
        let capture = match capture {
            Some(p) => piece_code(p),
            None => 0,
        };
        Move(
            (from.index() as u64) << FROM_SHIFT
                | (to.index() as u64) << TO_SHIFT
                | (kind as u64) << TYPE_SHIFT
                | capture << CAPTURE_SHIFT
                | piece_code(target) << TARGET_SHIFT
                | piece_code(piece) << PIECE_SHIFT,
        )
    }

    /// Same move with the sentry push destination set.
    #[inline]
    #[must_use]
    pub const fn with_push(self, dest: Square) -> Self {
        Move(self.0 & !(SQ_MASK << AUX_SHIFT) | (dest.index() as u64) << AUX_SHIFT)
    }

    /// Same move, additionally gating `figure` from the hand.
    #[inline]
    #[must_use]
    pub const fn with_gate(self, figure: Figure, on_rook: bool) -> Self {
        let code = match figure {
            Figure::Hawk => 1,
            Figure::Elephant => 2,
            _ => 0,
        };
        Move(self.0 | code << GATE_SHIFT | (on_rook as u64) << GATE_ROOK_SHIFT)
    }

    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    #[inline]
    #[must_use]
    pub const fn from(self) -> Square {
        Square::from_index(((self.0 >> FROM_SHIFT) & SQ_MASK) as usize)
    }

    #[inline]
    #[must_use]
    pub const fn to(self) -> Square {
        Square::from_index(((self.0 >> TO_SHIFT) & SQ_MASK) as usize)
    }

    #[inline]
    #[must_use]
    pub const fn move_type(self) -> MoveType {
        let t = ((self.0 >> TYPE_SHIFT) & TYPE_MASK) as usize;
        if t < MoveType::ALL.len() {
            MoveType::ALL[t]
        } else {
            MoveType::Normal
        }
    }

    #[inline]
    #[must_use]
    pub const fn capture(self) -> Option<Piece> {
        decode_piece((self.0 >> CAPTURE_SHIFT) & PIECE_MASK)
    }

    /// Piece on the destination after the move. Meaningless for the null move.
    #[inline]
    #[must_use]
    pub const fn target(self) -> Piece {
        match decode_piece((self.0 >> TARGET_SHIFT) & PIECE_MASK) {
            Some(p) => p,
            None => self.piece(),
        }
    }

    /// The moving piece. Meaningless for the null move.
    #[inline]
    #[must_use]
    pub const fn piece(self) -> Piece {
        match decode_piece((self.0 >> PIECE_SHIFT) & PIECE_MASK) {
            Some(p) => p,
            None => Piece::new(super::piece::Color::White, Figure::Pawn),
        }
    }

    /// Promoted figure for promotions.
    #[inline]
    #[must_use]
    pub const fn promotion(self) -> Option<Figure> {
        match self.move_type() {
            MoveType::Promotion => Some(self.target().figure),
            _ => None,
        }
    }

    /// Where a sentry push relocates the captured piece.
    #[inline]
    #[must_use]
    pub const fn push_to(self) -> Option<Square> {
        match self.move_type() {
            MoveType::SentryPush => Some(Square::from_index(
                ((self.0 >> AUX_SHIFT) & SQ_MASK) as usize,
            )),
            _ => None,
        }
    }

    /// Figure dropped from the hand, if any.
    #[inline]
    #[must_use]
    pub const fn gate(self) -> Option<Figure> {
        match (self.0 >> GATE_SHIFT) & GATE_MASK {
            1 => Some(Figure::Hawk),
            2 => Some(Figure::Elephant),
            _ => None,
        }
    }

    /// Square the gated figure lands on.
    #[inline]
    #[must_use]
    pub const fn gate_square(self) -> Option<Square> {
        if self.gate().is_none() {
            None
        } else if (self.0 >> GATE_ROOK_SHIFT) & 1 != 0 {
            Some(self.to())
        } else {
            Some(self.from())
        }
    }

    /// True for captures, queen promotions, en passant, pushes and passes.
    ///
    /// Under-promotions count as quiet even when they capture, so the violent
    /// and quiet generator outputs stay disjoint.
    #[inline]
    #[must_use]
    pub const fn is_violent(self) -> bool {
        match self.move_type() {
            MoveType::Promotion => matches!(self.target().figure, Figure::Queen),
            MoveType::Enpassant | MoveType::SentryPush | MoveType::Pass => true,
            MoveType::Castling => false,
            MoveType::Normal => self.capture().is_some(),
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_quiet(self) -> bool {
        !self.is_violent()
    }

    /// True if an enemy piece is removed or relocated.
    #[inline]
    #[must_use]
    pub const fn is_capture(self) -> bool {
        self.capture().is_some()
    }

    #[inline]
    #[must_use]
    pub const fn is_castling(self) -> bool {
        matches!(self.move_type(), MoveType::Castling)
    }

    /// Wing of a castling move.
    #[inline]
    #[must_use]
    pub const fn castle_side(self) -> Option<CastleSide> {
        if !self.is_castling() {
            None
        } else if self.to().file() > self.from().file() {
            Some(CastleSide::King)
        } else {
            Some(CastleSide::Queen)
        }
    }

    /// Final king and rook squares of a castling move.
    #[inline]
    #[must_use]
    pub const fn castle_destinations(self) -> Option<(Square, Square)> {
        match self.castle_side() {
            Some(side) => {
                let rank = self.from().rank();
                let (king, rook) = side.destination_files();
                Some((Square::new(rank, king), Square::new(rank, rook)))
            }
            None => None,
        }
    }

    /// UCI notation. Castling is written king-to-rook when `chess960` is set.
    #[must_use]
    pub fn uci(self, chess960: bool) -> String {
        if self.is_null() {
            return "0000".to_string();
        }
        let mut s = String::with_capacity(8);
        let (from, to) = match self.castle_destinations() {
            Some(_) if self.gate_square() == Some(self.to()) => (self.to(), self.from()),
            Some((king_to, _)) if !chess960 => (self.from(), king_to),
            _ => (self.from(), self.to()),
        };
        s.push_str(&from.to_string());
        s.push_str(&to.to_string());
        match self.move_type() {
            MoveType::Promotion => {
                s.push(self.target().figure.letter().to_ascii_lowercase());
                if let Some(dir) = self.target().figure.direction() {
                    s.push_str(dir.token());
                }
            }
            MoveType::SentryPush => {
                if let Some(dest) = self.push_to() {
                    s.push_str(&dest.to_string());
                }
            }
            MoveType::Normal if self.piece().figure.is_lancer() => {
                if let Some(dir) = self.target().figure.direction() {
                    s.push_str(dir.token());
                }
            }
            _ => {}
        }
        if let Some(gate) = self.gate() {
            s.push(gate.letter().to_ascii_lowercase());
        }
        s
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.uci(false))
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            return f.write_str("Move(null)");
        }
        write!(f, "Move({} {:?} {}", self.uci(true), self.move_type(), self.piece())?;
        if let Some(c) = self.capture() {
            write!(f, " x{c}")?;
        }
        f.write_str(")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::types::Color;

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    const WP: Piece = Piece::new(Color::White, Figure::Pawn);
    const WK: Piece = Piece::new(Color::White, Figure::King);
    const BN: Piece = Piece::new(Color::Black, Figure::Knight);

    #[test]
    fn fields_roundtrip() {
        let q = Piece::new(Color::White, Figure::Queen);
        let m = Move::new(MoveType::Promotion, sq("e7"), sq("d8"), Some(BN), q, WP);
        assert_eq!(m.from(), sq("e7"));
        assert_eq!(m.to(), sq("d8"));
        assert_eq!(m.move_type(), MoveType::Promotion);
        assert_eq!(m.capture(), Some(BN));
        assert_eq!(m.target(), q);
        assert_eq!(m.piece(), WP);
        assert_eq!(m.promotion(), Some(Figure::Queen));
        assert!(m.is_violent());
        assert_eq!(m.uci(false), "e7d8q");
    }

    #[test]
    fn underpromotion_capture_is_quiet() {
        let n = Piece::new(Color::White, Figure::Knight);
        let m = Move::new(MoveType::Promotion, sq("e7"), sq("d8"), Some(BN), n, WP);
        assert!(m.is_quiet());
        assert!(m.is_capture());
    }

    #[test]
    fn null_move_is_zero_and_never_a_real_move() {
        assert!(Move::NULL.is_null());
        assert_eq!(Move::NULL.to_string(), "0000");
        let m = Move::new(MoveType::Normal, sq("a1"), sq("a1"), None, WP, WP);
        assert!(!m.is_null());
    }

    #[test]
    fn castling_notation() {
        let m = Move::new(MoveType::Castling, sq("e1"), sq("h1"), None, WK, WK);
        assert_eq!(m.castle_side(), Some(CastleSide::King));
        assert_eq!(m.uci(false), "e1g1");
        assert_eq!(m.uci(true), "e1h1");
        let gated = m.with_gate(Figure::Hawk, true);
        assert_eq!(gated.gate_square(), Some(sq("h1")));
        assert_eq!(gated.uci(false), "h1e1h");
        let gated = m.with_gate(Figure::Elephant, false);
        assert_eq!(gated.gate_square(), Some(sq("e1")));
        assert_eq!(gated.uci(false), "e1g1e");
    }

    #[test]
    fn variant_suffixes() {
        let lancer = Piece::new(Color::White, Figure::LancerN);
        let turned = Piece::new(Color::White, Figure::LancerSW);
        let m = Move::new(MoveType::Normal, sq("b1"), sq("b5"), None, turned, lancer);
        assert_eq!(m.uci(false), "b1b5sw");

        let sentry = Piece::new(Color::White, Figure::Sentry);
        let push = Move::new(MoveType::SentryPush, sq("c1"), sq("f4"), Some(BN), sentry, sentry)
            .with_push(sq("g6"));
        assert_eq!(push.push_to(), Some(sq("g6")));
        assert_eq!(push.uci(false), "c1f4g6");
        assert!(push.is_violent());
    }
}
