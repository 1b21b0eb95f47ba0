use std::fmt::Write as _;
use std::str::FromStr;

use super::attack_tables::pawn_attacks;
use super::error::FenError;
use super::state::Position;
use super::types::{Bitboard, CastleSide, Color, Direction, Figure, Piece, Square, Variant};

impl Position {
    /// Parse a position of `variant` from FEN.
    ///
    /// Lancers are written `L(ne)`, seirawan hands follow the placement in
    /// brackets and eightpiece positions may carry a seventh field with the
    /// disabled move.
    pub fn from_fen(fen: &str, variant: Variant) -> Result<Self, FenError> {
        let mut pos = Position::empty(variant);
        let parts: Vec<&str> = fen.split_whitespace().collect();

        if parts.len() < 4 {
            return Err(FenError::TooFewParts { found: parts.len() });
        }

        // Piece placement, then the optional hand.
        let (placement, hand) = match parts[0].find('[') {
            Some(i) => (&parts[0][..i], Some(parts[0][i + 1..].trim_end_matches(']'))),
            None => (parts[0], None),
        };
        pos.parse_placement(placement)?;
        if let Some(hand) = hand {
            pos.parse_hand(hand)?;
        }

        // Side to move
        match parts[1] {
            "w" => {}
            "b" => pos.flip_side(),
            other => {
                return Err(FenError::InvalidSideToMove {
                    found: other.to_string(),
                })
            }
        }

        pos.parse_castling(parts[2])?;

        // En passant is kept only when it can be played.
        if parts[3] != "-" {
            let ep: Square = parts[3].parse().map_err(|_| FenError::InvalidEnPassant {
                found: parts[3].to_string(),
            })?;
            let us = pos.side_to_move;
            let victim = ep.offset(if us == Color::White { -1 } else { 1 }, 0);
            let capturable = (pawn_attacks(us.opponent(), ep) & pos.by_piece(us, Figure::Pawn)).any()
                && victim.and_then(|v| pos.piece_at(v))
                    == Some(Piece::new(us.opponent(), Figure::Pawn))
                && pos.piece_at(ep).is_none();
            if capturable {
                pos.set_en_passant(Some(ep));
            }
        }

        if let Some(field) = parts.get(4) {
            pos.state_mut().halfmove_clock = parse_counter(field)?;
        }
        if let Some(field) = parts.get(5) {
            pos.state_mut().fullmove_number = parse_counter(field)?.max(1);
        }
        if let Some(field) = parts.get(6) {
            if variant == Variant::EightPiece && *field != "-" {
                let bad = || FenError::InvalidDisabledMove {
                    found: field.to_string(),
                };
                if field.len() != 4 || !field.is_ascii() {
                    return Err(bad());
                }
                let from: Square = field[..2].parse().map_err(|_| bad())?;
                let to: Square = field[2..].parse().map_err(|_| bad())?;
                pos.set_disabled(Some((from, to)));
            }
        }

        Ok(pos)
    }

    fn parse_placement(&mut self, placement: &str) -> Result<(), FenError> {
        let ranks: Vec<&str> = placement.split('/').collect();
        if ranks.len() != 8 {
            return Err(FenError::InvalidRank { rank: ranks.len() });
        }
        for (rank_idx, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - rank_idx;
            let mut file = 0;
            let mut chars = rank_str.chars().peekable();
            while let Some(c) = chars.next() {
                if let Some(skip) = c.to_digit(10) {
                    file += skip as usize;
                    continue;
                }
                let mut piece = Piece::from_char(c).ok_or(FenError::InvalidPiece { char: c })?;
                if piece.figure.is_lancer() && chars.peek() == Some(&'(') {
                    chars.next();
                    let token: String = chars.by_ref().take_while(|&ch| ch != ')').collect();
                    let dir = Direction::from_token(&token)
                        .ok_or(FenError::InvalidLancer { token })?;
                    piece = Piece::new(piece.color, Figure::lancer(dir));
                }
                if file >= 8 {
                    return Err(FenError::TooManyFiles {
                        rank: rank_idx,
                        files: file + 1,
                    });
                }
                self.put(Square::new(rank, file), piece);
                file += 1;
            }
            if file != 8 {
                return Err(FenError::TooManyFiles {
                    rank: rank_idx,
                    files: file,
                });
            }
        }
        Ok(())
    }

    fn parse_hand(&mut self, hand: &str) -> Result<(), FenError> {
        for c in hand.chars() {
            let piece = Piece::from_char(c).ok_or(FenError::InvalidHand { char: c })?;
            if !matches!(piece.figure, Figure::Hawk | Figure::Elephant) {
                return Err(FenError::InvalidHand { char: c });
            }
            let count = self
                .hand(piece.color, piece.figure)
                .checked_add(1)
                .ok_or(FenError::InvalidHand { char: c })?;
            self.set_hand(piece.color, piece.figure, count);
        }
        Ok(())
    }

    fn parse_castling(&mut self, field: &str) -> Result<(), FenError> {
        if field == "-" {
            return Ok(());
        }
        let mut gates = Bitboard::EMPTY;
        for c in field.chars() {
            let color = if c.is_ascii_uppercase() {
                Color::White
            } else {
                Color::Black
            };
            let rank = color.back_rank();
            let missing = FenError::MissingCastlingPiece { char: c };
            let king = self
                .king_square(color)
                .filter(|k| k.rank() == rank);

            let (side, rook) = match c.to_ascii_lowercase() {
                'k' => {
                    let king = king.ok_or(missing.clone())?;
                    let rook = self.outermost_rook(color, king, CastleSide::King).ok_or(missing)?;
                    (CastleSide::King, rook)
                }
                'q' => {
                    let king = king.ok_or(missing.clone())?;
                    let rook = self.outermost_rook(color, king, CastleSide::Queen).ok_or(missing)?;
                    (CastleSide::Queen, rook)
                }
                f @ 'a'..='h' => {
                    let sq = Square::new(rank, f as usize - 'a' as usize);
                    if self.variant == Variant::Seirawan {
                        gates |= sq.bitboard();
                        continue;
                    }
                    let king = king.ok_or(missing.clone())?;
                    if self.piece_at(sq) != Some(Piece::new(color, Figure::Rook)) {
                        return Err(missing);
                    }
                    let side = if sq.file() > king.file() {
                        CastleSide::King
                    } else {
                        CastleSide::Queen
                    };
                    (side, sq)
                }
                _ => return Err(FenError::InvalidCastling { char: c }),
            };

            self.add_castling_right(color, side, rook);
            if self.variant == Variant::Seirawan {
                if let Some(king) = king {
                    gates |= king.bitboard() | rook.bitboard();
                }
            }
            let standard_rook = if side == CastleSide::King { 7 } else { 0 };
            if rook.file() != standard_rook || king.map(|k| k.file()) != Some(4) {
                self.chess960 = true;
            }
        }
        if gates.any() {
            self.set_gates(gates);
        }
        Ok(())
    }

    /// The rook of `color` farthest from `king` towards `side`.
    fn outermost_rook(&self, color: Color, king: Square, side: CastleSide) -> Option<Square> {
        let rooks = self.by_piece(color, Figure::Rook) & Bitboard::rank_mask(king.rank());
        match side {
            CastleSide::King => rooks.iter().filter(|r| r.file() > king.file()).last(),
            CastleSide::Queen => rooks.iter().find(|r| r.file() < king.file()),
        }
    }

    /// Serialize to FEN in the dialect of the position's variant.
    #[must_use]
    pub fn to_fen(&self) -> String {
        let mut fen = String::with_capacity(96);
        for rank in (0..8).rev() {
            let mut empty = 0;
            for file in 0..8 {
                match self.piece_at(Square::new(rank, file)) {
                    Some(piece) => {
                        if empty > 0 {
                            let _ = write!(fen, "{empty}");
                            empty = 0;
                        }
                        let _ = write!(fen, "{piece}");
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                let _ = write!(fen, "{empty}");
            }
            if rank > 0 {
                fen.push('/');
            }
        }

        if self.variant == Variant::Seirawan {
            fen.push('[');
            for color in Color::ALL {
                for figure in [Figure::Hawk, Figure::Elephant] {
                    let c = Piece::new(color, figure).to_char();
                    for _ in 0..self.hand(color, figure) {
                        fen.push(c);
                    }
                }
            }
            fen.push(']');
        }

        let _ = write!(fen, " {} {}", self.side_to_move, self.castling_field());
        match self.en_passant() {
            Some(ep) => {
                let _ = write!(fen, " {ep}");
            }
            None => fen.push_str(" -"),
        }
        let _ = write!(fen, " {} {}", self.halfmove_clock(), self.fullmove_number());

        if self.variant == Variant::EightPiece {
            match self.disabled_move() {
                Some((from, to)) => {
                    let _ = write!(fen, " {from}{to}");
                }
                None => fen.push_str(" -"),
            }
        }
        fen
    }

    fn castling_field(&self) -> String {
        let mut field = String::new();
        for color in Color::ALL {
            let mut implied = Bitboard::EMPTY;
            let king = self.king_square(color);
            for side in CastleSide::ALL {
                let Some(rook) = self.castling_rook(color, side) else {
                    continue;
                };
                let outermost = king.and_then(|k| self.outermost_rook(color, k, side));
                let c = if outermost == Some(rook) {
                    match side {
                        CastleSide::King => 'K',
                        CastleSide::Queen => 'Q',
                    }
                } else {
                    (b'A' + rook.file() as u8) as char
                };
                field.push(if color == Color::White {
                    c
                } else {
                    c.to_ascii_lowercase()
                });
                implied |= rook.bitboard();
                if let Some(k) = king {
                    implied |= k.bitboard();
                }
            }
            if self.variant == Variant::Seirawan {
                let gates = self.gates() & Bitboard::rank_mask(color.back_rank()) & !implied;
                for sq in gates {
                    let c = (b'A' + sq.file() as u8) as char;
                    field.push(if color == Color::White {
                        c
                    } else {
                        c.to_ascii_lowercase()
                    });
                }
            }
        }
        if field.is_empty() {
            field.push('-');
        }
        field
    }
}

fn parse_counter(field: &str) -> Result<u32, FenError> {
    field.parse().map_err(|_| FenError::InvalidCounter {
        found: field.to_string(),
    })
}

impl FromStr for Position {
    type Err = FenError;

    /// Parses a standard chess FEN.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Position::from_fen(s, Variant::Standard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::types::{SEIRAWAN_START_FEN, STANDARD_START_FEN, EIGHTPIECE_START_FEN};

    #[test]
    fn start_positions_roundtrip() {
        for variant in Variant::ALL {
            let pos = Position::start(variant);
            assert_eq!(pos.to_fen(), variant.start_fen());
            pos.assert_consistent();
        }
        assert_eq!(Position::start(Variant::Standard).to_fen(), STANDARD_START_FEN);
        assert_eq!(Position::start(Variant::Seirawan).to_fen(), SEIRAWAN_START_FEN);
        assert_eq!(Position::start(Variant::EightPiece).to_fen(), EIGHTPIECE_START_FEN);
    }

    #[test]
    fn lancer_facing_is_parsed() {
        let pos = Position::start(Variant::EightPiece);
        assert_eq!(
            pos.piece_at(Square::new(7, 1)),
            Some(Piece::new(Color::Black, Figure::LancerS))
        );
        assert_eq!(
            pos.piece_at(Square::new(0, 1)),
            Some(Piece::new(Color::White, Figure::LancerN))
        );
    }

    #[test]
    fn seirawan_hand_and_gates() {
        let pos = Position::start(Variant::Seirawan);
        assert_eq!(pos.hand(Color::White, Figure::Hawk), 1);
        assert_eq!(pos.hand(Color::Black, Figure::Elephant), 1);
        assert_eq!(pos.gates().popcount(), 16);
    }

    #[test]
    fn shredder_castling_sets_chess960() {
        let pos: Position = "bqnb1rkr/pp3ppp/3ppn2/2p5/5P2/P2P4/NPP1P1PP/BQ1BNRKR w HFhf - 2 9"
            .parse()
            .unwrap();
        assert!(pos.is_chess960());
        assert_eq!(pos.castling_rook(Color::White, CastleSide::Queen), Some(Square::new(0, 5)));
        let again: Position = pos.to_fen().parse().unwrap();
        assert_eq!(again.to_fen(), pos.to_fen());
    }

    #[test]
    fn uncapturable_en_passant_is_dropped() {
        let pos: Position = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1"
            .parse()
            .unwrap();
        assert_eq!(pos.en_passant(), None);
        assert_eq!(
            pos.to_fen(),
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1"
        );
    }

    #[test]
    fn malformed_fens_are_rejected() {
        assert_eq!(
            Position::from_fen("8/8/8 w - -", Variant::Standard).unwrap_err(),
            FenError::InvalidRank { rank: 3 }
        );
        assert!(matches!(
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR x KQkq - 0 1".parse::<Position>(),
            Err(FenError::InvalidSideToMove { .. })
        ));
        assert!(matches!(
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNZ w KQkq - 0 1".parse::<Position>(),
            Err(FenError::InvalidPiece { char: 'Z' })
        ));
        assert!(matches!(
            "4k3/8/8/8/8/8/8/4K3 w K - 0 1".parse::<Position>(),
            Err(FenError::MissingCastlingPiece { char: 'K' })
        ));
        assert!(matches!(
            "4k3/8/8/8/8/8/8/4K3 w - - x 1".parse::<Position>(),
            Err(FenError::InvalidCounter { .. })
        ));
    }

    #[test]
    fn overlong_hand_is_rejected() {
        let hand = "H".repeat(300);
        let fen = format!("4k3/8/8/8/8/8/8/4K3[{hand}] w - - 0 1");
        assert_eq!(
            Position::from_fen(&fen, Variant::Seirawan).unwrap_err(),
            FenError::InvalidHand { char: 'H' }
        );

        let pos = Position::from_fen("4k3/8/8/8/8/8/8/4K3[HHe] w - - 0 1", Variant::Seirawan)
            .unwrap();
        assert_eq!(pos.hand(Color::White, Figure::Hawk), 2);
        assert_eq!(pos.hand(Color::Black, Figure::Elephant), 1);
    }

    #[test]
    fn disabled_move_field() {
        let pos = Position::from_fen("4k3/8/8/8/8/8/n7/S3K3 b - - 0 1 a2a1", Variant::EightPiece)
            .unwrap();
        assert_eq!(pos.disabled_move(), Some((Square::new(1, 0), Square::A1)));
        assert!(pos.to_fen().ends_with(" a2a1"));
    }
}
