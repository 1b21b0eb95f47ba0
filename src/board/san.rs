//! Move notation: UCI, long algebraic and standard algebraic.
//!
//! SAN follows the usual conventions ("e4", "Nbd7", "exd6", "O-O", "e8=Q#")
//! with a few variant extensions:
//!
//! - lancer moves and promotions carry the new facing: `La5(ne)`, `b8=L(s)`
//! - sentry pushes name the push destination: `Sxc3@a2`
//! - seirawan gating appends the gated figure: `Nf3/H`, `O-O/Eh1`
//! - a jailed king's pass is written `pass`

use super::error::{MoveParseError, SanError};
use super::state::Position;
use super::types::{CastleSide, Figure, Move, MoveType};

impl Move {
    /// Long algebraic notation, e.g. `Ng1-f3`, `e5xd6`, `e7-e8=Q`.
    #[must_use]
    pub fn lan(self) -> String {
        if self.is_null() {
            return "0000".to_string();
        }
        let mut s = String::with_capacity(10);
        match self.move_type() {
            MoveType::Castling => {
                s.push_str(castling_token(self));
            }
            MoveType::Pass => s.push_str("pass"),
            _ => {
                let figure = self.piece().figure;
                if figure != Figure::Pawn {
                    s.push(figure.letter());
                }
                s.push_str(&self.from().to_string());
                s.push(if self.is_capture() { 'x' } else { '-' });
                s.push_str(&self.to().to_string());
                push_suffixes(self, &mut s);
            }
        }
        push_gate(self, &mut s);
        s
    }
}

fn castling_token(m: Move) -> &'static str {
    match m.castle_side() {
        Some(CastleSide::Queen) => "O-O-O",
        _ => "O-O",
    }
}

/// Promotion, lancer facing and push destination.
fn push_suffixes(m: Move, s: &mut String) {
    match m.move_type() {
        MoveType::Promotion => {
            s.push('=');
            s.push_str(&m.target().figure_token());
        }
        MoveType::SentryPush => {
            if let Some(dest) = m.push_to() {
                s.push('@');
                s.push_str(&dest.to_string());
            }
        }
        MoveType::Normal => {
            if let Some(dir) = m.target().figure.direction() {
                s.push('(');
                s.push_str(dir.token());
                s.push(')');
            }
        }
        _ => {}
    }
}

fn push_gate(m: Move, s: &mut String) {
    if let Some(gate) = m.gate() {
        s.push('/');
        s.push(gate.letter());
        if m.is_castling() && m.gate_square() == Some(m.to()) {
            s.push_str(&m.to().to_string());
        }
    }
}

impl super::types::Piece {
    /// Uppercase figure letter with the lancer facing, e.g. `Q` or `L(ne)`.
    fn figure_token(self) -> String {
        match self.figure.direction() {
            Some(dir) => format!("L({})", dir.token()),
            None => self.figure.letter().to_string(),
        }
    }
}

impl Position {
    /// Parse a UCI move string against the legal moves of this position.
    ///
    /// Castling is accepted both as king-to-destination and king-to-rook.
    pub fn parse_uci(&mut self, s: &str) -> Result<Move, MoveParseError> {
        let s = s.trim().to_ascii_lowercase();
        if !(4..=8).contains(&s.len()) || !s.is_ascii() {
            return Err(MoveParseError::InvalidLength { len: s.len() });
        }
        if s[..2].parse::<super::types::Square>().is_err()
            || s[2..4].parse::<super::types::Square>().is_err()
        {
            return Err(MoveParseError::InvalidSquare { notation: s });
        }
        self.legal_moves()
            .into_iter()
            .find(|m| m.uci(self.chess960) == s || m.uci(!self.chess960) == s)
            .ok_or(MoveParseError::IllegalMove { notation: s })
    }

    /// Standard algebraic notation of the legal move `m`.
    pub fn san(&mut self, m: Move) -> String {
        let legal = self.legal_moves();
        self.san_with(m, &legal)
    }

    fn san_with(&mut self, m: Move, legal: &[Move]) -> String {
        let mut s = String::with_capacity(10);
        match m.move_type() {
            MoveType::Castling => s.push_str(castling_token(m)),
            MoveType::Pass => s.push_str("pass"),
            _ => {
                let figure = m.piece().figure;
                if figure == Figure::Pawn {
                    if m.is_capture() {
                        s.push((b'a' + m.from().file() as u8) as char);
                    }
                } else {
                    s.push(figure.letter());
                    s.push_str(&disambiguation(m, legal));
                }
                if m.is_capture() {
                    s.push('x');
                }
                s.push_str(&m.to().to_string());
                push_suffixes(m, &mut s);
            }
        }
        push_gate(m, &mut s);

        self.do_move(m);
        let us = self.side_to_move;
        if self.king_square(us).is_none() {
            s.push('#');
        } else if self.is_checked(us) {
            s.push(if self.legal_moves().is_empty() { '#' } else { '+' });
        }
        self.undo_move();
        s
    }

    /// Legal moves paired with their SAN, sorted by SAN.
    pub fn sorted_san_moves(&mut self) -> Vec<(String, Move)> {
        let legal = self.legal_moves();
        let mut out: Vec<(String, Move)> = legal
            .iter()
            .map(|&m| (self.san_with(m, &legal), m))
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }

    /// Parse SAN against the legal moves. Check marks are optional and
    /// `0-0` is accepted for `O-O`.
    pub fn parse_san(&mut self, san: &str) -> Result<Move, SanError> {
        let wanted = normalize_san(san);
        if wanted.is_empty() {
            return Err(SanError::Empty);
        }
        let matches: Vec<Move> = self
            .sorted_san_moves()
            .into_iter()
            .filter(|(s, _)| normalize_san(s) == wanted)
            .map(|(_, m)| m)
            .collect();
        match matches.as_slice() {
            [m] => Ok(*m),
            [] => Err(SanError::NoMatchingMove {
                san: san.to_string(),
            }),
            _ => Err(SanError::AmbiguousMove {
                san: san.to_string(),
            }),
        }
    }
}

fn normalize_san(san: &str) -> String {
    san.trim()
        .trim_end_matches(['+', '#', '!', '?'])
        .replace('0', "O")
}

/// File, rank or full square needed to tell `m` apart from other legal
/// moves of the same figure to the same square.
fn disambiguation(m: Move, legal: &[Move]) -> String {
    let rivals: Vec<&Move> = legal
        .iter()
        .filter(|o| {
            o.to() == m.to()
                && o.from() != m.from()
                && o.piece().figure.base() == m.piece().figure.base()
                && o.move_type() != MoveType::Castling
        })
        .collect();
    if rivals.is_empty() {
        return String::new();
    }
    let file = (b'a' + m.from().file() as u8) as char;
    let rank = (b'1' + m.from().rank() as u8) as char;
    if rivals.iter().all(|o| o.from().file() != m.from().file()) {
        file.to_string()
    } else if rivals.iter().all(|o| o.from().rank() != m.from().rank()) {
        rank.to_string()
    } else {
        m.from().to_string()
    }
}
