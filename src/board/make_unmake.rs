use std::cell::Cell;

use super::attack_tables::{king_attacks, pawn_attacks};
use super::state::{Explosion, Position, StateInfo};
use super::types::{Bitboard, CastlingRights, Color, Figure, Move, MoveType, Piece, Square, Variant};

impl Position {
    /// Push a copy of the current state for the next ply.
    fn push_state(&mut self, m: Move) {
        let prev = self.state();
        let next = StateInfo {
            zobrist: prev.zobrist,
            pawn_king: prev.pawn_king,
            castling: prev.castling,
            en_passant: prev.en_passant,
            halfmove_clock: prev.halfmove_clock + 1,
            fullmove_number: prev.fullmove_number + u32::from(self.side_to_move == Color::Black),
            last_move: m,
            hands: prev.hands,
            gates: prev.gates,
            disabled: prev.disabled,
            explosion: Explosion::default(),
            checked: Cell::new(None),
        };
        self.states.push(next);
        self.set_en_passant(None);
        self.set_disabled(None);
    }

    /// Square of the pawn removed by an en passant capture.
    #[inline]
    fn en_passant_victim(m: Move) -> Square {
        Square::new(m.from().rank(), m.to().file())
    }

    /// Play `m`, which must be pseudo-legal in this position.
    pub fn do_move(&mut self, m: Move) {
        debug_assert!(!m.is_null(), "do_move with the null move");
        let us = self.side_to_move;
        let them = us.opponent();
        let from = m.from();
        let to = m.to();
        let piece = m.piece();

        self.push_state(m);

        let mut touched = if m.move_type() == MoveType::Pass {
            Bitboard::EMPTY
        } else {
            from.bitboard() | to.bitboard()
        };
        let atomic_capture = self.variant == Variant::Atomic && m.is_capture();

        match m.move_type() {
            MoveType::Pass => {}
            MoveType::Castling => {
                let rook = Piece::new(us, Figure::Rook);
                if let Some((king_to, rook_to)) = m.castle_destinations() {
                    self.remove(from, piece);
                    self.remove(to, rook);
                    self.put(king_to, piece);
                    self.put(rook_to, rook);
                }
            }
            MoveType::SentryPush => {
                // The vacated origin is a legal push target, so clear it first.
                self.remove(from, piece);
                if let (Some(victim), Some(dest)) = (m.capture(), m.push_to()) {
                    self.remove(to, victim);
                    self.put(dest, victim);
                    self.set_disabled((dest != from).then_some((dest, from)));
                }
                self.put(to, m.target());
            }
            MoveType::Normal | MoveType::Promotion | MoveType::Enpassant => {
                let victim_sq = if m.move_type() == MoveType::Enpassant {
                    Self::en_passant_victim(m)
                } else {
                    to
                };
                if let Some(victim) = m.capture() {
                    self.remove(victim_sq, victim);
                }
                self.remove(from, piece);
                if atomic_capture {
                    let blast = king_attacks(to) & self.occupied() & !self.by_figure(Figure::Pawn);
                    let mut explosion = Explosion::default();
                    for sq in blast {
                        if let Some(p) = self.piece_at(sq) {
                            self.remove(sq, p);
                            explosion.push(sq, p);
                        }
                    }
                    touched |= blast;
                    self.state_mut().explosion = explosion;
                } else {
                    self.put(to, m.target());
                }
            }
        }

        if let (Some(figure), Some(sq)) = (m.gate(), m.gate_square()) {
            let count = self.hand(us, figure);
            self.set_hand(us, figure, count.saturating_sub(1));
            self.put(sq, Piece::new(us, figure));
        }
        if (self.gates() & touched).any() {
            let gates = self.gates() & !touched;
            self.set_gates(gates);
        }

        let lost = touched
            .iter()
            .fold(CastlingRights::NONE, |acc, sq| {
                acc.union(self.castle_mask[sq.index()])
            });
        if self.castling().intersects(lost) {
            let rights = self.castling().without(lost);
            self.set_castling(rights);
        }

        if piece.figure == Figure::Pawn || m.is_capture() {
            self.state_mut().halfmove_clock = 0;
        }

        if piece.figure == Figure::Pawn
            && m.move_type() == MoveType::Normal
            && from.rank().abs_diff(to.rank()) == 2
        {
            let ep = Square::new((from.rank() + to.rank()) / 2, from.file());
            if (pawn_attacks(us, ep) & self.by_piece(them, Figure::Pawn)).any() {
                self.set_en_passant(Some(ep));
            }
        }

        self.flip_side();

        if let Some((hinted, checked)) = self.check_hint.take() {
            if hinted == m {
                self.state().checked.set(Some(checked));
            }
        }
    }

    /// Take back the last move or null move.
    ///
    /// # Panics
    ///
    /// Panics if there is no move to take back.
    pub fn undo_move(&mut self) {
        assert!(self.states.len() > 1, "undo_move called without a move to undo");
        let m = self.state().last_move;
        self.side_to_move = self.side_to_move.opponent();

        if !m.is_null() {
            self.unplay(m);
        }
        self.states.pop();
    }

    /// Reverse the piece placement of `m`. Hash changes land in the state
    /// about to be popped.
    fn unplay(&mut self, m: Move) {
        let us = self.side_to_move;
        let from = m.from();
        let to = m.to();
        let piece = m.piece();

        if let (Some(figure), Some(sq)) = (m.gate(), m.gate_square()) {
            self.remove(sq, Piece::new(us, figure));
        }

        match m.move_type() {
            MoveType::Pass => {}
            MoveType::Castling => {
                let rook = Piece::new(us, Figure::Rook);
                if let Some((king_to, rook_to)) = m.castle_destinations() {
                    self.remove(king_to, piece);
                    self.remove(rook_to, rook);
                    self.put(from, piece);
                    self.put(to, rook);
                }
            }
            MoveType::SentryPush => {
                self.remove(to, m.target());
                if let (Some(victim), Some(dest)) = (m.capture(), m.push_to()) {
                    self.remove(dest, victim);
                    self.put(to, victim);
                }
                self.put(from, piece);
            }
            MoveType::Normal | MoveType::Promotion | MoveType::Enpassant => {
                let victim_sq = if m.move_type() == MoveType::Enpassant {
                    Self::en_passant_victim(m)
                } else {
                    to
                };
                if self.variant == Variant::Atomic && m.is_capture() {
                    let explosion = self.state().explosion;
                    for (sq, p) in explosion.iter() {
                        self.put(sq, p);
                    }
                } else {
                    self.remove(to, m.target());
                }
                if let Some(victim) = m.capture() {
                    self.put(victim_sq, victim);
                }
                self.put(from, piece);
            }
        }
    }

    /// Pass the turn without moving. Used by null-move pruning.
    pub fn do_null_move(&mut self) {
        self.push_state(Move::NULL);
        // Repetitions are not tracked across a null move.
        self.state_mut().halfmove_clock = 0;
        self.flip_side();
    }

    pub fn undo_null_move(&mut self) {
        debug_assert!(self.last_move().is_null());
        self.undo_move();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::types::MoveKind;

    fn find(pos: &mut Position, uci: &str) -> Move {
        pos.parse_uci(uci).unwrap()
    }

    #[test]
    fn do_undo_restores_start() {
        let mut pos = Position::start(Variant::Standard);
        let fen = pos.to_fen();
        let z = pos.zobrist();
        let m = find(&mut pos, "e2e4");
        pos.do_move(m);
        assert_eq!(pos.side_to_move(), Color::Black);
        pos.assert_consistent();
        pos.undo_move();
        assert_eq!(pos.to_fen(), fen);
        assert_eq!(pos.zobrist(), z);
    }

    #[test]
    #[should_panic(expected = "without a move")]
    fn undo_on_root_panics() {
        let mut pos = Position::start(Variant::Standard);
        pos.undo_move();
    }

    #[test]
    fn en_passant_only_when_capturable() {
        let mut pos = Position::start(Variant::Standard);
        let m = find(&mut pos, "e2e4");
        pos.do_move(m);
        assert_eq!(pos.en_passant(), None);

        let mut pos =
            Position::from_fen("4k3/8/8/8/5p2/8/4P3/4K3 w - - 0 1", Variant::Standard).unwrap();
        let m = find(&mut pos, "e2e4");
        pos.do_move(m);
        assert_eq!(pos.en_passant(), Some("e3".parse().unwrap()));
    }

    #[test]
    fn null_move_flips_side_and_clears_en_passant() {
        let mut pos = Position::from_fen(
            "4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2",
            Variant::Standard,
        )
        .unwrap();
        let z = pos.zobrist();
        pos.do_null_move();
        assert_eq!(pos.side_to_move(), Color::Black);
        assert_eq!(pos.en_passant(), None);
        pos.assert_consistent();
        pos.undo_null_move();
        assert_eq!(pos.zobrist(), z);
        assert_eq!(pos.en_passant(), Some("d6".parse().unwrap()));
    }

    #[test]
    fn rook_capture_removes_castling_right() {
        let mut pos =
            Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1", Variant::Standard).unwrap();
        let m = find(&mut pos, "a1a8");
        pos.do_move(m);
        assert_eq!(pos.to_fen(), "R3k2r/8/8/8/8/8/8/4K2R b Kk - 0 1");
        pos.assert_consistent();
    }

    #[test]
    fn atomic_capture_explodes_neighbours() {
        let mut pos = Position::from_fen(
            "rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2",
            Variant::Atomic,
        )
        .unwrap();
        let m = find(&mut pos, "e4d5");
        pos.do_move(m);
        assert_eq!(pos.piece_at("d5".parse().unwrap()), None);
        assert_eq!(pos.piece_at("e4".parse().unwrap()), None);
        pos.assert_consistent();
        pos.undo_move();
        assert_eq!(
            pos.to_fen(),
            "rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2"
        );
    }

    #[test]
    fn check_hint_matches_computed_check() {
        let mut pos = Position::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 0 1", Variant::Standard)
            .unwrap();
        let mut moves = Vec::new();
        pos.generate(MoveKind::All, &mut moves);
        for m in moves {
            let hinted = pos.gives_check(m);
            pos.do_move(m);
            let checked = pos.is_checked(Color::Black);
            pos.undo_move();
            assert_eq!(hinted, checked, "{m}");
        }
    }
}
