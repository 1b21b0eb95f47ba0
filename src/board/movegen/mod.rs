//! Pseudo-legal move generation and the legality filter.
//!
//! Generation is split by piece family. Every generator appends to a caller
//! buffer and honours a [`MoveKind`] so the search can ask for violent and
//! quiet moves separately; the two sets are disjoint and their union equals
//! `MoveKind::All`.

mod kings;
mod knights;
mod pawns;
mod perft;
mod sentries;
mod sliders;

use super::attack_tables::{knight_attacks, queen_attacks};
use super::state::Position;
use super::types::{Bitboard, Color, Figure, Move, MoveKind, MoveType, Piece, Variant};

/// Masks shared by the per-piece generators for one call.
pub(crate) struct GenContext {
    pub(crate) us: Color,
    pub(crate) kind: MoveKind,
    pub(crate) occupied: Bitboard,
    pub(crate) own: Bitboard,
    pub(crate) enemy: Bitboard,
    pub(crate) empty: Bitboard,
    /// Non-king destinations that can answer a check. `ALL` when not in check.
    pub(crate) evasion: Bitboard,
}

impl GenContext {
    /// Destinations allowed for an ordinary capturing piece.
    #[inline]
    pub(crate) fn targets(&self) -> Bitboard {
        let mut targets = Bitboard::EMPTY;
        if self.kind.violent() {
            targets |= self.enemy;
        }
        if self.kind.quiet() {
            targets |= self.empty;
        }
        targets & self.evasion
    }

    /// Destinations for pieces that only move to empty squares.
    #[inline]
    pub(crate) fn quiet_targets(&self) -> Bitboard {
        if self.kind.quiet() {
            self.empty & self.evasion
        } else {
            Bitboard::EMPTY
        }
    }
}

/// Promotion figures offered in `variant`. Queen comes first.
pub(crate) fn promotion_figures(variant: Variant) -> &'static [Figure] {
    const STANDARD: [Figure; 4] = [Figure::Queen, Figure::Rook, Figure::Bishop, Figure::Knight];
    const SEIRAWAN: [Figure; 6] = [
        Figure::Queen,
        Figure::Rook,
        Figure::Bishop,
        Figure::Knight,
        Figure::Hawk,
        Figure::Elephant,
    ];
    const EIGHTPIECE: [Figure; 14] = [
        Figure::Queen,
        Figure::Rook,
        Figure::Bishop,
        Figure::Knight,
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
    match variant {
        Variant::Standard | Variant::Atomic => &STANDARD,
        Variant::Seirawan => &SEIRAWAN,
        Variant::EightPiece => &EIGHTPIECE,
    }
}

impl Position {
    fn gen_context(&self, kind: MoveKind) -> GenContext {
        let us = self.side_to_move;
        let own = self.by_color(us);
        let enemy = self.by_color(us.opponent());
        let occupied = own | enemy;
        let mut evasion = Bitboard::ALL;
        if self.variant == Variant::Standard && self.is_checked(us) {
            if let Some(king) = self.king_square(us) {
                evasion = knight_attacks(king) | queen_attacks(king, occupied);
            }
        }
        GenContext {
            us,
            kind,
            occupied,
            own,
            enemy,
            empty: !occupied,
            evasion,
        }
    }

    /// Append all pseudo-legal moves of `kind` to `out`.
    pub fn generate(&self, kind: MoveKind, out: &mut Vec<Move>) {
        self.generate_from(Bitboard::ALL, kind, out);
    }

    /// Append pseudo-legal moves of `kind` for pieces standing on `from_mask`.
    pub(crate) fn generate_from(&self, from_mask: Bitboard, kind: MoveKind, out: &mut Vec<Move>) {
        let us = self.side_to_move;
        if self.variant == Variant::Atomic
            && (self.king_square(us).is_none() || self.king_square(us.opponent()).is_none())
        {
            return;
        }

        let ctx = self.gen_context(kind);
        let movers = from_mask & ctx.own & !self.jailed(us);
        let start = out.len();

        self.gen_pawn_moves(&ctx, movers & self.by_figure(Figure::Pawn), out);
        self.gen_knight_moves(&ctx, movers & self.by_figure(Figure::Knight), out);
        self.gen_slider_moves(&ctx, movers, out);
        self.gen_sentry_moves(&ctx, movers & self.by_figure(Figure::Sentry), out);
        self.gen_king_moves(&ctx, from_mask, out);

        if let Some((from, to)) = self.disabled_move() {
            let mut i = start;
            while i < out.len() {
                if out[i].from() == from && out[i].to() == to {
                    out.swap_remove(i);
                } else {
                    i += 1;
                }
            }
        }
        if self.variant == Variant::Seirawan {
            self.expand_gating(start, out);
        }
    }

    /// Add a gating copy of every move that vacates an open gate square
    /// while hawks or elephants remain in hand.
    fn expand_gating(&self, start: usize, out: &mut Vec<Move>) {
        let us = self.side_to_move;
        let gates = self.gates() & Bitboard::rank_mask(us.back_rank());
        let figures: Vec<Figure> = [Figure::Hawk, Figure::Elephant]
            .into_iter()
            .filter(|&f| self.hand(us, f) > 0)
            .collect();
        if gates.is_empty() || figures.is_empty() {
            return;
        }
        let end = out.len();
        for i in start..end {
            let m = out[i];
            if m.move_type() == MoveType::Castling {
                let Some((king_to, rook_to)) = m.castle_destinations() else {
                    continue;
                };
                let landing = king_to.bitboard() | rook_to.bitboard();
                for (sq, on_rook) in [(m.from(), false), (m.to(), true)] {
                    if gates.contains(sq) && !landing.contains(sq) {
                        for &f in &figures {
                            out.push(m.with_gate(f, on_rook));
                        }
                    }
                }
            } else if gates.contains(m.from()) && m.move_type() != MoveType::Pass {
                for &f in &figures {
                    out.push(m.with_gate(f, false));
                }
            }
        }
    }

    /// Push a move or, on the last rank, one move per promotion figure.
    pub(crate) fn push_pawn_move(
        &self,
        ctx: &GenContext,
        from: super::types::Square,
        to: super::types::Square,
        capture: Option<Piece>,
        out: &mut Vec<Move>,
    ) {
        let pawn = Piece::new(ctx.us, Figure::Pawn);
        if to.relative_rank(ctx.us) == 7 {
            for &figure in promotion_figures(self.variant) {
                let violent = figure == Figure::Queen;
                if (violent && ctx.kind.violent()) || (!violent && ctx.kind.quiet()) {
                    let target = Piece::new(ctx.us, figure);
                    out.push(Move::new(MoveType::Promotion, from, to, capture, target, pawn));
                }
            }
        } else {
            let wanted = if capture.is_some() {
                ctx.kind.violent()
            } else {
                ctx.kind.quiet()
            };
            if wanted {
                out.push(Move::new(MoveType::Normal, from, to, capture, pawn, pawn));
            }
        }
    }

    /// True if the side that just moved did not leave its king en prise.
    /// Call right after `do_move`.
    pub(crate) fn last_move_was_legal(&self) -> bool {
        let mover = self.side_to_move.opponent();
        if self.king_square(mover).is_none() {
            return false;
        }
        if self.variant == Variant::Atomic && self.king_square(self.side_to_move).is_none() {
            return true;
        }
        !self.is_checked(mover)
    }

    /// Whether the pseudo-legal move `m` keeps the mover's king safe.
    pub fn is_legal(&mut self, m: Move) -> bool {
        self.do_move(m);
        let legal = self.last_move_was_legal();
        self.undo_move();
        legal
    }

    /// All legal moves in generation order.
    pub fn legal_moves(&mut self) -> Vec<Move> {
        let mut moves = Vec::with_capacity(64);
        self.generate(MoveKind::All, &mut moves);
        moves.retain(|&m| self.is_legal(m));
        moves
    }

    /// Whether `m` could be generated in this position, ignoring king safety.
    /// Used to validate hash, killer and PV moves before replaying them.
    #[must_use]
    pub fn is_pseudo_legal(&self, m: Move) -> bool {
        if m.is_null() || m.piece().color != self.side_to_move {
            return false;
        }
        if self.piece_at(m.from()) != Some(m.piece()) {
            return false;
        }
        let kind = if m.is_violent() {
            MoveKind::Violent
        } else {
            MoveKind::Quiet
        };
        let mut moves = Vec::with_capacity(32);
        self.generate_from(m.from().bitboard(), kind, &mut moves);
        moves.contains(&m)
    }
}
