use super::super::attack_tables::{bishop_attacks, knight_attacks, ray_attacks, rook_attacks};
use super::super::state::Position;
use super::super::types::{Bitboard, Direction, Figure, Move, MoveType, Piece};
use super::GenContext;

impl Position {
    /// Bishops, rooks, queens, hawks, elephants, jailers and lancers.
    pub(crate) fn gen_slider_moves(&self, ctx: &GenContext, movers: Bitboard, out: &mut Vec<Move>) {
        let occ = ctx.occupied;
        let targets = ctx.targets();

        for from in movers & self.by_figure(Figure::Bishop) {
            self.push_moves(from, bishop_attacks(from, occ) & targets, out);
        }
        for from in movers & self.by_figure(Figure::Rook) {
            self.push_moves(from, rook_attacks(from, occ) & targets, out);
        }
        for from in movers & self.by_figure(Figure::Queen) {
            let attacks = bishop_attacks(from, occ) | rook_attacks(from, occ);
            self.push_moves(from, attacks & targets, out);
        }
        for from in movers & self.by_figure(Figure::Hawk) {
            let attacks = bishop_attacks(from, occ) | knight_attacks(from);
            self.push_moves(from, attacks & targets, out);
        }
        for from in movers & self.by_figure(Figure::Elephant) {
            let attacks = rook_attacks(from, occ) | knight_attacks(from);
            self.push_moves(from, attacks & targets, out);
        }
        // Jailers never capture.
        for from in movers & self.by_figure(Figure::Jailer) {
            self.push_moves(from, rook_attacks(from, occ) & ctx.quiet_targets(), out);
        }
        for dir in Direction::ALL {
            let figure = Figure::lancer(dir);
            for from in movers & self.by_figure(figure) {
                let dests = ray_attacks(dir, from, occ) & targets;
                self.push_lancer_moves(ctx, from, figure, dests, out);
            }
        }
    }

    /// Each lancer arrival fans out into one move per new facing.
    fn push_lancer_moves(
        &self,
        ctx: &GenContext,
        from: super::super::types::Square,
        figure: Figure,
        dests: Bitboard,
        out: &mut Vec<Move>,
    ) {
        let piece = Piece::new(ctx.us, figure);
        for to in dests {
            let capture = self.piece_at(to);
            for facing in Direction::ALL {
                let target = Piece::new(ctx.us, Figure::lancer(facing));
                out.push(Move::new(MoveType::Normal, from, to, capture, target, piece));
            }
        }
    }
}
