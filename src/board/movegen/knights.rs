use super::super::attack_tables::knight_attacks;
use super::super::state::Position;
use super::super::types::{Bitboard, Move, MoveType};
use super::GenContext;

impl Position {
    pub(crate) fn gen_knight_moves(&self, ctx: &GenContext, knights: Bitboard, out: &mut Vec<Move>) {
        let targets = ctx.targets();
        for from in knights {
            self.push_moves(from, knight_attacks(from) & targets, out);
        }
    }

    /// Push one normal move per destination for the piece on `from`.
    pub(crate) fn push_moves(&self, from: super::super::types::Square, dests: Bitboard, out: &mut Vec<Move>) {
        let Some(piece) = self.piece_at(from) else {
            return;
        };
        for to in dests {
            out.push(Move::new(MoveType::Normal, from, to, self.piece_at(to), piece, piece));
        }
    }
}
