use super::super::attack_tables::pawn_attacks;
use super::super::state::Position;
use super::super::types::{Bitboard, Figure, Move, MoveType, Piece, Square};
use super::GenContext;

impl Position {
    pub(crate) fn gen_pawn_moves(&self, ctx: &GenContext, pawns: Bitboard, out: &mut Vec<Move>) {
        let us = ctx.us;
        let them = us.opponent();
        let last_rank = Bitboard::rank_mask(them.back_rank());
        let ep = self.en_passant();

        for from in pawns {
            // Pushes. Promotions can be violent, so test the kind per move.
            let one = from.bitboard().forward(us) & ctx.empty;
            if let Some(to) = one.lsb() {
                if (ctx.kind.quiet() || (one & last_rank).any()) && ctx.evasion.contains(to) {
                    self.push_pawn_move(ctx, from, to, None, out);
                }
                if from.relative_rank(us) == 1 && ctx.kind.quiet() {
                    let two = one.forward(us) & ctx.empty & ctx.evasion;
                    if let Some(to) = two.lsb() {
                        let pawn = Piece::new(us, Figure::Pawn);
                        out.push(Move::new(MoveType::Normal, from, to, None, pawn, pawn));
                    }
                }
            }

            // Captures. Underpromotions that capture are quiet.
            let attacks = pawn_attacks(us, from);
            for to in attacks & ctx.enemy & ctx.evasion {
                if ctx.kind.violent() || to.relative_rank(us) == 7 {
                    self.push_pawn_move(ctx, from, to, self.piece_at(to), out);
                }
            }

            if let Some(ep) = ep {
                if ctx.kind.violent() && attacks.contains(ep) {
                    let victim = Square::new(from.rank(), ep.file());
                    let pawn = Piece::new(us, Figure::Pawn);
                    let captured = Piece::new(them, Figure::Pawn);
                    if self.piece_at(victim) == Some(captured) && self.piece_at(ep).is_none() {
                        out.push(Move::new(
                            MoveType::Enpassant,
                            from,
                            ep,
                            Some(captured),
                            pawn,
                            pawn,
                        ));
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::board::{MoveKind, Position, Variant};

    #[test]
    fn double_push_needs_empty_intermediate() {
        let pos = Position::from_fen("4k3/8/8/8/8/4n3/4P3/4K3 w - - 0 1", Variant::Standard)
            .unwrap();
        let mut moves = Vec::new();
        pos.generate(MoveKind::All, &mut moves);
        assert!(moves.iter().all(|m| m.piece().figure != crate::board::Figure::Pawn));
    }

    #[test]
    fn en_passant_is_generated() {
        let pos = Position::from_fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2", Variant::Standard)
            .unwrap();
        let mut moves = Vec::new();
        pos.generate(MoveKind::Violent, &mut moves);
        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0].uci(false), "e5d6");
    }
}
