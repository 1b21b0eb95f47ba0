use super::super::attack_tables::{bishop_attacks, knight_attacks, ray_attacks, rook_attacks};
use super::super::state::Position;
use super::super::types::{Bitboard, Figure, Move, MoveType, Piece, Square};
use super::GenContext;

impl Position {
    /// Sentry slides and pushes.
    ///
    /// A sentry slides like a bishop onto empty squares. Landing on an enemy
    /// piece other than the king pushes that piece to an empty square it
    /// could itself reach from the landing square.
    pub(crate) fn gen_sentry_moves(&self, ctx: &GenContext, sentries: Bitboard, out: &mut Vec<Move>) {
        let kings = self.by_figure(Figure::King);
        for from in sentries {
            let attacks = bishop_attacks(from, ctx.occupied);
            self.push_moves(from, attacks & ctx.quiet_targets(), out);

            if !ctx.kind.violent() {
                continue;
            }
            let sentry = Piece::new(ctx.us, Figure::Sentry);
            for to in attacks & ctx.enemy & !kings & ctx.evasion {
                let Some(victim) = self.piece_at(to) else {
                    continue;
                };
                let occ = ctx.occupied ^ from.bitboard();
                for dest in push_destinations(victim, to, occ) {
                    out.push(
                        Move::new(MoveType::SentryPush, from, to, Some(victim), sentry, sentry)
                            .with_push(dest),
                    );
                }
            }
        }
    }
}

/// Empty squares `victim` could move to from `sq` with occupancy `occ`.
fn push_destinations(victim: Piece, sq: Square, occ: Bitboard) -> Bitboard {
    let empty = !occ;
    let reach = match victim.figure {
        Figure::Pawn => {
            let color = victim.color;
            let last_rank = Bitboard::rank_mask(color.opponent().back_rank());
            let one = sq.bitboard().forward(color) & empty;
            let two = if sq.relative_rank(color) == 1 {
                one.forward(color) & empty
            } else {
                Bitboard::EMPTY
            };
            (one | two) & !last_rank
        }
        Figure::Knight => knight_attacks(sq),
        Figure::Bishop | Figure::Sentry => bishop_attacks(sq, occ),
        Figure::Rook | Figure::Jailer => rook_attacks(sq, occ),
        Figure::Queen => bishop_attacks(sq, occ) | rook_attacks(sq, occ),
        Figure::Hawk => bishop_attacks(sq, occ) | knight_attacks(sq),
        Figure::Elephant => rook_attacks(sq, occ) | knight_attacks(sq),
        Figure::King => Bitboard::EMPTY,
        lancer => match lancer.direction() {
            Some(dir) => ray_attacks(dir, sq, occ),
            None => Bitboard::EMPTY,
        },
    };
    reach & empty
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::types::Color;
    use crate::board::{MoveKind, Variant};

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    #[test]
    fn pushed_pawn_never_reaches_last_rank() {
        let pawn = Piece::new(Color::Black, Figure::Pawn);
        let occ = sq("e2").bitboard();
        assert!(push_destinations(pawn, sq("e2"), occ).is_empty());
        let dests = push_destinations(pawn, sq("e7"), sq("e7").bitboard());
        assert_eq!(dests, sq("e6").bitboard() | sq("e5").bitboard());
    }

    #[test]
    fn sentry_pushes_knight() {
        let pos = Position::from_fen("4k3/8/8/8/8/2n5/8/S3K3 w - - 0 1 -", Variant::EightPiece)
            .unwrap();
        let mut moves = Vec::new();
        pos.generate(MoveKind::Violent, &mut moves);
        let pushes: Vec<_> = moves
            .iter()
            .filter(|m| m.move_type() == MoveType::SentryPush)
            .collect();
        // knight on c3 after the sentry lands: a2 b1 a4 b5 d5 e4 e2 d1
        assert_eq!(pushes.len(), 8);
        assert!(pushes.iter().all(|m| m.to() == sq("c3")));
    }

    #[test]
    fn push_disables_the_return_move() {
        let mut pos =
            Position::from_fen("4k3/8/8/8/8/2n5/8/S3K3 w - - 0 1 -", Variant::EightPiece).unwrap();
        let m = pos.parse_uci("a1c3a2").unwrap();
        pos.do_move(m);
        assert_eq!(pos.disabled_move(), Some((sq("a2"), sq("a1"))));
        pos.assert_consistent();
        let moves = pos.legal_moves();
        assert!(!moves.iter().any(|m| m.from() == sq("a2") && m.to() == sq("a1")));
        pos.undo_move();
        assert_eq!(pos.to_fen(), "4k3/8/8/8/8/2n5/8/S3K3 w - - 0 1 -");
    }
}
