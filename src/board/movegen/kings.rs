use super::super::attack_tables::king_attacks;
use super::super::state::Position;
use super::super::types::{Bitboard, CastleSide, Figure, Move, MoveType, Piece, Square, Variant};
use super::GenContext;

/// Squares from `a` to `b` inclusive on a shared rank.
fn rank_span(a: Square, b: Square) -> Bitboard {
    let (lo, hi) = if a.file() <= b.file() {
        (a.file(), b.file())
    } else {
        (b.file(), a.file())
    };
    let files = (0..8)
        .filter(|f| (lo..=hi).contains(f))
        .fold(Bitboard::EMPTY, |acc, f| acc | Bitboard::file_mask(f));
    files & Bitboard::rank_mask(a.rank())
}

impl Position {
    /// King steps, castling and, for a jailed king, the pass move.
    pub(crate) fn gen_king_moves(&self, ctx: &GenContext, from_mask: Bitboard, out: &mut Vec<Move>) {
        let Some(king) = self.king_square(ctx.us) else {
            return;
        };
        if !from_mask.contains(king) {
            return;
        }
        let piece = Piece::new(ctx.us, Figure::King);

        if self.jailed(ctx.us).contains(king) {
            if ctx.kind.violent() {
                out.push(Move::new(MoveType::Pass, king, king, None, piece, piece));
            }
            return;
        }

        let mut targets = Bitboard::EMPTY;
        // Atomic kings cannot capture.
        if ctx.kind.violent() && self.variant != Variant::Atomic {
            targets |= ctx.enemy;
        }
        if ctx.kind.quiet() {
            targets |= ctx.empty;
        }
        self.push_moves(king, king_attacks(king) & targets, out);

        if ctx.kind.quiet() {
            self.gen_castling(ctx, king, out);
        }
    }

    fn gen_castling(&self, ctx: &GenContext, king: Square, out: &mut Vec<Move>) {
        if self.castling().is_empty() || self.is_checked(ctx.us) {
            return;
        }
        let them = ctx.us.opponent();
        let king_piece = Piece::new(ctx.us, Figure::King);
        let rook_piece = Piece::new(ctx.us, Figure::Rook);

        for side in CastleSide::ALL {
            let Some(rook) = self.castling_rook(ctx.us, side) else {
                continue;
            };
            if self.piece_at(rook) != Some(rook_piece) || self.jailed(ctx.us).contains(rook) {
                continue;
            }
            let rank = king.rank();
            let (king_file, rook_file) = side.destination_files();
            let king_to = Square::new(rank, king_file);
            let rook_to = Square::new(rank, rook_file);

            let path = (rank_span(king, king_to) | rank_span(rook, rook_to))
                & !(king.bitboard() | rook.bitboard());
            if (path & ctx.occupied).any() {
                continue;
            }
            // Neither castling piece screens an attacker along the rank.
            let occ = ctx.occupied ^ king.bitboard() ^ rook.bitboard();
            let safe = rank_span(king, king_to)
                .iter()
                .all(|sq| self.attackers_to(sq, occ, them).is_empty());
            if safe {
                out.push(Move::new(MoveType::Castling, king, rook, None, king_piece, king_piece));
            }
        }
    }
}
