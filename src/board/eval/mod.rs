//! Static evaluation.
//!
//! A tapered evaluation: every term produces a midgame and an endgame score
//! which are blended by the game phase (0 = opening, 256 = bare endgame).
//! The pawn and king skeleton is cached in a [`PawnHashTable`] keyed by the
//! position's pawn+king hash.
//!
//! Scores are in centipawns from White's point of view; callers negate for
//! Black to move (see [`Evaluator::evaluate_relative`]).

mod weights;

use crate::pawn_hash::PawnHashTable;

use super::attack_tables::{
    bishop_attacks, distance, king_attacks, knight_attacks, pawn_attacks, ray_attacks,
    rook_attacks,
};
use super::search::{KNOWN_LOSS, KNOWN_WIN};
use super::state::Position;
use super::types::{Bitboard, Color, Figure, Piece, Square};
use weights::*;

/// Phase value of a bare endgame.
pub const PHASE_MAX: i32 = 256;

#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
struct Score {
    mg: i32,
    eg: i32,
}

impl Score {
    fn add(&mut self, (mg, eg): (i32, i32)) {
        self.mg += mg;
        self.eg += eg;
    }

    fn sub(&mut self, (mg, eg): (i32, i32)) {
        self.mg -= mg;
        self.eg -= eg;
    }

    fn add_for(&mut self, color: Color, term: (i32, i32)) {
        match color {
            Color::White => self.add(term),
            Color::Black => self.sub(term),
        }
    }
}

/// Squares attacked by `piece` from `sq`.
///
/// Jailers only block and never attack; the value returned for them is
/// their rook-like reach, which mobility counts.
pub(crate) fn piece_attacks(piece: Piece, sq: Square, occ: Bitboard) -> Bitboard {
    match piece.figure {
        Figure::Pawn => pawn_attacks(piece.color, sq),
        Figure::Knight => knight_attacks(sq),
        Figure::Bishop | Figure::Sentry => bishop_attacks(sq, occ),
        Figure::Rook | Figure::Jailer => rook_attacks(sq, occ),
        Figure::Queen => bishop_attacks(sq, occ) | rook_attacks(sq, occ),
        Figure::King => king_attacks(sq),
        Figure::Hawk => bishop_attacks(sq, occ) | knight_attacks(sq),
        Figure::Elephant => rook_attacks(sq, occ) | knight_attacks(sq),
        lancer => match lancer.direction() {
            Some(dir) => ray_attacks(dir, sq, occ),
            None => Bitboard::EMPTY,
        },
    }
}

fn mobility_bonus(figure: Figure, count: usize) -> (i32, i32) {
    fn pick(mg: &[i32], eg: &[i32], count: usize) -> (i32, i32) {
        let i = count.min(mg.len() - 1);
        (mg[i], eg[i])
    }
    match figure {
        Figure::Pawn | Figure::King => (0, 0),
        Figure::Bishop | Figure::Sentry | Figure::Hawk => pick(&BISHOP_MOB_MG, &BISHOP_MOB_EG, count),
        Figure::Rook | Figure::Jailer | Figure::Elephant => pick(&ROOK_MOB_MG, &ROOK_MOB_EG, count),
        Figure::Queen => pick(&QUEEN_MOB_MG, &QUEEN_MOB_EG, count),
        _ => pick(&KNIGHT_MOB_MG, &KNIGHT_MOB_EG, count),
    }
}

/// Piece-square table index of `sq` for `color`.
#[inline]
fn pst_index(color: Color, sq: Square) -> usize {
    match color {
        Color::White => sq.index(),
        Color::Black => sq.index() ^ 56,
    }
}

/// Game phase from non-pawn material on the board and in hand.
#[must_use]
pub fn phase(pos: &Position) -> i32 {
    let mut npm = 0;
    for figure in Figure::ALL {
        npm += phase_weight(figure) * pos.by_figure(figure).popcount() as i32;
    }
    for color in Color::ALL {
        for figure in [Figure::Hawk, Figure::Elephant] {
            npm += phase_weight(figure) * i32::from(pos.hand(color, figure));
        }
    }
    let npm = npm.min(PHASE_TOTAL);
    ((PHASE_TOTAL - npm) * PHASE_MAX + PHASE_TOTAL / 2) / PHASE_TOTAL
}

/// Evaluation context owning the pawn structure cache.
pub struct Evaluator {
    pawns: PawnHashTable,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    #[must_use]
    pub fn new() -> Self {
        Evaluator {
            pawns: PawnHashTable::default(),
        }
    }

    #[must_use]
    pub fn with_pawn_hash_kb(size_kb: usize) -> Self {
        Evaluator {
            pawns: PawnHashTable::new(size_kb),
        }
    }

    pub fn clear(&mut self) {
        self.pawns.clear();
    }

    /// Score from the side to move's point of view.
    pub fn evaluate_relative(&mut self, pos: &Position) -> i32 {
        self.evaluate(pos) * pos.side_to_move().multiplier()
    }

    /// Score from White's point of view, strictly inside
    /// `(KNOWN_LOSS, KNOWN_WIN)`.
    pub fn evaluate(&mut self, pos: &Position) -> i32 {
        let mut score = Score::default();

        material_and_placement(pos, &mut score);
        score.add(self.pawn_structure(pos));
        pieces(pos, &mut score);

        let phase = phase(pos);
        let blended = score.mg * (PHASE_MAX - phase) + score.eg * phase;
        // Round half away from zero so mirrored positions score exactly opposite.
        let cp = if blended >= 0 {
            (blended + PHASE_MAX / 2) >> 8
        } else {
            -((PHASE_MAX / 2 - blended) >> 8)
        };
        cp.clamp(KNOWN_LOSS + 1, KNOWN_WIN - 1)
    }

    fn pawn_structure(&mut self, pos: &Position) -> (i32, i32) {
        let key = pos.pawn_king_hash();
        if let Some(entry) = self.pawns.probe(key) {
            return (entry.mg, entry.eg);
        }
        let mut score = Score::default();
        for color in Color::ALL {
            score.add_for(color, pawn_terms(pos, color));
            score.add_for(color, (shelter(pos, color), 0));
        }
        self.pawns.store(key, score.mg, score.eg);
        (score.mg, score.eg)
    }
}

fn material_and_placement(pos: &Position, score: &mut Score) {
    for color in Color::ALL {
        for figure in Figure::ALL {
            let row = pst_row(figure);
            let (mg, eg) = material(figure);
            for sq in pos.by_piece(color, figure) {
                let i = pst_index(color, sq);
                score.add_for(color, (mg + PST_MG[row][i], eg + PST_EG[row][i]));
            }
        }
        for figure in [Figure::Hawk, Figure::Elephant] {
            let count = i32::from(pos.hand(color, figure));
            let (mg, eg) = material(figure);
            score.add_for(color, (mg * count, eg * count));
        }
    }
}

/// Pawn structure and passed-pawn king distances for `us`.
fn pawn_terms(pos: &Position, us: Color) -> (i32, i32) {
    let them = us.opponent();
    let own = pos.by_piece(us, Figure::Pawn);
    let their = pos.by_piece(them, Figure::Pawn);
    let kings = (pos.king_square(us), pos.king_square(them));
    let mut score = Score::default();

    for sq in own {
        let b = sq.bitboard();
        let rank = sq.relative_rank(us);
        let beside = b.east() | b.west();

        let doubled = (own & b.forward_span(us)).any();
        let isolated = (own & b.adjacent_files()).is_empty();
        let rammed = (their & b.forward(us)).any();
        let phalanx = (own & beside).any();
        let defended = (own & pawn_attacks(them, sq)).any();

        if doubled {
            score.add(DOUBLED_PAWN);
        }
        if isolated {
            score.add(ISOLATED_PAWN);
        }
        if rammed {
            score.add(RAMMED_PAWN);
        }
        if phalanx || defended {
            score.add((CONNECTED_MG[rank], CONNECTED_EG[rank]));
        } else if !isolated {
            let support = own & (beside | beside.backward_span(us));
            let stop = b.forward(us);
            let stop_attacked = stop
                .lsb()
                .is_some_and(|s| (pawn_attacks(us, s) & their).any());
            if support.is_empty() && stop_attacked {
                score.add(BACKWARD_PAWN);
            }
        }

        let passed = !doubled && (their & (b | beside).forward_span(us)).is_empty();
        if passed {
            score.add((PASSED_MG[rank], PASSED_EG[rank]));
            if let (Some(own_king), Some(their_king), Some(stop)) =
                (kings.0, kings.1, b.forward(us).lsb())
            {
                let tropism = distance(their_king, stop) * PASSED_ENEMY_KING_DISTANCE
                    - distance(own_king, stop) * PASSED_OWN_KING_DISTANCE;
                score.add((0, tropism * rank as i32 / 4));
            }
        }
    }
    (score.mg, score.eg)
}

/// Midgame pawn shelter in front of `us`'s king.
fn shelter(pos: &Position, us: Color) -> i32 {
    let Some(king) = pos.king_square(us) else {
        return 0;
    };
    let own = pos.by_piece(us, Figure::Pawn);
    let b = king.bitboard();
    let files = b | b.east() | b.west();
    let mut bonus = 0;
    for front in files {
        let ahead = own & front.bitboard().forward_span(us);
        let nearest = match us {
            Color::White => ahead.lsb(),
            Color::Black => ahead.msb(),
        };
        if let Some(pawn) = nearest {
            bonus += match pawn.rank().abs_diff(king.rank()) {
                1 => SHELTER_NEAR,
                2 => SHELTER_FRONT,
                _ => SHELTER_FAR,
            };
        }
    }
    bonus
}

/// Mobility, king attackers, rooks on open files, bishop pair and queen
/// tropism.
fn pieces(pos: &Position, score: &mut Score) {
    let occ = pos.occupied();
    let pawns = pos.by_figure(Figure::Pawn);

    for us in Color::ALL {
        let them = us.opponent();
        let own = pos.by_color(us);
        let jailed = pos.jailed(us);
        let enemy_pawn_attacks = {
            let p = pos.by_piece(them, Figure::Pawn).forward(them);
            p.east() | p.west()
        };
        let area = !own & !enemy_pawn_attacks;
        let their_king = pos.king_square(them);
        let king_zone = their_king.map_or(Bitboard::EMPTY, |k| king_attacks(k) | k.bitboard());
        let mut king_attackers = 0usize;

        for sq in own & !jailed & !pawns {
            let Some(piece) = pos.piece_at(sq) else {
                continue;
            };
            if piece.figure == Figure::King {
                continue;
            }
            let attacks = piece_attacks(piece, sq, occ);
            let reach = if piece.figure == Figure::Jailer {
                attacks & !occ
            } else {
                attacks
            };
            score.add_for(
                us,
                mobility_bonus(piece.figure, (reach & area).popcount() as usize),
            );
            if piece.figure != Figure::Jailer && (attacks & king_zone).any() {
                king_attackers += 1;
            }

            match piece.figure {
                Figure::Rook | Figure::Elephant => {
                    let file = Bitboard::file_mask(sq.file());
                    if (file & pawns).is_empty() {
                        score.add_for(us, ROOK_OPEN_FILE);
                    } else if (file & pos.by_piece(us, Figure::Pawn)).is_empty() {
                        score.add_for(us, ROOK_SEMI_OPEN_FILE);
                    }
                }
                Figure::Queen => {
                    if let Some(k) = their_king {
                        score.add_for(us, ((7 - distance(sq, k)) * QUEEN_TROPISM, 0));
                    }
                }
                _ => {}
            }
        }

        score.add_for(us, (-KING_ATTACKERS[king_attackers.min(3)], 0));

        let bishops = pos.by_piece(us, Figure::Bishop);
        if (bishops & Bitboard::LIGHT_SQUARES).any() && (bishops & Bitboard::DARK_SQUARES).any() {
            score.add_for(us, BISHOP_PAIR);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Variant;

    fn eval(fen: &str, variant: Variant) -> i32 {
        let pos = Position::from_fen(fen, variant).unwrap();
        Evaluator::new().evaluate(&pos)
    }

    #[test]
    fn start_positions_are_balanced() {
        for variant in Variant::ALL {
            let pos = Position::start(variant);
            assert_eq!(Evaluator::new().evaluate(&pos), 0, "{variant:?}");
        }
    }

    #[test]
    fn mirrored_positions_negate() {
        let white = eval("4k3/8/8/8/8/2N5/4P3/4K3 w - - 0 1", Variant::Standard);
        let black = eval("4k3/4p3/2n5/8/8/8/8/4K3 b - - 0 1", Variant::Standard);
        assert!(white > 0);
        assert_eq!(white, -black);
    }

    #[test]
    fn relative_score_follows_side_to_move() {
        let mut e = Evaluator::new();
        let w = Position::from_fen("4k3/8/8/8/8/8/4P3/4K3 w - - 0 1", Variant::Standard).unwrap();
        let b = Position::from_fen("4k3/8/8/8/8/8/4P3/4K3 b - - 0 1", Variant::Standard).unwrap();
        assert_eq!(e.evaluate_relative(&w), -e.evaluate_relative(&b));
    }

    #[test]
    fn phase_runs_from_opening_to_endgame() {
        assert_eq!(phase(&Position::start(Variant::Standard)), 0);
        let bare = Position::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1", Variant::Standard).unwrap();
        assert_eq!(phase(&bare), PHASE_MAX);
        let rooks = Position::from_fen("r3k3/8/8/8/8/8/8/R3K3 w - - 0 1", Variant::Standard).unwrap();
        let p = phase(&rooks);
        assert!(p > 0 && p < PHASE_MAX);
    }

    #[test]
    fn passed_pawn_beats_blocked_pawn() {
        let passed = eval("4k3/8/8/3P4/8/8/8/4K3 w - - 0 1", Variant::Standard);
        let blocked = eval("4k3/8/3p4/3P4/8/8/8/4K3 w - - 0 1", Variant::Standard);
        assert!(passed > blocked + 50);
    }

    #[test]
    fn hand_pieces_count_as_material() {
        let with = eval("4k3/8/8/8/8/8/8/4K3[H] w - - 0 1", Variant::Seirawan);
        assert!(with > 500);
    }

    #[test]
    fn pawn_cache_hit_matches_fresh_evaluation() {
        let pos = Position::from_fen(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            Variant::Standard,
        )
        .unwrap();
        let mut e = Evaluator::new();
        let first = e.evaluate(&pos);
        assert_eq!(e.evaluate(&pos), first);
        assert_eq!(Evaluator::new().evaluate(&pos), first);
    }

    #[test]
    fn missing_king_is_bounded() {
        let score = eval("8/8/8/8/8/8/8/QQQQK3 w - - 0 1", Variant::Atomic);
        assert!(score > KNOWN_LOSS && score < KNOWN_WIN);
    }
}
