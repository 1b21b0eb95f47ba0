//! Staged move picker.
//!
//! Moves of one node are produced lazily in stages so a cutoff on an early
//! move saves generating and sorting the rest:
//!
//! `Hash -> GenViolent -> ReturnViolent -> GenKiller -> ReturnKiller ->
//! GenRest -> ReturnRest -> Done`
//!
//! Every pseudo-legal move of the position is returned exactly once.

use super::constants::SORT_GAPS;
use super::tables::HistoryTable;
use crate::board::{Move, MoveKind, Position};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Hash,
    GenViolent,
    ReturnViolent,
    GenKiller,
    ReturnKiller,
    GenRest,
    ReturnRest,
    Done,
}

/// Most valuable victim first, least valuable attacker breaking ties.
/// Promotions count the promoted figure as extra victim value.
#[must_use]
pub fn mvv_lva(m: Move) -> i32 {
    let victim = m.capture().map_or(0, |p| p.figure.order());
    let promotion = m.promotion().map_or(0, |f| f.order());
    (victim + promotion) * 16 - m.piece().figure.order()
}

/// Sort `moves` by descending key with a gapped insertion sort.
fn shell_sort(moves: &mut [(i32, Move)]) {
    for gap in SORT_GAPS {
        for i in gap..moves.len() {
            let item = moves[i];
            let mut j = i;
            while j >= gap && moves[j - gap].0 < item.0 {
                moves[j] = moves[j - gap];
                j -= gap;
            }
            moves[j] = item;
        }
    }
}

pub struct MovePicker {
    stage: Stage,
    hash_move: Move,
    /// Killers then the counter move.
    candidates: [Move; 3],
    /// Killers actually returned, skipped in the rest stage.
    returned: [Move; 3],
    moves: Vec<(i32, Move)>,
    index: usize,
    violent_only: bool,
}

impl MovePicker {
    /// Picker over all pseudo-legal moves.
    #[must_use]
    pub fn new(hash_move: Move, killers: [Move; 2], counter: Move) -> Self {
        MovePicker {
            stage: Stage::Hash,
            hash_move,
            candidates: [killers[0], killers[1], counter],
            returned: [Move::NULL; 3],
            moves: Vec::with_capacity(64),
            index: 0,
            violent_only: false,
        }
    }

    /// Picker over violent moves only, for quiescence.
    #[must_use]
    pub fn violent(hash_move: Move) -> Self {
        let hash_move = if hash_move.is_violent() {
            hash_move
        } else {
            Move::NULL
        };
        MovePicker {
            violent_only: true,
            ..Self::new(hash_move, [Move::NULL; 2], Move::NULL)
        }
    }

    #[must_use]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Next pseudo-legal move, or `None` once every stage is exhausted.
    pub fn next(&mut self, pos: &Position, history: &HistoryTable) -> Option<Move> {
        loop {
            match self.stage {
                Stage::Hash => {
                    self.stage = Stage::GenViolent;
                    if pos.is_pseudo_legal(self.hash_move) {
                        return Some(self.hash_move);
                    }
                    self.hash_move = Move::NULL;
                }
                Stage::GenViolent => {
                    self.generate(pos, MoveKind::Violent, |m| mvv_lva(m));
                    self.stage = Stage::ReturnViolent;
                }
                Stage::ReturnViolent => {
                    if let Some(m) = self.pop() {
                        return Some(m);
                    }
                    self.stage = if self.violent_only {
                        Stage::Done
                    } else {
                        Stage::GenKiller
                    };
                }
                Stage::GenKiller => {
                    self.index = 0;
                    self.stage = Stage::ReturnKiller;
                }
                Stage::ReturnKiller => {
                    while self.index < self.candidates.len() {
                        let m = self.candidates[self.index];
                        self.index += 1;
                        if m.is_null()
                            || m == self.hash_move
                            || !m.is_quiet()
                            || self.returned.contains(&m)
                            || !pos.is_pseudo_legal(m)
                        {
                            continue;
                        }
                        self.returned[self.index - 1] = m;
                        return Some(m);
                    }
                    self.stage = Stage::GenRest;
                }
                Stage::GenRest => {
                    self.generate(pos, MoveKind::Quiet, |m| history.score(m));
                    self.stage = Stage::ReturnRest;
                }
                Stage::ReturnRest => {
                    if let Some(m) = self.pop() {
                        return Some(m);
                    }
                    self.stage = Stage::Done;
                }
                Stage::Done => return None,
            }
        }
    }

    fn generate(&mut self, pos: &Position, kind: MoveKind, key: impl Fn(Move) -> i32) {
        let mut moves = Vec::with_capacity(64);
        pos.generate(kind, &mut moves);
        self.moves.clear();
        self.moves.extend(moves.into_iter().map(|m| (key(m), m)));
        shell_sort(&mut self.moves);
        self.index = 0;
    }

    /// Next generated move that was not already returned.
    fn pop(&mut self) -> Option<Move> {
        while let Some(&(_, m)) = self.moves.get(self.index) {
            self.index += 1;
            if m != self.hash_move && !self.returned.contains(&m) {
                return Some(m);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Variant;
    use std::collections::HashSet;

    const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";

    fn drain(picker: &mut MovePicker, pos: &Position) -> Vec<Move> {
        let history = HistoryTable::new();
        std::iter::from_fn(|| picker.next(pos, &history)).collect()
    }

    #[test]
    fn shell_sort_is_descending() {
        let m = Move::NULL;
        let mut v: Vec<(i32, Move)> = [5, 1, 9, 3, 3, 12, 0, -4, 7, 8, 2, 11, 6]
            .into_iter()
            .map(|k| (k, m))
            .collect();
        shell_sort(&mut v);
        assert!(v.windows(2).all(|w| w[0].0 >= w[1].0));
    }

    #[test]
    fn every_move_exactly_once() {
        let pos = Position::from_fen(KIWIPETE, Variant::Standard).unwrap();
        let mut all = Vec::new();
        pos.generate(MoveKind::All, &mut all);
        let quiet: Vec<Move> = all.iter().copied().filter(|m| m.is_quiet()).collect();

        let hash = all[7];
        let mut picker = MovePicker::new(hash, [quiet[3], quiet[3]], quiet[10]);
        let picked = drain(&mut picker, &pos);

        assert_eq!(picked[0], hash);
        assert_eq!(picked.len(), all.len());
        let unique: HashSet<Move> = picked.iter().copied().collect();
        assert_eq!(unique.len(), picked.len());
        assert_eq!(unique, all.into_iter().collect());
        assert_eq!(picker.stage(), Stage::Done);
    }

    #[test]
    fn stale_killers_are_skipped() {
        let pos = Position::start(Variant::Standard);
        let mut other = Position::from_fen(KIWIPETE, Variant::Standard).unwrap();
        let foreign: Vec<Move> = other
            .legal_moves()
            .into_iter()
            .filter(|m| m.is_quiet() && !pos.is_pseudo_legal(*m))
            .take(2)
            .collect();
        let mut picker = MovePicker::new(Move::NULL, [foreign[0], foreign[1]], Move::NULL);
        let picked = drain(&mut picker, &pos);
        assert_eq!(picked.len(), 20);
        assert!(!picked.contains(&foreign[0]));
    }

    #[test]
    fn violent_stream_is_mvv_lva_ordered() {
        let pos = Position::from_fen(KIWIPETE, Variant::Standard).unwrap();
        let mut picker = MovePicker::violent(Move::NULL);
        let picked = drain(&mut picker, &pos);
        assert!(!picked.is_empty());
        assert!(picked.iter().all(|m| m.is_violent()));
        assert!(picked.windows(2).all(|w| mvv_lva(w[0]) >= mvv_lva(w[1])));
    }

    #[test]
    fn quiet_hash_move_is_dropped_in_quiescence() {
        let mut pos = Position::start(Variant::Standard);
        let quiet = pos.legal_moves()[0];
        let mut picker = MovePicker::violent(quiet);
        assert!(drain(&mut picker, &pos).is_empty());
    }

    #[test]
    fn pawn_takes_before_queen_takes() {
        let pos = Position::from_fen("4k3/8/3r4/2P5/3Q4/8/8/4K3 w - - 0 1", Variant::Standard)
            .unwrap();
        let mut picker = MovePicker::violent(Move::NULL);
        let picked = drain(&mut picker, &pos);
        let uci: Vec<String> = picked.iter().map(|m| m.uci(false)).collect();
        assert_eq!(uci, vec!["c5d6", "d4d6"]);
    }
}
