//! Move ordering heuristics: killers, counter moves and history.

use super::constants::HISTORY_MAX;
use crate::board::types::{Move, Piece, MAX_PLY};

/// Two quiet moves per ply that recently caused a beta cutoff.
pub struct KillerTable {
    slots: [[Move; 2]; MAX_PLY],
}

impl Default for KillerTable {
    fn default() -> Self {
        Self::new()
    }
}

impl KillerTable {
    #[must_use]
    pub fn new() -> Self {
        KillerTable {
            slots: [[Move::NULL; 2]; MAX_PLY],
        }
    }

    #[must_use]
    pub fn get(&self, ply: usize) -> [Move; 2] {
        self.slots.get(ply).copied().unwrap_or([Move::NULL; 2])
    }

    pub fn update(&mut self, ply: usize, mv: Move) {
        let Some(row) = self.slots.get_mut(ply) else {
            return;
        };
        if row[0] != mv {
            row[1] = row[0];
            row[0] = mv;
        }
    }

    pub fn reset(&mut self) {
        self.slots = [[Move::NULL; 2]; MAX_PLY];
    }
}

/// Quiet reply that refuted the opponent's previous move, keyed by that
/// move's from and to squares.
pub struct CounterMoveTable {
    entries: Box<[[Move; 64]; 64]>,
}

impl Default for CounterMoveTable {
    fn default() -> Self {
        Self::new()
    }
}

impl CounterMoveTable {
    #[must_use]
    pub fn new() -> Self {
        CounterMoveTable {
            entries: Box::new([[Move::NULL; 64]; 64]),
        }
    }

    #[must_use]
    pub fn get(&self, previous: Move) -> Move {
        if previous.is_null() {
            return Move::NULL;
        }
        self.entries[previous.from().index()][previous.to().index()]
    }

    pub fn set(&mut self, previous: Move, mv: Move) {
        if !previous.is_null() {
            self.entries[previous.from().index()][previous.to().index()] = mv;
        }
    }

    pub fn reset(&mut self) {
        *self.entries = [[Move::NULL; 64]; 64];
    }
}

/// History heuristic indexed by moving piece and destination.
pub struct HistoryTable {
    entries: Box<[[i32; 64]; Piece::COUNT]>,
}

impl Default for HistoryTable {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryTable {
    #[must_use]
    pub fn new() -> Self {
        HistoryTable {
            entries: Box::new([[0; 64]; Piece::COUNT]),
        }
    }

    #[must_use]
    pub fn score(&self, mv: Move) -> i32 {
        self.entries[mv.piece().index()][mv.to().index()]
    }

    /// Reward a quiet move that caused a beta cutoff.
    pub fn update(&mut self, mv: Move, depth: i32) {
        let bonus = depth.max(1).pow(2);
        let entry = &mut self.entries[mv.piece().index()][mv.to().index()];
        *entry = (*entry + bonus).min(HISTORY_MAX);
    }

    /// Shrink every score so recent searches dominate.
    pub fn decay(&mut self) {
        for row in self.entries.iter_mut() {
            for entry in row.iter_mut() {
                *entry >>= 2;
            }
        }
    }

    pub fn reset(&mut self) {
        *self.entries = [[0; 64]; Piece::COUNT];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Position, Variant};

    #[test]
    fn killers_shift_and_ignore_duplicates() {
        let moves = Position::start(Variant::Standard).legal_moves();
        let mut k = KillerTable::new();
        k.update(3, moves[0]);
        k.update(3, moves[0]);
        assert_eq!(k.get(3), [moves[0], Move::NULL]);
        k.update(3, moves[1]);
        assert_eq!(k.get(3), [moves[1], moves[0]]);
        k.update(MAX_PLY + 5, moves[2]);
        assert_eq!(k.get(MAX_PLY + 5), [Move::NULL; 2]);
        k.reset();
        assert_eq!(k.get(3), [Move::NULL; 2]);
    }

    #[test]
    fn history_grows_and_decays() {
        let moves = Position::start(Variant::Standard).legal_moves();
        let mut h = HistoryTable::new();
        h.update(moves[0], 4);
        h.update(moves[0], 4);
        assert_eq!(h.score(moves[0]), 32);
        h.decay();
        assert_eq!(h.score(moves[0]), 8);
        assert_eq!(h.score(moves[1]), 0);
    }

    #[test]
    fn counter_moves_follow_previous_move() {
        let moves = Position::start(Variant::Standard).legal_moves();
        let mut c = CounterMoveTable::new();
        c.set(moves[0], moves[1]);
        assert_eq!(c.get(moves[0]), moves[1]);
        assert_eq!(c.get(Move::NULL), Move::NULL);
    }
}
