//! Move-path enumeration for generator validation.

use super::super::state::Position;
use super::super::types::{Move, MoveKind};

impl Position {
    /// Number of leaf nodes of the legal move tree at `depth`.
    pub fn perft(&mut self, depth: u32) -> u64 {
        if depth == 0 {
            return 1;
        }
        let mut moves = Vec::with_capacity(64);
        self.generate(MoveKind::All, &mut moves);

        let mut nodes = 0;
        for m in moves {
            self.do_move(m);
            if self.last_move_was_legal() {
                nodes += if depth == 1 { 1 } else { self.perft(depth - 1) };
            }
            self.undo_move();
        }
        nodes
    }

    /// Perft split by root move, in UCI order.
    pub fn divide(&mut self, depth: u32) -> Vec<(Move, u64)> {
        let mut result: Vec<(Move, u64)> = self
            .legal_moves()
            .into_iter()
            .map(|m| {
                self.do_move(m);
                let nodes = self.perft(depth.saturating_sub(1));
                self.undo_move();
                (m, nodes)
            })
            .collect();
        let chess960 = self.chess960;
        result.sort_by_key(|(m, _)| m.uci(chess960));
        result
    }
}
