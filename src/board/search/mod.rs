//! Search module implementing alpha-beta with iterative deepening.
//!
//! Features:
//! - Iterative deepening with MultiPV (each line excludes the root moves
//!   chosen by the previous lines)
//! - Fail-soft negamax alpha-beta with null move pruning
//! - Quiescence search over violent moves, bounded by `Quiescence Depth`
//! - Staged move ordering (hash move, MVV-LVA, killers, counter move, history)
//! - Transposition table for cutoffs, ordering and cached static evaluations
//! - Cooperative cancellation polled every [`CHECKPOINT_NODES`] nodes

mod constants;
mod picker;
mod report;
mod tables;

use std::collections::HashSet;
use std::sync::Arc;

use log::debug;

pub use constants::*;
pub use picker::{mvv_lva, MovePicker, Stage};
pub use report::{format_pv, format_score, LogLogger, Logger, NulLogger, SearchStats};
pub use tables::{CounterMoveTable, HistoryTable, KillerTable};

use super::eval::Evaluator;
use super::state::Position;
use super::types::{Figure, Move, MAX_PLY};
use crate::engine::options::{OptionSource, MULTI_PV, QUIESCENCE_DEPTH};
use crate::engine::time::TimeController;
use crate::tt::{score_to_tt, BoundType, PvTable, TranspositionTable, TtEntry};

/// One principal variation reported by the search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchLine {
    pub depth: u32,
    pub score: i32,
    pub pv: Vec<Move>,
}

/// Outcome of [`Searcher::go`].
#[derive(Clone, Debug)]
pub struct SearchResult {
    /// The best move found, `None` when the side to move has no legal move.
    pub best_move: Option<Move>,
    /// The expected opponent reply (for pondering)
    pub ponder_move: Option<Move>,
    /// Score of the best line from the side to move's point of view.
    pub score: i32,
    /// Depth of the best line, 0 when the root was terminal.
    pub depth: u32,
    /// Best lines, deepest and highest scoring first.
    pub lines: Vec<SearchLine>,
    pub stats: SearchStats,
}

/// Search context. Owns every table the search mutates, so two searchers
/// never share state.
pub struct Searcher<L: Logger = NulLogger> {
    tt: TranspositionTable,
    pv: PvTable,
    evaluator: Evaluator,
    history: HistoryTable,
    killers: KillerTable,
    counters: CounterMoveTable,
    stats: SearchStats,
    time: Arc<TimeController>,
    logger: L,
    /// Root moves already claimed by earlier MultiPV lines.
    root_ignore: Vec<Move>,
    root_best: Move,
    root_depth: u32,
    quiescence_depth: i32,
    stopped: bool,
}

impl<L: Logger> Searcher<L> {
    #[must_use]
    pub fn new(hash_mb: usize, time: Arc<TimeController>, logger: L) -> Self {
        Searcher {
            tt: TranspositionTable::new(hash_mb),
            pv: PvTable::default(),
            evaluator: Evaluator::new(),
            history: HistoryTable::new(),
            killers: KillerTable::new(),
            counters: CounterMoveTable::new(),
            stats: SearchStats::default(),
            time,
            logger,
            root_ignore: Vec::new(),
            root_best: Move::NULL,
            root_depth: 0,
            quiescence_depth: DEFAULT_QUIESCENCE_DEPTH,
            stopped: false,
        }
    }

    /// Forget everything learned in previous games.
    pub fn clear(&mut self) {
        self.tt.clear();
        self.pv.clear();
        self.evaluator.clear();
        self.history.reset();
        self.killers.reset();
        self.counters.reset();
    }

    /// Replace the transposition table with an empty one of `hash_mb`.
    pub fn resize(&mut self, hash_mb: usize) {
        self.tt = TranspositionTable::new(hash_mb);
    }

    /// Static evaluation from the side to move's point of view.
    pub fn evaluate(&mut self, pos: &Position) -> i32 {
        self.evaluator.evaluate_relative(pos)
    }

    #[must_use]
    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    #[must_use]
    pub fn time(&self) -> &Arc<TimeController> {
        &self.time
    }

    #[must_use]
    pub fn hashfull_per_mille(&self) -> u32 {
        self.tt.hashfull_per_mille()
    }

    pub fn logger_mut(&mut self) -> &mut L {
        &mut self.logger
    }

    /// Search `pos` until the time controller ends it.
    ///
    /// The controller must have been started by the caller. `pos` is
    /// restored before returning.
    pub fn go(&mut self, pos: &mut Position, options: &impl OptionSource) -> SearchResult {
        let multipv = options.int(MULTI_PV, 1).max(1) as usize;
        self.quiescence_depth = options
            .int(QUIESCENCE_DEPTH, i64::from(DEFAULT_QUIESCENCE_DEPTH))
            .clamp(0, 100) as i32;

        self.new_search();
        self.logger.begin_search();
        let mut result = self.iterate(pos, multipv);
        self.stats.elapsed = self.time.elapsed();
        result.stats = self.stats.clone();
        self.logger.end_search();
        result
    }

    fn new_search(&mut self) {
        self.history.decay();
        self.killers.reset();
        self.stats = SearchStats::default();
        self.root_ignore.clear();
        self.root_best = Move::NULL;
        self.root_depth = 0;
        self.stopped = false;
    }

    fn iterate(&mut self, pos: &mut Position, multipv: usize) -> SearchResult {
        let legal = pos.legal_moves();
        if let Some(score) = root_terminal(pos, &legal) {
            debug!("root position is terminal, score {}", format_score(score));
            return SearchResult {
                best_move: legal.first().copied(),
                ponder_move: None,
                score,
                depth: 0,
                lines: Vec::new(),
                stats: SearchStats::default(),
            };
        }

        let wanted = multipv.min(legal.len());
        let mut lines: Vec<SearchLine> = Vec::new();
        let mut depth = 1;
        while depth <= MAX_DEPTH && self.time.next_depth(depth) {
            self.root_depth = depth;
            self.stats.depth = depth;
            self.root_ignore.clear();

            for index in 0..wanted {
                self.root_best = Move::NULL;
                let score = self.search(pos, -INFINITY, INFINITY, depth as i32, 0);
                if self.stopped || self.root_best.is_null() {
                    break;
                }
                let pv = self.extract_pv(pos);
                self.stats.elapsed = self.time.elapsed();
                self.logger.print_pv(&self.stats, index, score, &pv);
                self.root_ignore.push(self.root_best);
                lines.push(SearchLine { depth, score, pv });
            }

            if self.stopped {
                debug!("iteration {} aborted after {} nodes", depth, self.stats.nodes);
                break;
            }
            debug!(
                "iteration {} done: {} nodes, seldepth {}",
                depth, self.stats.nodes, self.stats.seldepth
            );
            depth += 1;
        }

        lines.sort_by(|a, b| b.depth.cmp(&a.depth).then(b.score.cmp(&a.score)));
        let mut seen = HashSet::new();
        lines.retain(|line| line.pv.first().is_some_and(|&m| seen.insert(m)));
        lines.truncate(multipv);

        match lines.first() {
            Some(best) => SearchResult {
                best_move: best.pv.first().copied(),
                ponder_move: best.pv.get(1).copied(),
                score: best.score,
                depth: best.depth,
                lines,
                stats: SearchStats::default(),
            },
            None => SearchResult {
                best_move: legal.first().copied(),
                ponder_move: None,
                score: self.evaluate(pos),
                depth: 0,
                lines,
                stats: SearchStats::default(),
            },
        }
    }

    /// Count a node and poll the time controller at every checkpoint.
    /// Returns true once the search must unwind.
    fn poll(&mut self, ply: usize) -> bool {
        self.stats.nodes += 1;
        self.stats.seldepth = self.stats.seldepth.max(ply as u32);
        if !self.stopped
            && self.stats.nodes % CHECKPOINT_NODES == 0
            && self.time.should_stop(self.root_depth)
        {
            self.stopped = true;
        }
        self.stopped
    }

    fn search(&mut self, pos: &mut Position, mut alpha: i32, beta: i32, depth: i32, ply: usize) -> i32 {
        if depth <= 0 {
            return self.quiescence(pos, alpha, beta, ply, self.quiescence_depth);
        }
        if self.poll(ply) {
            return alpha;
        }
        let root = ply == 0;
        if !root {
            if let Some(score) = interior_terminal(pos, ply) {
                return score;
            }
        }
        if ply >= MAX_PLY - 1 {
            return self.evaluate(pos);
        }

        let key = pos.zobrist();
        let entry = self.tt.get(key);
        let mut hash_move = Move::NULL;
        if !entry.is_empty() {
            self.stats.tt_hits += 1;
            hash_move = entry.best_move().unwrap_or(Move::NULL);
            if !root && entry.depth() >= depth && entry.cuts(ply, alpha, beta) {
                return entry.score_at(ply);
            }
        }
        if hash_move.is_null() {
            hash_move = self.pv.get(key).first().copied().unwrap_or(Move::NULL);
        }

        let us = pos.side_to_move();
        let in_check = pos.is_checked(us);

        if !root
            && !in_check
            && depth >= NULL_MOVE_MIN_DEPTH
            && beta.abs() < KNOWN_WIN
            && !pos.last_move().is_null()
            && has_pieces(pos)
            && self.static_eval(pos, key, &entry) >= beta
        {
            pos.do_null_move();
            let score = -self.search(pos, -beta, -beta + 1, depth - 1 - NULL_MOVE_REDUCTION, ply + 1);
            pos.undo_null_move();
            if self.stopped {
                return alpha;
            }
            if score >= beta {
                return score.min(KNOWN_WIN);
            }
        }

        let mut picker = MovePicker::new(
            hash_move,
            self.killers.get(ply),
            self.counters.get(pos.last_move()),
        );
        let mut best_score = -INFINITY;
        let mut best_move = Move::NULL;
        let mut bound = BoundType::UpperBound;
        let mut played = 0;

        while let Some(m) = picker.next(pos, &self.history) {
            if root && self.root_ignore.contains(&m) {
                continue;
            }
            pos.do_move(m);
            if !pos.last_move_was_legal() {
                pos.undo_move();
                continue;
            }
            if root {
                self.logger.curr_move(self.root_depth, m, played);
            }
            played += 1;
            let score = -self.search(pos, -beta, -alpha, depth - 1, ply + 1);
            pos.undo_move();
            if self.stopped {
                return alpha;
            }

            if score > best_score {
                best_score = score;
                best_move = m;
            }
            if score > alpha {
                alpha = score;
                bound = BoundType::Exact;
                self.stats.alpha_cuts += 1;
                self.pv.put(key, m);
                if root {
                    self.root_best = m;
                }
            }
            if score >= beta {
                self.stats.beta_cuts += 1;
                if m.is_quiet() {
                    self.killers.update(ply, m);
                    self.history.update(m, depth);
                    self.counters.set(pos.last_move(), m);
                }
                self.store(key, &entry, depth, score, ply, BoundType::LowerBound, m);
                return score;
            }
        }

        if played == 0 {
            return if in_check { MATED + ply as i32 } else { DRAW };
        }

        self.store(key, &entry, depth, best_score, ply, bound, best_move);
        best_score
    }

    fn quiescence(&mut self, pos: &mut Position, mut alpha: i32, beta: i32, ply: usize, qdepth: i32) -> i32 {
        if self.poll(ply) {
            return alpha;
        }
        if let Some(score) = interior_terminal(pos, ply) {
            return score;
        }
        if ply >= MAX_PLY - 1 {
            return self.evaluate(pos);
        }

        let key = pos.zobrist();
        let entry = self.tt.get(key);
        if !entry.is_empty() {
            self.stats.tt_hits += 1;
            if entry.depth() >= 0 && entry.cuts(ply, alpha, beta) {
                return entry.score_at(ply);
            }
        }

        let eval = self.static_eval(pos, key, &entry);
        if qdepth <= 0 {
            return eval;
        }

        let hash_move = entry.best_move().unwrap_or(Move::NULL);
        let in_check = pos.is_checked(pos.side_to_move());
        let mut best_score = -INFINITY;
        let mut picker = if in_check {
            MovePicker::new(hash_move, [Move::NULL; 2], Move::NULL)
        } else {
            if eval >= beta {
                return eval;
            }
            alpha = alpha.max(eval);
            best_score = eval;
            MovePicker::violent(hash_move)
        };

        let mut played = false;
        while let Some(m) = picker.next(pos, &self.history) {
            pos.do_move(m);
            if !pos.last_move_was_legal() {
                pos.undo_move();
                continue;
            }
            played = true;
            let score = -self.quiescence(pos, -beta, -alpha, ply + 1, qdepth - 1);
            pos.undo_move();
            if self.stopped {
                return alpha;
            }

            best_score = best_score.max(score);
            if score > alpha {
                alpha = score;
            }
            if score >= beta {
                self.stats.beta_cuts += 1;
                self.store(key, &entry, 0, score, ply, BoundType::LowerBound, m);
                return score;
            }
        }

        if in_check && !played {
            return MATED + ply as i32;
        }
        best_score
    }

    /// Static evaluation of the side to move, cached in the transposition
    /// table. A position without an entry gets a depth -1 entry that only
    /// carries the evaluation.
    fn static_eval(&mut self, pos: &Position, key: u64, entry: &TtEntry) -> i32 {
        if let Some(eval) = entry.static_eval() {
            return eval;
        }
        let eval = self.evaluate(pos);
        if entry.is_empty() {
            let cached = TtEntry::new(key, -1, eval, BoundType::Exact, Move::NULL).with_static_eval(eval);
            self.tt.put(key, cached);
        }
        eval
    }

    #[allow(clippy::too_many_arguments)]
    fn store(
        &mut self,
        key: u64,
        previous: &TtEntry,
        depth: i32,
        score: i32,
        ply: usize,
        bound: BoundType,
        mv: Move,
    ) {
        let mut entry = TtEntry::new(key, depth, score_to_tt(score, ply), bound, mv);
        if let Some(eval) = previous.static_eval() {
            entry = entry.with_static_eval(eval);
        }
        self.tt.put(key, entry);
    }

    /// Principal variation starting with the root best move. Every move is
    /// checked for legality before it is replayed; the walk stops at the
    /// first repetition.
    fn extract_pv(&mut self, pos: &mut Position) -> Vec<Move> {
        let mut pv = Vec::new();
        let mut next = self.root_best;
        while !next.is_null() && pv.len() < MAX_PLY {
            if !pos.is_pseudo_legal(next) {
                break;
            }
            pos.do_move(next);
            if !pos.last_move_was_legal() {
                pos.undo_move();
                break;
            }
            pv.push(next);
            if pos.is_repetition(2) {
                break;
            }
            let key = pos.zobrist();
            next = self
                .pv
                .get(key)
                .first()
                .copied()
                .or_else(|| self.tt.get(key).best_move())
                .unwrap_or(Move::NULL);
        }
        for _ in 0..pv.len() {
            pos.undo_move();
        }
        pv
    }
}

/// Null-move pruning is unsound when the side to move has only pawns.
fn has_pieces(pos: &Position) -> bool {
    let us = pos.side_to_move();
    (pos.by_color(us) & !(pos.by_figure(Figure::Pawn) | pos.by_figure(Figure::King))).any()
}

/// Score of a root position that must not be searched, or `None`.
fn root_terminal(pos: &Position, legal: &[Move]) -> Option<i32> {
    let us = pos.side_to_move();
    match (pos.king_square(us), pos.king_square(us.opponent())) {
        (None, None) => return Some(DRAW),
        (None, Some(_)) => return Some(MATED),
        (Some(_), None) => return Some(MATE),
        _ => {}
    }
    if legal.is_empty() {
        return Some(if pos.is_checked(us) { MATED } else { DRAW });
    }
    if pos.is_fifty_move_draw() || pos.is_repetition(3) || pos.is_insufficient_material() {
        return Some(DRAW);
    }
    None
}

/// Score of an interior node decided without search, or `None`.
/// A single repetition already counts as a draw here.
fn interior_terminal(pos: &Position, ply: usize) -> Option<i32> {
    let us = pos.side_to_move();
    let ply = ply as i32;
    match (pos.king_square(us), pos.king_square(us.opponent())) {
        (None, None) => return Some(DRAW),
        (None, Some(_)) => return Some(MATED + ply),
        (Some(_), None) => return Some(MATE - ply),
        _ => {}
    }
    if pos.is_fifty_move_draw() || pos.is_repetition(2) || pos.is_insufficient_material() {
        return Some(DRAW);
    }
    None
}
