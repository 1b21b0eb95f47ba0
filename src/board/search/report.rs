//! Search reporting.
//!
//! The search reports progress through a [`Logger`]. Reporting is a side
//! effect only: [`NulLogger`] discards everything and the search behaves the
//! same.

use std::time::Duration;

use super::constants::{KNOWN_LOSS, KNOWN_WIN, MATE};
use crate::board::Move;

/// Counters of one search, reset at every root search.
#[derive(Clone, Debug, Default)]
pub struct SearchStats {
    /// Depth of the last iteration started.
    pub depth: u32,
    /// Deepest ply reached, quiescence included.
    pub seldepth: u32,
    pub nodes: u64,
    /// Transposition table probes that returned an entry.
    pub tt_hits: u64,
    /// Nodes where some move raised alpha.
    pub alpha_cuts: u64,
    /// Nodes that failed high.
    pub beta_cuts: u64,
    pub elapsed: Duration,
}

impl SearchStats {
    /// Nodes per second over the elapsed time.
    #[must_use]
    pub fn nps(&self) -> u64 {
        let micros = self.elapsed.as_micros().max(1);
        (u128::from(self.nodes) * 1_000_000 / micros) as u64
    }
}

/// UCI style score: `cp 35` or `mate -3` (in moves, not plies).
#[must_use]
pub fn format_score(score: i32) -> String {
    if score > KNOWN_WIN {
        format!("mate {}", (MATE - score + 1) / 2)
    } else if score < KNOWN_LOSS {
        format!("mate {}", -(MATE + score) / 2)
    } else {
        format!("cp {score}")
    }
}

/// Space separated UCI moves.
#[must_use]
pub fn format_pv(moves: &[Move], chess960: bool) -> String {
    moves
        .iter()
        .map(|m| m.uci(chess960))
        .collect::<Vec<_>>()
        .join(" ")
}

pub trait Logger {
    fn begin_search(&mut self);
    fn end_search(&mut self);
    /// A finished line of iteration `stats.depth`. `multipv` counts from 0.
    fn print_pv(&mut self, stats: &SearchStats, multipv: usize, score: i32, moves: &[Move]);
    /// The root move about to be searched. `index` counts from 0.
    fn curr_move(&mut self, depth: u32, mv: Move, index: usize);
}

/// Discards every report.
#[derive(Clone, Copy, Debug, Default)]
pub struct NulLogger;

impl Logger for NulLogger {
    fn begin_search(&mut self) {}
    fn end_search(&mut self) {}
    fn print_pv(&mut self, _: &SearchStats, _: usize, _: i32, _: &[Move]) {}
    fn curr_move(&mut self, _: u32, _: Move, _: usize) {}
}

/// Forwards reports to the `log` facade as UCI `info` lines.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogLogger {
    pub chess960: bool,
}

impl Logger for LogLogger {
    fn begin_search(&mut self) {
        log::debug!("search started");
    }

    fn end_search(&mut self) {
        log::debug!("search finished");
    }

    fn print_pv(&mut self, stats: &SearchStats, multipv: usize, score: i32, moves: &[Move]) {
        log::info!(
            "info depth {} seldepth {} multipv {} score {} nodes {} nps {} time {} pv {}",
            stats.depth,
            stats.seldepth,
            multipv + 1,
            format_score(score),
            stats.nodes,
            stats.nps(),
            stats.elapsed.as_millis(),
            format_pv(moves, self.chess960)
        );
    }

    fn curr_move(&mut self, depth: u32, mv: Move, index: usize) {
        log::trace!(
            "info depth {} currmove {} currmovenumber {}",
            depth,
            mv.uci(self.chess960),
            index + 1
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scores_format_as_uci() {
        assert_eq!(format_score(35), "cp 35");
        assert_eq!(format_score(MATE - 1), "mate 1");
        assert_eq!(format_score(MATE - 3), "mate 2");
        assert_eq!(format_score(-MATE + 2), "mate -1");
        assert_eq!(format_score(-MATE), "mate 0");
    }

    #[test]
    fn nps_survives_zero_time() {
        let stats = SearchStats {
            nodes: 1000,
            ..SearchStats::default()
        };
        assert_eq!(stats.nps(), 1_000_000_000);
    }
}
