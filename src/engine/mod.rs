//! Engine facade.
//!
//! [`Engine`] ties a position, the option values, the time controller and a
//! [`Searcher`] together behind the operations a protocol front end needs:
//! set a position, change options, search (blocking or on a background
//! thread), stop, ponder hit and new game.

pub mod options;
pub mod time;

use std::fmt;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::{debug, warn};
use parking_lot::Mutex;

use crate::board::search::{LogLogger, SearchResult, Searcher};
use crate::board::{FenError, MoveParseError, OptionError, Position};
use crate::sync::StopFlag;
use options::{EngineOptions, OptionAction};
use time::{TimeConfig, TimeControl, TimeController};

pub use options::{OptionSource, OptionValue};
pub use time::DEFAULT_MOVES_TO_GO;

/// Search thread stack size (32 MB)
const SEARCH_STACK_SIZE: usize = 32 * 1024 * 1024;

/// Error returned when a position command cannot be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    Fen(FenError),
    Move(MoveParseError),
    Option(OptionError),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Fen(e) => write!(f, "Invalid position: {e}"),
            EngineError::Move(e) => write!(f, "Invalid move: {e}"),
            EngineError::Option(e) => write!(f, "Invalid option: {e}"),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::Fen(e) => Some(e),
            EngineError::Move(e) => Some(e),
            EngineError::Option(e) => Some(e),
        }
    }
}

impl From<FenError> for EngineError {
    fn from(err: FenError) -> Self {
        EngineError::Fen(err)
    }
}

impl From<MoveParseError> for EngineError {
    fn from(err: MoveParseError) -> Self {
        EngineError::Move(err)
    }
}

impl From<OptionError> for EngineError {
    fn from(err: OptionError) -> Self {
        EngineError::Option(err)
    }
}

/// A search running on its own thread.
pub struct SearchJob {
    time: Arc<TimeController>,
    handle: JoinHandle<SearchResult>,
}

impl SearchJob {
    /// Signal stop without waiting
    pub fn signal_stop(&self) {
        self.time.stop();
    }

    pub fn ponder_hit(&self) {
        self.time.ponder_hit();
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the search to finish. `None` if the search thread panicked.
    pub fn wait(self) -> Option<SearchResult> {
        self.handle.join().ok()
    }

    /// Stop the search and wait for the thread to finish
    pub fn stop_and_wait(self) -> Option<SearchResult> {
        self.signal_stop();
        self.wait()
    }
}

pub struct Engine {
    position: Position,
    options: EngineOptions,
    time: Arc<TimeController>,
    searcher: Arc<Mutex<Searcher<LogLogger>>>,
    current_job: Option<SearchJob>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineOptions::default())
    }
}

impl Engine {
    #[must_use]
    pub fn new(options: EngineOptions) -> Self {
        let time = Arc::new(TimeController::new(TimeConfig {
            move_overhead_ms: options.move_overhead_ms,
            ..TimeConfig::default()
        }));
        let logger = LogLogger {
            chess960: options.chess960,
        };
        let searcher = Searcher::new(options.hash_mb, Arc::clone(&time), logger);
        let mut position = Position::start(options.variant);
        position.set_chess960(options.chess960);
        Engine {
            position,
            options,
            time,
            searcher: Arc::new(Mutex::new(searcher)),
            current_job: None,
        }
    }

    #[must_use]
    pub fn position(&self) -> &Position {
        &self.position
    }

    #[must_use]
    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Apply a `setoption`. Changing the variant resets the position to
    /// the variant's start position.
    pub fn set_option(&mut self, name: &str, value: Option<&str>) -> Result<(), EngineError> {
        self.stop_search();
        match self.options.set_option(name, value)? {
            Some(OptionAction::ResizeHash(mb)) => self.searcher.lock().resize(mb),
            Some(OptionAction::ChangeVariant(variant)) => {
                self.position = Position::start(variant);
            }
            None => {}
        }
        let chess960 = self.options.chess960;
        self.position.set_chess960(chess960);
        self.searcher.lock().logger_mut().chess960 = chess960;
        self.time.set_config(TimeConfig {
            move_overhead_ms: self.options.move_overhead_ms,
            ..self.time.config()
        });
        debug!("option '{}' set to {:?}", name.trim(), value);
        Ok(())
    }

    /// Set up `fen` (or the variant's start position) and play `moves`,
    /// given in UCI notation. The current position is kept on error.
    pub fn set_position(&mut self, fen: Option<&str>, moves: &[&str]) -> Result<(), EngineError> {
        self.stop_search();
        let variant = self.options.variant;
        let mut position = match fen {
            Some(fen) => Position::from_fen(fen, variant)?,
            None => Position::start(variant),
        };
        if self.options.chess960 {
            position.set_chess960(true);
        }
        for uci in moves {
            let m = position.parse_uci(uci)?;
            position.do_move(m);
        }
        self.position = position;
        Ok(())
    }

    /// Search the current position on the calling thread.
    pub fn search(&mut self, control: TimeControl) -> SearchResult {
        self.stop_search();
        self.time.start(control, false);
        let mut position = self.position.clone();
        let result = self.searcher.lock().go(&mut position, &self.options);
        log_result(&result, self.options.chess960);
        result
    }

    /// Start searching the current position on a background thread.
    pub fn start_search(&mut self, control: TimeControl, ponder: bool) {
        self.stop_search();
        self.time.start(control, ponder);

        let mut position = self.position.clone();
        let options = self.options.clone();
        let searcher = Arc::clone(&self.searcher);
        let spawned = thread::Builder::new()
            .name("search".to_string())
            .stack_size(SEARCH_STACK_SIZE)
            .spawn(move || {
                let result = searcher.lock().go(&mut position, &options);
                log_result(&result, options.chess960);
                result
            });
        match spawned {
            Ok(handle) => {
                self.current_job = Some(SearchJob {
                    time: Arc::clone(&self.time),
                    handle,
                });
            }
            Err(err) => warn!("failed to spawn search thread: {err}"),
        }
    }

    /// Check if there's an active search
    #[must_use]
    pub fn is_searching(&self) -> bool {
        self.current_job.as_ref().is_some_and(|job| !job.is_finished())
    }

    /// Stop any active search and return its result.
    pub fn stop_search(&mut self) -> Option<SearchResult> {
        self.current_job.take().and_then(SearchJob::stop_and_wait)
    }

    /// Wait for the background search to end on its own.
    pub fn wait(&mut self) -> Option<SearchResult> {
        self.current_job.take().and_then(SearchJob::wait)
    }

    pub fn ponder_hit(&self) {
        self.time.ponder_hit();
    }

    /// Handle another thread can use to stop the search.
    #[must_use]
    pub fn stop_handle(&self) -> StopFlag {
        self.time.stop_flag()
    }

    /// Reset to the start position and forget all search tables.
    pub fn new_game(&mut self) {
        self.stop_search();
        self.position = Position::start(self.options.variant);
        self.position.set_chess960(self.options.chess960);
        self.searcher.lock().clear();
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.stop_search();
    }
}

fn log_result(result: &SearchResult, chess960: bool) {
    match result.best_move {
        Some(m) => debug!(
            "bestmove {}{}",
            m.uci(chess960),
            result
                .ponder_move
                .map(|p| format!(" ponder {}", p.uci(chess960)))
                .unwrap_or_default()
        ),
        None => debug!("bestmove (none)"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Variant;

    #[test]
    fn set_position_plays_moves() {
        let mut engine = Engine::default();
        engine.set_position(None, &["e2e4", "e7e5", "g1f3"]).unwrap();
        assert_eq!(
            engine.position().to_fen(),
            "rnbqkbnr/pppp1ppp/8/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R b KQkq - 1 2"
        );
    }

    #[test]
    fn bad_move_keeps_position() {
        let mut engine = Engine::default();
        engine.set_position(None, &["e2e4"]).unwrap();
        let before = engine.position().to_fen();
        let err = engine.set_position(None, &["e2e4", "e2e4"]).unwrap_err();
        assert!(matches!(err, EngineError::Move(_)));
        assert_eq!(engine.position().to_fen(), before);
        assert!(matches!(
            engine.set_position(Some("not a fen"), &[]),
            Err(EngineError::Fen(_))
        ));
    }

    #[test]
    fn variant_option_resets_position() {
        let mut engine = Engine::default();
        engine.set_position(None, &["e2e4"]).unwrap();
        engine.set_option("UCI_Variant", Some("seirawan")).unwrap();
        assert_eq!(engine.position().variant(), Variant::Seirawan);
        assert_eq!(engine.position().to_fen(), Variant::Seirawan.start_fen());
        assert!(matches!(
            engine.set_option("UCI_Variant", Some("nope")),
            Err(EngineError::Option(_))
        ));
    }

    #[test]
    fn blocking_search_returns_a_legal_move() {
        let mut engine = Engine::default();
        let result = engine.search(TimeControl::Depth { depth: 2 });
        let mut pos = engine.position().clone();
        assert!(pos.legal_moves().contains(&result.best_move.unwrap()));
        assert_eq!(result.depth, 2);
    }

    #[test]
    fn background_search_stops_on_request() {
        let mut engine = Engine::default();
        engine.start_search(TimeControl::Infinite, false);
        std::thread::sleep(std::time::Duration::from_millis(20));
        engine.stop_handle().stop();
        let result = engine.wait().expect("search thread finished");
        assert!(result.best_move.is_some());
        assert!(!engine.is_searching());
    }

    #[test]
    fn new_game_resets_position() {
        let mut engine = Engine::default();
        engine.set_position(None, &["d2d4"]).unwrap();
        engine.new_game();
        assert_eq!(engine.position().to_fen(), Variant::Standard.start_fen());
    }
}
