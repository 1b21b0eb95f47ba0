//! Time management for a single search.
//!
//! [`TimeControl`] describes the clock situation handed over by the caller,
//! [`TimeConfig`] the engine-side tuning. [`TimeController`] turns both into a
//! soft search deadline (no new iteration is started past it) and a hard stop
//! deadline (the running iteration is aborted), and carries the stop flag
//! another thread may raise.

use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::board::search::MAX_DEPTH;
use crate::sync::StopFlag;

/// Default moves to go estimate when not specified
pub const DEFAULT_MOVES_TO_GO: u64 = 30;

/// Time threshold below which we enter "panic mode" (in ms)
const PANIC_THRESHOLD_MS: u64 = 5000;

/// Minimum moves-to-go estimate to avoid over-thinking
const MIN_MOVES_TO_GO: u64 = 10;

/// Safety margin added to overhead for critical time detection
const CRITICAL_TIME_MARGIN_MS: u64 = 50;

/// Panic mode: fraction of remaining time to use
const PANIC_TIME_FRACTION: f64 = 0.05;

/// Panic mode: minimum fraction divisor for target time
const PANIC_MIN_FRACTION: u64 = 5;

/// Panic mode: hard time fraction divisor
const PANIC_HARD_FRACTION: u64 = 3;

/// Time thresholds for moves-to-go estimation (in ms)
const LONG_TIME_CONTROL_MS: u64 = 300_000;
const MEDIUM_TIME_CONTROL_MS: u64 = 60_000;

/// Estimated moves for different time controls
const LONG_MOVES_ESTIMATE: u64 = 40;
const MEDIUM_MOVES_ESTIMATE: u64 = DEFAULT_MOVES_TO_GO;
const SHORT_MOVES_ESTIMATE: u64 = 25;

/// Iterations up to this depth run to completion unless stopped explicitly,
/// so short forced mates are not missed on a nearly empty clock.
const GUARANTEED_DEPTH: u32 = 2;

/// Configuration for time management calculations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeConfig {
    /// Time to reserve for move overhead (communication latency, etc.)
    pub move_overhead_ms: u64,
    /// Percentage of remaining time to use as soft limit
    pub soft_time_percent: u64,
    /// Percentage of remaining time to use as hard limit
    pub hard_time_percent: u64,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            move_overhead_ms: 50,
            soft_time_percent: 70,
            hard_time_percent: 90,
        }
    }
}

/// Time control settings for a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeControl {
    /// Search until stopped.
    #[default]
    Infinite,
    /// Search to a fixed depth, no time limit.
    Depth { depth: u32 },
    /// Fixed time per move
    MoveTime { time_ms: u64 },
    /// Standard time control with remaining time and increment
    Incremental {
        time_left_ms: u64,
        inc_ms: u64,
        movestogo: Option<u64>,
    },
}

impl TimeControl {
    /// Create a new incremental time control from Duration values.
    #[must_use]
    pub fn incremental(time_left: Duration, inc: Duration, movestogo: Option<u64>) -> Self {
        TimeControl::Incremental {
            time_left_ms: time_left.as_millis() as u64,
            inc_ms: inc.as_millis() as u64,
            movestogo,
        }
    }

    /// Create a fixed move time control from Duration.
    #[must_use]
    pub fn move_time(time: Duration) -> Self {
        TimeControl::MoveTime {
            time_ms: time.as_millis() as u64,
        }
    }

    /// Create a fixed move time control from milliseconds.
    #[must_use]
    pub fn move_time_ms(time_ms: u64) -> Self {
        TimeControl::MoveTime { time_ms }
    }

    /// Check if this is an unlimited time control (infinite or depth-based).
    #[must_use]
    pub fn is_unlimited(&self) -> bool {
        matches!(self, TimeControl::Infinite | TimeControl::Depth { .. })
    }

    /// Deepest iteration allowed by this control.
    #[must_use]
    pub fn max_depth(&self) -> u32 {
        match self {
            TimeControl::Depth { depth } => (*depth).clamp(1, MAX_DEPTH),
            _ => MAX_DEPTH,
        }
    }

    /// Compute soft and hard time limits for this time control.
    ///
    /// Returns `(soft_time_ms, hard_time_ms)` or `(u64::MAX, u64::MAX)` for unlimited.
    #[must_use]
    pub fn compute_limits(&self, config: &TimeConfig) -> (u64, u64) {
        match self {
            TimeControl::Infinite | TimeControl::Depth { .. } => (u64::MAX, u64::MAX),
            TimeControl::MoveTime { time_ms } => {
                // The caller asked for exactly this long; overhead is theirs.
                let capped = (*time_ms).max(1);
                (capped, capped)
            }
            TimeControl::Incremental {
                time_left_ms,
                inc_ms,
                movestogo,
            } => compute_incremental_limits(*time_left_ms, *inc_ms, *movestogo, config),
        }
    }
}

/// Compute soft and hard time limits for incremental time control.
#[allow(clippy::cast_precision_loss)]
fn compute_incremental_limits(
    time_left_ms: u64,
    inc_ms: u64,
    movestogo: Option<u64>,
    config: &TimeConfig,
) -> (u64, u64) {
    let safe_ms = time_left_ms.saturating_sub(config.move_overhead_ms);

    // Critical time: less than overhead + safety margin
    if time_left_ms
        <= config
            .move_overhead_ms
            .saturating_add(CRITICAL_TIME_MARGIN_MS)
    {
        let fallback = (time_left_ms / 2).max(1);
        return (fallback, fallback);
    }

    // Panic mode: use very little time when running low
    if safe_ms < PANIC_THRESHOLD_MS {
        let panic_factor = safe_ms as f64 / PANIC_THRESHOLD_MS as f64;
        let target = (safe_ms as f64 * PANIC_TIME_FRACTION * panic_factor) as u64 + inc_ms;
        let target = target.min(safe_ms / PANIC_MIN_FRACTION).max(1);
        let hard = (safe_ms / PANIC_HARD_FRACTION).max(target).max(1);
        return (target, hard);
    }

    // An explicit moves-to-go shrinks the window as the control approaches.
    let estimate = if safe_ms > LONG_TIME_CONTROL_MS {
        LONG_MOVES_ESTIMATE
    } else if safe_ms > MEDIUM_TIME_CONTROL_MS {
        MEDIUM_MOVES_ESTIMATE
    } else {
        SHORT_MOVES_ESTIMATE
    };
    let moves_to_go = movestogo.map_or(estimate.max(MIN_MOVES_TO_GO), |n| n.max(1));

    let base_time = safe_ms / moves_to_go + inc_ms;

    let soft_cap = safe_ms * config.soft_time_percent / 100;
    let hard_cap = safe_ms * config.hard_time_percent / 100;

    let soft_ms = base_time.min(soft_cap).max(1);
    let hard_ms = hard_cap.min(base_time.saturating_mul(3)).max(soft_ms).max(1);

    (soft_ms, hard_ms)
}

#[derive(Debug)]
struct Clock {
    control: TimeControl,
    config: TimeConfig,
    started: Instant,
    search_deadline: Option<Instant>,
    stop_deadline: Option<Instant>,
    pondering: bool,
}

impl Clock {
    fn arm(&mut self, from: Instant) {
        let (soft, hard) = self.control.compute_limits(&self.config);
        let deadline = |ms: u64| (ms != u64::MAX).then(|| from + Duration::from_millis(ms));
        self.search_deadline = deadline(soft);
        self.stop_deadline = deadline(hard);
    }
}

/// Deadlines and stop flag of the running search.
///
/// The search thread polls [`should_stop`](Self::should_stop) every few
/// thousand nodes; any other thread may call [`stop`](Self::stop) or
/// [`ponder_hit`](Self::ponder_hit).
#[derive(Debug)]
pub struct TimeController {
    stop: StopFlag,
    clock: Mutex<Clock>,
}

impl Default for TimeController {
    fn default() -> Self {
        Self::new(TimeConfig::default())
    }
}

impl TimeController {
    #[must_use]
    pub fn new(config: TimeConfig) -> Self {
        TimeController {
            stop: StopFlag::new(),
            clock: Mutex::new(Clock {
                control: TimeControl::Infinite,
                config,
                started: Instant::now(),
                search_deadline: None,
                stop_deadline: None,
                pondering: false,
            }),
        }
    }

    /// Start timing a new search. While `ponder` is set no deadline applies
    /// until [`ponder_hit`](Self::ponder_hit).
    pub fn start(&self, control: TimeControl, ponder: bool) {
        self.stop.reset();
        let mut clock = self.clock.lock();
        let now = Instant::now();
        clock.control = control;
        clock.started = now;
        clock.pondering = ponder;
        if ponder {
            clock.search_deadline = None;
            clock.stop_deadline = None;
        } else {
            clock.arm(now);
        }
    }

    pub fn set_config(&self, config: TimeConfig) {
        self.clock.lock().config = config;
    }

    #[must_use]
    pub fn config(&self) -> TimeConfig {
        self.clock.lock().config
    }

    /// Ask the running search to stop as soon as possible.
    pub fn stop(&self) {
        self.stop.stop();
    }

    /// Shared handle on the stop flag.
    #[must_use]
    pub fn stop_flag(&self) -> StopFlag {
        self.stop.clone()
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stop.is_stopped()
    }

    /// The opponent played the expected move: switch from pondering to
    /// normal timing, measured from now.
    pub fn ponder_hit(&self) {
        let mut clock = self.clock.lock();
        if clock.pondering {
            clock.pondering = false;
            clock.arm(Instant::now());
        }
    }

    /// Whether the iteration at `depth` must be aborted.
    #[must_use]
    pub fn should_stop(&self, depth: u32) -> bool {
        if self.stop.is_stopped() {
            return true;
        }
        if depth <= GUARANTEED_DEPTH {
            return false;
        }
        let clock = self.clock.lock();
        !clock.pondering && clock.stop_deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Whether an iteration at `depth` may be started.
    #[must_use]
    pub fn next_depth(&self, depth: u32) -> bool {
        if self.stop.is_stopped() {
            return false;
        }
        let clock = self.clock.lock();
        if depth > clock.control.max_depth() {
            return false;
        }
        if depth <= GUARANTEED_DEPTH || clock.pondering {
            return true;
        }
        clock.search_deadline.map_or(true, |d| Instant::now() < d)
    }

    /// Deepest iteration allowed by the current control.
    #[must_use]
    pub fn max_depth(&self) -> u32 {
        self.clock.lock().control.max_depth()
    }

    /// Time since [`start`](Self::start).
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.clock.lock().started.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> TimeConfig {
        TimeConfig {
            move_overhead_ms: 50,
            soft_time_percent: 5,
            hard_time_percent: 20,
        }
    }

    #[test]
    fn unlimited_controls() {
        assert!(TimeControl::Infinite.is_unlimited());
        assert!(TimeControl::Depth { depth: 5 }.is_unlimited());
        assert!(!TimeControl::MoveTime { time_ms: 5000 }.is_unlimited());
        assert_eq!(
            TimeControl::Infinite.compute_limits(&test_config()),
            (u64::MAX, u64::MAX)
        );
    }

    #[test]
    fn depth_control_caps_iterations() {
        assert_eq!(TimeControl::Depth { depth: 5 }.max_depth(), 5);
        assert_eq!(TimeControl::Depth { depth: 0 }.max_depth(), 1);
        assert_eq!(TimeControl::Depth { depth: 1000 }.max_depth(), MAX_DEPTH);
        assert_eq!(TimeControl::Infinite.max_depth(), MAX_DEPTH);
    }

    #[test]
    fn constructors_convert_durations() {
        let tc =
            TimeControl::incremental(Duration::from_secs(300), Duration::from_secs(3), Some(40));
        assert_eq!(
            tc,
            TimeControl::Incremental {
                time_left_ms: 300_000,
                inc_ms: 3000,
                movestogo: Some(40)
            }
        );
        assert_eq!(
            TimeControl::move_time(Duration::from_secs(5)),
            TimeControl::move_time_ms(5000)
        );
    }

    #[test]
    fn movetime_is_used_verbatim() {
        let tc = TimeControl::MoveTime { time_ms: 5000 };
        assert_eq!(tc.compute_limits(&test_config()), (5000, 5000));
        let tc = TimeControl::MoveTime { time_ms: 0 };
        assert_eq!(tc.compute_limits(&test_config()), (1, 1));
    }

    #[test]
    fn incremental_limits_are_ordered() {
        let tc = TimeControl::Incremental {
            time_left_ms: 300_000,
            inc_ms: 3000,
            movestogo: None,
        };
        let (soft, hard) = tc.compute_limits(&test_config());
        assert!(soft > 0);
        assert!(hard >= soft);
        assert!(hard < 300_000);
    }

    #[test]
    fn fewer_moves_to_go_means_more_time() {
        let config = TimeConfig::default();
        let limits = |n| {
            TimeControl::Incremental {
                time_left_ms: 60_000,
                inc_ms: 0,
                movestogo: Some(n),
            }
            .compute_limits(&config)
            .0
        };
        assert!(limits(2) > limits(10));
        assert!(limits(10) > limits(30));
    }

    #[test]
    fn critical_and_panic_time() {
        let critical = TimeControl::Incremental {
            time_left_ms: 100,
            inc_ms: 0,
            movestogo: None,
        };
        let (soft, _) = critical.compute_limits(&test_config());
        assert!(soft > 0 && soft <= 100);

        let panic = TimeControl::Incremental {
            time_left_ms: 3000,
            inc_ms: 0,
            movestogo: None,
        };
        let (soft, hard) = panic.compute_limits(&test_config());
        assert!(soft > 0 && soft < 3000);
        assert!(hard < 3000);
    }

    #[test]
    fn zero_time_left_is_handled() {
        let tc = TimeControl::Incremental {
            time_left_ms: 0,
            inc_ms: 0,
            movestogo: None,
        };
        let config = TimeConfig {
            move_overhead_ms: 0,
            ..test_config()
        };
        let (soft, hard) = tc.compute_limits(&config);
        assert!(soft >= 1);
        assert!(hard >= 1);
    }

    #[test]
    fn shallow_depths_survive_expired_time() {
        let tc = TimeController::default();
        tc.start(TimeControl::MoveTime { time_ms: 1 }, false);
        std::thread::sleep(Duration::from_millis(5));
        assert!(!tc.should_stop(1));
        assert!(!tc.should_stop(2));
        assert!(tc.should_stop(3));
        assert!(tc.next_depth(2));
        assert!(!tc.next_depth(3));
    }

    #[test]
    fn explicit_stop_ends_every_depth() {
        let tc = TimeController::default();
        tc.start(TimeControl::Infinite, false);
        assert!(!tc.should_stop(10));
        tc.stop_flag().stop();
        assert!(tc.is_stopped());
        assert!(tc.should_stop(1));
        assert!(!tc.next_depth(1));
        tc.start(TimeControl::Infinite, false);
        assert!(!tc.is_stopped());
    }

    #[test]
    fn ponder_hit_arms_deadlines() {
        let tc = TimeController::default();
        tc.start(TimeControl::MoveTime { time_ms: 1 }, true);
        std::thread::sleep(Duration::from_millis(5));
        assert!(!tc.should_stop(10));
        tc.ponder_hit();
        std::thread::sleep(Duration::from_millis(5));
        assert!(tc.should_stop(10));
    }

    #[test]
    fn depth_control_stops_iterating() {
        let tc = TimeController::default();
        tc.start(TimeControl::Depth { depth: 3 }, false);
        assert_eq!(tc.max_depth(), 3);
        assert!(tc.next_depth(3));
        assert!(!tc.next_depth(4));
    }
}
