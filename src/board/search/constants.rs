//! Search constants.

// ============================================================================
// SCORES
// ============================================================================

/// Score of delivering mate at the root. A mate found `n` plies deep scores
/// `MATE - n`.
pub const MATE: i32 = 30000;

/// Score of being mated at the root.
pub const MATED: i32 = -MATE;

/// Bound larger than any score.
pub const INFINITY: i32 = 32000;

/// Static scores never reach these; anything beyond is a mate score.
pub const KNOWN_WIN: i32 = 25000;
pub const KNOWN_LOSS: i32 = -KNOWN_WIN;

pub const DRAW: i32 = 0;

// ============================================================================
// LIMITS
// ============================================================================

/// Deepest iteration the driver will start.
pub const MAX_DEPTH: u32 = 64;

/// Nodes between two polls of the time controller.
pub const CHECKPOINT_NODES: u64 = 4096;

/// Default `Quiescence Depth`.
pub const DEFAULT_QUIESCENCE_DEPTH: i32 = 4;

// ============================================================================
// PRUNING AND ORDERING
// ============================================================================

/// Depth reduction of the null-move search.
pub const NULL_MOVE_REDUCTION: i32 = 2;

/// Null-move pruning is tried from this depth on.
pub const NULL_MOVE_MIN_DEPTH: i32 = 3;

/// Shell sort gap sequence used by the move picker.
pub const SORT_GAPS: [usize; 3] = [10, 4, 1];

/// History scores saturate here.
pub const HISTORY_MAX: i32 = 1 << 20;
