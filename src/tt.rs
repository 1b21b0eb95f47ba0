//! Transposition table for caching search results.
//!
//! Uses Zobrist hashes to store and retrieve search scores, bounds and best
//! moves, enabling search tree pruning and move ordering.
//!
//! The main table is two-way set associative: a key maps to slot `i` (low
//! bits of the hash) and its partner slot `i ^ 1`. Entries are verified by a
//! 32-bit lock taken from the high bits of the hash.
//!
//! [`PvTable`] is a smaller move-only table remembering the principal
//! variation candidates of a position, most recent first.

use std::mem;

use crate::board::search::{KNOWN_LOSS, KNOWN_WIN};
use crate::board::Move;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoundType {
    Exact,      // Score is the exact value
    LowerBound, // Score is at least this value (failed high - score >= beta)
    UpperBound, // Score is at most this value (failed low - score <= alpha)
}

const FLAG_USED: u8 = 0x80;
const FLAG_STATIC_EVAL: u8 = 0x40;
const BOUND_MASK: u8 = 0x03;

impl BoundType {
    fn to_u8(self) -> u8 {
        match self {
            BoundType::Exact => 0,
            BoundType::LowerBound => 1,
            BoundType::UpperBound => 2,
        }
    }

    fn from_u8(v: u8) -> Self {
        match v & BOUND_MASK {
            0 => BoundType::Exact,
            1 => BoundType::LowerBound,
            _ => BoundType::UpperBound,
        }
    }
}

/// One table slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TtEntry {
    lock: u32,
    mv: Move,
    score: i16,
    static_eval: i16,
    depth: i8,
    flags: u8,
}

impl TtEntry {
    /// Entry for `key` carrying a search result.
    #[must_use]
    pub fn new(key: u64, depth: i32, score: i32, bound: BoundType, mv: Move) -> Self {
        TtEntry {
            lock: lock_of(key),
            mv,
            score: score.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16,
            static_eval: 0,
            depth: depth.clamp(i32::from(i8::MIN), i32::from(i8::MAX)) as i8,
            flags: FLAG_USED | bound.to_u8(),
        }
    }

    /// Attach the static evaluation of the position.
    #[must_use]
    pub fn with_static_eval(mut self, eval: i32) -> Self {
        self.static_eval = eval.clamp(KNOWN_LOSS, KNOWN_WIN) as i16;
        self.flags |= FLAG_STATIC_EVAL;
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.flags & FLAG_USED == 0
    }

    #[must_use]
    pub fn depth(&self) -> i32 {
        i32::from(self.depth)
    }

    #[must_use]
    pub fn score(&self) -> i32 {
        i32::from(self.score)
    }

    #[must_use]
    pub fn bound(&self) -> BoundType {
        BoundType::from_u8(self.flags)
    }

    #[must_use]
    pub fn best_move(&self) -> Option<Move> {
        (!self.mv.is_null()).then_some(self.mv)
    }

    #[must_use]
    pub fn static_eval(&self) -> Option<i32> {
        (self.flags & FLAG_STATIC_EVAL != 0).then_some(i32::from(self.static_eval))
    }

    /// Stored score seen from a node at `ply`.
    #[must_use]
    pub fn score_at(&self, ply: usize) -> i32 {
        score_from_tt(self.score(), ply)
    }

    /// Whether the stored bound settles the window `(alpha, beta)` at `ply`.
    #[must_use]
    pub fn cuts(&self, ply: usize, alpha: i32, beta: i32) -> bool {
        let score = self.score_at(ply);
        match self.bound() {
            BoundType::Exact => true,
            BoundType::LowerBound => score >= beta,
            BoundType::UpperBound => score <= alpha,
        }
    }
}

#[inline]
fn lock_of(key: u64) -> u32 {
    (key >> 32) as u32
}

/// Convert a score relative to the root into one relative to the node at
/// `ply`, so mate distances stay correct when the entry is found elsewhere.
#[must_use]
pub fn score_to_tt(score: i32, ply: usize) -> i32 {
    let ply = ply as i32;
    if score > KNOWN_WIN {
        score + ply
    } else if score < KNOWN_LOSS {
        score - ply
    } else {
        score
    }
}

/// Inverse of [`score_to_tt`].
#[must_use]
pub fn score_from_tt(score: i32, ply: usize) -> i32 {
    let ply = ply as i32;
    if score > KNOWN_WIN {
        score - ply
    } else if score < KNOWN_LOSS {
        score + ply
    } else {
        score
    }
}

/// Score, bound and best-move cache.
///
/// Owned by a single search thread.
pub struct TranspositionTable {
    slots: Vec<TtEntry>,
    mask: usize,
}

impl TranspositionTable {
    /// Create a new transposition table with the given size in megabytes.
    #[must_use]
    pub fn new(size_mb: usize) -> Self {
        let entry_size = mem::size_of::<TtEntry>();
        let mut num_slots = (size_mb * 1024 * 1024) / entry_size;

        // Ensure num_slots is a power of 2 for efficient indexing
        num_slots = num_slots.next_power_of_two() / 2;
        if num_slots < 2 {
            num_slots = 1024;
        }

        TranspositionTable {
            slots: vec![TtEntry::default(); num_slots],
            mask: num_slots - 1,
        }
    }

    fn index(&self, key: u64) -> usize {
        (key as usize) & self.mask
    }

    /// Store `entry` under `key`.
    ///
    /// The first slot is replaced when it holds the same position, is empty
    /// or holds a shallower search; otherwise the partner slot is
    /// overwritten.
    pub fn put(&mut self, key: u64, entry: TtEntry) {
        let i = self.index(key);
        let first = self.slots[i];
        if first.is_empty() || first.lock == lock_of(key) || first.depth < entry.depth {
            self.slots[i] = entry;
        } else {
            self.slots[i ^ 1] = entry;
        }
    }

    /// The entry stored for `key`, or an empty entry.
    #[must_use]
    pub fn get(&self, key: u64) -> TtEntry {
        let i = self.index(key);
        let lock = lock_of(key);
        [self.slots[i], self.slots[i ^ 1]]
            .into_iter()
            .find(|e| !e.is_empty() && e.lock == lock)
            .unwrap_or_default()
    }

    /// Returns hash table fullness in per mille (0-1000).
    #[must_use]
    pub fn hashfull_per_mille(&self) -> u32 {
        // Sample the first 1000 slots
        let sample_size = self.slots.len().min(1000);
        let occupied = self
            .slots
            .iter()
            .take(sample_size)
            .filter(|e| !e.is_empty())
            .count();
        ((occupied as u64 * 1000) / sample_size as u64) as u32
    }

    /// Clear all entries from the table.
    pub fn clear(&mut self) {
        self.slots.fill(TtEntry::default());
    }
}

/// Number of principal variation candidates remembered per position.
pub const PV_MOVES: usize = 4;

#[derive(Clone, Copy, Default)]
struct PvEntry {
    key: u64,
    moves: [Move; PV_MOVES],
}

/// Principal variation move table.
///
/// Entries store the full key, so a probe never returns moves recorded for
/// a different position.
pub struct PvTable {
    entries: Vec<PvEntry>,
    mask: usize,
}

impl Default for PvTable {
    fn default() -> Self {
        Self::new(1 << 16)
    }
}

impl PvTable {
    /// Table with `capacity` entries, rounded down to a power of two.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let size = capacity.max(2).next_power_of_two();
        let size = if size > capacity.max(2) { size / 2 } else { size };
        PvTable {
            entries: vec![PvEntry::default(); size],
            mask: size - 1,
        }
    }

    /// Candidate moves for `key`, most recent first.
    #[must_use]
    pub fn get(&self, key: u64) -> &[Move] {
        let entry = &self.entries[(key as usize) & self.mask];
        if entry.key != key {
            return &[];
        }
        let len = entry.moves.iter().take_while(|m| !m.is_null()).count();
        &entry.moves[..len]
    }

    /// Record `mv` as the best move of `key`, keeping earlier candidates
    /// behind it.
    pub fn put(&mut self, key: u64, mv: Move) {
        let entry = &mut self.entries[(key as usize) & self.mask];
        if entry.key != key {
            *entry = PvEntry {
                key,
                moves: [Move::NULL; PV_MOVES],
            };
        }
        let pos = entry
            .moves
            .iter()
            .position(|&m| m == mv || m.is_null())
            .unwrap_or(PV_MOVES - 1);
        entry.moves.copy_within(0..pos, 1);
        entry.moves[0] = mv;
    }

    pub fn clear(&mut self) {
        self.entries.fill(PvEntry::default());
    }
}
