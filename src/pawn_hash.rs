//! Pawn hash table for caching pawn and king structure evaluation.
//!
//! Pawn structure, king shelter and passed-pawn king distances depend only
//! on where the pawns and kings stand, so they are cached under the
//! position's pawn+king hash. Pawns and kings rarely move relative to the
//! rest of the tree, which makes the hit rate high.

/// Cached midgame and endgame scores, White's point of view.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PawnHashEntry {
    pub mg: i32,
    pub eg: i32,
}

#[derive(Clone, Copy, Default)]
struct PawnSlot {
    key: u64,
    mg: i32,
    eg: i32,
}

impl PawnSlot {
    fn is_empty(&self) -> bool {
        self.key == 0
    }
}

/// Number of slots per bucket
const BUCKET_SIZE: usize = 2;

type PawnBucket = [PawnSlot; BUCKET_SIZE];

/// Cache of pawn structure evaluation indexed by pawn+king hash.
///
/// Owned by a single search; there is no interior synchronization.
pub struct PawnHashTable {
    buckets: Vec<PawnBucket>,
    mask: usize,
}

impl PawnHashTable {
    /// Create a new pawn hash table with the given size in kilobytes.
    /// Default is 1024 KB (1 MB).
    #[must_use]
    pub fn new(size_kb: usize) -> Self {
        let bucket_size = std::mem::size_of::<PawnBucket>();
        let mut num_buckets = (size_kb * 1024) / bucket_size;

        // Ensure power of 2 for efficient indexing
        num_buckets = num_buckets.next_power_of_two() / 2;
        if num_buckets == 0 {
            num_buckets = 1024;
        }

        PawnHashTable {
            buckets: vec![[PawnSlot::default(); BUCKET_SIZE]; num_buckets],
            mask: num_buckets - 1,
        }
    }

    #[inline]
    fn index(&self, hash: u64) -> usize {
        (hash as usize) & self.mask
    }

    /// Probe the table for cached pawn structure evaluation.
    #[must_use]
    pub fn probe(&self, hash: u64) -> Option<PawnHashEntry> {
        self.buckets[self.index(hash)]
            .iter()
            .find(|slot| !slot.is_empty() && slot.key == hash)
            .map(|slot| PawnHashEntry {
                mg: slot.mg,
                eg: slot.eg,
            })
    }

    /// Store pawn structure evaluation in the table.
    pub fn store(&mut self, hash: u64, mg: i32, eg: i32) {
        let idx = self.index(hash);
        let bucket = &mut self.buckets[idx];
        let new = PawnSlot { key: hash, mg, eg };

        // First pass: look for empty slot or matching hash
        for slot in bucket.iter_mut() {
            if slot.is_empty() || slot.key == hash {
                *slot = new;
                return;
            }
        }

        // Both slots taken by other keys: the second slot is the victim.
        bucket[1] = new;
    }

    /// Clear all entries from the table.
    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            *bucket = [PawnSlot::default(); BUCKET_SIZE];
        }
    }
}

impl Default for PawnHashTable {
    fn default() -> Self {
        Self::new(1024) // 1 MB default
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_and_probe() {
        let mut table = PawnHashTable::new(64);
        let hash = 0x1234_5678_9ABC_DEF0;

        table.store(hash, 150, -50);

        let entry = table.probe(hash).expect("should find entry");
        assert_eq!(entry, PawnHashEntry { mg: 150, eg: -50 });
    }

    #[test]
    fn test_no_false_positives() {
        let mut table = PawnHashTable::new(64);
        table.store(0x1234_5678_9ABC_DEF0, 100, 200);
        assert!(table.probe(0xFEDC_BA98_7654_3210).is_none());
    }

    #[test]
    fn test_update_existing() {
        let mut table = PawnHashTable::new(64);
        let hash = 0x1234_5678_9ABC_DEF0;

        table.store(hash, 100, 200);
        table.store(hash, 300, 400);

        let entry = table.probe(hash).expect("should find entry");
        assert_eq!(entry.mg, 300);
        assert_eq!(entry.eg, 400);
    }

    #[test]
    fn test_bucket_keeps_two_colliding_keys() {
        let mut table = PawnHashTable::new(1);
        let stride = (table.mask as u64) + 1;
        let (a, b, c) = (5, 5 + stride, 5 + 2 * stride);

        table.store(a, 1, 1);
        table.store(b, 2, 2);
        assert!(table.probe(a).is_some());
        assert!(table.probe(b).is_some());

        table.store(c, 3, 3);
        assert!(table.probe(c).is_some());
        assert!(table.probe(a).is_some());
        assert!(table.probe(b).is_none());
    }

    #[test]
    fn test_clear() {
        let mut table = PawnHashTable::new(64);
        let hash = 0x1234_5678_9ABC_DEF0;

        table.store(hash, 100, 200);
        assert!(table.probe(hash).is_some());

        table.clear();
        assert!(table.probe(hash).is_none());
    }
}
