//! Cross-thread search cancellation.
//!
//! The time controller owns one [`StopFlag`]; the engine hands clones to
//! whoever may end a running search (a protocol thread, a test, a GUI).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared "stop searching" bit. All clones observe the same flag.
#[derive(Clone, Debug, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Ask the search to return at its next node checkpoint.
    #[inline]
    pub fn stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Re-arm the flag before a new search starts.
    #[inline]
    pub fn reset(&self) {
        self.0.store(false, Ordering::Release);
    }
}
