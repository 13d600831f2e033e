//! Unique layer names.

use std::sync::atomic::{AtomicU64, Ordering};

/// Hands out process-unique layer names (`gm_id_1`, `gm_id_2`, ...).
///
/// One allocator is shared by every map source of a process and passed in
/// by reference, so tests can start from a fresh, predictable sequence.
#[derive(Debug)]
pub struct IdAllocator {
    prefix: String,
    next: AtomicU64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::with_prefix("gm_id_")
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(1),
        }
    }

    /// Allocate the next unused name.
    pub fn next_id(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{}{}", self.prefix, n)
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}
