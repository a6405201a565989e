//! Instance naming for bound targets
//!
//! Every bind call gets a stable instance name that correlates its hook
//! events: an explicit name verbatim, an explicit name suffixed with a
//! counter when uniqueness is requested, or an auto-generated `o<counter>`
//! id. The counter behind [`bind`](crate::binder::bind) is process-wide and
//! never resets; tests construct their own [`NameAllocator`] so the sequence
//! they observe is deterministic.

use std::sync::atomic::{AtomicU64, Ordering};

/// Prefix for auto-generated instance names.
const AUTO_PREFIX: &str = "o";

/// Allocates instance names from a monotonically increasing counter.
#[derive(Debug, Default)]
pub struct NameAllocator {
    counter: AtomicU64,
}

impl NameAllocator {
    /// A fresh allocator with its counter at zero.
    pub const fn new() -> Self {
        NameAllocator {
            counter: AtomicU64::new(0),
        }
    }

    /// Next counter value. Pre-incremented: the first allocation observes 1.
    fn next(&self) -> u64 {
        self.counter.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Compute the instance name for one bind call.
    ///
    /// An explicit name without `unique` is returned verbatim; repeated
    /// explicit names collide on purpose. With `unique`, the counter is
    /// appended even when the name repeats.
    pub fn allocate(&self, explicit: Option<&str>, unique: bool) -> String {
        match explicit {
            Some(name) if unique => format!("{}{}", name, self.next()),
            Some(name) => name.to_string(),
            None => format!("{}{}", AUTO_PREFIX, self.next()),
        }
    }
}

/// Process-wide allocator backing [`bind`](crate::binder::bind). Lives for
/// the process, never torn down.
static PROCESS_ALLOCATOR: NameAllocator = NameAllocator::new();

pub(crate) fn process_allocator() -> &'static NameAllocator {
    &PROCESS_ALLOCATOR
}
