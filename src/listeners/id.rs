//! Listener identifiers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identity of a registered listener, unique for the life of the process
///
/// `ListenerId::NONE` (zero) marks a mutation with no specific requester;
/// it is never allocated.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ListenerId(u64);

impl ListenerId {
    pub const NONE: ListenerId = ListenerId(0);

    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    pub const fn is_none(self) -> bool {
        self.0 == 0
    }
}

impl From<u64> for ListenerId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hands out listener ids 1, 2, 3, ... and never reuses them
#[derive(Debug)]
pub struct ListenerIdAllocator {
    next: AtomicU64,
}

impl Default for ListenerIdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl ListenerIdAllocator {
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    pub fn allocate(&self) -> ListenerId {
        ListenerId(self.next.fetch_add(1, Ordering::SeqCst))
    }

    /// The id the next allocation will return
    pub fn peek_next(&self) -> ListenerId {
        ListenerId(self.next.load(Ordering::SeqCst))
    }
}
