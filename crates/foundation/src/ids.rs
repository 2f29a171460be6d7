use serde::{Deserialize, Serialize};

/// Opaque handle for a marker record.
///
/// Ids are handed out by an [`IdAllocator`] and never reused, so a visibility
/// delta computed across a reload can't confuse an old record with a new one.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(u64);

impl RecordId {
    pub fn new(n: u64) -> Self {
        RecordId(n)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonic source of [`RecordId`]s.
#[derive(Debug, Default)]
pub struct IdAllocator {
    next: std::sync::atomic::AtomicU64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&self) -> RecordId {
        RecordId(
            self.next
                .fetch_add(1, std::sync::atomic::Ordering::Relaxed),
        )
    }
}
