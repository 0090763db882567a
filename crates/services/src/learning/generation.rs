use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic request counter used to discard results of superseded loads.
#[derive(Debug, Default)]
pub struct RequestGeneration {
    current: AtomicU64,
}

/// Ticket for one load; compare with `RequestGeneration::is_current` before
/// committing its results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationToken(u64);

impl RequestGeneration {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new load, invalidating every earlier token.
    pub fn begin(&self) -> GenerationToken {
        GenerationToken(self.current.fetch_add(1, Ordering::AcqRel) + 1)
    }

    #[must_use]
    pub fn is_current(&self, token: GenerationToken) -> bool {
        self.current.load(Ordering::Acquire) == token.0
    }
}

/// Whether a load's results were published.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Committed,
    Stale,
}
