//! The advisory request-quota snapshot reported by the service.
//!
//! Every response carries the current rate-limit counters in headers. The
//! client keeps only the most recently observed set, replaced wholesale
//! after each completed request. When parallel requests complete close
//! together the winner is whichever writes last, which may not be the
//! request that finished last in wall-clock terms - an acceptable race,
//! since the snapshot is advisory.

use std::sync::{Arc, RwLock};

/// The rate-limit counters observed on one response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitSnapshot {
    /// Requests allowed per window.
    pub allowed: u64,
    /// Requests remaining in the current window.
    pub remaining: u64,
    /// Unix time at which the window resets.
    pub reset_at: u64,
    /// Seconds until the window resets.
    pub reset_in: u64,
}

/// Process-wide slot holding the latest [`RateLimitSnapshot`].
///
/// The snapshot is swapped as a unit, never mutated in place, so readers
/// can never observe a half-written set of counters.
#[derive(Debug, Default)]
pub struct RateLimitSlot {
    current: RwLock<Option<Arc<RateLimitSnapshot>>>,
}

impl RateLimitSlot {
    /// Creates an empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the snapshot wholesale. Last writer wins.
    pub fn store(&self, snapshot: RateLimitSnapshot) {
        let mut slot = self
            .current
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *slot = Some(Arc::new(snapshot));
    }

    /// Returns the most recently stored snapshot, if any request has
    /// completed yet.
    #[must_use]
    pub fn load(&self) -> Option<Arc<RateLimitSnapshot>> {
        self.current
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}
