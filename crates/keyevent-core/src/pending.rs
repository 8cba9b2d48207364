//! Backlog tracking for sent-but-unanswered key events.
//!
//! Every event sent to the framework takes a [`PendingGuard`]; the guard is
//! released when the reply continuation runs, or when the transport drops the
//! continuation without running it.  If the number of outstanding events grows
//! past the configured ceiling, a warning is logged once per upward crossing,
//! which usually means the framework stopped answering.
//!
//! # Thread safety
//!
//! The count is an `AtomicUsize`; replies may be delivered on any thread.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tracing::warn;

/// Default ceiling before the backlog warning fires.
pub const DEFAULT_MAX_PENDING_EVENTS: usize = 1000;

/// Shared counter of outstanding key events.
#[derive(Debug)]
pub struct PendingEvents {
    count: AtomicUsize,
    ceiling: usize,
}

impl PendingEvents {
    /// Creates a tracker that warns once more than `ceiling` events are pending.
    pub fn new(ceiling: usize) -> Self {
        Self {
            count: AtomicUsize::new(0),
            ceiling,
        }
    }

    /// Registers one more outstanding event.
    ///
    /// The returned guard decrements the count when dropped.
    pub fn track(self: &Arc<Self>) -> PendingGuard {
        // `fetch_add` returns the value before the increment.
        let previous = self.count.fetch_add(1, Ordering::AcqRel);
        if previous == self.ceiling {
            warn!(
                pending = previous + 1,
                ceiling = self.ceiling,
                "more key events are waiting for a framework reply than expected; \
                 the framework may not be handling key events"
            );
        }
        PendingGuard {
            events: Arc::clone(self),
        }
    }

    /// Number of events currently waiting for a reply.
    pub fn count(&self) -> usize {
        self.count.load(Ordering::Acquire)
    }

    /// The configured warning ceiling.
    pub fn ceiling(&self) -> usize {
        self.ceiling
    }
}

impl Default for PendingEvents {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PENDING_EVENTS)
    }
}

/// Marks one event as outstanding for as long as it lives.
#[derive(Debug)]
pub struct PendingGuard {
    events: Arc<PendingEvents>,
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.events.count.fetch_sub(1, Ordering::AcqRel);
    }
}
