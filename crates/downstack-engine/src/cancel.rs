//! Cooperative cancellation
//!
//! A [`CancelToken`] asks the run to wind down: the coordinator stops
//! launching work on the next resource boundary, and the poller stops
//! after finishing its current sleep/recheck cycle. Nothing in flight is
//! interrupted, so a deletion's status is always checked one last time
//! before the run stops.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared cancellation flag. Cloning is cheap; all clones observe the
/// same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}
