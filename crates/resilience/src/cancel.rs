//! Cooperative cancellation of a retry sequence.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cancellation token for an in-flight backoff sequence.
///
/// Cloned handles share one flag. The executor checks it before each attempt
/// and before each sleep; it does not abort an attempt already in flight
/// (per-attempt timeouts bound those).
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
