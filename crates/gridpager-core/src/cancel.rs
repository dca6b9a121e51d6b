use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancellation token shared between the coordination thread
/// and one background worker.
///
/// Cancellation is advisory: a worker already past its last check may still
/// finish its decode, but its result is dropped before it can bind (the
/// worker skips the post, and the continuation is removed from the runtime).
/// Long-running work should check [`CancelToken::is_cancelled`] at every
/// resumption point and exit early; nothing is ever force-terminated.
///
/// After cancelling a token whose worker may be parked on a [`WorkGate`],
/// call [`WorkGate::wake_all`] so the waiter re-checks its predicate.
///
/// [`WorkGate`]: crate::WorkGate
/// [`WorkGate::wake_all`]: crate::WorkGate::wake_all
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates a fresh, non-cancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the token cancelled. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Returns `true` once [`cancel`](Self::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Returns whether the associated work should keep going.
    pub fn is_active(&self) -> bool {
        !self.is_cancelled()
    }
}
