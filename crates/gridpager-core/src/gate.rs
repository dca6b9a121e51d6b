use parking_lot::{Condvar, Mutex};
use std::sync::Arc;

use crate::CancelToken;

/// Shared pause flag that background workers block on during fast scrolling.
///
/// The gate is the only blocking wait in the pipeline. A paused worker sleeps
/// on the condition variable until the gate is unpaused or its task is
/// cancelled; there is no timeout. Cancellation must be followed by
/// [`WorkGate::wake_all`] so parked waiters re-evaluate their predicate.
#[derive(Clone, Debug, Default)]
pub struct WorkGate {
    inner: Arc<GateInner>,
}

#[derive(Debug, Default)]
struct GateInner {
    paused: Mutex<bool>,
    cond: Condvar,
}

impl WorkGate {
    /// Creates an unpaused gate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pauses or resumes background work. Unpausing wakes every waiter.
    pub fn set_paused(&self, paused: bool) {
        let mut guard = self.inner.paused.lock();
        *guard = paused;
        if !paused {
            self.inner.cond.notify_all();
        }
    }

    /// Returns the current pause state.
    pub fn is_paused(&self) -> bool {
        *self.inner.paused.lock()
    }

    /// Blocks while the gate is paused and `token` is still active.
    ///
    /// Returns as soon as either the gate is unpaused or the token is
    /// cancelled; callers must re-check the token afterwards.
    pub fn wait_while_paused(&self, token: &CancelToken) {
        let mut guard = self.inner.paused.lock();
        while *guard && !token.is_cancelled() {
            self.inner.cond.wait(&mut guard);
        }
    }

    /// Wakes every waiter without changing the pause state.
    ///
    /// The gate lock is taken before notifying so a waiter between its
    /// predicate check and its wait cannot miss the wakeup.
    pub fn wake_all(&self) {
        let _guard = self.inner.paused.lock();
        self.inner.cond.notify_all();
    }
}
