//! Context provides cancellation, similar to Golang's Context.
//!
//! Each click gets its own Context; a newer click cancels it. The binary also
//! uses one for shutdown.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

#[derive(Clone, Debug, Default)]
pub struct Context {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    cancelled: Mutex<bool>,
    cv: Condvar,
}

impl Context {
    /// Create a new, live Context.
    pub fn new() -> Self {
        Self::default()
    }

    // The flag is a plain bool, so a panic while holding it cannot leave it
    // half-written.
    fn flag(&self) -> MutexGuard<'_, bool> {
        self.inner
            .cancelled
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Cancel the context, waking anyone waiting on it.
    pub fn cancel(&self) {
        *self.flag() = true;
        self.inner.cv.notify_all();
    }

    /// Returns true iff the context has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        *self.flag()
    }

    /// Wait until the context is cancelled.
    pub fn wait(&self) {
        let g = self.flag();
        let _g = self
            .inner
            .cv
            .wait_while(g, |cancelled| !*cancelled)
            .unwrap_or_else(PoisonError::into_inner);
    }
}
