//! Shutdown signalling.

use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A cloneable, one-way shutdown token.
///
/// The process lifecycle (a signal handler, a test) calls
/// [`trigger`](Self::trigger); the accept loop and the timestamp writer
/// observe it between blocking steps. Triggering is permanent.
#[derive(Debug, Clone, Default)]
pub struct Shutdown {
    inner: Arc<State>,
}

#[derive(Debug, Default)]
struct State {
    triggered: Mutex<bool>,
    cond: Condvar,
}

impl Shutdown {
    /// Creates an untriggered token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests shutdown and wakes every waiter.
    pub fn trigger(&self) {
        let mut triggered = self.inner.triggered.lock();
        *triggered = true;
        self.inner.cond.notify_all();
    }

    /// Returns true once shutdown has been requested.
    pub fn is_triggered(&self) -> bool {
        *self.inner.triggered.lock()
    }

    /// Sleeps for up to `timeout`, returning early if shutdown is requested.
    ///
    /// Returns true if shutdown has been requested.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut triggered = self.inner.triggered.lock();
        while !*triggered {
            if self.inner.cond.wait_until(&mut triggered, deadline).timed_out() {
                break;
            }
        }
        *triggered
    }
}
