//! The store shared by every connection.

use crate::error::ServerResult;
use parking_lot::{Mutex, MutexGuard};
use ringlog_core::LogStore;
use std::fmt;
use std::sync::Arc;

/// A log medium behind the server-wide lock.
///
/// Cloning yields another handle to the same medium. A connection holds the
/// guard across one record's mutation and the complete echo that follows,
/// so no other writer can interleave with what it reads back. The guard is
/// released on every exit path, unwinding included; the lock never poisons.
#[derive(Clone)]
pub struct SharedStore {
    inner: Arc<Mutex<Box<dyn LogStore>>>,
}

impl SharedStore {
    /// Wraps a medium.
    pub fn new(store: impl LogStore + 'static) -> Self {
        Self::from_boxed(Box::new(store))
    }

    /// Wraps an already boxed medium.
    pub fn from_boxed(store: Box<dyn LogStore>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    /// Acquires the server-wide lock.
    pub fn lock(&self) -> MutexGuard<'_, Box<dyn LogStore>> {
        self.inner.lock()
    }

    /// Copies the whole logical view.
    ///
    /// # Errors
    ///
    /// Returns an error if the medium cannot be read.
    pub fn snapshot(&self) -> ServerResult<Vec<u8>> {
        let store = self.lock();
        let mut out = Vec::new();
        store.read_from(0, &mut out)?;
        Ok(out)
    }
}

impl fmt::Debug for SharedStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedStore")
            .field("locked", &self.inner.is_locked())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ringlog_core::RingStore;

    #[test]
    fn clones_share_one_medium() {
        let store = SharedStore::new(RingStore::new(2).unwrap());
        let other = store.clone();

        store.lock().append(b"one\n").unwrap();
        other.lock().append(b"two\n").unwrap();
        store.lock().append(b"three\n").unwrap();

        assert_eq!(other.snapshot().unwrap(), b"two\nthree\n");
    }

    #[test]
    fn debug_reports_lock_state() {
        let store = SharedStore::new(RingStore::default());
        let guard = store.lock();
        assert!(format!("{store:?}").contains("locked: true"));
        drop(guard);
        assert!(format!("{store:?}").contains("locked: false"));
    }
}
