//! Heap-backed storage.

use crate::backend::{checked_range, StorageBackend};
use crate::error::StorageResult;
use parking_lot::RwLock;
use std::io::Write;

/// A log medium held entirely in memory.
///
/// Nothing survives the process. Useful in tests and for running the flat
/// medium without a data file.
///
/// ```rust
/// use ringlog_storage::{InMemoryBackend, StorageBackend};
///
/// let mut backend = InMemoryBackend::new();
/// backend.append(b"one\n").unwrap();
/// assert_eq!(backend.append(b"two\n").unwrap(), 4);
/// assert_eq!(backend.contents(), b"one\ntwo\n");
/// ```
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    bytes: RwLock<Vec<u8>>,
}

impl InMemoryBackend {
    /// Creates an empty medium.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a medium that already holds `contents`.
    #[must_use]
    pub fn with_contents(contents: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: RwLock::new(contents.into()),
        }
    }

    /// Copies out everything stored so far.
    #[must_use]
    pub fn contents(&self) -> Vec<u8> {
        self.bytes.read().clone()
    }
}

impl StorageBackend for InMemoryBackend {
    fn read_at(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>> {
        let bytes = self.bytes.read();
        let range = checked_range(offset, len, bytes.len() as u64)?;
        Ok(bytes[range.start as usize..range.end as usize].to_vec())
    }

    fn append(&mut self, data: &[u8]) -> StorageResult<u64> {
        let bytes = self.bytes.get_mut();
        let at = bytes.len() as u64;
        bytes.extend_from_slice(data);
        Ok(at)
    }

    fn flush(&mut self) -> StorageResult<()> {
        Ok(())
    }

    fn size(&self) -> StorageResult<u64> {
        Ok(self.bytes.read().len() as u64)
    }

    fn sync(&mut self) -> StorageResult<()> {
        Ok(())
    }

    fn copy_range(&self, offset: u64, out: &mut dyn Write) -> StorageResult<u64> {
        let bytes = self.bytes.read();
        let tail = usize::try_from(offset)
            .ok()
            .and_then(|start| bytes.get(start..))
            .unwrap_or_default();
        out.write_all(tail)?;
        Ok(tail.len() as u64)
    }
}
