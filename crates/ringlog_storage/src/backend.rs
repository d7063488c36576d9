//! Storage backend trait definition.

use crate::error::{StorageError, StorageResult};
use std::io::Write;
use std::ops::Range;

/// Chunk size for callers that scan a backend piecewise.
pub const COPY_CHUNK_SIZE: usize = 64 * 1024;

/// An append-only byte store holding the concatenated records of a log.
///
/// # Invariants
///
/// - `append` returns the offset where data was written
/// - `read_at` returns exactly the bytes previously written at that offset
/// - `size` is the offset the next `append` will write at
/// - Backends must be `Send + Sync` so a store can move between threads
pub trait StorageBackend: Send + Sync {
    /// Reads `len` bytes starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::ReadPastEnd`] if the range extends beyond the
    /// current size, or an I/O error.
    fn read_at(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>>;

    /// Appends data to the end of the storage.
    ///
    /// Returns the offset where the data was written.
    ///
    /// # Errors
    ///
    /// Returns an error if an I/O error occurs.
    fn append(&mut self, data: &[u8]) -> StorageResult<u64>;

    /// Flushes pending writes to the OS.
    ///
    /// # Errors
    ///
    /// Returns an error if the flush operation fails.
    fn flush(&mut self) -> StorageResult<()>;

    /// Returns the current size of the storage in bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the size cannot be determined.
    fn size(&self) -> StorageResult<u64>;

    /// Syncs data and metadata to durable storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the sync operation fails.
    fn sync(&mut self) -> StorageResult<()>;

    /// Streams everything from `offset` to the end into `out`.
    ///
    /// Returns the number of bytes written. An offset at or past the end
    /// writes nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if reading the backend or writing `out` fails.
    fn copy_range(&self, offset: u64, out: &mut dyn Write) -> StorageResult<u64>;
}

/// Validates a read of `len` bytes at `offset` against `size`.
pub(crate) fn checked_range(offset: u64, len: usize, size: u64) -> StorageResult<Range<u64>> {
    match offset.checked_add(len as u64) {
        Some(end) if end <= size => Ok(offset..end),
        _ => Err(StorageError::ReadPastEnd { offset, len, size }),
    }
}
