//! Log media.
//!
//! [`LogStore`] is what the server appends to and echoes from. Two media
//! are provided:
//!
//! - [`RingStore`] keeps the last `capacity` entries in a [`RingLog`]
//! - [`FlatStore`] keeps every record in a `ringlog_storage` backend, such
//!   as a plain data file

use crate::config::StoreConfig;
use crate::cursor::{fixed_size_seek, CursorResolver};
use crate::entry::Entry;
use crate::error::CoreResult;
use crate::ring::RingLog;
use ringlog_storage::{StorageBackend, COPY_CHUNK_SIZE};
use std::io::{SeekFrom, Write};
use tracing::debug;

/// Record terminator; entries of a flat medium are delimited by it.
const TERMINATOR: u8 = b'\n';

/// A medium that stores log records and serves the logical view.
///
/// # Invariants
///
/// - `append` stores exactly one entry per call
/// - `read_from(o)` streams the same bytes as indexing the concatenation of
///   live entries from `o`
/// - `seek_to_entry` never mutates the medium
///
/// Implementations do not lock; the server serializes all access.
pub trait LogStore: Send {
    /// Stores one record as a new entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying medium fails to store it.
    fn append(&mut self, record: &[u8]) -> CoreResult<()>;

    /// Streams the logical view from `offset` to the end into `out`.
    ///
    /// Returns the number of bytes written. Offsets at or past the end
    /// write nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the medium cannot be read or `out` fails.
    fn read_from(&self, offset: u64, out: &mut dyn Write) -> CoreResult<u64>;

    /// Length of the logical view in bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the size cannot be determined.
    fn total_length(&self) -> CoreResult<u64>;

    /// Number of live entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the medium cannot be read.
    fn entry_count(&self) -> CoreResult<usize>;

    /// Resolves `(write_cmd_index, intra_offset)` to an absolute offset.
    ///
    /// # Errors
    ///
    /// Returns [`crate::SeekError::OutOfRange`] (wrapped) for positions
    /// outside the live view.
    fn seek_to_entry(&self, write_cmd_index: u32, intra_offset: u32) -> CoreResult<u64>;

    /// Repositions a byte cursor with `lseek` semantics over the view.
    ///
    /// # Errors
    ///
    /// Returns [`crate::SeekError::InvalidPosition`] (wrapped) when the
    /// target lies outside the view.
    fn seek(&self, current: u64, pos: SeekFrom) -> CoreResult<u64> {
        let total = self.total_length()?;
        Ok(fixed_size_seek(current, pos, total)?)
    }

    /// Pushes pending writes through to durable storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the flush fails.
    fn flush(&mut self) -> CoreResult<()> {
        Ok(())
    }
}

/// Capacity-bounded medium backed by a [`RingLog`].
#[derive(Debug, Default)]
pub struct RingStore {
    ring: RingLog,
}

impl RingStore {
    /// Creates a ring medium with the given capacity.
    ///
    /// # Errors
    ///
    /// Returns an error for a capacity of zero.
    pub fn new(capacity: usize) -> CoreResult<Self> {
        Ok(Self {
            ring: RingLog::new(capacity)?,
        })
    }

    /// Creates a ring medium from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error for a capacity of zero.
    pub fn with_config(config: &StoreConfig) -> CoreResult<Self> {
        Self::new(config.capacity)
    }

    /// Borrows the underlying ring.
    #[must_use]
    pub fn ring(&self) -> &RingLog {
        &self.ring
    }
}

impl LogStore for RingStore {
    fn append(&mut self, record: &[u8]) -> CoreResult<()> {
        if let Some(evicted) = self.ring.add_entry(Entry::copy_from_slice(record)) {
            debug!(evicted_bytes = evicted.size(), "ring full, evicted oldest entry");
        }
        Ok(())
    }

    fn read_from(&self, offset: u64, out: &mut dyn Write) -> CoreResult<u64> {
        let Ok(offset) = usize::try_from(offset) else {
            return Ok(0);
        };
        Ok(self.ring.read_from(offset, out)? as u64)
    }

    fn total_length(&self) -> CoreResult<u64> {
        Ok(self.ring.total_size() as u64)
    }

    fn entry_count(&self) -> CoreResult<usize> {
        Ok(self.ring.len())
    }

    fn seek_to_entry(&self, write_cmd_index: u32, intra_offset: u32) -> CoreResult<u64> {
        Ok(self.ring.resolve_seek(write_cmd_index, intra_offset)?)
    }
}

/// Unbounded medium over a byte-store backend.
///
/// Nothing is ever evicted. Entries are recovered by splitting the stored
/// bytes on the record terminator; trailing bytes without a terminator
/// (for example from a pre-existing data file) count as one final entry.
#[derive(Debug)]
pub struct FlatStore<B> {
    backend: B,
}

impl<B: StorageBackend> FlatStore<B> {
    /// Wraps a backend. Existing content becomes the start of the log.
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Borrows the backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Consumes the store, returning the backend.
    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Sizes of all entries, oldest first.
    fn entry_sizes(&self) -> CoreResult<Vec<usize>> {
        let total = self.backend.size()?;
        let mut sizes = Vec::new();
        let mut current = 0usize;
        let mut offset = 0u64;

        while offset < total {
            let len = (total - offset).min(COPY_CHUNK_SIZE as u64) as usize;
            let chunk = self.backend.read_at(offset, len)?;
            for byte in &chunk {
                current += 1;
                if *byte == TERMINATOR {
                    sizes.push(current);
                    current = 0;
                }
            }
            offset += len as u64;
        }

        if current > 0 {
            sizes.push(current);
        }
        Ok(sizes)
    }
}

impl<B: StorageBackend> LogStore for FlatStore<B> {
    fn append(&mut self, record: &[u8]) -> CoreResult<()> {
        self.backend.append(record)?;
        self.backend.flush()?;
        Ok(())
    }

    fn read_from(&self, offset: u64, out: &mut dyn Write) -> CoreResult<u64> {
        Ok(self.backend.copy_range(offset, out)?)
    }

    fn total_length(&self) -> CoreResult<u64> {
        Ok(self.backend.size()?)
    }

    fn entry_count(&self) -> CoreResult<usize> {
        Ok(self.entry_sizes()?.len())
    }

    fn seek_to_entry(&self, write_cmd_index: u32, intra_offset: u32) -> CoreResult<u64> {
        let sizes = self.entry_sizes()?;
        Ok(CursorResolver::new(sizes.iter().copied()).resolve_seek(write_cmd_index, intra_offset)?)
    }

    fn flush(&mut self) -> CoreResult<()> {
        self.backend.flush()?;
        self.backend.sync()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::SeekError;
    use crate::error::CoreError;
    use ringlog_storage::{FileBackend, InMemoryBackend};
    use tempfile::tempdir;

    fn view(store: &dyn LogStore, offset: u64) -> Vec<u8> {
        let mut out = Vec::new();
        store.read_from(offset, &mut out).unwrap();
        out
    }

    fn fill(store: &mut dyn LogStore, records: &[&[u8]]) {
        for record in records {
            store.append(record).unwrap();
        }
    }

    #[test]
    fn ring_store_evicts_and_seeks() {
        let mut store = RingStore::new(3).unwrap();
        fill(&mut store, &[b"a\n", b"b\n", b"c\n", b"d\n"]);

        assert_eq!(store.total_length().unwrap(), 6);
        assert_eq!(store.entry_count().unwrap(), 3);
        assert_eq!(view(&store, 0), b"b\nc\nd\n");

        let cursor = store.seek_to_entry(1, 0).unwrap();
        assert_eq!(cursor, 2);
        assert_eq!(view(&store, cursor), b"c\nd\n");
    }

    #[test]
    fn ring_store_rejects_out_of_range_seek() {
        let mut store = RingStore::with_config(&StoreConfig::new().capacity(3)).unwrap();
        fill(&mut store, &[b"a\n", b"b\n", b"c\n", b"d\n"]);

        let err = store.seek_to_entry(3, 0).unwrap_err();
        assert!(matches!(err, CoreError::Seek(SeekError::OutOfRange { .. })));
    }

    #[test]
    fn ring_store_read_past_end_is_empty() {
        let mut store = RingStore::default();
        fill(&mut store, &[b"only\n"]);
        assert!(view(&store, 5).is_empty());
        assert!(view(&store, u64::MAX).is_empty());
        assert_eq!(store.ring().capacity(), 10);
    }

    #[test]
    fn whence_seek_over_view() {
        let mut store = RingStore::new(4).unwrap();
        fill(&mut store, &[b"abc\n", b"de\n"]);

        assert_eq!(store.seek(0, SeekFrom::End(0)).unwrap(), 7);
        assert_eq!(store.seek(4, SeekFrom::Current(-2)).unwrap(), 2);
        assert!(store.seek(0, SeekFrom::Start(8)).is_err());
    }

    #[test]
    fn flat_store_keeps_everything() {
        let mut store = FlatStore::new(InMemoryBackend::new());
        fill(&mut store, &[b"a\n", b"b\n", b"c\n", b"d\n"]);

        assert_eq!(store.total_length().unwrap(), 8);
        assert_eq!(store.entry_count().unwrap(), 4);
        assert_eq!(view(&store, 0), b"a\nb\nc\nd\n");
        assert_eq!(view(&store, 5), b"\nd\n");
        assert!(view(&store, 8).is_empty());
    }

    #[test]
    fn flat_store_seeks_by_line() {
        let mut store = FlatStore::new(InMemoryBackend::new());
        fill(&mut store, &[b"first\n", b"second\n", b"third\n"]);

        assert_eq!(store.seek_to_entry(1, 0).unwrap(), 6);
        assert_eq!(store.seek_to_entry(2, 3).unwrap(), 16);
        assert!(store.seek_to_entry(3, 0).is_err());
    }

    #[test]
    fn flat_store_counts_unterminated_tail() {
        let store = FlatStore::new(InMemoryBackend::with_contents(&b"one\ntw"[..]));
        assert_eq!(store.entry_count().unwrap(), 2);
        assert_eq!(store.seek_to_entry(1, 2).unwrap(), 6);
    }

    #[test]
    fn flat_store_over_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ringlogdata");

        let mut store = FlatStore::new(FileBackend::open(&path).unwrap());
        fill(&mut store, &[b"persisted\n", b"again\n"]);
        store.flush().unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"persisted\nagain\n");
        assert_eq!(view(&store, 10), b"again\n");
        assert_eq!(store.backend().path(), path);
    }

    #[test]
    fn flat_store_streams_past_chunk_size() {
        let big = vec![b'x'; COPY_CHUNK_SIZE + 10];
        let mut record = big.clone();
        record.push(b'\n');

        let mut store = FlatStore::new(InMemoryBackend::new());
        store.append(&record).unwrap();

        let out = view(&store, 0);
        assert_eq!(out.len(), record.len());
        assert_eq!(store.entry_count().unwrap(), 1);
        assert_eq!(store.into_backend().contents(), record);
    }
}
