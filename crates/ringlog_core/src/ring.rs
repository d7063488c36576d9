//! Fixed-capacity circular log of entries.

use crate::cursor::{CursorResolver, SeekError};
use crate::entry::Entry;
use crate::error::{CoreError, CoreResult};
use std::io::{self, Write};
use std::iter::FusedIterator;

/// Default number of entries retained by a ring.
pub const DEFAULT_CAPACITY: usize = 10;

/// A fixed-capacity ring of entries with overwrite-oldest retention.
///
/// # Invariants
///
/// - When not full, live entries occupy slots `read_index..write_index`
///   (modulo capacity), oldest first.
/// - When full, every slot is live and `write_index == read_index`.
/// - The live count is always within `0..=capacity`.
///
/// The ring does no locking of its own.
#[derive(Debug, Clone)]
pub struct RingLog {
    slots: Box<[Option<Entry>]>,
    write_index: usize,
    read_index: usize,
    full: bool,
}

impl Default for RingLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl RingLog {
    /// Creates an empty ring.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidCapacity`] for a capacity of zero.
    pub fn new(capacity: usize) -> CoreResult<Self> {
        if capacity == 0 {
            return Err(CoreError::InvalidCapacity { capacity });
        }
        Ok(Self::with_capacity(capacity))
    }

    fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: (0..capacity).map(|_| None).collect(),
            write_index: 0,
            read_index: 0,
            full: false,
        }
    }

    /// Maximum number of live entries.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of live entries.
    #[must_use]
    pub fn len(&self) -> usize {
        if self.full {
            self.capacity()
        } else {
            (self.write_index + self.capacity() - self.read_index) % self.capacity()
        }
    }

    /// Returns true when no entries are live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.full && self.write_index == self.read_index
    }

    /// Returns true when the next insertion will evict.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.full
    }

    /// Slot that the next entry will be written to.
    #[must_use]
    pub fn write_index(&self) -> usize {
        self.write_index
    }

    /// Slot holding the oldest live entry.
    #[must_use]
    pub fn read_index(&self) -> usize {
        self.read_index
    }

    /// Appends an entry, evicting the oldest one if the ring is full.
    ///
    /// Returns the evicted entry, if any.
    pub fn add_entry(&mut self, entry: impl Into<Entry>) -> Option<Entry> {
        let evicted = if self.full {
            let oldest = self.slots[self.read_index].take();
            self.read_index = self.advance(self.read_index);
            oldest
        } else {
            None
        };

        self.slots[self.write_index] = Some(entry.into());
        self.write_index = self.advance(self.write_index);

        if self.write_index == self.read_index {
            self.full = true;
        }

        evicted
    }

    /// Drops every entry and resets the indices.
    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
        self.write_index = 0;
        self.read_index = 0;
        self.full = false;
    }

    /// Returns the entry held in a physical slot, if that slot is live.
    #[must_use]
    pub fn entry_at_slot(&self, slot: usize) -> Option<&Entry> {
        if slot >= self.capacity() || self.ordinal_of_slot(slot) >= self.len() {
            return None;
        }
        self.slots[slot].as_ref()
    }

    /// Returns the entry at `ordinal`, counted from the oldest live entry.
    #[must_use]
    pub fn entry(&self, ordinal: usize) -> Option<&Entry> {
        if ordinal >= self.len() {
            return None;
        }
        self.slots[self.slot_of_ordinal(ordinal)].as_ref()
    }

    /// Iterates live entries, oldest first.
    ///
    /// The iterator borrows the ring and can be cloned to restart the walk.
    pub fn entries_oldest_to_newest(&self) -> Entries<'_> {
        Entries {
            ring: self,
            ordinal: 0,
            remaining: self.len(),
        }
    }

    /// Sum of the sizes of all live entries.
    #[must_use]
    pub fn total_size(&self) -> usize {
        self.entries_oldest_to_newest().map(Entry::size).sum()
    }

    /// Locates a byte of the logical view.
    ///
    /// Walks the live slots from the oldest, subtracting each entry's size
    /// from `offset` until it falls inside an entry. Returns the physical
    /// slot and the offset inside that entry, or `None` when `offset` is at
    /// or beyond [`total_size`](Self::total_size). Each live slot is visited
    /// at most once.
    #[must_use]
    pub fn find_offset_for_position(&self, offset: usize) -> Option<(usize, usize)> {
        let mut remaining = offset;
        for ordinal in 0..self.len() {
            let slot = self.slot_of_ordinal(ordinal);
            let size = self.slots[slot].as_ref().map_or(0, Entry::size);
            if remaining < size {
                return Some((slot, remaining));
            }
            remaining -= size;
        }
        None
    }

    /// Maps `(write_cmd_index, intra_offset)` to an absolute offset in the
    /// logical view.
    ///
    /// # Errors
    ///
    /// Returns [`SeekError::OutOfRange`] if the entry is not live or the
    /// offset runs past the end of the view.
    pub fn resolve_seek(&self, write_cmd_index: u32, intra_offset: u32) -> Result<u64, SeekError> {
        CursorResolver::new(self.entries_oldest_to_newest().map(Entry::size))
            .resolve_seek(write_cmd_index, intra_offset)
    }

    /// Streams the logical view from `offset` to the end into `out`.
    ///
    /// Returns the number of bytes written; zero when `offset` is at or
    /// past the end.
    ///
    /// # Errors
    ///
    /// Propagates write errors from `out`.
    pub fn read_from<W: Write + ?Sized>(&self, offset: usize, out: &mut W) -> io::Result<usize> {
        let Some((slot, local)) = self.find_offset_for_position(offset) else {
            return Ok(0);
        };

        let first = self.ordinal_of_slot(slot);
        let mut written = 0;
        for (i, entry) in self.entries_oldest_to_newest().skip(first).enumerate() {
            let bytes = if i == 0 {
                &entry.as_bytes()[local..]
            } else {
                entry.as_bytes()
            };
            out.write_all(bytes)?;
            written += bytes.len();
        }
        Ok(written)
    }

    fn advance(&self, index: usize) -> usize {
        (index + 1) % self.capacity()
    }

    fn slot_of_ordinal(&self, ordinal: usize) -> usize {
        (self.read_index + ordinal) % self.capacity()
    }

    fn ordinal_of_slot(&self, slot: usize) -> usize {
        (slot + self.capacity() - self.read_index) % self.capacity()
    }
}

/// Iterator over live entries, oldest first.
#[derive(Debug, Clone)]
pub struct Entries<'a> {
    ring: &'a RingLog,
    ordinal: usize,
    remaining: usize,
}

impl<'a> Iterator for Entries<'a> {
    type Item = &'a Entry;

    fn next(&mut self) -> Option<Self::Item> {
        while self.remaining > 0 {
            let slot = self.ring.slot_of_ordinal(self.ordinal);
            self.ordinal += 1;
            self.remaining -= 1;
            if let Some(entry) = self.ring.slots[slot].as_ref() {
                return Some(entry);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Entries<'_> {}

impl FusedIterator for Entries<'_> {}
