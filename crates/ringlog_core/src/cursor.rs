//! Cursor resolution over the logical view.
//!
//! A cursor is a byte offset into the concatenation of all live entries,
//! oldest first. Clients address it as `(write_cmd_index, intra_offset)`:
//! the ordinal of an entry counted from the oldest live one, plus a byte
//! offset inside that entry. [`CursorResolver`] turns the pair into the
//! absolute offset.

use std::io::SeekFrom;
use thiserror::Error;

/// Errors raised while repositioning a cursor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SeekError {
    /// The entry index or the resulting offset lies outside the live view.
    #[error(
        "seek to entry {write_cmd_index} offset {intra_offset} out of range \
         ({live_entries} live entries, {total_size} bytes)"
    )]
    OutOfRange {
        /// Requested entry ordinal.
        write_cmd_index: u32,
        /// Requested offset inside the entry.
        intra_offset: u32,
        /// Number of live entries at resolution time.
        live_entries: usize,
        /// Logical view length at resolution time.
        total_size: u64,
    },

    /// A whence-style seek landed before 0 or past the end of the view.
    #[error("seek position {position} outside 0..={total_size}")]
    InvalidPosition {
        /// The computed position.
        position: i128,
        /// Logical view length.
        total_size: u64,
    },
}

/// Resolves entry-indexed seeks against a sequence of entry sizes.
///
/// The sizes must be supplied oldest first. Resolution never mutates
/// anything; the same input always yields the same offset.
///
/// # Example
///
/// ```rust
/// use ringlog_core::CursorResolver;
///
/// // "b\n", "c\n", "d\n"
/// let resolver = CursorResolver::new([2usize, 2, 2]);
/// assert_eq!(resolver.resolve_seek(1, 0).unwrap(), 2);
/// assert_eq!(resolver.resolve_seek(2, 2).unwrap(), 6);
/// assert!(resolver.resolve_seek(3, 0).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct CursorResolver<I> {
    sizes: I,
}

impl<I> CursorResolver<I>
where
    I: IntoIterator<Item = usize> + Clone,
{
    /// Creates a resolver over entry sizes, oldest first.
    pub fn new(sizes: I) -> Self {
        Self { sizes }
    }

    /// Maps `(write_cmd_index, intra_offset)` to an absolute byte offset.
    ///
    /// The offset may equal the view length (a cursor parked at the end),
    /// but the entry index must name a live entry.
    ///
    /// # Errors
    ///
    /// Returns [`SeekError::OutOfRange`] if `write_cmd_index` is not a live
    /// ordinal or `base + intra_offset` exceeds the view length.
    pub fn resolve_seek(&self, write_cmd_index: u32, intra_offset: u32) -> Result<u64, SeekError> {
        let target = write_cmd_index as usize;
        let mut live_entries = 0usize;
        let mut base = 0u64;
        let mut total_size = 0u64;

        for (ordinal, size) in self.sizes.clone().into_iter().enumerate() {
            if ordinal < target {
                base += size as u64;
            }
            total_size += size as u64;
            live_entries += 1;
        }

        let out_of_range = SeekError::OutOfRange {
            write_cmd_index,
            intra_offset,
            live_entries,
            total_size,
        };

        if target >= live_entries {
            return Err(out_of_range);
        }

        let absolute = base + u64::from(intra_offset);
        if absolute > total_size {
            return Err(out_of_range);
        }

        Ok(absolute)
    }
}

/// Repositions a cursor within a view of fixed length `total_size`.
///
/// Behaves like `lseek` on a fixed-size file: the target must land in
/// `0..=total_size` or the seek is rejected.
///
/// # Errors
///
/// Returns [`SeekError::InvalidPosition`] when the target falls outside
/// the view.
pub fn fixed_size_seek(current: u64, pos: SeekFrom, total_size: u64) -> Result<u64, SeekError> {
    let position = match pos {
        SeekFrom::Start(offset) => i128::from(offset),
        SeekFrom::Current(delta) => i128::from(current) + i128::from(delta),
        SeekFrom::End(delta) => i128::from(total_size) + i128::from(delta),
    };

    if position < 0 || position > i128::from(total_size) {
        return Err(SeekError::InvalidPosition {
            position,
            total_size,
        });
    }

    Ok(position as u64)
}
