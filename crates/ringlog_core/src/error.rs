//! Error types for RingLog core.

use crate::cursor::SeekError;
use std::io;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in RingLog core operations.
///
/// There is no capacity variant: appending to a full
/// [`crate::RingLog`] evicts, it never fails.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Storage backend error.
    #[error("storage error: {0}")]
    Storage(#[from] ringlog_storage::StorageError),

    /// I/O error while streaming log content.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A ring log needs at least one slot.
    #[error("invalid ring capacity: {capacity}")]
    InvalidCapacity {
        /// The rejected capacity.
        capacity: usize,
    },

    /// Cursor repositioning failed.
    #[error("seek failed: {0}")]
    Seek(#[from] SeekError),
}

impl CoreError {
    /// Returns true if this error only rejects a seek request and left the
    /// store untouched.
    pub fn is_seek_rejection(&self) -> bool {
        matches!(self, CoreError::Seek(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seek_errors_are_rejections() {
        let err = CoreError::from(SeekError::InvalidPosition {
            position: -1,
            total_size: 4,
        });
        assert!(err.is_seek_rejection());

        let err = CoreError::from(io::Error::from(io::ErrorKind::UnexpectedEof));
        assert!(!err.is_seek_rejection());

        let err = CoreError::InvalidCapacity { capacity: 0 };
        assert!(!err.is_seek_rejection());
    }

    #[test]
    fn error_display() {
        let err = CoreError::from(SeekError::OutOfRange {
            write_cmd_index: 7,
            intra_offset: 3,
            live_entries: 2,
            total_size: 10,
        });
        let msg = err.to_string();
        assert!(msg.contains('7'));
        assert!(msg.contains("2 live"));
    }
}
