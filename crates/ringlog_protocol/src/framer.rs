//! Newline framing over a byte stream.

use crate::error::{ProtocolError, ProtocolResult};
use crate::record::RECORD_TERMINATOR;

/// Default upper bound on a single record, terminator included.
pub const DEFAULT_MAX_RECORD_LEN: usize = 1024 * 1024;

/// Per-connection record accumulator.
///
/// Bytes are pushed as they arrive; complete records are then drained with
/// [`next_record`](Self::next_record). The accumulator only holds the
/// unterminated tail between reads.
///
/// # Example
///
/// ```rust
/// use ringlog_protocol::LineFramer;
///
/// let mut framer = LineFramer::default();
/// framer.push(b"hel").unwrap();
/// assert!(framer.next_record().unwrap().is_none());
///
/// framer.push(b"lo\nwor").unwrap();
/// assert_eq!(framer.next_record().unwrap().unwrap(), b"hello\n");
/// assert!(framer.next_record().unwrap().is_none());
/// assert_eq!(framer.pending_len(), 3);
/// ```
#[derive(Debug)]
pub struct LineFramer {
    buf: Vec<u8>,
    /// Start of the first unconsumed byte.
    start: usize,
    /// Bytes before this index (from `start`) hold no terminator.
    scanned: usize,
    max_record_len: usize,
}

impl Default for LineFramer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RECORD_LEN)
    }
}

impl LineFramer {
    /// Creates an accumulator that rejects records longer than
    /// `max_record_len` bytes.
    pub fn new(max_record_len: usize) -> Self {
        Self {
            buf: Vec::new(),
            start: 0,
            scanned: 0,
            max_record_len,
        }
    }

    /// Appends freshly received bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::ResourceExhausted`] if the buffer cannot
    /// grow, or [`ProtocolError::RecordTooLarge`] if the unterminated tail
    /// already exceeds the limit.
    pub fn push(&mut self, data: &[u8]) -> ProtocolResult<()> {
        self.compact();

        self.buf
            .try_reserve(data.len())
            .map_err(|_| ProtocolError::ResourceExhausted {
                requested: data.len(),
            })?;
        self.buf.extend_from_slice(data);

        // After compaction the pending tail starts at 0.
        if self.buf[self.scanned..].contains(&RECORD_TERMINATOR) {
            return Ok(());
        }
        self.scanned = self.buf.len();
        if self.buf.len() > self.max_record_len {
            return Err(ProtocolError::RecordTooLarge {
                len: self.buf.len(),
                limit: self.max_record_len,
            });
        }
        Ok(())
    }

    /// Removes and returns the next complete record, terminator included.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::RecordTooLarge`] for a complete record that
    /// exceeds the limit, or [`ProtocolError::ResourceExhausted`] if the
    /// record cannot be allocated.
    pub fn next_record(&mut self) -> ProtocolResult<Option<Vec<u8>>> {
        let unscanned = &self.buf[self.start + self.scanned..];
        let Some(pos) = unscanned.iter().position(|b| *b == RECORD_TERMINATOR) else {
            self.scanned = self.buf.len() - self.start;
            return Ok(None);
        };

        let end = self.start + self.scanned + pos + 1;
        let len = end - self.start;
        if len > self.max_record_len {
            return Err(ProtocolError::RecordTooLarge {
                len,
                limit: self.max_record_len,
            });
        }

        let mut record = Vec::new();
        record
            .try_reserve_exact(len)
            .map_err(|_| ProtocolError::ResourceExhausted { requested: len })?;
        record.extend_from_slice(&self.buf[self.start..end]);
        self.start = end;
        self.scanned = 0;
        Ok(Some(record))
    }

    /// Number of buffered bytes that do not yet form a complete record.
    pub fn pending_len(&self) -> usize {
        self.buf.len() - self.start
    }

    /// Drops any partial record.
    pub fn clear(&mut self) {
        self.buf.clear();
        self.start = 0;
        self.scanned = 0;
    }

    fn compact(&mut self) {
        if self.start > 0 {
            self.buf.drain(..self.start);
            self.start = 0;
        }
    }
}
