//! Log entries.

use bytes::Bytes;

/// One stored record: an immutable byte payload.
///
/// Entries are owned by the ring slot that holds them and dropped when the
/// slot is overwritten. Cloning is cheap (the payload is reference counted),
/// which lets a caller keep an evicted entry around for logging.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Entry {
    payload: Bytes,
}

impl Entry {
    /// Creates an entry from anything convertible into [`Bytes`].
    pub fn new(payload: impl Into<Bytes>) -> Self {
        Self {
            payload: payload.into(),
        }
    }

    /// Creates an entry by copying a borrowed slice.
    pub fn copy_from_slice(payload: &[u8]) -> Self {
        Self {
            payload: Bytes::copy_from_slice(payload),
        }
    }

    /// Payload length in bytes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.payload.len()
    }

    /// Returns true for a zero-length payload.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    /// Borrows the payload.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.payload
    }

    /// Consumes the entry, returning the payload.
    #[must_use]
    pub fn into_bytes(self) -> Bytes {
        self.payload
    }
}

impl AsRef<[u8]> for Entry {
    fn as_ref(&self) -> &[u8] {
        &self.payload
    }
}

impl From<Bytes> for Entry {
    fn from(payload: Bytes) -> Self {
        Self { payload }
    }
}

impl From<Vec<u8>> for Entry {
    fn from(payload: Vec<u8>) -> Self {
        Self::new(payload)
    }
}

impl From<&'static str> for Entry {
    fn from(payload: &'static str) -> Self {
        Self::new(payload)
    }
}

impl From<&'static [u8]> for Entry {
    fn from(payload: &'static [u8]) -> Self {
        Self::new(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_matches_payload() {
        let entry = Entry::from("write1\n");
        assert_eq!(entry.size(), 7);
        assert_eq!(entry.as_bytes(), b"write1\n");
        assert!(!entry.is_empty());
    }

    #[test]
    fn copy_from_slice_detaches_from_source() {
        let mut source = b"abc\n".to_vec();
        let entry = Entry::copy_from_slice(&source);
        source[0] = b'z';
        assert_eq!(entry.as_bytes(), b"abc\n");
    }

    #[test]
    fn empty_entry() {
        let entry = Entry::default();
        assert_eq!(entry.size(), 0);
        assert!(entry.is_empty());
        assert!(entry.into_bytes().is_empty());
    }
}
