//! Error types for record framing.

use thiserror::Error;

/// Result type for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Errors raised while framing a client byte stream.
///
/// Both variants are local to one connection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// A record grew past the configured limit before its terminator.
    #[error("record of {len} bytes exceeds limit of {limit} bytes")]
    RecordTooLarge {
        /// Bytes accumulated so far.
        len: usize,
        /// Configured maximum.
        limit: usize,
    },

    /// The accumulator could not grow.
    #[error("unable to reserve {requested} bytes for the record accumulator")]
    ResourceExhausted {
        /// Bytes that could not be reserved.
        requested: usize,
    },
}
