//! # RingLog Core
//!
//! The data plane of RingLog: a fixed-capacity ring of variable-length
//! entries with byte-addressable random access across their logical
//! concatenation.
//!
//! - [`RingLog`] - the circular store; evicts the oldest entry when full
//! - [`CursorResolver`] - maps `(entry index, intra-entry offset)` to a
//!   byte offset in the concatenated view
//! - [`LogStore`] - the medium interface the server talks to, with a
//!   capacity-bounded [`RingStore`] and an unbounded [`FlatStore`] over a
//!   `ringlog_storage` backend
//!
//! None of these types lock; callers serialize access.
//!
//! ```rust
//! use ringlog_core::RingLog;
//!
//! let mut log = RingLog::new(3).unwrap();
//! for line in ["a\n", "b\n", "c\n", "d\n"] {
//!     log.add_entry(line);
//! }
//! assert_eq!(log.total_size(), 6);
//! assert_eq!(log.resolve_seek(1, 0).unwrap(), 2);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod config;
mod cursor;
mod entry;
mod error;
mod ring;
mod store;

pub use config::StoreConfig;
pub use cursor::{fixed_size_seek, CursorResolver, SeekError};
pub use entry::Entry;
pub use error::{CoreError, CoreResult};
pub use ring::{Entries, RingLog, DEFAULT_CAPACITY};
pub use store::{FlatStore, LogStore, RingStore};
