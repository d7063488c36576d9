//! # RingLog Storage
//!
//! Byte-store backends for the RingLog flat medium.
//!
//! A flat medium keeps every record ever appended, in order, with no
//! eviction. Backends here are **opaque byte stores**: they know nothing
//! about records, entries or seek commands. `ringlog_core::FlatStore` layers
//! the log semantics on top.
//!
//! ## Available Backends
//!
//! - [`InMemoryBackend`] - For testing and ephemeral logs
//! - [`FileBackend`] - A plain data file, exclusively locked while open
//!
//! ## Example
//!
//! ```rust
//! use ringlog_storage::{StorageBackend, InMemoryBackend};
//!
//! let mut backend = InMemoryBackend::new();
//! backend.append(b"one\n").unwrap();
//! backend.append(b"two\n").unwrap();
//!
//! let mut tail = Vec::new();
//! backend.copy_range(4, &mut tail).unwrap();
//! assert_eq!(tail, b"two\n");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod memory;

pub use backend::{StorageBackend, COPY_CHUNK_SIZE};
pub use error::{StorageError, StorageResult};
pub use file::FileBackend;
pub use memory::InMemoryBackend;
