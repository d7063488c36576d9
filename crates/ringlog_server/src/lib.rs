//! # RingLog Server
//!
//! Thread-per-connection TCP front end for a RingLog store.
//!
//! Clients send newline-terminated records. Each data record is appended to
//! the shared store and answered with the store's full logical view. A
//! `SEEKCMD:<index>,<offset>\n` record is not stored; it moves the
//! connection's private cursor so later echoes start at that entry.
//!
//! # Concurrency
//!
//! One lock guards the store. A connection holds it from the moment a record
//! mutates the store until its echo has been written, so concurrent clients
//! never see each other's records half-applied. Worker failures, panics
//! included, stay confined to their connection.
//!
//! ```rust,no_run
//! use ringlog_core::RingStore;
//! use ringlog_server::{LogServer, ServerConfig, SharedStore};
//!
//! let store = SharedStore::new(RingStore::new(10).unwrap());
//! let config = ServerConfig::new("127.0.0.1:9000".parse().unwrap());
//! let server = LogServer::bind(config, store).unwrap();
//! server.run().unwrap();
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod config;
mod error;
mod handler;
mod server;
mod shared;
mod shutdown;
mod timestamp;

pub use config::{ServerConfig, DEFAULT_PORT};
pub use error::{ServerError, ServerResult};
pub use handler::{ConnectionHandler, ConnectionState, ConnectionStats};
pub use server::{LogServer, ServerStats};
pub use shared::SharedStore;
pub use shutdown::Shutdown;
pub use timestamp::{timestamp_record, TimestampWriter, TIMESTAMP_PREFIX};
