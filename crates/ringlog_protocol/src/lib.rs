//! # RingLog Protocol
//!
//! The RingLog wire protocol is line oriented: clients send
//! `\n`-terminated records over a byte stream, and a record may be split
//! across any number of reads.
//!
//! - A **data record** is any byte sequence ending in `\n`; it is stored
//!   verbatim, terminator included.
//! - A **control record** is exactly `SEEKCMD:<index>,<offset>\n` with two
//!   decimal `u32` fields; it repositions the connection's read cursor.
//!
//! This crate provides:
//! - [`LineFramer`] to cut a byte stream into records
//! - [`Record`] and [`SeekCommand`] to classify and build records
//!
//! This is a pure protocol crate with no I/O operations.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod error;
mod framer;
mod record;

pub use error::{ProtocolError, ProtocolResult};
pub use framer::{LineFramer, DEFAULT_MAX_RECORD_LEN};
pub use record::{Record, SeekCommand, RECORD_TERMINATOR, SEEK_PREFIX};
