//! Periodic timestamp records.

use crate::error::ServerResult;
use crate::shared::SharedStore;
use crate::shutdown::Shutdown;
use chrono::{DateTime, Local, TimeZone};
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// Prefix of every timestamp record.
pub const TIMESTAMP_PREFIX: &str = "timestamp:";

/// Formats a timestamp record (`strftime` style `%a, %d %b %Y %T %z`).
pub fn timestamp_record<Tz>(at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    format!("{TIMESTAMP_PREFIX}{}\n", at.format("%a, %d %b %Y %T %z"))
}

/// Background producer that appends a timestamp record at a fixed interval.
///
/// It competes for the store lock like any connection and its records are
/// ordinary data records.
#[derive(Debug)]
pub struct TimestampWriter {
    store: SharedStore,
    shutdown: Shutdown,
    interval: Duration,
}

impl TimestampWriter {
    /// Creates a writer.
    pub fn new(store: SharedStore, shutdown: Shutdown, interval: Duration) -> Self {
        Self {
            store,
            shutdown,
            interval,
        }
    }

    /// Writes one record per interval until shutdown is requested.
    ///
    /// Returns the number of records written.
    ///
    /// # Errors
    ///
    /// Returns an error if the store rejects a record.
    pub fn run(&self) -> ServerResult<u64> {
        let mut written = 0;
        while !self.shutdown.wait_timeout(self.interval) {
            let record = timestamp_record(&Local::now());
            self.store.lock().append(record.as_bytes())?;
            written += 1;
            debug!(record = record.trim_end(), "appended timestamp");
        }
        Ok(written)
    }
}
