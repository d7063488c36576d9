//! Per-connection protocol handling.

use crate::config::ServerConfig;
use crate::error::ServerResult;
use crate::shared::SharedStore;
use ringlog_protocol::{LineFramer, Record, SeekCommand};
use std::io::{self, Read, Write};
use tracing::{debug, trace};

/// Where a connection is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Waiting for the rest of a record.
    Receiving,
    /// Streaming the logical view back, lock held.
    Echoing,
    /// End of stream or an unrecoverable error.
    Closed,
}

/// Counters for one finished connection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnectionStats {
    /// Data records stored.
    pub records: u64,
    /// Seek commands that moved the cursor.
    pub seeks: u64,
    /// Seek commands dropped as out of range or unsupported.
    pub ignored_seeks: u64,
    /// Bytes streamed back to the client.
    pub bytes_echoed: u64,
}

/// Drives one client connection.
///
/// Each complete record is applied to the shared store and answered with
/// the logical view, from the connection's cursor if a seek has succeeded
/// or from the start otherwise. The cursor is private to the connection.
pub struct ConnectionHandler<S> {
    stream: S,
    store: SharedStore,
    framer: LineFramer,
    read_buffer: Vec<u8>,
    cursor: Option<u64>,
    state: ConnectionState,
    stats: ConnectionStats,
}

impl<S: Read + Write> ConnectionHandler<S> {
    /// Creates a handler for a freshly accepted stream.
    pub fn new(stream: S, store: SharedStore, config: &ServerConfig) -> Self {
        Self {
            stream,
            store,
            framer: LineFramer::new(config.max_record_len),
            read_buffer: vec![0u8; config.read_buffer_size.max(1)],
            cursor: None,
            state: ConnectionState::Receiving,
            stats: ConnectionStats::default(),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Offset echoes start from, if a seek has succeeded.
    pub fn cursor(&self) -> Option<u64> {
        self.cursor
    }

    /// Counters so far.
    pub fn stats(&self) -> ConnectionStats {
        self.stats
    }

    /// Serves the connection until the client closes its side.
    ///
    /// A trailing partial record is discarded. The handler is `Closed`
    /// afterwards whatever the outcome.
    ///
    /// # Errors
    ///
    /// Returns transport, framing and store errors; all of them are local
    /// to this connection.
    pub fn run(&mut self) -> ServerResult<ConnectionStats> {
        let result = self.serve();
        self.state = ConnectionState::Closed;

        let pending = self.framer.pending_len();
        if pending > 0 {
            debug!(pending, "discarding unterminated record at close");
            self.framer.clear();
        }

        result.map(|()| self.stats)
    }

    fn serve(&mut self) -> ServerResult<()> {
        loop {
            let n = match self.stream.read(&mut self.read_buffer) {
                Ok(0) => return Ok(()),
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            trace!(bytes = n, "received");

            self.framer.push(&self.read_buffer[..n])?;
            while let Some(record) = self.framer.next_record()? {
                self.process_record(&record)?;
            }
        }
    }

    /// Applies one complete record and echoes the view, all under the lock.
    fn process_record(&mut self, record: &[u8]) -> ServerResult<()> {
        let mut store = self.store.lock();

        match Record::parse(record) {
            Record::Data(data) => {
                store.append(data)?;
                self.stats.records += 1;
                debug!(len = data.len(), "stored record");
            }
            Record::Seek(SeekCommand {
                write_cmd_index,
                intra_offset,
            }) => match store.seek_to_entry(write_cmd_index, intra_offset) {
                Ok(offset) => {
                    self.cursor = Some(offset);
                    self.stats.seeks += 1;
                    debug!(write_cmd_index, intra_offset, offset, "cursor moved");
                }
                Err(err) if err.is_seek_rejection() => {
                    self.stats.ignored_seeks += 1;
                    debug!(write_cmd_index, intra_offset, %err, "ignoring seek command");
                }
                Err(err) => return Err(err.into()),
            },
        }

        self.state = ConnectionState::Echoing;
        let start = self.cursor.unwrap_or(0);
        let echoed = store.read_from(start, &mut self.stream)?;
        self.stream.flush()?;
        drop(store);

        self.stats.bytes_echoed += echoed;
        self.state = ConnectionState::Receiving;
        Ok(())
    }
}
