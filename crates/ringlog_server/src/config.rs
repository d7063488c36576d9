//! Server configuration.

use ringlog_protocol::DEFAULT_MAX_RECORD_LEN;
use std::net::SocketAddr;
use std::time::Duration;

/// Default listening port.
pub const DEFAULT_PORT: u16 = 9000;

/// Configuration for the log server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to.
    pub bind_addr: SocketAddr,
    /// Size of the per-connection receive buffer.
    pub read_buffer_size: usize,
    /// Longest accepted record, terminator included.
    pub max_record_len: usize,
    /// How long the accept loop sleeps when no connection is pending.
    pub accept_poll_interval: Duration,
    /// Interval of the background timestamp writer, if enabled.
    pub timestamp_interval: Option<Duration>,
}

impl ServerConfig {
    /// Creates a new server configuration.
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            read_buffer_size: 1024,
            max_record_len: DEFAULT_MAX_RECORD_LEN,
            accept_poll_interval: Duration::from_millis(50),
            timestamp_interval: None,
        }
    }

    /// Sets the per-connection receive buffer size.
    pub fn with_read_buffer_size(mut self, size: usize) -> Self {
        self.read_buffer_size = size.max(1);
        self
    }

    /// Sets the maximum record length.
    pub fn with_max_record_len(mut self, len: usize) -> Self {
        self.max_record_len = len;
        self
    }

    /// Sets the accept poll interval.
    pub fn with_accept_poll_interval(mut self, interval: Duration) -> Self {
        self.accept_poll_interval = interval;
        self
    }

    /// Enables the periodic timestamp writer.
    pub fn with_timestamps(mut self, interval: Duration) -> Self {
        self.timestamp_interval = Some(interval);
        self
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new(SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)))
    }
}
