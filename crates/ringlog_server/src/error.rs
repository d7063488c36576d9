//! Error types for the log server.

use ringlog_core::CoreError;
use ringlog_protocol::ProtocolError;
use std::io;
use std::net::SocketAddr;
use thiserror::Error;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that can occur in the log server.
#[derive(Error, Debug)]
pub enum ServerError {
    /// The listening address could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// Requested address.
        addr: SocketAddr,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// The listener could not be configured or queried.
    #[error("listener error: {0}")]
    Listen(#[source] io::Error),

    /// A worker thread could not be started.
    #[error("failed to spawn connection worker: {0}")]
    Spawn(#[source] io::Error),

    /// Client transport failure.
    #[error("transport error: {0}")]
    Transport(#[from] io::Error),

    /// The client stream could not be framed.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The log medium failed.
    #[error("store error: {0}")]
    Store(#[from] CoreError),
}

impl ServerError {
    /// Returns true if the error stops the whole server.
    ///
    /// Only startup-time resource acquisition is fatal; everything else is
    /// confined to one connection.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ServerError::Bind { .. } | ServerError::Listen(_))
    }
}
