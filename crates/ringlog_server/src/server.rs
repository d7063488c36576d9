//! TCP accept loop and connection workers.

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::handler::{ConnectionHandler, ConnectionStats};
use crate::shared::SharedStore;
use crate::shutdown::Shutdown;
use crate::timestamp::TimestampWriter;
use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::thread::{self, Scope, ScopedJoinHandle};
use tracing::{debug, info, warn};

type Worker<'scope> = ScopedJoinHandle<'scope, ServerResult<ConnectionStats>>;

/// Totals for one server run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServerStats {
    /// Connections accepted.
    pub connections: u64,
    /// Connections that ended with an error.
    pub failed_connections: u64,
    /// Workers that panicked.
    pub panicked_workers: u64,
    /// Data records stored by clients.
    pub records: u64,
    /// Records written by the timestamp writer.
    pub timestamps: u64,
}

/// A thread-per-connection log server.
///
/// Every accepted connection gets its own worker thread, and all workers
/// share one [`SharedStore`]. A failing or panicking worker affects only its
/// own connection.
///
/// # Example
///
/// ```no_run
/// use ringlog_core::RingStore;
/// use ringlog_server::{LogServer, ServerConfig, SharedStore};
///
/// let store = SharedStore::new(RingStore::new(10).unwrap());
/// let server = LogServer::bind(ServerConfig::default(), store).unwrap();
///
/// let shutdown = server.shutdown_handle();
/// // hand `shutdown` to a signal handler, then:
/// let stats = server.run().unwrap();
/// println!("served {} connections", stats.connections);
/// ```
#[derive(Debug)]
pub struct LogServer {
    config: ServerConfig,
    store: SharedStore,
    shutdown: Shutdown,
    listener: TcpListener,
}

impl LogServer {
    /// Binds the listening socket.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Bind`] if the address cannot be bound.
    pub fn bind(config: ServerConfig, store: SharedStore) -> ServerResult<Self> {
        let listener = TcpListener::bind(config.bind_addr).map_err(|source| ServerError::Bind {
            addr: config.bind_addr,
            source,
        })?;
        let local = listener.local_addr().map_err(ServerError::Listen)?;
        info!(addr = %local, "listening");

        Ok(Self {
            config,
            store,
            shutdown: Shutdown::new(),
            listener,
        })
    }

    /// Address the listener is bound to.
    ///
    /// # Errors
    ///
    /// Returns an error if the socket cannot be queried.
    pub fn local_addr(&self) -> ServerResult<SocketAddr> {
        self.listener.local_addr().map_err(ServerError::Listen)
    }

    /// Token that stops [`run`](Self::run) when triggered.
    pub fn shutdown_handle(&self) -> Shutdown {
        self.shutdown.clone()
    }

    /// Handle to the store the server writes to.
    pub fn shared_store(&self) -> SharedStore {
        self.store.clone()
    }

    /// Accepts connections until shutdown is requested.
    ///
    /// Once shutdown is seen no new connection is accepted; connections
    /// already being served run until their clients close. The listener is
    /// closed when this returns.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be configured or a background
    /// thread cannot be started.
    pub fn run(self) -> ServerResult<ServerStats> {
        self.listener
            .set_nonblocking(true)
            .map_err(ServerError::Listen)?;

        let stats = thread::scope(|scope| self.run_scoped(scope))?;
        info!(
            connections = stats.connections,
            failed = stats.failed_connections,
            panicked = stats.panicked_workers,
            "server stopped"
        );
        Ok(stats)
    }

    fn run_scoped<'scope, 'env>(
        &'env self,
        scope: &'scope Scope<'scope, 'env>,
    ) -> ServerResult<ServerStats> {
        let mut stats = ServerStats::default();

        let timestamps = match self.config.timestamp_interval {
            Some(interval) => {
                let writer =
                    TimestampWriter::new(self.store.clone(), self.shutdown.clone(), interval);
                let handle = thread::Builder::new()
                    .name("ringlog-timestamp".into())
                    .spawn_scoped(scope, move || writer.run())
                    .map_err(ServerError::Spawn)?;
                Some(handle)
            }
            None => None,
        };

        let mut workers: Vec<Worker<'scope>> = Vec::new();
        let mut next_id = 0u64;

        while !self.shutdown.is_triggered() {
            let (finished, running): (Vec<_>, Vec<_>) =
                workers.drain(..).partition(|w| w.is_finished());
            workers = running;
            for worker in finished {
                reap(worker, &mut stats);
            }

            match self.listener.accept() {
                Ok((stream, peer)) => {
                    next_id += 1;
                    stats.connections += 1;
                    if let Some(worker) = self.spawn_worker(scope, stream, peer, next_id) {
                        workers.push(worker);
                    } else {
                        stats.failed_connections += 1;
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    self.shutdown.wait_timeout(self.config.accept_poll_interval);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => {
                    warn!(error = %e, "accept failed");
                    self.shutdown.wait_timeout(self.config.accept_poll_interval);
                }
            }
        }

        info!(active = workers.len(), "shutting down, waiting for open connections");
        for worker in workers {
            reap(worker, &mut stats);
        }

        if let Some(handle) = timestamps {
            match handle.join() {
                Ok(Ok(written)) => stats.timestamps = written,
                Ok(Err(e)) => warn!(error = %e, "timestamp writer failed"),
                Err(_) => {
                    stats.panicked_workers += 1;
                    warn!("timestamp writer panicked");
                }
            }
        }

        // Every writer is gone; push the medium to durable storage.
        if let Err(e) = self.store.lock().flush() {
            warn!(error = %e, "failed to flush store at shutdown");
        }

        Ok(stats)
    }

    fn spawn_worker<'scope, 'env>(
        &'env self,
        scope: &'scope Scope<'scope, 'env>,
        stream: TcpStream,
        peer: SocketAddr,
        id: u64,
    ) -> Option<Worker<'scope>> {
        // Accepted sockets can inherit the listener's non-blocking mode.
        if let Err(e) = stream.set_nonblocking(false) {
            warn!(%peer, error = %e, "dropping connection");
            return None;
        }
        info!(%peer, id, "accepted connection");

        let store = self.store.clone();
        let config = &self.config;
        let spawned = thread::Builder::new()
            .name(format!("ringlog-conn-{id}"))
            .spawn_scoped(scope, move || serve_connection(stream, peer, store, config));

        match spawned {
            Ok(worker) => Some(worker),
            Err(e) => {
                let err = ServerError::Spawn(e);
                warn!(%peer, error = %err, "dropping connection");
                None
            }
        }
    }
}

fn serve_connection(
    stream: TcpStream,
    peer: SocketAddr,
    store: SharedStore,
    config: &ServerConfig,
) -> ServerResult<ConnectionStats> {
    let mut handler = ConnectionHandler::new(stream, store, config);
    match handler.run() {
        Ok(conn) => {
            info!(
                %peer,
                records = conn.records,
                seeks = conn.seeks,
                bytes = conn.bytes_echoed,
                "connection closed"
            );
            Ok(conn)
        }
        Err(e) => {
            warn!(%peer, error = %e, "connection failed");
            Err(e)
        }
    }
}

fn reap(worker: Worker<'_>, stats: &mut ServerStats) {
    let name = worker.thread().name().map(str::to_owned);
    match worker.join() {
        Ok(Ok(conn)) => stats.records += conn.records,
        Ok(Err(_)) => stats.failed_connections += 1,
        Err(_) => {
            stats.panicked_workers += 1;
            warn!(worker = name.as_deref().unwrap_or("?"), "connection worker panicked");
        }
    }
    debug!(worker = name.as_deref().unwrap_or("?"), "worker reaped");
}
