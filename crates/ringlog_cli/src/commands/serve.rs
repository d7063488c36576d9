//! Serve command implementation.

use ringlog_core::{FlatStore, RingStore, StoreConfig};
use ringlog_server::{LogServer, ServerConfig, SharedStore};
use ringlog_storage::FileBackend;
use std::fs;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info, warn};

/// Timestamp interval used with a file medium when none is given.
const DEFAULT_FILE_TIMESTAMP_SECS: u64 = 10;

/// Options for the serve command.
#[derive(Debug)]
pub struct ServeOptions {
    /// Address to listen on.
    pub addr: SocketAddr,
    /// Ring capacity in entries.
    pub capacity: usize,
    /// Flat file medium, if any.
    pub file: Option<PathBuf>,
    /// Keep the data file after shutdown.
    pub keep_file: bool,
    /// Interval between timestamp records.
    pub timestamp_interval: Option<Duration>,
}

/// Picks the timestamp interval from the command-line flags.
///
/// Timestamps are on by default only for a file medium.
pub fn timestamp_interval(secs: Option<u64>, disabled: bool, file: bool) -> Option<Duration> {
    if disabled {
        return None;
    }
    match secs {
        Some(0) => None,
        Some(secs) => Some(Duration::from_secs(secs)),
        None if file => Some(Duration::from_secs(DEFAULT_FILE_TIMESTAMP_SECS)),
        None => None,
    }
}

/// Runs the serve command until interrupted.
///
/// Once the data file has been opened it is removed on every exit path,
/// bind failures included, unless `keep_file` is set.
pub fn run(options: ServeOptions) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(&options)?;
    // The server owns the last store handle, so the data file is closed
    // and unlocked once `serve` returns.
    let result = serve(&options, store);
    cleanup_data_file(&options);
    result
}

fn serve(options: &ServeOptions, store: SharedStore) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = ServerConfig::new(options.addr);
    if let Some(interval) = options.timestamp_interval {
        config = config.with_timestamps(interval);
    }

    let server = match LogServer::bind(config, store) {
        Ok(server) => server,
        Err(e) => {
            error!(error = %e, "startup failed");
            return Err(e.into());
        }
    };

    let shutdown = server.shutdown_handle();
    ctrlc::set_handler(move || {
        info!("caught signal, exiting");
        shutdown.trigger();
    })?;

    let stats = server.run()?;
    info!(
        connections = stats.connections,
        records = stats.records,
        timestamps = stats.timestamps,
        "done"
    );
    Ok(())
}

fn cleanup_data_file(options: &ServeOptions) {
    let Some(path) = &options.file else {
        return;
    };
    if options.keep_file {
        info!(path = %path.display(), "keeping data file");
    } else if let Err(e) = fs::remove_file(path) {
        warn!(path = %path.display(), error = %e, "failed to remove data file");
    } else {
        info!(path = %path.display(), "removed data file");
    }
}

fn open_store(options: &ServeOptions) -> Result<SharedStore, Box<dyn std::error::Error>> {
    match &options.file {
        Some(path) => {
            let backend = FileBackend::open_with_create_dirs(path)?;
            info!(path = %path.display(), "using file medium");
            Ok(SharedStore::new(FlatStore::new(backend)))
        }
        None => {
            let config = StoreConfig::new().capacity(options.capacity);
            let store = RingStore::with_config(&config)?;
            info!(capacity = options.capacity, "using in-memory ring");
            Ok(SharedStore::new(store))
        }
    }
}
