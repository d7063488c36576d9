//! RingLog CLI
//!
//! Runs the log server and talks to it.
//!
//! # Commands
//!
//! - `serve` - Run the TCP log server
//! - `send` - Send records to a running server and print the echo
//! - `version` - Show version information

mod commands;

use clap::{Parser, Subcommand};
use ringlog_protocol::SeekCommand;
use std::net::IpAddr;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Bounded log server with cursor seeks.
#[derive(Parser)]
#[command(name = "ringlog")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the log server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value_t = ringlog_server::DEFAULT_PORT)]
        port: u16,

        /// Address to bind to
        #[arg(short, long, default_value = "0.0.0.0")]
        bind: IpAddr,

        /// Number of entries kept by the in-memory ring
        #[arg(short, long, default_value_t = ringlog_core::DEFAULT_CAPACITY)]
        capacity: usize,

        /// Append to this file instead of the in-memory ring
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Keep the data file after shutdown
        #[arg(long, requires = "file")]
        keep_file: bool,

        /// Seconds between timestamp records (default: 10 with --file)
        #[arg(long)]
        timestamp_interval: Option<u64>,

        /// Never write timestamp records
        #[arg(long, conflicts_with = "timestamp_interval")]
        no_timestamps: bool,
    },

    /// Send records to a server and print what it echoes
    Send {
        /// Server address (host:port)
        addr: String,

        /// Records to send, one per argument
        lines: Vec<String>,

        /// Seek command to send after the records, as INDEX,OFFSET
        #[arg(short, long, value_parser = commands::send::parse_seek)]
        seek: Option<SeekCommand>,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // RUST_LOG wins over --verbose
    let level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Serve {
            port,
            bind,
            capacity,
            file,
            keep_file,
            timestamp_interval,
            no_timestamps,
        } => {
            let timestamp_interval = commands::serve::timestamp_interval(
                timestamp_interval,
                no_timestamps,
                file.is_some(),
            );
            let options = commands::serve::ServeOptions {
                addr: (bind, port).into(),
                capacity,
                file,
                keep_file,
                timestamp_interval,
            };
            commands::serve::run(options)?;
        }
        Commands::Send { addr, lines, seek } => {
            commands::send::run(&addr, &lines, seek, &mut std::io::stdout().lock())?;
        }
        Commands::Version => {
            println!("RingLog CLI v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
