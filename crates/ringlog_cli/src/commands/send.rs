//! Send command implementation.

use ringlog_protocol::{SeekCommand, RECORD_TERMINATOR};
use std::io::{Read, Write};
use std::net::{Shutdown, TcpStream};
use tracing::debug;

/// Parses a seek argument of the form `INDEX,OFFSET`.
pub fn parse_seek(arg: &str) -> Result<SeekCommand, String> {
    let (index, offset) = arg
        .split_once(',')
        .ok_or_else(|| format!("expected INDEX,OFFSET, got {arg:?}"))?;
    let index = index
        .trim()
        .parse()
        .map_err(|e| format!("bad index {index:?}: {e}"))?;
    let offset = offset
        .trim()
        .parse()
        .map_err(|e| format!("bad offset {offset:?}: {e}"))?;
    Ok(SeekCommand::new(index, offset))
}

/// Sends `lines` (and then `seek`) and copies every echo to `out`.
///
/// The write side is closed after the last record so the server finishes
/// its echoes and closes the connection.
pub fn run(
    addr: &str,
    lines: &[String],
    seek: Option<SeekCommand>,
    out: &mut dyn Write,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut stream = TcpStream::connect(addr)?;
    debug!(addr, records = lines.len(), "connected");

    for line in lines {
        let mut record = Vec::with_capacity(line.len() + 1);
        record.extend_from_slice(line.as_bytes());
        record.push(RECORD_TERMINATOR);
        stream.write_all(&record)?;
    }
    if let Some(seek) = seek {
        stream.write_all(&seek.encode())?;
    }
    stream.shutdown(Shutdown::Write)?;

    let mut echoed = Vec::new();
    stream.read_to_end(&mut echoed)?;
    out.write_all(&echoed)?;
    out.flush()?;
    Ok(())
}
