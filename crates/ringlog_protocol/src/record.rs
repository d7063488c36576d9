//! Record classification.

use std::fmt;

/// Terminator that ends every record.
pub const RECORD_TERMINATOR: u8 = b'\n';

/// Reserved prefix of a control record.
pub const SEEK_PREFIX: &[u8] = b"SEEKCMD:";

/// A cursor repositioning request.
///
/// `write_cmd_index` is the ordinal of a live entry counted from the
/// oldest; `intra_offset` is a byte offset inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SeekCommand {
    /// Entry ordinal, 0-based from the oldest live entry.
    pub write_cmd_index: u32,
    /// Byte offset within that entry.
    pub intra_offset: u32,
}

impl SeekCommand {
    /// Creates a seek command.
    pub fn new(write_cmd_index: u32, intra_offset: u32) -> Self {
        Self {
            write_cmd_index,
            intra_offset,
        }
    }

    /// Encodes the command as a complete control record.
    pub fn encode(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }

    /// Parses a full record, terminator included.
    ///
    /// Returns `None` unless the record is exactly
    /// `SEEKCMD:<digits>,<digits>\n` with both fields fitting a `u32`.
    pub fn parse(record: &[u8]) -> Option<Self> {
        let body = record
            .strip_prefix(SEEK_PREFIX)?
            .strip_suffix(&[RECORD_TERMINATOR])?;

        let comma = body.iter().position(|b| *b == b',')?;
        let write_cmd_index = parse_u32(&body[..comma])?;
        let intra_offset = parse_u32(&body[comma + 1..])?;

        Some(Self {
            write_cmd_index,
            intra_offset,
        })
    }
}

impl fmt::Display for SeekCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "SEEKCMD:{},{}",
            self.write_cmd_index, self.intra_offset
        )
    }
}

/// Decimal digits only: no sign, no whitespace, no empty field.
fn parse_u32(field: &[u8]) -> Option<u32> {
    if field.is_empty() || !field.iter().all(u8::is_ascii_digit) {
        return None;
    }
    std::str::from_utf8(field).ok()?.parse().ok()
}

/// A classified record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Record<'a> {
    /// Bytes to store as a new entry, terminator included.
    Data(&'a [u8]),
    /// A cursor repositioning request.
    Seek(SeekCommand),
}

impl<'a> Record<'a> {
    /// Classifies a complete record.
    ///
    /// Anything that is not a well-formed control record is data, including
    /// lines that carry the reserved prefix but malformed fields.
    pub fn parse(record: &'a [u8]) -> Self {
        match SeekCommand::parse(record) {
            Some(command) => Record::Seek(command),
            None => Record::Data(record),
        }
    }
}
