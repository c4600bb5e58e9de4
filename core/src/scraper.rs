//! Emulator console scraping
//!
//! mupen64plus prints its ROM header and any startup failure as plain text
//! before the game starts. This module reads that text from the PTY and
//! extracts:
//!
//! - a fatal error (`UI-Console Error: ...`)
//! - a non-fatal warning (`UI-Console Warning: ...`)
//! - ROM metadata (`Goodname`, `MD5`, `Imagetype`, `Country`)
//!
//! Reading stops at the first error, at the end-of-startup marker
//! (`UI-Console Status`), at end of file, or when the buffer is full.

use std::io::{self, Read};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::rom_info::{NOT_FOUND, RomField, RomInfo};

/// Size of the console buffer shared by every read of one probe.
pub const OUTPUT_BUFFER_SIZE: usize = 2048;

pub const ERROR_MARKER: &str = "UI-Console Error";
pub const WARNING_MARKER: &str = "UI-Console Warning";
pub const END_MARKER: &str = "UI-Console Status";

pub const GOODNAME_KEY: &str = "Goodname";
pub const MD5_KEY: &str = "MD5";
pub const IMAGETYPE_KEY: &str = "Imagetype";
pub const COUNTRY_KEY: &str = "Country";

const DELIMITER: &str = ": ";

/// Result of scraping one probe's console output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeReport {
    /// The emulator printed a fatal error and will not run the ROM
    Failed { error: String },
    /// The emulator got past startup
    Started {
        rom_info: RomInfo,
        warning: Option<String>,
        /// Keys that were absent and set to the `not found` sentinel
        missing: Vec<&'static str>,
    },
}

/// Read console output until a terminal marker, EOF, or a full buffer.
///
/// `Interrupted` and `WouldBlock` reads are retried. A `TimedOut` read
/// becomes [`Error::ReadTimeout`]; anything else is [`Error::Read`].
pub fn read_console<R: Read + ?Sized>(
    reader: &mut R,
    read_timeout: Option<Duration>,
) -> Result<String> {
    let mut buf = vec![0u8; OUTPUT_BUFFER_SIZE];
    let mut len = 0;

    while len < buf.len() {
        match reader.read(&mut buf[len..]) {
            Ok(0) => break,
            Ok(n) => {
                len += n;
                let seen = &buf[..len];
                if contains(seen, ERROR_MARKER) || contains(seen, END_MARKER) {
                    break;
                }
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                std::thread::sleep(Duration::from_millis(10));
            }
            Err(e) if e.kind() == io::ErrorKind::TimedOut => {
                return Err(Error::ReadTimeout(read_timeout.unwrap_or_default()));
            }
            Err(e) => return Err(Error::Read(e)),
        }
    }

    buf.truncate(len);
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Extract the error, warning and ROM metadata from console text.
pub fn parse_console(text: &str) -> ProbeReport {
    if let Some(error) = value_after(text, ERROR_MARKER) {
        return ProbeReport::Failed {
            error: error.to_string(),
        };
    }

    let warning = value_after(text, WARNING_MARKER).map(str::to_string);

    let mut rom_info = RomInfo::default();
    let mut missing = Vec::new();
    let fields: [(&'static str, &mut RomField); 4] = [
        (GOODNAME_KEY, &mut rom_info.goodname),
        (MD5_KEY, &mut rom_info.md5),
        (IMAGETYPE_KEY, &mut rom_info.imagetype),
        (COUNTRY_KEY, &mut rom_info.country),
    ];
    for (key, field) in fields {
        match value_after(text, key) {
            Some(value) => {
                if field.set(value) {
                    tracing::debug!("ROM {} truncated to \"{}\"", key, field);
                }
            }
            None => {
                field.set(NOT_FOUND);
                missing.push(key);
            }
        }
    }
    rom_info.derive_id();

    ProbeReport::Started {
        rom_info,
        warning,
        missing,
    }
}

/// Read and parse in one go.
pub fn scrape<R: Read + ?Sized>(
    reader: &mut R,
    read_timeout: Option<Duration>,
) -> Result<ProbeReport> {
    let text = read_console(reader, read_timeout)?;
    Ok(parse_console(&text))
}

/// Read and log console output until end of file, returning the byte count.
///
/// Timeouts and interrupted reads keep draining; any other read error ends
/// the drain.
pub fn drain_console<R: Read + ?Sized>(reader: &mut R) -> usize {
    let mut buf = [0u8; OUTPUT_BUFFER_SIZE];
    let mut total = 0;
    loop {
        match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => {
                total += n;
                for line in String::from_utf8_lossy(&buf[..n]).lines() {
                    let line = line.trim_end_matches('\r');
                    if !line.is_empty() {
                        tracing::debug!("emulator: {}", line);
                    }
                }
            }
            Err(e) if is_transient(&e) => {}
            Err(e) => {
                tracing::debug!("Stopped draining emulator output: {}", e);
                break;
            }
        }
    }
    total
}

fn is_transient(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
    )
}

/// Text between `<key>: ` and the end of its line.
fn value_after<'a>(text: &'a str, key: &str) -> Option<&'a str> {
    let needle = format!("{key}{DELIMITER}");
    let start = text.find(&needle)? + needle.len();
    let rest = &text[start..];
    let end = rest.find(['\r', '\n']).unwrap_or(rest.len());
    Some(&rest[..end])
}

fn contains(haystack: &[u8], needle: &str) -> bool {
    haystack
        .windows(needle.len())
        .any(|window| window == needle.as_bytes())
}
