//! candump log file parser
//!
//! Reads the text logs written by `candump -l` (Linux can-utils):
//!
//! ```text
//! (1436509052.249713) vcan0 044#2A366C2BBA
//! (1436509052.449847) vcan0 18FF0001#C7
//! (1436509052.650004) can1 123##1DEADBEEF
//! ```
//!
//! `#` separates ID and classic CAN data, `##` introduces a CAN-FD frame whose
//! first hex digit is the flags nibble. Remote frames (`#R`) carry no payload
//! and are skipped.

use crate::types::{CanFrame, DecoderError, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// candump log parser
pub struct CandumpParser;

impl CandumpParser {
    /// Open a candump log and return an iterator over its CAN frames
    pub fn parse(path: &Path) -> Result<CandumpFrameIterator<BufReader<File>>> {
        log::info!("Parsing candump log: {:?}", path);

        let file = File::open(path).map_err(|e| {
            DecoderError::LogParseError(format!("Failed to open log file {:?}: {}", path, e))
        })?;

        Ok(Self::from_reader(BufReader::new(file)))
    }

    /// Iterate over the frames of an already opened log
    pub fn from_reader<R: BufRead>(reader: R) -> CandumpFrameIterator<R> {
        CandumpFrameIterator {
            reader,
            line: String::new(),
            line_number: 0,
        }
    }
}

/// Iterator over CAN frames from a candump log
///
/// A malformed line yields one `Err` item; iteration continues with the next
/// line.
pub struct CandumpFrameIterator<R> {
    reader: R,
    line: String,
    line_number: usize,
}

impl<R: BufRead> Iterator for CandumpFrameIterator<R> {
    type Item = Result<CanFrame>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.line.clear();
            match self.reader.read_line(&mut self.line) {
                Ok(0) => return None,
                Ok(_) => self.line_number += 1,
                Err(e) => return Some(Err(e.into())),
            }

            let line = self.line.trim();
            if line.is_empty() {
                continue;
            }

            match parse_candump_line(line) {
                Ok(Some(frame)) => return Some(Ok(frame)),
                Ok(None) => {
                    log::debug!("Skipping remote frame on line {}", self.line_number);
                    continue;
                }
                Err(e) => {
                    return Some(Err(DecoderError::LogParseError(format!(
                        "line {}: {}",
                        self.line_number, e
                    ))))
                }
            }
        }
    }
}

/// Parse one candump line; `Ok(None)` for remote frames
pub fn parse_candump_line(line: &str) -> Result<Option<CanFrame>> {
    let mut parts = line.split_whitespace();

    let timestamp = parts
        .next()
        .and_then(|t| t.strip_prefix('('))
        .and_then(|t| t.strip_suffix(')'))
        .ok_or_else(|| invalid(line, "missing (timestamp)"))?;
    let timestamp_ns = parse_timestamp(timestamp).ok_or_else(|| invalid(line, "bad timestamp"))?;

    let channel = parts.next().ok_or_else(|| invalid(line, "missing interface"))?;
    let id_and_data = parts.next().ok_or_else(|| invalid(line, "missing id#data"))?;

    let (id, payload, is_fd) = if let Some((id, rest)) = id_and_data.split_once("##") {
        // First hex digit holds the FD flags
        let payload = rest.get(1..).ok_or_else(|| invalid(line, "missing CAN-FD flags"))?;
        (id, payload, true)
    } else if let Some((id, rest)) = id_and_data.split_once('#') {
        (id, rest, false)
    } else {
        return Err(invalid(line, "missing '#' separator"));
    };

    if payload.starts_with('R') {
        return Ok(None);
    }

    let can_id = u32::from_str_radix(id, 16).map_err(|_| invalid(line, "bad CAN ID"))?;
    let data = hex_to_bytes(payload).ok_or_else(|| invalid(line, "bad payload"))?;

    Ok(Some(CanFrame {
        timestamp_ns,
        channel: channel.to_string(),
        can_id,
        data,
        is_extended: id.len() > 3,
        is_fd,
    }))
}

/// Seconds with up to nine fractional digits, kept exact
fn parse_timestamp(text: &str) -> Option<u64> {
    let (secs, frac) = text.split_once('.').unwrap_or((text, ""));
    if frac.len() > 9 || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let secs: u64 = secs.parse().ok()?;
    let nanos = if frac.is_empty() {
        0
    } else {
        frac.parse::<u64>().ok()? * 10u64.pow(9 - frac.len() as u32)
    };

    secs.checked_mul(1_000_000_000)?.checked_add(nanos)
}

fn hex_to_bytes(hex: &str) -> Option<Vec<u8>> {
    if hex.len() % 2 != 0 {
        return None;
    }

    (0..hex.len())
        .step_by(2)
        .map(|i| hex.get(i..i + 2).and_then(|b| u8::from_str_radix(b, 16).ok()))
        .collect()
}

fn invalid(line: &str, reason: &str) -> DecoderError {
    DecoderError::LogParseError(format!("{} in '{}'", reason, line))
}
