//! Raw bit extraction
//!
//! Reads unsigned fields of 1 to 64 bits out of a frame payload. Offsets are
//! counted from the most significant bit of byte 0 (bit 0) towards the end of
//! the buffer; both DBC byte orders are mapped onto this numbering by
//! [`SignalSpec`](crate::SignalSpec) before reaching this module.

use crate::types::{DecoderError, Result};

/// Widest field that can be extracted
pub const MAX_WIDTH: u32 = 64;

/// Convert between DBC big-endian (sawtooth) bit numbering and MSB-first
/// linear numbering.
///
/// Within a byte the DBC index runs 7..0 from MSB to LSB while the linear
/// index runs 0..7, so the conversion mirrors the bit inside its byte. It is
/// its own inverse.
pub fn big_endian_bit_index(index: u32) -> u32 {
    8 * (index / 8) + (7 - index % 8)
}

/// Extract `width` bits starting at MSB-first `offset`
///
/// # Errors
/// * `InvalidWidth` if `width` is outside 1..=64
/// * `OutOfRange` if `offset + width` exceeds the buffer length in bits
pub fn extract(data: &[u8], offset: usize, width: u32) -> Result<u64> {
    check_span(data.len(), offset as i64, width)?;
    Ok(extract_with(|i| data[i], offset, width))
}

/// Extract a field addressed LSB-first, as little-endian DBC signals are
///
/// Bit `8 * i + j` is bit `j` (counted from the LSB) of byte `i`, and
/// `start` names the field's least significant bit. The buffer is walked in
/// reverse byte order, which turns LSB-first numbering into MSB-first
/// numbering without copying the payload.
pub fn extract_lsb_first(data: &[u8], start: usize, width: u32) -> Result<u64> {
    let bit_len = data.len() * 8;
    let offset = bit_len as i64 - (start as i64 + i64::from(width));
    check_span(data.len(), offset, width)?;

    let last = data.len() - 1;
    Ok(extract_with(|i| data[last - i], offset as usize, width))
}

fn check_span(len: usize, offset: i64, width: u32) -> Result<()> {
    if width == 0 || width > MAX_WIDTH {
        return Err(DecoderError::InvalidWidth(width));
    }

    let capacity = len * 8;
    if offset < 0 || offset as u64 + u64::from(width) > capacity as u64 {
        return Err(DecoderError::OutOfRange { offset, width, capacity });
    }

    Ok(())
}

/// Span is validated by the caller. At most 9 bytes are touched, so the
/// accumulator never exceeds 72 significant bits.
fn extract_with(byte_at: impl Fn(usize) -> u8, offset: usize, width: u32) -> u64 {
    let end = offset + width as usize;
    let first_byte = offset / 8;
    let last_byte = (end - 1) / 8;

    let mut acc: u128 = 0;
    for i in first_byte..=last_byte {
        acc = (acc << 8) | u128::from(byte_at(i));
    }

    let trailing = (last_byte + 1) * 8 - end;
    ((acc >> trailing) & mask(width)) as u64
}

fn mask(width: u32) -> u128 {
    (1u128 << width) - 1
}
