//! Variable-length integer encoding.
//!
//! Integers are encoded low bits first in 7-bit groups, with the high bit of
//! each byte set while further groups follow. The decoder is strict: amounts
//! and rune identities are 128-bit quantities, so any encoding that continues
//! past 19 groups or carries excess bits in the final group is rejected. This
//! is the single canonical decoder for all on-wire integers.

use crate::error::VarintError;
use crate::limits::MAX_VARINT_BYTES;

/// Encodes `value`, appending to `buf`.
pub fn encode_to(buf: &mut Vec<u8>, mut value: u128) {
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            buf.push(byte);
            return;
        }
        buf.push(byte | 0x80);
    }
}

/// Encodes `value` into a fresh buffer. Zero encodes as a single `0x00` byte.
pub fn encode(value: u128) -> Vec<u8> {
    let mut buf = Vec::with_capacity(MAX_VARINT_BYTES);
    encode_to(&mut buf, value);
    buf
}

/// Decodes one integer from the front of `bytes`.
///
/// Returns the value and the number of bytes consumed.
pub fn decode(bytes: &[u8]) -> Result<(u128, usize), VarintError> {
    let mut n: u128 = 0;
    for (i, &byte) in bytes.iter().enumerate() {
        if i >= MAX_VARINT_BYTES {
            return Err(VarintError::Overlong);
        }
        let value = u128::from(byte & 0x7f);
        // The 19th group holds bits 126..=132; only the low two may be set.
        if i == MAX_VARINT_BYTES - 1 && byte & 0b0111_1100 != 0 {
            return Err(VarintError::Overflow);
        }
        n |= value << (7 * i);
        if byte & 0x80 == 0 {
            return Ok((n, i + 1));
        }
    }
    Err(VarintError::Unterminated)
}

/// Decodes a payload into its full integer sequence.
pub fn decode_all(payload: &[u8]) -> Result<Vec<u128>, VarintError> {
    let mut integers = Vec::new();
    let mut i = 0;
    while i < payload.len() {
        let (n, len) = decode(&payload[i..])?;
        integers.push(n);
        i += len;
    }
    Ok(integers)
}
