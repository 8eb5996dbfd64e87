//! Protocol constants and security limits.
//!
//! The bounds here protect against resource exhaustion and silent numeric
//! truncation when processing untrusted transaction data.

/// Maximum bytes for a varint (19 seven-bit groups cover 128 bits).
pub const MAX_VARINT_BYTES: usize = 19;

/// The small-integer opcode identifying a runestone output script (OP_13).
pub const MAGIC_NUMBER: u8 = 0x5d;

/// The opcode marking a provably unspendable output (OP_RETURN).
pub const OP_RETURN: u8 = 0x6a;

/// Protocol identifier pushed at the start of an inscription envelope.
pub const PROTOCOL_ID: &[u8] = b"ord";

/// Maximum bytes per data push inside an inscription envelope.
pub const MAX_CHUNK_LEN: usize = 520;

/// The name returned for the single reserved rune value, `u128::MAX`,
/// which the general base-26 algorithm cannot represent.
pub const RESERVED_RUNE_NAME: &str = "BCGDENLQRQWDSLRUGSNLBTMFIJAV";

/// Display-only separator glyph inserted between rune name letters.
pub const SPACER: char = '\u{2022}';
