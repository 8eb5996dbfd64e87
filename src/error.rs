//! Error types for the runestone codec.
//!
//! Decoding untrusted transaction data never surfaces these directly: decode
//! failures are contained as [`Flaw`](crate::model::Flaw) bits on the decoded
//! message, which turn the result into a cenotaph. The errors here are raised
//! on the construction and encoding path, where the caller controls the input
//! and an invalid value is a programming error worth naming.

use thiserror::Error;

use crate::limits::{MAX_VARINT_BYTES, SPACER};
use crate::model::Etching;

/// Errors from the strict variable-length integer decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum VarintError {
    /// The encoding continues past the maximum number of 7-bit groups.
    #[error("varint is longer than the maximum of {MAX_VARINT_BYTES} bytes")]
    Overlong,

    /// The final group carries bits beyond what fits in 128 bits.
    #[error("varint overflows 128 bits")]
    Overflow,

    /// Input ran out before a byte with a clear continuation bit.
    #[error("varint has no terminating byte")]
    Unterminated,
}

/// Errors from encoding a rune name into its numeric identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NameError {
    /// The empty string has no numeric identity.
    #[error("rune name is empty")]
    Empty,

    /// Names are restricted to the uppercase letters `A`..=`Z`.
    #[error("invalid character {character:?} in rune name")]
    InvalidCharacter { character: char },

    /// The name encodes a value that does not fit in 128 bits.
    #[error("rune name exceeds 128 bits")]
    ValueOverflow,

    /// A spacer may not lead the name or follow the final letter.
    #[error("misplaced spacer {SPACER:?} in rune name")]
    MisplacedSpacer,
}

/// Errors from decompiling a raw script into opcodes and data pushes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ScriptError {
    /// A push opcode declared more bytes than the script contains.
    #[error("push of {len} bytes overruns the end of the script")]
    TruncatedPush { len: usize },

    /// The script ended inside a push-data length prefix.
    #[error("script ended inside a push length prefix")]
    TruncatedLengthPrefix,
}

/// Construction-time domain errors.
///
/// Raised when building or enciphering a runestone with invalid field values,
/// so that an invalid [`Runestone`](crate::model::Runestone) can never be
/// serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// Divisibility is bounded by [`Etching::MAX_DIVISIBILITY`].
    #[error(
        "divisibility {divisibility} exceeds maximum {max}",
        max = Etching::MAX_DIVISIBILITY
    )]
    DivisibilityTooLarge { divisibility: u8 },

    /// The spacer bitmask is bounded by [`Etching::MAX_SPACERS`].
    #[error("spacers {spacers:#x} exceed maximum {max:#x}", max = Etching::MAX_SPACERS)]
    SpacersTooLarge { spacers: u32 },

    /// `premine + terms.cap * terms.amount` must fit in 128 bits.
    #[error("etching supply overflows 128 bits")]
    SupplyOverflow,

    /// An edict must target an output of the carrying transaction.
    #[error("edict output {output} exceeds transaction output count {output_count}")]
    EdictOutputOutOfRange { output: u32, output_count: u32 },

    /// A pointer must index an existing output of the carrying transaction.
    #[error("pointer {pointer} is not an output of a transaction with {output_count} outputs")]
    PointerOutOfRange { pointer: u32, output_count: u32 },
}
