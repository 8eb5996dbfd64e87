//! Runestone: codec for the runes metaprotocol.
//!
//! This crate encodes and decodes runestones, the protocol messages that
//! etch, mint, and transfer runes inside Bitcoin transactions, along with
//! the inscription envelopes that commit to an etching's name.
//!
//! # Overview
//!
//! A runestone rides in an unspendable output: `OP_RETURN OP_13` followed
//! by data pushes. The pushes concatenate into a payload of variable-length
//! integers forming a tagged message:
//! - **Fields**: `(tag, value)` pairs carrying the etching, mint, and
//!   pointer
//! - **Edicts**: groups of four integers transferring runes between
//!   outputs, delta-addressed by rune id
//! - **Cenotaphs**: malformed messages are never errors; they decode with
//!   flaw bits set and take effect as deliberate burns
//!
//! # Quick Start
//!
//! ```rust
//! use runestone::{RuneId, Runestone, Transaction, TxOut};
//!
//! // A runestone minting rune 211:1.
//! let runestone = Runestone {
//!     mint: Some(RuneId::new(211, 1)),
//!     ..Runestone::default()
//! };
//!
//! // Serialize to the carrier output script.
//! let script_pubkey = runestone.encipher(1).unwrap();
//!
//! // Extract it back from a transaction.
//! let tx = Transaction {
//!     outputs: vec![TxOut { script_pubkey }],
//! };
//! let deciphered = Runestone::decipher(&tx).unwrap();
//! assert_eq!(deciphered.mint, Some(RuneId::new(211, 1)));
//! assert!(!deciphered.is_cenotaph());
//! ```
//!
//! # Modules
//!
//! - [`model`]: Core data types (Rune, RuneId, Edict, Etching, Runestone)
//! - [`codec`]: Varint, name, message, script, and envelope codecs
//! - [`validate`]: Construction-time validation
//! - [`error`]: Error types
//! - [`limits`]: Protocol constants and security limits
//!
//! # Security
//!
//! The decoder is designed to safely handle untrusted transaction data:
//! - Varints are strict and bounded to 128 bits
//! - Numeric conversions are checked; out-of-range fields become flaws,
//!   never truncations
//! - Malformed input degrades to a cenotaph instead of an error or a
//!   partially-applied message

pub mod codec;
pub mod error;
pub mod limits;
pub mod model;
pub mod validate;

// Re-export commonly used types at crate root
pub use codec::envelope::EtchInscription;
pub use codec::script::{Instruction, Transaction, TxOut};
pub use error::{EncodeError, NameError, ScriptError, VarintError};
pub use model::{
    Edict, Etching, Flag, Flaw, Flaws, Message, Range, Rune, RuneId, Runestone, SpacedRune, Tag,
    Terms,
};
pub use validate::{validate_edicts, validate_etching, validate_runestone};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
