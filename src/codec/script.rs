//! Script boundary: decompilation, push framing, and payload search.
//!
//! The codec does not construct or sign transactions. [`Transaction`] and
//! [`TxOut`] are the minimal collaborator shapes it consumes: a list of
//! outputs exposing raw script bytes. This module turns those bytes into an
//! opcode/data-push sequence, locates the runestone payload among the
//! outputs, and builds the carrier script on the encode side.

use crate::error::ScriptError;
use crate::limits::{MAGIC_NUMBER, OP_RETURN};
use crate::model::Flaw;

/// Empty-push opcode (OP_0 / OP_FALSE).
pub const OP_0: u8 = 0x00;
/// One-byte length prefix follows.
pub const OP_PUSHDATA1: u8 = 0x4c;
/// Two-byte little-endian length prefix follows.
pub const OP_PUSHDATA2: u8 = 0x4d;
/// Four-byte little-endian length prefix follows.
pub const OP_PUSHDATA4: u8 = 0x4e;
/// Opens a conditional branch (OP_IF).
pub const OP_IF: u8 = 0x63;
/// Closes a conditional branch (OP_ENDIF).
pub const OP_ENDIF: u8 = 0x68;
/// Small-integer opcodes OP_1..=OP_16 are this offset plus their value.
pub const OP_PUSHNUM_OFFSET: u8 = 0x50;
/// Largest push expressible with a bare length byte.
pub const MAX_DIRECT_PUSH: usize = 75;

/// One element of a decompiled script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// A non-push opcode.
    Op(u8),
    /// A data push; OP_0 decompiles to an empty push.
    Push(Vec<u8>),
}

/// A transaction output, reduced to its script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxOut {
    pub script_pubkey: Vec<u8>,
}

/// The collaborator shape consumed by [`Runestone::decipher`].
///
/// [`Runestone::decipher`]: crate::model::Runestone::decipher
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transaction {
    pub outputs: Vec<TxOut>,
}

/// Decompiles raw script bytes into opcodes and data pushes.
pub fn decompile(script: &[u8]) -> Result<Vec<Instruction>, ScriptError> {
    let mut instructions = Vec::new();
    let mut i = 0;
    while i < script.len() {
        let opcode = script[i];
        i += 1;
        let len = match opcode {
            OP_0 => {
                instructions.push(Instruction::Push(Vec::new()));
                continue;
            }
            1..=75 => usize::from(opcode),
            OP_PUSHDATA1 => {
                let &len = script.get(i).ok_or(ScriptError::TruncatedLengthPrefix)?;
                i += 1;
                usize::from(len)
            }
            OP_PUSHDATA2 => {
                let prefix: [u8; 2] = script
                    .get(i..i + 2)
                    .and_then(|s| s.try_into().ok())
                    .ok_or(ScriptError::TruncatedLengthPrefix)?;
                i += 2;
                usize::from(u16::from_le_bytes(prefix))
            }
            OP_PUSHDATA4 => {
                let prefix: [u8; 4] = script
                    .get(i..i + 4)
                    .and_then(|s| s.try_into().ok())
                    .ok_or(ScriptError::TruncatedLengthPrefix)?;
                i += 4;
                u32::from_le_bytes(prefix) as usize
            }
            _ => {
                instructions.push(Instruction::Op(opcode));
                continue;
            }
        };
        let data = script
            .get(i..i + len)
            .ok_or(ScriptError::TruncatedPush { len })?;
        instructions.push(Instruction::Push(data.to_vec()));
        i += len;
    }
    Ok(instructions)
}

/// Appends `data` to `buf` with minimal push framing.
pub fn push(buf: &mut Vec<u8>, data: &[u8]) {
    match data.len() {
        0 => buf.push(OP_0),
        len @ 1..=MAX_DIRECT_PUSH => buf.push(len as u8),
        len @ ..=0xff => {
            buf.push(OP_PUSHDATA1);
            buf.push(len as u8);
        }
        len @ ..=0xffff => {
            buf.push(OP_PUSHDATA2);
            buf.extend_from_slice(&(len as u16).to_le_bytes());
        }
        len => {
            buf.push(OP_PUSHDATA4);
            buf.extend_from_slice(&(len as u32).to_le_bytes());
        }
    }
    buf.extend_from_slice(data);
}

/// Builds the null-data output script carrying a serialized message payload.
pub fn runestone_script(payload: &[u8]) -> Vec<u8> {
    let mut script = vec![OP_RETURN, MAGIC_NUMBER];
    push(&mut script, payload);
    script
}

/// Searches the outputs for the protocol's payload.
///
/// The first output whose script begins with OP_RETURN followed by the magic
/// opcode wins. `None` means no qualifying output exists, which is absence,
/// not an error. A qualifying output that fails to decompile yields
/// [`Flaw::InvalidScript`]; a non-push element after the magic yields
/// [`Flaw::Opcode`].
pub fn find_payload(tx: &Transaction) -> Option<Result<Vec<u8>, Flaw>> {
    for output in &tx.outputs {
        let script = &output.script_pubkey;
        if script.first() != Some(&OP_RETURN) || script.get(1) != Some(&MAGIC_NUMBER) {
            continue;
        }
        let Ok(instructions) = decompile(&script[2..]) else {
            return Some(Err(Flaw::InvalidScript));
        };
        let mut payload = Vec::new();
        for instruction in instructions {
            match instruction {
                Instruction::Push(data) => payload.extend_from_slice(&data),
                Instruction::Op(_) => return Some(Err(Flaw::Opcode)),
            }
        }
        return Some(Ok(payload));
    }
    None
}
