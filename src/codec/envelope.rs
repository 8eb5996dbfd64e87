//! Inscription envelope codec for etching commitments.
//!
//! An etching's name is committed to in a tapscript envelope revealed
//! alongside the runestone: `OP_FALSE OP_IF "ord" <fields> OP_0 <data>
//! OP_ENDIF`. Fields are `(tag, value)` push pairs sorted by tag; the body
//! after the separator carries the inscribed data in pushes of at most
//! [`MAX_CHUNK_LEN`] bytes.

use crate::codec::script::{decompile, push, Instruction, OP_ENDIF, OP_IF, OP_PUSHNUM_OFFSET};
use crate::limits::{MAX_CHUNK_LEN, PROTOCOL_ID};
use crate::model::Rune;

/// Field tag for the content's MIME type.
pub const CONTENT_TYPE_TAG: u8 = 1;
/// Field tag for the output pointer.
pub const POINTER_TAG: u8 = 2;
/// Field tag for the rune name commitment.
pub const RUNE_TAG: u8 = 13;

/// An inscription carrying an etching's rune commitment.
///
/// Fields map envelope tags to raw byte values; typed accessors cover the
/// tags the etching path uses. `data` is the inscribed content itself.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EtchInscription {
    pub fields: Vec<(u8, Vec<u8>)>,
    pub data: Vec<u8>,
}

impl EtchInscription {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a raw field, replacing any existing value under `tag`.
    pub fn set_field(&mut self, tag: u8, value: Vec<u8>) {
        match self.fields.iter_mut().find(|(t, _)| *t == tag) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((tag, value)),
        }
    }

    /// Raw bytes of the field under `tag`.
    pub fn field(&self, tag: u8) -> Option<&[u8]> {
        self.fields
            .iter()
            .find(|(t, _)| *t == tag)
            .map(|(_, value)| value.as_slice())
    }

    /// Sets the content type and inscribed data together.
    pub fn set_content(&mut self, content_type: &str, data: Vec<u8>) {
        self.set_field(CONTENT_TYPE_TAG, content_type.as_bytes().to_vec());
        self.data = data;
    }

    pub fn content_type(&self) -> Option<&str> {
        std::str::from_utf8(self.field(CONTENT_TYPE_TAG)?).ok()
    }

    /// Commits to a rune as minimal little-endian bytes.
    pub fn set_rune(&mut self, rune: Rune) {
        let mut bytes = rune.0.to_le_bytes().to_vec();
        while bytes.last() == Some(&0) {
            bytes.pop();
        }
        self.set_field(RUNE_TAG, bytes);
    }

    /// The committed rune, if the field is present and fits in 128 bits.
    pub fn rune(&self) -> Option<Rune> {
        let bytes = self.field(RUNE_TAG)?;
        if bytes.len() > 16 {
            return None;
        }
        let mut value: u128 = 0;
        for (i, &byte) in bytes.iter().enumerate() {
            value |= u128::from(byte) << (8 * i);
        }
        Some(Rune(value))
    }

    /// Points the inscription at an output, as minimal little-endian bytes.
    pub fn set_pointer(&mut self, pointer: u32) {
        let mut bytes = pointer.to_le_bytes().to_vec();
        while bytes.len() > 1 && bytes.last() == Some(&0) {
            bytes.pop();
        }
        self.set_field(POINTER_TAG, bytes);
    }

    pub fn pointer(&self) -> Option<u32> {
        let bytes = self.field(POINTER_TAG)?;
        if bytes.len() > 4 {
            return None;
        }
        let mut value: u32 = 0;
        for (i, &byte) in bytes.iter().enumerate() {
            value |= u32::from(byte) << (8 * i);
        }
        Some(value)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Serializes the envelope to tapscript bytes.
    ///
    /// Fields are emitted sorted by tag. A value of a single zero byte is
    /// emitted as a bare OP_0, matching the minimal-push rule for small
    /// integers. Data is split into pushes of at most [`MAX_CHUNK_LEN`]
    /// bytes.
    pub fn encipher(&self) -> Vec<u8> {
        let mut script = Vec::new();
        push(&mut script, &[]);
        script.push(OP_IF);
        push(&mut script, PROTOCOL_ID);

        let mut fields = self.fields.clone();
        fields.sort_by_key(|(tag, _)| *tag);
        for (tag, value) in &fields {
            push(&mut script, &[*tag]);
            if value.as_slice() == [0] {
                push(&mut script, &[]);
            } else {
                push(&mut script, value);
            }
        }

        push(&mut script, &[]);
        for chunk in self.data.chunks(MAX_CHUNK_LEN) {
            push(&mut script, chunk);
        }

        script.push(OP_ENDIF);
        script
    }

    /// Extracts the first envelope from a witness stack.
    ///
    /// Each witness element is decompiled and scanned for the envelope
    /// preamble; elements that fail to decompile are skipped. `None` means
    /// no element carries a well-formed envelope.
    pub fn decipher(witness: &[Vec<u8>]) -> Option<EtchInscription> {
        witness.iter().find_map(|element| {
            let instructions = decompile(element).ok()?;
            from_instructions(&instructions)
        })
    }
}

fn from_instructions(instructions: &[Instruction]) -> Option<EtchInscription> {
    let start = (0..instructions.len().checked_sub(2)?).find(|&i| {
        instructions[i] == Instruction::Push(Vec::new())
            && instructions[i + 1] == Instruction::Op(OP_IF)
            && instructions[i + 2] == Instruction::Push(PROTOCOL_ID.to_vec())
    })?;

    let mut fields = Vec::new();
    let mut data = Vec::new();
    let mut iter = instructions[start + 3..].iter();

    loop {
        match iter.next()? {
            Instruction::Op(OP_ENDIF) => break,
            // Separator: the rest of the envelope is data.
            Instruction::Push(bytes) if bytes.is_empty() => {
                loop {
                    match iter.next()? {
                        Instruction::Op(OP_ENDIF) => return Some(EtchInscription { fields, data }),
                        Instruction::Push(chunk) => data.extend_from_slice(chunk),
                        Instruction::Op(_) => return None,
                    }
                }
            }
            tag_instruction => {
                let tag = match tag_instruction {
                    Instruction::Push(bytes) if bytes.len() == 1 => bytes[0],
                    // OP_1..=OP_16 as a minimally-encoded small tag.
                    Instruction::Op(op)
                        if (OP_PUSHNUM_OFFSET + 1..=OP_PUSHNUM_OFFSET + 16).contains(op) =>
                    {
                        op - OP_PUSHNUM_OFFSET
                    }
                    _ => return None,
                };
                let value = match iter.next()? {
                    Instruction::Push(bytes) if bytes.is_empty() => vec![0],
                    Instruction::Push(bytes) => bytes.clone(),
                    Instruction::Op(_) => return None,
                };
                fields.push((tag, value));
            }
        }
    }

    Some(EtchInscription { fields, data })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{b:02x}")).collect()
    }

    #[test]
    fn encipher_etch_reveal() {
        let mut inscription = EtchInscription::new();
        inscription.set_content("text/plain", b"scrypt is best".to_vec());
        inscription.set_rune(Rune::from_name("BESTSCRYPTMINT").unwrap());
        inscription.set_pointer(0);

        assert_eq!(
            hex(&inscription.encipher()),
            "0063036f726401010a746578742f706c61696e010200010d084b3f3580cdf67e4c000e736372797074206973206265737468"
        );
    }

    #[test]
    fn decipher_roundtrip() {
        let mut inscription = EtchInscription::new();
        inscription.set_content("text/plain", b"hello".to_vec());
        inscription.set_rune(Rune::from_name("AAA").unwrap());

        let witness = vec![vec![0x01, 0xab], inscription.encipher()];
        let deciphered = EtchInscription::decipher(&witness).unwrap();
        assert_eq!(deciphered.content_type(), Some("text/plain"));
        assert_eq!(deciphered.rune(), Some(Rune::from_name("AAA").unwrap()));
        assert_eq!(deciphered.data(), b"hello");
    }

    #[test]
    fn pointer_zero_survives_bare_op_0() {
        let mut inscription = EtchInscription::new();
        inscription.set_pointer(0);

        let deciphered = EtchInscription::decipher(&[inscription.encipher()]).unwrap();
        assert_eq!(deciphered.pointer(), Some(0));
    }

    #[test]
    fn large_data_chunks_and_reassembles() {
        let mut inscription = EtchInscription::new();
        inscription.set_content("application/octet-stream", vec![0xaa; 1300]);

        let script = inscription.encipher();
        let instructions = decompile(&script).unwrap();
        let chunks = instructions
            .iter()
            .filter(|i| matches!(i, Instruction::Push(p) if p.len() == MAX_CHUNK_LEN))
            .count();
        assert_eq!(chunks, 2);

        let deciphered = EtchInscription::decipher(&[script]).unwrap();
        assert_eq!(deciphered.data(), vec![0xaa; 1300]);
    }

    #[test]
    fn small_integer_opcode_tags_are_accepted() {
        // OP_13 as the rune tag instead of a one-byte push.
        let mut script = Vec::new();
        push(&mut script, &[]);
        script.push(OP_IF);
        push(&mut script, PROTOCOL_ID);
        script.push(OP_PUSHNUM_OFFSET + RUNE_TAG);
        push(&mut script, &[0x4b, 0x3f]);
        script.push(OP_ENDIF);

        let deciphered = EtchInscription::decipher(&[script]).unwrap();
        assert_eq!(deciphered.rune(), Some(Rune(0x3f4b)));
    }

    #[test]
    fn witness_without_envelope_is_none() {
        assert_eq!(EtchInscription::decipher(&[vec![0x01, 0xab]]), None);
        assert_eq!(EtchInscription::decipher(&[]), None);
    }

    #[test]
    fn envelope_missing_endif_is_none() {
        let mut script = Vec::new();
        push(&mut script, &[]);
        script.push(OP_IF);
        push(&mut script, PROTOCOL_ID);
        assert_eq!(EtchInscription::decipher(&[script]), None);
    }
}
