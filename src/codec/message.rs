//! Wire codec for the tagged message: a flat varint sequence on the wire,
//! a [`Message`] in memory.
//!
//! Decoding is total: malformed input produces a message with flaw bits
//! set, never an error. Encoding of a well-formed message is infallible;
//! domain validation happens before a [`Runestone`](crate::model::Runestone)
//! is lowered to a message at all.

use crate::codec::varint;
use crate::model::{Edict, FieldMap, Flaw, Flaws, Message, RuneId, Tag};

/// Decodes a flat integer sequence into a message.
///
/// Integers before the `Body` tag are consumed in `(tag, value)` pairs; a
/// trailing tag with no value records [`Flaw::TruncatedField`]. The `Body`
/// tag switches to edict groups of four, delta-addressed over a running
/// [`RuneId`]. Edict flaws truncate further edict processing but preserve
/// the edicts already parsed. The scan is a single forward pass; consumed
/// groups are never revisited.
pub fn decode_message(output_count: u32, integers: &[u128]) -> Message {
    let mut fields = FieldMap::new();
    let mut edicts = Vec::new();
    let mut flaws = Flaws::default();

    let mut i = 0;
    while i < integers.len() {
        let tag = integers[i];

        if tag == Tag::Body.into() {
            i += 1;
            let mut id = RuneId::default();
            while i < integers.len() {
                if integers.len() - i < 4 {
                    flaws.set(Flaw::TrailingIntegers);
                    break;
                }
                let Some(next) = id.next(integers[i], integers[i + 1]) else {
                    flaws.set(Flaw::EdictRuneId);
                    break;
                };
                let Some(edict) =
                    Edict::from_wire(output_count, next, integers[i + 2], integers[i + 3])
                else {
                    flaws.set(Flaw::EdictOutput);
                    break;
                };
                edicts.push(edict);
                id = next;
                i += 4;
            }
            break;
        }

        let Some(&value) = integers.get(i + 1) else {
            flaws.set(Flaw::TruncatedField);
            break;
        };
        fields.push(tag, value);
        i += 2;
    }

    Message {
        fields,
        edicts,
        flaws,
    }
}

/// Decodes a raw payload, strict-varint first, then [`decode_message`].
///
/// A varint failure yields a message carrying only [`Flaw::Varint`].
pub fn decode_payload(output_count: u32, payload: &[u8]) -> Message {
    match varint::decode_all(payload) {
        Ok(integers) => decode_message(output_count, &integers),
        Err(_) => Message::flawed(Flaw::Varint.into()),
    }
}

/// Flattens a message into its integer sequence.
///
/// Fields are emitted in multimap order. Edicts, if any, follow the `Body`
/// tag sorted ascending by id and delta-encoded: the first edict emits its
/// absolute `(block, index)`; later edicts in the same block emit
/// `(0, index_delta)`, and a block change emits
/// `(block_delta, index_absolute)`.
pub fn message_integers(message: &Message) -> Vec<u128> {
    let mut integers = Vec::new();

    for (tag, values) in message.fields.iter() {
        for &value in values {
            integers.push(tag);
            integers.push(value);
        }
    }

    if !message.edicts.is_empty() {
        integers.push(Tag::Body.into());

        let mut edicts = message.edicts.clone();
        edicts.sort_by_key(|edict| edict.id);

        let mut previous = RuneId::default();
        for edict in edicts {
            let (block, index) = previous.delta(edict.id);
            integers.push(block);
            integers.push(index);
            integers.push(edict.amount);
            integers.push(u128::from(edict.output));
            previous = edict.id;
        }
    }

    integers
}

/// Serializes a message to payload bytes.
pub fn encode_message(message: &Message) -> Vec<u8> {
    let mut bytes = Vec::new();
    for n in message_integers(message) {
        varint::encode_to(&mut bytes, n);
    }
    bytes
}
