//! The validated protocol message and its extraction from transactions.

use crate::codec::message::{decode_payload, encode_message};
use crate::codec::script::{find_payload, runestone_script, Transaction};
use crate::error::EncodeError;
use crate::model::{
    Edict, Etching, FieldMap, Flag, Flaw, Flaws, Message, Range, Rune, RuneId, Tag, Terms,
};
use crate::validate::validate_runestone;

/// A decoded runestone: edicts plus the optional etching, mint, and pointer.
///
/// `flaws` is non-empty exactly when the message is a cenotaph, in which
/// case every payload field is suppressed and only the flaws remain.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Runestone {
    pub edicts: Vec<Edict>,
    pub etching: Option<Etching>,
    pub mint: Option<RuneId>,
    pub pointer: Option<u32>,
    pub flaws: Flaws,
}

impl Runestone {
    /// Whether this message is voided by flaws.
    ///
    /// A cenotaph still burns the runes its transaction carries; it just
    /// etches, mints, and transfers nothing.
    pub fn is_cenotaph(&self) -> bool {
        !self.flaws.is_empty()
    }

    /// Extracts the runestone from a transaction's outputs.
    ///
    /// `None` means no output carries the protocol marker. A marked output
    /// always yields `Some`, possibly a cenotaph.
    pub fn decipher(tx: &Transaction) -> Option<Runestone> {
        let output_count = u32::try_from(tx.outputs.len()).unwrap_or(u32::MAX);
        let message = match find_payload(tx)? {
            Ok(payload) => decode_payload(output_count, &payload),
            Err(flaw) => Message::flawed(flaw.into()),
        };
        Some(Runestone::from_message(output_count, message))
    }

    /// Interprets a decoded message's fields.
    ///
    /// Recognized fields are consumed from the field map; a field whose
    /// value fails conversion or a bounds check records
    /// [`Flaw::TruncatedField`]. Leftover even tags and leftover flag bits
    /// each record their flaw. Any flaw at all collapses the result to a
    /// cenotaph.
    pub fn from_message(output_count: u32, message: Message) -> Runestone {
        let Message {
            mut fields,
            edicts,
            mut flaws,
        } = message;

        let mut flags = field(&mut fields, &mut flaws, Tag::Flags, Some).unwrap_or_default();

        let etching = if Flag::Etching.take(&mut flags) {
            let divisibility = field(&mut fields, &mut flaws, Tag::Divisibility, |value| {
                u8::try_from(value)
                    .ok()
                    .filter(|divisibility| *divisibility <= Etching::MAX_DIVISIBILITY)
            });
            let rune = field(&mut fields, &mut flaws, Tag::Rune, |value| Some(Rune(value)));
            let spacers = field(&mut fields, &mut flaws, Tag::Spacers, |value| {
                u32::try_from(value)
                    .ok()
                    .filter(|spacers| *spacers <= Etching::MAX_SPACERS)
            });
            let symbol = field(&mut fields, &mut flaws, Tag::Symbol, |value| {
                u32::try_from(value).ok().and_then(char::from_u32)
            });
            let premine = field(&mut fields, &mut flaws, Tag::Premine, Some);

            let terms = if Flag::Terms.take(&mut flags) {
                let amount = field(&mut fields, &mut flaws, Tag::Amount, Some);
                let cap = field(&mut fields, &mut flaws, Tag::Cap, Some);
                let height = Range::new(
                    field(&mut fields, &mut flaws, Tag::HeightStart, |v| {
                        u64::try_from(v).ok()
                    }),
                    field(&mut fields, &mut flaws, Tag::HeightEnd, |v| {
                        u64::try_from(v).ok()
                    }),
                );
                let offset = Range::new(
                    field(&mut fields, &mut flaws, Tag::OffsetStart, |v| {
                        u64::try_from(v).ok()
                    }),
                    field(&mut fields, &mut flaws, Tag::OffsetEnd, |v| {
                        u64::try_from(v).ok()
                    }),
                );
                match (amount, cap) {
                    (Some(amount), Some(cap)) => Some(Terms {
                        amount,
                        cap,
                        height,
                        offset,
                    }),
                    _ => {
                        flaws.set(Flaw::TruncatedField);
                        None
                    }
                }
            } else {
                None
            };

            let turbo = Flag::Turbo.take(&mut flags);

            Some(Etching {
                divisibility,
                premine,
                rune,
                spacers,
                symbol,
                terms,
                turbo,
            })
        } else {
            None
        };

        if flags != 0 {
            flaws.set(Flaw::UnrecognizedFlag);
        }

        let mint = match fields.remove(Tag::Mint) {
            Some(values) if values.len() >= 2 => {
                // Block and index, in that order; extra values are ignored.
                match mint_id(values[0], values[1]) {
                    Some(id) => Some(id),
                    None => {
                        flaws.set(Flaw::TruncatedField);
                        None
                    }
                }
            }
            Some(_) => {
                flaws.set(Flaw::TruncatedField);
                None
            }
            None => None,
        };

        let pointer = field(&mut fields, &mut flaws, Tag::Pointer, |value| {
            u32::try_from(value)
                .ok()
                .filter(|pointer| *pointer < output_count)
        });

        if let Some(etching) = &etching {
            if etching.supply().is_none() {
                flaws.set(Flaw::SupplyOverflow);
            }
        }

        if fields.iter().any(|(tag, _)| tag % 2 == 0) {
            flaws.set(Flaw::UnrecognizedEvenTag);
        }

        if flaws.is_empty() {
            Runestone {
                edicts,
                etching,
                mint,
                pointer,
                flaws,
            }
        } else {
            Runestone {
                flaws,
                ..Runestone::default()
            }
        }
    }

    /// Lowers the runestone to its tagged message.
    pub fn to_message(&self) -> Message {
        let mut message = Message::new();

        if let Some(etching) = &self.etching {
            let mut flags = Flag::Etching.mask();
            if etching.terms.is_some() {
                flags |= Flag::Terms.mask();
            }
            if etching.turbo {
                flags |= Flag::Turbo.mask();
            }
            message.add_field(Tag::Flags, flags);

            if let Some(rune) = etching.rune {
                message.add_field(Tag::Rune, rune.0);
            }
            if let Some(divisibility) = etching.divisibility {
                message.add_field(Tag::Divisibility, divisibility.into());
            }
            if let Some(spacers) = etching.spacers {
                message.add_field(Tag::Spacers, spacers.into());
            }
            if let Some(symbol) = etching.symbol {
                message.add_field(Tag::Symbol, u128::from(u32::from(symbol)));
            }
            if let Some(premine) = etching.premine {
                message.add_field(Tag::Premine, premine);
            }
            if let Some(terms) = etching.terms {
                message.add_field(Tag::Amount, terms.amount);
                message.add_field(Tag::Cap, terms.cap);
                if let Some(start) = terms.height.start {
                    message.add_field(Tag::HeightStart, start.into());
                }
                if let Some(end) = terms.height.end {
                    message.add_field(Tag::HeightEnd, end.into());
                }
                if let Some(start) = terms.offset.start {
                    message.add_field(Tag::OffsetStart, start.into());
                }
                if let Some(end) = terms.offset.end {
                    message.add_field(Tag::OffsetEnd, end.into());
                }
            }
        }

        if let Some(mint) = self.mint {
            message.add_field(Tag::Mint, mint.block.into());
            message.add_field(Tag::Mint, mint.index.into());
        }

        if let Some(pointer) = self.pointer {
            message.add_field(Tag::Pointer, pointer.into());
        }

        for edict in &self.edicts {
            message.add_edict(*edict);
        }

        message
    }

    /// Validates the runestone against a transaction with `output_count`
    /// outputs and serializes it to the carrier output script.
    pub fn encipher(&self, output_count: u32) -> Result<Vec<u8>, EncodeError> {
        validate_runestone(self, output_count)?;
        Ok(runestone_script(&encode_message(&self.to_message())))
    }
}

/// Removes `tag` and converts its first value, recording a flaw when the
/// conversion rejects it. Extra values under the tag are dropped.
fn field<T>(
    fields: &mut FieldMap,
    flaws: &mut Flaws,
    tag: Tag,
    convert: impl FnOnce(u128) -> Option<T>,
) -> Option<T> {
    let value = fields.remove(tag)?.into_iter().next()?;
    let converted = convert(value);
    if converted.is_none() {
        flaws.set(Flaw::TruncatedField);
    }
    converted
}

fn mint_id(block: u128, index: u128) -> Option<RuneId> {
    Some(RuneId {
        block: u64::try_from(block).ok()?,
        index: u32::try_from(index).ok()?,
    })
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::codec::script::TxOut;

    fn tx(scripts: Vec<Vec<u8>>) -> Transaction {
        Transaction {
            outputs: scripts
                .into_iter()
                .map(|script_pubkey| TxOut { script_pubkey })
                .collect(),
        }
    }

    fn extract(output_count: u32, integers: &[u128]) -> Runestone {
        let mut message = Message::new();
        let mut i = 0;
        while i < integers.len() {
            message
                .fields
                .push(integers[i], integers[i + 1]);
            i += 2;
        }
        Runestone::from_message(output_count, message)
    }

    #[test]
    fn decipher_mint() {
        let script = runestone_script(&[0x14, 0xd3, 0x01, 0x14, 0x01]);
        let runestone = Runestone::decipher(&tx(vec![vec![0x51], script])).unwrap();
        assert!(!runestone.is_cenotaph());
        assert_eq!(runestone.mint, Some(RuneId::new(211, 1)));
    }

    #[test]
    fn decipher_absent() {
        assert_eq!(Runestone::decipher(&tx(vec![vec![0x51]])), None);
        assert_eq!(Runestone::decipher(&tx(vec![])), None);
    }

    #[test]
    fn decipher_etch_reveal() {
        let rune = Rune::from_name("BESTSCRYPTMINT").unwrap();
        let mut message = Message::new();
        message.add_field(Tag::Flags, 3);
        message.add_field(Tag::Rune, rune.0);
        message.add_field(Tag::Divisibility, 2);
        message.add_field(Tag::Symbol, 0x53);
        message.add_field(Tag::Amount, 100000);
        message.add_field(Tag::Cap, 10000);

        let script = runestone_script(&encode_message(&message));
        let runestone = Runestone::decipher(&tx(vec![script])).unwrap();

        let etching = runestone.etching.unwrap();
        assert_eq!(etching.rune, Some(rune));
        assert_eq!(etching.divisibility, Some(2));
        assert_eq!(etching.symbol, Some('S'));
        assert_eq!(
            etching.terms,
            Some(Terms {
                amount: 100000,
                cap: 10000,
                ..Terms::default()
            })
        );
        assert!(!etching.turbo);
    }

    #[test]
    fn divisibility_out_of_range_is_a_cenotaph() {
        let runestone = extract(1, &[2, 1, 1, 39]);
        assert!(runestone.flaws.contains(Flaw::TruncatedField));
        assert_eq!(runestone.etching, None);
    }

    #[test]
    fn unknown_flag_is_a_cenotaph() {
        let runestone = extract(1, &[2, 1 << 3]);
        assert_eq!(runestone.flaws, Flaw::UnrecognizedFlag.into());

        let runestone = extract(1, &[2, Flag::Cenotaph.mask()]);
        assert_eq!(runestone.flaws, Flaw::UnrecognizedFlag.into());
    }

    #[test]
    fn terms_flag_without_etching_is_a_cenotaph() {
        let runestone = extract(1, &[2, Flag::Terms.mask()]);
        assert!(runestone.flaws.contains(Flaw::UnrecognizedFlag));
    }

    #[test]
    fn unrecognized_even_tag_is_a_cenotaph() {
        let runestone = extract(1, &[126, 0]);
        assert_eq!(runestone.flaws, Flaw::UnrecognizedEvenTag.into());
    }

    #[test]
    fn nop_tag_is_ignored() {
        let runestone = extract(1, &[127, 9000]);
        assert!(!runestone.is_cenotaph());
    }

    #[test]
    fn mint_with_one_value_is_a_cenotaph() {
        let runestone = extract(1, &[20, 211]);
        assert_eq!(runestone.flaws, Flaw::TruncatedField.into());
        assert_eq!(runestone.mint, None);
    }

    #[test]
    fn mint_block_out_of_range_is_a_cenotaph() {
        let mut message = Message::new();
        message.add_field(Tag::Mint, u128::from(u64::MAX) + 1);
        message.add_field(Tag::Mint, 1);
        let runestone = Runestone::from_message(1, message);
        assert_eq!(runestone.flaws, Flaw::TruncatedField.into());
    }

    #[test]
    fn terms_without_cap_is_a_cenotaph() {
        let runestone = extract(1, &[2, 3, 10, 100]);
        assert!(runestone.flaws.contains(Flaw::TruncatedField));
    }

    #[test]
    fn supply_overflow_is_a_cenotaph() {
        let runestone = extract(1, &[2, 3, 6, u128::MAX, 10, u128::MAX, 8, 2]);
        assert!(runestone.flaws.contains(Flaw::SupplyOverflow));
    }

    #[test]
    fn pointer_out_of_range_is_a_cenotaph() {
        let runestone = extract(2, &[22, 2]);
        assert_eq!(runestone.flaws, Flaw::TruncatedField.into());

        let runestone = extract(2, &[22, 1]);
        assert_eq!(runestone.pointer, Some(1));
    }

    #[test]
    fn cenotaph_suppresses_everything() {
        let mut message = Message::new();
        message.add_field(Tag::Flags, 1);
        message.add_field(Tag::Rune, 99);
        message.add_field(Tag::Pointer, 0);
        message.add_field(Tag::Cenotaph, 0);
        message.add_edict(Edict::new(RuneId::new(1, 1), 100, 0));

        let runestone = Runestone::from_message(1, message);
        assert!(runestone.is_cenotaph());
        assert!(runestone.edicts.is_empty());
        assert_eq!(runestone.etching, None);
        assert_eq!(runestone.pointer, None);
    }

    #[test]
    fn opcode_after_magic_is_a_cenotaph() {
        let runestone = Runestone::decipher(&tx(vec![vec![0x6a, 0x5d, 0x87]])).unwrap();
        assert_eq!(runestone.flaws, Flaw::Opcode.into());
    }

    #[test]
    fn encipher_roundtrip() {
        let runestone = Runestone {
            edicts: vec![Edict::new(RuneId::new(211, 1), 25000, 2)],
            etching: Some(Etching {
                divisibility: Some(2),
                premine: Some(1000),
                rune: Some(Rune::from_name("BESTSCRYPTMINT").unwrap()),
                spacers: Some(0b100),
                symbol: Some('S'),
                terms: Some(Terms {
                    amount: 100000,
                    cap: 10000,
                    height: Range::new(Some(840000), None),
                    offset: Range::new(None, Some(1000)),
                }),
                turbo: true,
            }),
            mint: Some(RuneId::new(211, 1)),
            pointer: Some(1),
            flaws: Flaws::default(),
        };

        let script = runestone.encipher(3).unwrap();
        let deciphered = Runestone::decipher(&tx(vec![vec![0x51], vec![0x51], script])).unwrap();
        assert_eq!(deciphered, runestone);
    }

    #[test]
    fn encipher_rejects_invalid_pointer() {
        let runestone = Runestone {
            pointer: Some(3),
            ..Runestone::default()
        };
        assert_eq!(
            runestone.encipher(3),
            Err(EncodeError::PointerOutOfRange {
                pointer: 3,
                output_count: 3
            })
        );
    }

    prop_compose! {
        // Amount, cap, and premine bounded to 64 bits so the supply check
        // cannot trip.
        fn arb_terms()(
            amount in 1u128..=u128::from(u64::MAX),
            cap in 1u128..=u128::from(u64::MAX),
            height_start in prop::option::of(any::<u64>()),
            height_end in prop::option::of(any::<u64>()),
            offset_start in prop::option::of(any::<u64>()),
            offset_end in prop::option::of(any::<u64>()),
        ) -> Terms {
            Terms {
                amount,
                cap,
                height: Range::new(height_start, height_end),
                offset: Range::new(offset_start, offset_end),
            }
        }
    }

    prop_compose! {
        fn arb_etching()(
            divisibility in prop::option::of(0u8..=Etching::MAX_DIVISIBILITY),
            premine in prop::option::of(0u128..=u128::from(u64::MAX)),
            rune in prop::option::of(any::<u128>()),
            spacers in prop::option::of(0u32..=Etching::MAX_SPACERS),
            symbol in prop::option::of(any::<char>()),
            terms in prop::option::of(arb_terms()),
            turbo in any::<bool>(),
        ) -> Etching {
            Etching {
                divisibility,
                premine,
                rune: rune.map(Rune),
                spacers,
                symbol,
                terms,
                turbo,
            }
        }
    }

    prop_compose! {
        fn arb_edict(output_count: u32)(
            block in any::<u64>(),
            index in any::<u32>(),
            amount in any::<u128>(),
            output in 0..=output_count,
        ) -> Edict {
            Edict::new(RuneId::new(block, index), amount, output)
        }
    }

    proptest! {
        #[test]
        fn lower_extract_roundtrip(
            etching in prop::option::of(arb_etching()),
            mint in prop::option::of((any::<u64>(), any::<u32>())),
            pointer in prop::option::of(0u32..4),
            edicts in prop::collection::vec(arb_edict(4), 0..8),
        ) {
            let runestone = Runestone {
                edicts,
                etching,
                mint: mint.map(|(block, index)| RuneId::new(block, index)),
                pointer,
                flaws: Flaws::default(),
            };

            let extracted = Runestone::from_message(4, runestone.to_message());
            prop_assert!(!extracted.is_cenotaph());
            prop_assert_eq!(extracted, runestone);
        }
    }
}
