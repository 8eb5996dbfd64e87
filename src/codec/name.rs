//! Bijective base-26 rune names and the spacer display overlay.
//!
//! Names are not conventional positional base 26: every digit except the
//! rightmost is offset by one, which makes the mapping bijective. No two
//! names share a value and there is no leading-`A` ambiguity (`"A"` is 0,
//! `"AA"` is 26, not 0).
//!
//! Spacers are display-only. Bit `i` of the mask inserts a separator after
//! the name's `i`-th letter; the overlay never changes the encoded value.

use crate::error::NameError;
use crate::limits::{RESERVED_RUNE_NAME, SPACER};

/// Encodes a name of uppercase letters into its numeric identity.
pub fn encode_name(name: &str) -> Result<u128, NameError> {
    if name.is_empty() {
        return Err(NameError::Empty);
    }
    let last = name.len() - 1;
    let mut value: u128 = 0;
    for (i, c) in name.chars().enumerate() {
        if !c.is_ascii_uppercase() {
            return Err(NameError::InvalidCharacter { character: c });
        }
        let digit = u128::from(c as u8 - b'A');
        let k = (last - i) as u32;
        let contribution = if k == 0 {
            digit
        } else {
            26u128
                .checked_pow(k)
                .and_then(|place| (digit + 1).checked_mul(place))
                .ok_or(NameError::ValueOverflow)?
        };
        value = value
            .checked_add(contribution)
            .ok_or(NameError::ValueOverflow)?;
    }
    Ok(value)
}

/// Decodes a numeric identity back into its name.
///
/// The reserved value `u128::MAX` maps to a fixed name, since the general
/// algorithm would need a 129-bit increment to express it.
pub fn decode_name(value: u128) -> String {
    if value == u128::MAX {
        return RESERVED_RUNE_NAME.into();
    }
    let mut n = value + 1;
    let mut letters = Vec::new();
    while n > 0 {
        letters.push(char::from(b'A' + ((n - 1) % 26) as u8));
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// Inserts a separator after each letter whose bit is set in `spacers`.
///
/// Bits at or beyond the final letter are ignored.
pub fn apply_spacers(name: &str, spacers: u32) -> String {
    let last = name.chars().count().saturating_sub(1);
    let mut spaced = String::with_capacity(name.len() * 2);
    for (i, c) in name.chars().enumerate() {
        spaced.push(c);
        if i < last && i < u32::BITS as usize && spacers & (1 << i) != 0 {
            spaced.push(SPACER);
        }
    }
    spaced
}

/// Recovers the spacer bitmask from a separator-bearing name.
///
/// Exact inverse of [`apply_spacers`] for any legally spaced name (no
/// leading separator, none past the final letter).
pub fn spacers_value(spaced: &str) -> u32 {
    let mut spacers = 0u32;
    let mut seen = 0u32;
    for (i, c) in spaced.chars().enumerate() {
        if c == SPACER {
            if let Some(bit) = (i as u32).checked_sub(1 + seen) {
                if bit < u32::BITS {
                    spacers |= 1 << bit;
                }
            }
            seen += 1;
        }
    }
    spacers
}

/// Drops separators, leaving the bare name.
pub fn strip_spacers(spaced: &str) -> String {
    spaced.chars().filter(|c| *c != SPACER).collect()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn encode_vectors() {
        assert_eq!(encode_name("B"), Ok(1));
        assert_eq!(encode_name("AA"), Ok(26));
        assert_eq!(encode_name("BA"), Ok(52));
        assert_eq!(
            encode_name("AAAAAAAAAAAAAAAAAAAAAAAAAAA"),
            Ok(6402364363415443603228541259936211926)
        );
        assert_eq!(
            encode_name("TTTTTTTTTTTTTTTTTTTT"),
            Ok(15942519116167527321872157899)
        );
    }

    #[test]
    fn decode_vectors() {
        assert_eq!(decode_name(0), "A");
        assert_eq!(decode_name(1), "B");
        assert_eq!(decode_name(26), "AA");
        assert_eq!(decode_name(52), "BA");
        assert_eq!(
            decode_name(6402364363415443603228541259936211926),
            "AAAAAAAAAAAAAAAAAAAAAAAAAAA"
        );
        assert_eq!(
            decode_name(15942519116167527321872157899),
            "TTTTTTTTTTTTTTTTTTTT"
        );
    }

    #[test]
    fn reserved_value_has_fixed_name() {
        assert_eq!(decode_name(u128::MAX), RESERVED_RUNE_NAME);
        assert_eq!(RESERVED_RUNE_NAME.len(), 28);
    }

    #[test]
    fn invalid_names_are_rejected() {
        assert_eq!(encode_name(""), Err(NameError::Empty));
        assert_eq!(
            encode_name("AbC"),
            Err(NameError::InvalidCharacter { character: 'b' })
        );
        assert_eq!(
            encode_name("ZZZZZZZZZZZZZZZZZZZZZZZZZZZZ"),
            Err(NameError::ValueOverflow)
        );
    }

    #[test]
    fn apply_spacers_vectors() {
        assert_eq!(apply_spacers("AAAA", 0), "AAAA");
        assert_eq!(apply_spacers("AAAA", 1), "A\u{2022}AAA");
        assert_eq!(apply_spacers("AAAA", 2), "AA\u{2022}AA");
        assert_eq!(apply_spacers("AAAA", 3), "A\u{2022}A\u{2022}AA");
        assert_eq!(apply_spacers("AAAA", 7), "A\u{2022}A\u{2022}A\u{2022}A");
    }

    #[test]
    fn spacers_value_vectors() {
        assert_eq!(spacers_value("AAAA"), 0);
        assert_eq!(spacers_value("A\u{2022}AAA"), 1);
        assert_eq!(spacers_value("AA\u{2022}AA"), 2);
        assert_eq!(spacers_value("A\u{2022}A\u{2022}AA"), 3);
        assert_eq!(spacers_value("A\u{2022}A\u{2022}A\u{2022}A"), 7);
    }

    #[test]
    fn bits_past_the_name_are_ignored() {
        assert_eq!(apply_spacers("AB", 0b1110), "AB");
        assert_eq!(apply_spacers("AB", 0b1111), "A\u{2022}B");
    }

    #[test]
    fn spaced_names_roundtrip() {
        for spaced in [
            "XXXXXX",
            "AAA\u{2022}DD\u{2022}D\u{2022}FF\u{2022}FSS\u{2022}SD\u{2022}DS",
            "YOU\u{2022}ARE\u{2022}SO\u{2022}PRETTY",
            "ZZZZ\u{2022}ZZZZ\u{2022}ZZZZ\u{2022}ZZZZ\u{2022}TEST\u{2022}TTTT",
            "RUNE\u{2022}MEA\u{2022}BSK\u{2022}GARF",
        ] {
            let name = strip_spacers(spaced);
            let value = encode_name(&name).unwrap();
            assert_eq!(
                apply_spacers(&decode_name(value), spacers_value(spaced)),
                spaced
            );
        }
    }

    proptest! {
        #[test]
        fn name_roundtrip(name in "[A-Z]{1,26}") {
            let value = encode_name(&name).unwrap();
            prop_assert_eq!(decode_name(value), name);
        }

        #[test]
        fn spacer_roundtrip(name in "[A-Z]{2,16}", mask in any::<u32>()) {
            // Restrict the mask to legal positions before checking inversion.
            let legal = mask & ((1u32 << (name.len() - 1)) - 1);
            let spaced = apply_spacers(&name, legal);
            prop_assert_eq!(spacers_value(&spaced), legal);
            prop_assert_eq!(strip_spacers(&spaced), name);
        }
    }
}
