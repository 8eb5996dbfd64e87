//! Etching parameters: the record defining a new rune.

use crate::model::Rune;

/// Feature bits carried in the `Flags` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Flag {
    /// The message carries an etching.
    Etching = 0,
    /// The etching carries open-mint terms.
    Terms = 1,
    /// The etching opts into protocol upgrades.
    Turbo = 2,
    /// Reserved; setting it voids the message.
    Cenotaph = 127,
}

impl Flag {
    pub fn mask(self) -> u128 {
        1u128 << self as u8
    }

    /// Tests and clears this flag's bit, so that leftover unknown bits can
    /// be detected after all recognized flags are taken.
    pub fn take(self, flags: &mut u128) -> bool {
        let mask = self.mask();
        let set = *flags & mask != 0;
        *flags &= !mask;
        set
    }
}

/// A half-open activity window; an absent bound is unbounded on that side.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Range {
    pub start: Option<u64>,
    pub end: Option<u64>,
}

impl Range {
    pub fn new(start: Option<u64>, end: Option<u64>) -> Self {
        Self { start, end }
    }
}

/// Open-mint terms: amount per mint, total cap, and activity windows.
///
/// `height` bounds are absolute block heights; `offset` bounds are relative
/// to the etching height.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Terms {
    pub amount: u128,
    pub cap: u128,
    pub height: Range,
    pub offset: Range,
}

/// Parameters defining a new rune.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Etching {
    pub divisibility: Option<u8>,
    pub premine: Option<u128>,
    pub rune: Option<Rune>,
    pub spacers: Option<u32>,
    pub symbol: Option<char>,
    pub terms: Option<Terms>,
    pub turbo: bool,
}

impl Etching {
    /// Largest permitted divisibility.
    pub const MAX_DIVISIBILITY: u8 = 38;

    /// Largest permitted spacer bitmask (27 positions).
    pub const MAX_SPACERS: u32 = 0b0000_0111_1111_1111_1111_1111_1111_1111;

    /// Total supply: `premine + cap * amount`, or `None` on overflow.
    pub fn supply(&self) -> Option<u128> {
        let premine = self.premine.unwrap_or_default();
        let (cap, amount) = self
            .terms
            .map(|terms| (terms.cap, terms.amount))
            .unwrap_or_default();
        premine.checked_add(cap.checked_mul(amount)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_take_clears_bit() {
        let mut flags = Flag::Etching.mask() | Flag::Turbo.mask();
        assert!(Flag::Etching.take(&mut flags));
        assert!(!Flag::Terms.take(&mut flags));
        assert!(Flag::Turbo.take(&mut flags));
        assert_eq!(flags, 0);
    }

    #[test]
    fn cenotaph_flag_is_the_high_bit() {
        assert_eq!(Flag::Cenotaph.mask(), 1 << 127);
    }

    #[test]
    fn supply_combines_premine_and_terms() {
        let etching = Etching {
            premine: Some(1000),
            terms: Some(Terms {
                amount: 100,
                cap: 10,
                ..Terms::default()
            }),
            ..Etching::default()
        };
        assert_eq!(etching.supply(), Some(2000));
        assert_eq!(Etching::default().supply(), Some(0));
    }

    #[test]
    fn supply_overflow_is_detected() {
        let etching = Etching {
            premine: Some(u128::MAX),
            terms: Some(Terms {
                amount: 2,
                cap: 2,
                ..Terms::default()
            }),
            ..Etching::default()
        };
        assert_eq!(etching.supply(), None);

        let etching = Etching {
            premine: None,
            terms: Some(Terms {
                amount: u128::MAX,
                cap: 2,
                ..Terms::default()
            }),
            ..Etching::default()
        };
        assert_eq!(etching.supply(), None);
    }
}
