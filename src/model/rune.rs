//! Rune identities: the canonical numeric value and its derived name.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use crate::codec::name::{
    apply_spacers, decode_name, encode_name, spacers_value, strip_spacers,
};
use crate::error::NameError;
use crate::limits::SPACER;

/// The numeric identity of a rune. The name is derived, never stored.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rune(pub u128);

impl Rune {
    /// Encodes an uppercase name into its identity.
    pub fn from_name(name: &str) -> Result<Rune, NameError> {
        Ok(Rune(encode_name(name)?))
    }

    /// The bijective base-26 name for this identity.
    pub fn name(&self) -> String {
        decode_name(self.0)
    }
}

impl Display for Rune {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl FromStr for Rune {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Rune::from_name(s)
    }
}

/// A rune together with its display spacers.
///
/// The spacers are cosmetic; two spaced runes with the same `rune` identify
/// the same token.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpacedRune {
    pub rune: Rune,
    pub spacers: u32,
}

impl SpacedRune {
    pub fn new(rune: Rune, spacers: u32) -> Self {
        Self { rune, spacers }
    }
}

impl Display for SpacedRune {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&apply_spacers(&self.rune.name(), self.spacers))
    }
}

impl FromStr for SpacedRune {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // No leading, trailing, or doubled spacers.
        let mut previous = SPACER;
        for c in s.chars() {
            if c == SPACER && previous == SPACER {
                return Err(NameError::MisplacedSpacer);
            }
            previous = c;
        }
        if previous == SPACER && !s.is_empty() {
            return Err(NameError::MisplacedSpacer);
        }
        Ok(SpacedRune {
            rune: Rune::from_name(&strip_spacers(s))?,
            spacers: spacers_value(s),
        })
    }
}
