//! The untyped intermediate form of a runestone: an ordered tag multimap,
//! a list of edicts, and the flaws recorded while decoding.

use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};

use lazy_static::lazy_static;

use crate::model::Edict;

/// Field tags of the tagged message format.
///
/// Even tags carry data the protocol must understand; a leftover even tag
/// after extraction voids the message. Odd tags are ignorable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Tag {
    /// Switches the remaining integers into edict groups.
    Body = 0,
    Flags = 2,
    Rune = 4,
    Premine = 6,
    Cap = 8,
    Amount = 10,
    HeightStart = 12,
    HeightEnd = 14,
    OffsetStart = 16,
    OffsetEnd = 18,
    Mint = 20,
    Pointer = 22,
    /// Reserved even tag; never written, voids the message when read.
    Cenotaph = 126,

    Divisibility = 1,
    Spacers = 3,
    Symbol = 5,
    /// Reserved odd tag; ignored when read.
    Nop = 127,
}

impl Tag {
    /// Every defined tag, in wire-value order.
    pub const ALL: [Tag; 17] = [
        Tag::Body,
        Tag::Divisibility,
        Tag::Flags,
        Tag::Spacers,
        Tag::Rune,
        Tag::Symbol,
        Tag::Premine,
        Tag::Cap,
        Tag::Amount,
        Tag::HeightStart,
        Tag::HeightEnd,
        Tag::OffsetStart,
        Tag::OffsetEnd,
        Tag::Mint,
        Tag::Pointer,
        Tag::Cenotaph,
        Tag::Nop,
    ];

    /// Looks up a tag by its wire value.
    pub fn from_value(value: u128) -> Option<Tag> {
        TAG_BY_VALUE.get(&value).copied()
    }
}

impl From<Tag> for u128 {
    fn from(tag: Tag) -> u128 {
        u128::from(tag as u8)
    }
}

lazy_static! {
    /// Wire value to tag lookup table.
    static ref TAG_BY_VALUE: HashMap<u128, Tag> =
        Tag::ALL.iter().map(|&tag| (u128::from(tag), tag)).collect();
}

/// A structural anomaly recorded while decoding.
///
/// Flaws never abort decoding; they accumulate in a [`Flaws`] bitset and
/// mark the decoded runestone as a cenotaph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Flaw {
    /// An edict's output index exceeds the transaction's output count.
    EdictOutput,
    /// An edict's delta-addressed id overflows its range.
    EdictRuneId,
    /// The payload-bearing script failed to decompile.
    InvalidScript,
    /// A non-push opcode followed the magic number.
    Opcode,
    /// The etching's total supply overflows 128 bits.
    SupplyOverflow,
    /// The edict body length is not a multiple of four.
    TrailingIntegers,
    /// A field is missing its value, incomplete, or out of range.
    TruncatedField,
    /// An even tag was present but not consumed by extraction.
    UnrecognizedEvenTag,
    /// The flags field carries bits no known flag claims.
    UnrecognizedFlag,
    /// An on-wire integer failed strict varint decoding.
    Varint,
}

impl Flaw {
    pub const ALL: [Flaw; 10] = [
        Flaw::EdictOutput,
        Flaw::EdictRuneId,
        Flaw::InvalidScript,
        Flaw::Opcode,
        Flaw::SupplyOverflow,
        Flaw::TrailingIntegers,
        Flaw::TruncatedField,
        Flaw::UnrecognizedEvenTag,
        Flaw::UnrecognizedFlag,
        Flaw::Varint,
    ];

    fn mask(self) -> u32 {
        1 << self as u32
    }
}

impl Display for Flaw {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Flaw::EdictOutput => write!(f, "edict output greater than transaction output count"),
            Flaw::EdictRuneId => write!(f, "invalid rune id in edict"),
            Flaw::InvalidScript => write!(f, "invalid script in runestone output"),
            Flaw::Opcode => write!(f, "non-pushdata opcode in runestone output"),
            Flaw::SupplyOverflow => write!(f, "supply overflows 128 bits"),
            Flaw::TrailingIntegers => write!(f, "trailing integers in body"),
            Flaw::TruncatedField => write!(f, "field with missing or out-of-range value"),
            Flaw::UnrecognizedEvenTag => write!(f, "unrecognized even tag"),
            Flaw::UnrecognizedFlag => write!(f, "unrecognized flag"),
            Flaw::Varint => write!(f, "invalid varint"),
        }
    }
}

/// The set of flaws recorded for a message.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Flaws(u32);

impl Flaws {
    pub fn set(&mut self, flaw: Flaw) {
        self.0 |= flaw.mask();
    }

    pub fn contains(self, flaw: Flaw) -> bool {
        self.0 & flaw.mask() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Flaws present, in declaration order.
    pub fn iter(self) -> impl Iterator<Item = Flaw> {
        Flaw::ALL.into_iter().filter(move |flaw| self.contains(*flaw))
    }
}

impl From<Flaw> for Flaws {
    fn from(flaw: Flaw) -> Flaws {
        Flaws(flaw.mask())
    }
}

impl Display for Flaws {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for flaw in self.iter() {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{flaw}")?;
            first = false;
        }
        Ok(())
    }
}

/// Insertion-ordered multimap from wire tags to their values.
///
/// Key order is first-seen order; values under a repeated tag accumulate in
/// insertion order. Both orders are preserved through serialization.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FieldMap {
    entries: Vec<(u128, Vec<u128>)>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a value under `tag`.
    pub fn push(&mut self, tag: u128, value: u128) {
        match self.entries.iter_mut().find(|(t, _)| *t == tag) {
            Some((_, values)) => values.push(value),
            None => self.entries.push((tag, vec![value])),
        }
    }

    /// First value stored under `tag`.
    pub fn first(&self, tag: Tag) -> Option<u128> {
        self.all(tag).and_then(|values| values.first().copied())
    }

    /// All values stored under `tag`, in insertion order.
    pub fn all(&self, tag: Tag) -> Option<&[u128]> {
        let tag = u128::from(tag);
        self.entries
            .iter()
            .find(|(t, _)| *t == tag)
            .map(|(_, values)| values.as_slice())
    }

    /// Removes and returns the values under `tag`. Extraction consumes
    /// fields this way so leftovers can be classified afterwards.
    pub fn remove(&mut self, tag: Tag) -> Option<Vec<u128>> {
        let tag = u128::from(tag);
        let index = self.entries.iter().position(|(t, _)| *t == tag)?;
        Some(self.entries.remove(index).1)
    }

    /// Iterates `(tag, values)` entries in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (u128, &[u128])> {
        self.entries
            .iter()
            .map(|(tag, values)| (*tag, values.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The intermediate representation between the integer sequence and the
/// validated [`Runestone`](crate::model::Runestone).
///
/// Built either by decoding (immutable afterwards) or incrementally with
/// [`add_field`](Message::add_field) and [`add_edict`](Message::add_edict)
/// for later serialization.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Message {
    pub fields: FieldMap,
    pub edicts: Vec<Edict>,
    pub flaws: Flaws,
}

impl Message {
    pub fn new() -> Self {
        Self::default()
    }

    /// A message carrying nothing but flaws.
    pub fn flawed(flaws: Flaws) -> Self {
        Message {
            flaws,
            ..Message::default()
        }
    }

    /// Appends a value under a known tag.
    pub fn add_field(&mut self, tag: Tag, value: u128) {
        self.fields.push(tag.into(), value);
    }

    pub fn add_edict(&mut self, edict: Edict) {
        self.edicts.push(edict);
    }
}
