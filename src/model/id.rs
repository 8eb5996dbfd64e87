//! Rune identifiers and transfer instructions.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Identifies a rune by the transaction that etched it.
///
/// Ordered lexicographically by `(block, index)`, which is also the order
/// edicts are sorted into before delta encoding.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RuneId {
    pub block: u64,
    pub index: u32,
}

impl RuneId {
    pub fn new(block: u64, index: u32) -> Self {
        Self { block, index }
    }

    /// Resolves the next absolute id from a wire delta pair.
    ///
    /// A zero block delta makes the index field a delta as well; a nonzero
    /// block delta makes it absolute. Returns `None` when either component
    /// overflows its range.
    pub fn next(self, block_delta: u128, index_field: u128) -> Option<RuneId> {
        let block_delta = u64::try_from(block_delta).ok()?;
        let block = self.block.checked_add(block_delta)?;
        let index = if block_delta == 0 {
            self.index.checked_add(u32::try_from(index_field).ok()?)?
        } else {
            u32::try_from(index_field).ok()?
        };
        Some(RuneId { block, index })
    }

    /// Wire delta pair from `self` to `next`.
    ///
    /// Callers sort edicts ascending first, so `next` never precedes `self`.
    pub fn delta(self, next: RuneId) -> (u128, u128) {
        let block = u128::from(next.block.saturating_sub(self.block));
        let index = if block == 0 {
            u128::from(next.index.saturating_sub(self.index))
        } else {
            u128::from(next.index)
        };
        (block, index)
    }
}

impl Display for RuneId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.block, self.index)
    }
}

impl FromStr for RuneId {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (block, index) = s.split_once(':').ok_or("missing separator")?;
        Ok(RuneId {
            block: block.parse().map_err(|_| "invalid block")?,
            index: index.parse().map_err(|_| "invalid index")?,
        })
    }
}

/// An instruction moving `amount` of the rune `id` to `output`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edict {
    pub id: RuneId,
    pub amount: u128,
    pub output: u32,
}

impl Edict {
    pub fn new(id: RuneId, amount: u128, output: u32) -> Self {
        Self { id, amount, output }
    }

    /// Builds an edict from a decoded wire group, validating the output
    /// index against the carrying transaction's output count.
    ///
    /// An output equal to the count is allowed: it conventionally divides
    /// the amount between all outputs.
    pub fn from_wire(output_count: u32, id: RuneId, amount: u128, output: u128) -> Option<Edict> {
        let output = u32::try_from(output).ok()?;
        (output <= output_count).then_some(Edict { id, amount, output })
    }
}
