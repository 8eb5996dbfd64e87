//! Domain model: runes, identifiers, etchings, messages, and runestones.

pub mod etching;
pub mod id;
pub mod message;
pub mod rune;
pub mod runestone;

pub use etching::{Etching, Flag, Range, Terms};
pub use id::{Edict, RuneId};
pub use message::{FieldMap, Flaw, Flaws, Message, Tag};
pub use rune::{Rune, SpacedRune};
pub use runestone::Runestone;
