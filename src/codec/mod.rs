//! Wire codecs: varints, names, tagged messages, scripts, and envelopes.

pub mod envelope;
pub mod message;
pub mod name;
pub mod script;
pub mod varint;
