//! Construction-time validation.
//!
//! Decoding tolerates anything and records flaws; encoding does not. These
//! checks run before serialization so a [`Runestone`] that would decode as
//! a cenotaph is rejected with a named error instead of being written.

use crate::error::EncodeError;
use crate::model::{Edict, Etching, Runestone};

/// Checks an etching's field bounds and total supply.
pub fn validate_etching(etching: &Etching) -> Result<(), EncodeError> {
    if let Some(divisibility) = etching.divisibility {
        if divisibility > Etching::MAX_DIVISIBILITY {
            return Err(EncodeError::DivisibilityTooLarge { divisibility });
        }
    }
    if let Some(spacers) = etching.spacers {
        if spacers > Etching::MAX_SPACERS {
            return Err(EncodeError::SpacersTooLarge { spacers });
        }
    }
    if etching.supply().is_none() {
        return Err(EncodeError::SupplyOverflow);
    }
    Ok(())
}

/// Checks that every edict targets an output of a transaction with
/// `output_count` outputs. An output equal to the count is the split-all
/// convention and is allowed.
pub fn validate_edicts(edicts: &[Edict], output_count: u32) -> Result<(), EncodeError> {
    for edict in edicts {
        if edict.output > output_count {
            return Err(EncodeError::EdictOutputOutOfRange {
                output: edict.output,
                output_count,
            });
        }
    }
    Ok(())
}

/// Checks a whole runestone against its carrying transaction shape.
pub fn validate_runestone(runestone: &Runestone, output_count: u32) -> Result<(), EncodeError> {
    if let Some(etching) = &runestone.etching {
        validate_etching(etching)?;
    }
    validate_edicts(&runestone.edicts, output_count)?;
    if let Some(pointer) = runestone.pointer {
        if pointer >= output_count {
            return Err(EncodeError::PointerOutOfRange {
                pointer,
                output_count,
            });
        }
    }
    Ok(())
}
