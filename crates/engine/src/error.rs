// In crates/engine/src/error.rs

use thiserror::Error;

/// Why a single record failed.
///
/// Both variants skip the record and leave the rest of the batch alone.
/// Alert-delivery failures are deliberately not represented here: by the
/// time publishing runs the state is already committed, so the record
/// still counts as processed and the batch summary carries the failure.
#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("Failed to decode stream record: {0}")]
    Decode(#[from] decoder::Error),

    #[error("State store failure: {0}")]
    Store(#[from] store::Error),
}
