// In crates/engine/src/event.rs

use serde::Deserialize;

/// One inbound batch, as handed to the engine by the host.
#[derive(Debug, Clone, Deserialize)]
pub struct StreamEvent {
    pub records: Vec<StreamRecord>,
}

/// A single stream record wrapping the base64 observation payload.
#[derive(Debug, Clone, Deserialize)]
pub struct StreamRecord {
    pub data: String,
}
