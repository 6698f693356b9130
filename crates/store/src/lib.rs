// In crates/store/src/lib.rs

use async_trait::async_trait;
use core_types::{AssetId, AssetState, AssetStatePatch};

pub mod error;
pub mod memory;
pub mod postgres;

// Re-export the most important types for easy access.
pub use error::{Error, Result};
pub use memory::MemoryStore;
pub use postgres::{PostgresStore, connect};

/// The per-asset state store the engine reads from and writes to.
///
/// `put` applies a field-level partial update: only the populated patch
/// fields change. It is called more than once while processing a single
/// observation (the history/indicator update, then one call per family
/// that crossed), and nothing batches those calls transactionally.
///
/// Writes are conditional on `patch.expected_version` matching the
/// stored version (0 for an asset that was never persisted). A mismatch
/// fails with `Error::VersionConflict` instead of silently overwriting a
/// concurrent writer's state; the caller treats it like any other store
/// failure and skips the record.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Fetches the state for `asset`, or `None` if it was never written.
    async fn get(&self, asset: &AssetId) -> Result<Option<AssetState>>;

    /// Applies `patch` to the stored state for `asset`.
    async fn put(&self, asset: &AssetId, patch: AssetStatePatch) -> Result<()>;
}
