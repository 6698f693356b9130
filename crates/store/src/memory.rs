// In crates/store/src/memory.rs

use crate::{Error, Result, StateStore};
use async_trait::async_trait;
use core_types::{AssetId, AssetState, AssetStatePatch};
use std::collections::HashMap;
use tokio::sync::Mutex;

/// An in-memory `StateStore`.
///
/// Used by tests and `--memory` dry runs; nothing survives the process.
/// Implements exactly the same patch and version semantics as the
/// Postgres store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    assets: Mutex<HashMap<AssetId, AssetState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StateStore for MemoryStore {
    async fn get(&self, asset: &AssetId) -> Result<Option<AssetState>> {
        Ok(self.assets.lock().await.get(asset).cloned())
    }

    async fn put(&self, asset: &AssetId, patch: AssetStatePatch) -> Result<()> {
        let mut assets = self.assets.lock().await;
        let current = assets.get(asset).map(|state| state.version).unwrap_or(0);
        if current != patch.expected_version {
            return Err(Error::VersionConflict {
                asset: asset.to_string(),
                expected: patch.expected_version,
            });
        }
        let state = assets.entry(asset.clone()).or_default();
        patch.apply(state);
        Ok(())
    }
}
