// In crates/core-types/src/lib.rs

pub mod decimal;
pub mod types;

// Re-export the most important types for easy access from other crates.
pub use decimal::to_fixed;
pub use types::{
    AssetId, AssetState, AssetStatePatch, CrossEntry, IndicatorFamily, IndicatorSet,
    PositionState, PriceObservation, PricePoint, ProfitEntry, Signal,
};
