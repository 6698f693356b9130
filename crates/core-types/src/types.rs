// In crates/core-types/src/types.rs

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The identifier of a tracked asset, e.g. `"bitcoin"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetId(pub String);

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One decoded inbound price observation.
///
/// `at` is the canonical timestamp: the decoder has already converted it
/// to the reporting offset, so every value derived from this observation
/// carries the same offset-qualified timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceObservation {
    pub asset_id: AssetId,
    pub price: Decimal,
    pub at: DateTime<FixedOffset>,
}

/// An entry in an asset's bounded price history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub price: Decimal,
    pub at: DateTime<FixedOffset>,
}

/// A crossover classification for one indicator family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Signal {
    #[serde(rename = "Golden Cross")]
    GoldenCross,
    #[serde(rename = "Dead Cross")]
    DeadCross,
    None,
}

impl Signal {
    pub fn is_cross(self) -> bool {
        !matches!(self, Signal::None)
    }

    /// The Buy/Sell/Hold label this signal contributes to `trend_status`.
    pub fn trend_label(self) -> &'static str {
        match self {
            Signal::GoldenCross => "Buy",
            Signal::DeadCross => "Sell",
            Signal::None => "Hold",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Signal::GoldenCross => "Golden Cross",
            Signal::DeadCross => "Dead Cross",
            Signal::None => "None",
        };
        write!(f, "{label}")
    }
}

/// The two indicator families tracked independently per asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorFamily {
    Ema,
    Sma,
}

impl fmt::Display for IndicatorFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorFamily::Ema => write!(f, "EMA"),
            IndicatorFamily::Sma => write!(f, "SMA"),
        }
    }
}

/// The four moving-average values computed from one price history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSet {
    pub ema_short: Decimal,
    pub ema_long: Decimal,
    pub sma_short: Decimal,
    pub sma_long: Decimal,
}

impl IndicatorSet {
    /// Rounds every value to `places` decimal places (half-to-even).
    /// Applied at the persistence boundary only; intermediate indicator
    /// arithmetic never rounds.
    pub fn round_dp(&self, places: u32) -> Self {
        Self {
            ema_short: self.ema_short.round_dp(places),
            ema_long: self.ema_long.round_dp(places),
            sma_short: self.sma_short.round_dp(places),
            sma_long: self.sma_long.round_dp(places),
        }
    }
}

/// A crossover event as recorded in a family's `cross_history`, kept for
/// every detected cross regardless of whether the position guard let the
/// transition through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossEntry {
    pub price: Decimal,
    pub at: DateTime<FixedOffset>,
    pub signal: Signal,
}

/// One closed round trip (golden cross buy, dead cross sell).
///
/// `profit` and `profit_pct` are fixed-precision strings (6 and 4 decimal
/// places respectively); downstream consumers rely on the exact widths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfitEntry {
    pub sequence_no: u64,
    pub profit: String,
    pub profit_pct: String,
    pub dead_cross_entry: PricePoint,
    pub golden_cross_entry: Option<PricePoint>,
}

/// The buy/hold/sell bookkeeping for one indicator family of one asset.
/// `holding == false` is the Flat state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PositionState {
    pub holding: bool,
    pub last_golden_cross_price: Option<Decimal>,
    pub last_golden_cross_at: Option<DateTime<FixedOffset>>,
    pub last_dead_cross_price: Option<Decimal>,
    pub last_dead_cross_at: Option<DateTime<FixedOffset>>,
    pub golden_cross_history: Vec<PricePoint>,
    pub dead_cross_history: Vec<PricePoint>,
    pub cross_history: Vec<CrossEntry>,
    pub num_golden_crosses: u64,
    pub num_dead_crosses: u64,
    /// Newest first.
    pub profit_history: Vec<ProfitEntry>,
    pub realized_profit: Option<Decimal>,
    pub realized_profit_pct: Option<Decimal>,
}

/// Everything the store persists for one asset.
///
/// Created lazily with `AssetState::default()` on the first observation
/// for an asset; never deleted by the engine. The indicator fields hold
/// the values as persisted (rounded to 5 decimal places), which makes
/// them the `prev_*` inputs of the next observation's crossover check.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetState {
    /// Monotonic write counter; 0 means the asset has never been
    /// persisted. Used for conditional writes.
    pub version: u64,
    pub price_history: Vec<PricePoint>,
    pub num_price_history: u32,
    pub ema_short: Decimal,
    pub ema_long: Decimal,
    pub sma_short: Decimal,
    pub sma_long: Decimal,
    pub last_updated: Option<DateTime<FixedOffset>>,
    /// Composite label, e.g. `"EMA: Hold, SMA: Sell"`.
    pub trend_status: String,
    pub ema_position: PositionState,
    pub sma_position: PositionState,
}

impl AssetState {
    /// The persisted indicator values as a set.
    pub fn indicators(&self) -> IndicatorSet {
        IndicatorSet {
            ema_short: self.ema_short,
            ema_long: self.ema_long,
            sma_short: self.sma_short,
            sma_long: self.sma_long,
        }
    }

    pub fn position(&self, family: IndicatorFamily) -> &PositionState {
        match family {
            IndicatorFamily::Ema => &self.ema_position,
            IndicatorFamily::Sma => &self.sma_position,
        }
    }
}

/// A field-level partial update of an `AssetState`.
///
/// Only the populated fields change; everything else is left untouched.
/// The write is conditional: it applies only when the stored `version`
/// equals `expected_version`, and bumps the version by one.
#[derive(Debug, Clone, Default)]
pub struct AssetStatePatch {
    pub expected_version: u64,
    pub price_history: Option<Vec<PricePoint>>,
    pub num_price_history: Option<u32>,
    pub indicators: Option<IndicatorSet>,
    pub last_updated: Option<DateTime<FixedOffset>>,
    pub trend_status: Option<String>,
    pub ema_position: Option<PositionState>,
    pub sma_position: Option<PositionState>,
}

impl AssetStatePatch {
    pub fn set_position(&mut self, family: IndicatorFamily, position: PositionState) {
        match family {
            IndicatorFamily::Ema => self.ema_position = Some(position),
            IndicatorFamily::Sma => self.sma_position = Some(position),
        }
    }

    /// Applies the patch in place. The caller is responsible for having
    /// checked `expected_version` against the stored state first.
    pub fn apply(self, state: &mut AssetState) {
        state.version = self.expected_version + 1;
        if let Some(history) = self.price_history {
            state.price_history = history;
        }
        if let Some(count) = self.num_price_history {
            state.num_price_history = count;
        }
        if let Some(set) = self.indicators {
            state.ema_short = set.ema_short;
            state.ema_long = set.ema_long;
            state.sma_short = set.sma_short;
            state.sma_long = set.sma_long;
        }
        if let Some(at) = self.last_updated {
            state.last_updated = Some(at);
        }
        if let Some(trend) = self.trend_status {
            state.trend_status = trend;
        }
        if let Some(position) = self.ema_position {
            state.ema_position = position;
        }
        if let Some(position) = self.sma_position {
            state.sma_position = position;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn signal_labels() {
        assert_eq!(Signal::GoldenCross.to_string(), "Golden Cross");
        assert_eq!(Signal::DeadCross.to_string(), "Dead Cross");
        assert_eq!(Signal::None.to_string(), "None");
        assert_eq!(Signal::GoldenCross.trend_label(), "Buy");
        assert_eq!(Signal::DeadCross.trend_label(), "Sell");
        assert_eq!(Signal::None.trend_label(), "Hold");
    }

    #[test]
    fn signal_serializes_with_spaces() {
        let json = serde_json::to_string(&Signal::GoldenCross).unwrap();
        assert_eq!(json, "\"Golden Cross\"");
    }

    #[test]
    fn patch_only_touches_populated_fields() {
        let mut state = AssetState {
            version: 3,
            trend_status: "EMA: Hold, SMA: Hold".into(),
            ..AssetState::default()
        };
        state.ema_short = dec!(9);

        let patch = AssetStatePatch {
            expected_version: 3,
            trend_status: Some("EMA: Buy, SMA: Hold".into()),
            ..AssetStatePatch::default()
        };
        patch.apply(&mut state);

        assert_eq!(state.version, 4);
        assert_eq!(state.trend_status, "EMA: Buy, SMA: Hold");
        // Untouched fields survive.
        assert_eq!(state.ema_short, dec!(9));
        assert!(state.price_history.is_empty());
    }

    #[test]
    fn position_state_deserializes_from_empty_object() {
        let position: PositionState = serde_json::from_str("{}").unwrap();
        assert_eq!(position, PositionState::default());
    }
}
