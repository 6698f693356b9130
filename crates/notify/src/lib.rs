// In crates/notify/src/lib.rs

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use core_types::{AssetId, IndicatorSet, Signal, to_fixed};
use rust_decimal::Decimal;
use serde::Serialize;

pub mod error;

// Re-export public types
pub use error::{Error, Result};

/// The outbound alert message, published once per observation when either
/// indicator family crossed.
///
/// All numeric fields are fixed-precision decimal strings at 5 places;
/// the downstream notification formatter parses them back out of the
/// composite `signal` and `trend_status` strings, so the field shapes
/// here are a wire contract.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendAlert {
    pub coin: String,
    /// Composite, e.g. `"EMA: Golden Cross, SMA: None"`.
    pub signal: String,
    /// Composite, e.g. `"EMA: Buy, SMA: Hold"`.
    pub trend_status: String,
    pub price: String,
    pub ema_short: String,
    pub ema_long: String,
    pub sma_short: String,
    pub sma_long: String,
    pub timestamp: String,
}

impl TrendAlert {
    /// Builds the alert from the observation's unrounded indicator values;
    /// rounding to 5 places happens here, at the publishing boundary.
    pub fn new(
        asset: &AssetId,
        ema_signal: Signal,
        sma_signal: Signal,
        trend_status: &str,
        price: Decimal,
        indicators: &IndicatorSet,
        at: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            coin: asset.0.clone(),
            signal: format!("EMA: {ema_signal}, SMA: {sma_signal}"),
            trend_status: trend_status.to_owned(),
            price: to_fixed(price, 5),
            ema_short: to_fixed(indicators.ema_short, 5),
            ema_long: to_fixed(indicators.ema_long, 5),
            sma_short: to_fixed(indicators.sma_short, 5),
            sma_long: to_fixed(indicators.sma_long, 5),
            timestamp: at.to_rfc3339(),
        }
    }
}

/// The universal interface for an alert channel.
///
/// Delivery is best-effort: by the time an alert is built, the state
/// mutations it reports are already committed, so a failed publish is
/// logged and counted but never retried and never rolls anything back.
#[async_trait]
pub trait AlertPublisher: Send + Sync {
    async fn publish(&self, alert: &TrendAlert) -> Result<()>;
}

/// Publishes alerts as JSON to an HTTP topic endpoint.
#[derive(Debug, Clone)]
pub struct WebhookPublisher {
    client: reqwest::Client,
    topic_url: String,
}

impl WebhookPublisher {
    pub fn new(topic_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            topic_url: topic_url.into(),
        }
    }
}

#[async_trait]
impl AlertPublisher for WebhookPublisher {
    async fn publish(&self, alert: &TrendAlert) -> Result<()> {
        let response = self
            .client
            .post(&self.topic_url)
            .json(alert)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Status(response.status().as_u16()));
        }
        tracing::info!(coin = %alert.coin, signal = %alert.signal, "Alert published.");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn alert_fields_are_fixed_precision_strings() {
        let indicators = IndicatorSet {
            ema_short: dec!(103.923076923),
            ema_long: dec!(101.666666667),
            sma_short: dec!(102),
            sma_long: dec!(101.6666),
        };
        let at = DateTime::parse_from_rfc3339("2024-05-01T19:00:00+07:00").unwrap();
        let alert = TrendAlert::new(
            &AssetId("bitcoin".into()),
            Signal::GoldenCross,
            Signal::None,
            "EMA: Buy, SMA: Hold",
            dec!(200),
            &indicators,
            at,
        );

        assert_eq!(alert.coin, "bitcoin");
        assert_eq!(alert.signal, "EMA: Golden Cross, SMA: None");
        assert_eq!(alert.trend_status, "EMA: Buy, SMA: Hold");
        assert_eq!(alert.price, "200.00000");
        assert_eq!(alert.ema_short, "103.92308");
        assert_eq!(alert.ema_long, "101.66667");
        assert_eq!(alert.sma_short, "102.00000");
        assert_eq!(alert.sma_long, "101.66660");
        assert_eq!(alert.timestamp, "2024-05-01T19:00:00+07:00");
    }

    #[test]
    fn alert_serializes_with_the_wire_field_names() {
        let indicators = IndicatorSet::default();
        let at = DateTime::parse_from_rfc3339("2024-05-01T19:00:00+07:00").unwrap();
        let alert = TrendAlert::new(
            &AssetId("ethereum".into()),
            Signal::None,
            Signal::DeadCross,
            "EMA: Hold, SMA: Sell",
            dec!(3100),
            &indicators,
            at,
        );
        let json = serde_json::to_value(&alert).unwrap();

        assert_eq!(json["coin"], "ethereum");
        assert_eq!(json["signal"], "EMA: None, SMA: Dead Cross");
        assert_eq!(json["price"], "3100.00000");
        assert_eq!(json["timestamp"], "2024-05-01T19:00:00+07:00");
    }
}
