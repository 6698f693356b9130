// In crates/indicators/src/lib.rs

use core_types::{IndicatorSet, PricePoint};
use rust_decimal::Decimal;

pub mod crossover;

pub use crossover::detect;

/// Fast window, shared by both indicator families.
pub const SHORT_PERIOD: usize = 50;
/// Slow window, shared by both indicator families.
pub const LONG_PERIOD: usize = 200;
/// Maximum number of points retained in an asset's price history.
pub const PRICE_HISTORY_LIMIT: usize = 500;

/// Appends `point` to `history` and truncates to the most recent
/// `PRICE_HISTORY_LIMIT` entries, oldest evicted first.
///
/// Appending a point identical to the last stored entry (price and
/// timestamp both equal) is a no-op, which makes redelivered records
/// idempotent. Returns the resulting history and its length.
pub fn append_and_bound(
    mut history: Vec<PricePoint>,
    point: PricePoint,
) -> (Vec<PricePoint>, usize) {
    let duplicate = history.last().is_some_and(|last| *last == point);
    if !duplicate {
        history.push(point);
    }
    if history.len() > PRICE_HISTORY_LIMIT {
        let excess = history.len() - PRICE_HISTORY_LIMIT;
        history.drain(..excess);
    }
    let len = history.len();
    (history, len)
}

/// Exponential moving average over `prices`.
///
/// With fewer than `period` prices this falls back to the arithmetic mean
/// of everything given: a deliberate bootstrap rule so a usable value
/// exists before enough history accumulates. Otherwise the accumulator is
/// seeded with the first price and `acc = (p - acc) * m + acc` is applied
/// in order with multiplier `2 / (period + 1)`.
///
/// An empty slice yields zero. The pipeline appends the observation
/// before computing, so it never passes one.
pub fn ema(prices: &[Decimal], period: usize) -> Decimal {
    if prices.is_empty() {
        return Decimal::ZERO;
    }
    if prices.len() < period {
        return mean(prices);
    }
    let multiplier = Decimal::TWO / (Decimal::from(period as u64) + Decimal::ONE);
    let mut acc = prices[0];
    for &price in &prices[1..] {
        acc = (price - acc) * multiplier + acc;
    }
    acc
}

/// Simple moving average: the mean of the last `period` prices, with the
/// same mean-of-everything fallback as `ema` when history is short.
pub fn sma(prices: &[Decimal], period: usize) -> Decimal {
    if prices.is_empty() {
        return Decimal::ZERO;
    }
    if prices.len() < period {
        return mean(prices);
    }
    mean(&prices[prices.len() - period..])
}

/// Computes all four indicator values from a bounded price history.
///
/// The EMA is fed the trailing `period`-sized window so its fallback rule
/// applies relative to that window; the SMA takes the full sequence and
/// applies its own window internally. No intermediate rounding anywhere.
pub fn compute(history: &[PricePoint]) -> IndicatorSet {
    let prices: Vec<Decimal> = history.iter().map(|p| p.price).collect();
    IndicatorSet {
        ema_short: ema(trailing(&prices, SHORT_PERIOD), SHORT_PERIOD),
        ema_long: ema(trailing(&prices, LONG_PERIOD), LONG_PERIOD),
        sma_short: sma(&prices, SHORT_PERIOD),
        sma_long: sma(&prices, LONG_PERIOD),
    }
}

fn trailing(prices: &[Decimal], period: usize) -> &[Decimal] {
    &prices[prices.len().saturating_sub(period)..]
}

fn mean(prices: &[Decimal]) -> Decimal {
    let sum: Decimal = prices.iter().copied().sum();
    sum / Decimal::from(prices.len() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, FixedOffset};
    use rust_decimal_macros::dec;

    fn point(price: Decimal, second: i64) -> PricePoint {
        let base = DateTime::<FixedOffset>::parse_from_rfc3339("2024-05-01T00:00:00+07:00")
            .unwrap();
        PricePoint {
            price,
            at: base + Duration::seconds(second),
        }
    }

    #[test]
    fn short_history_falls_back_to_the_mean() {
        let prices = vec![dec!(10), dec!(20), dec!(40)];
        let expected = dec!(70) / dec!(3);
        assert_eq!(ema(&prices, 50), expected);
        assert_eq!(sma(&prices, 50), expected);
    }

    #[test]
    fn ema_applies_the_recurrence_in_order() {
        // period 3, multiplier 1/2: seed 1, then 1.5, then 2.25.
        let prices = vec![dec!(1), dec!(2), dec!(3)];
        assert_eq!(ema(&prices, 3), dec!(2.25));
    }

    #[test]
    fn sma_uses_only_the_trailing_window() {
        let prices = vec![dec!(100), dec!(1), dec!(2), dec!(3)];
        assert_eq!(sma(&prices, 3), dec!(2));
    }

    #[test]
    fn empty_history_yields_zero() {
        assert_eq!(ema(&[], 50), Decimal::ZERO);
        assert_eq!(sma(&[], 50), Decimal::ZERO);
    }

    #[test]
    fn duplicate_of_last_point_is_not_appended() {
        let (history, len) = append_and_bound(Vec::new(), point(dec!(100), 0));
        assert_eq!(len, 1);
        let (history, len) = append_and_bound(history, point(dec!(100), 0));
        assert_eq!(len, 1);
        // Same price at a new timestamp is a genuine point.
        let (_, len) = append_and_bound(history, point(dec!(100), 60));
        assert_eq!(len, 2);
    }

    #[test]
    fn history_is_bounded_to_the_most_recent_entries() {
        let mut history = Vec::new();
        for i in 0..(PRICE_HISTORY_LIMIT as i64 + 1) {
            let (next, _) = append_and_bound(history, point(Decimal::from(i), i));
            history = next;
        }
        assert_eq!(history.len(), PRICE_HISTORY_LIMIT);
        // The oldest point was evicted; order is preserved.
        assert_eq!(history.first().unwrap().price, dec!(1));
        assert_eq!(
            history.last().unwrap().price,
            Decimal::from(PRICE_HISTORY_LIMIT as i64)
        );
    }

    #[test]
    fn compute_uses_the_window_relative_fallback() {
        // 60 points: the short window is saturated, the long one is not,
        // so ema_long and sma_long both degrade to the overall mean.
        let history: Vec<PricePoint> = (0..60).map(|i| point(dec!(100), i)).collect();
        let set = compute(&history);
        assert_eq!(set.ema_short, dec!(100));
        assert_eq!(set.ema_long, dec!(100));
        assert_eq!(set.sma_short, dec!(100));
        assert_eq!(set.sma_long, dec!(100));
    }
}
