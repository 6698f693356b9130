// In crates/position/src/lib.rs

use chrono::{DateTime, FixedOffset};
use core_types::{
    CrossEntry, IndicatorFamily, PositionState, PricePoint, ProfitEntry, Signal, to_fixed,
};
use rust_decimal::Decimal;

/// What a crossover did to the position.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Golden cross while flat: a simulated position was opened.
    Opened,
    /// Dead cross while holding: the position was closed.
    Closed {
        profit: Decimal,
        profit_pct: Decimal,
    },
    /// The guard rejected the transition; only `cross_history` changed.
    Skipped,
    /// No crossover; nothing was recorded.
    Ignored,
}

/// Applies one detected crossover to a family's position state.
///
/// The two families run this machine independently: a transition here
/// never touches the other family's fields. Every non-`None` signal is
/// appended to `cross_history` whether or not the guard let the
/// transition through.
pub fn apply_cross(
    position: &mut PositionState,
    family: IndicatorFamily,
    signal: Signal,
    price: Decimal,
    at: DateTime<FixedOffset>,
) -> Outcome {
    let outcome = match signal {
        Signal::None => return Outcome::Ignored,
        Signal::GoldenCross => open(position, family, price, at),
        Signal::DeadCross => close(position, family, price, at),
    };
    position.cross_history.push(CrossEntry { price, at, signal });
    outcome
}

/// Golden cross: buy, but only from the Flat state.
fn open(
    position: &mut PositionState,
    family: IndicatorFamily,
    price: Decimal,
    at: DateTime<FixedOffset>,
) -> Outcome {
    if position.holding {
        tracing::info!(%family, %price, "Already holding, skipping buy.");
        return Outcome::Skipped;
    }

    position.golden_cross_history.push(PricePoint { price, at });
    position.num_golden_crosses += 1;
    position.last_golden_cross_price = Some(price);
    position.last_golden_cross_at = Some(at);
    position.holding = true;

    tracing::info!(%family, %price, "Buy signal recorded.");
    Outcome::Opened
}

/// Dead cross: sell and realize profit, but only while holding with a
/// recorded, non-zero buy price.
fn close(
    position: &mut PositionState,
    family: IndicatorFamily,
    price: Decimal,
    at: DateTime<FixedOffset>,
) -> Outcome {
    let buy_price = match position.last_golden_cross_price {
        Some(buy) if position.holding && !buy.is_zero() => buy,
        _ => {
            tracing::info!(%family, %price, "Not holding, skipping sell.");
            return Outcome::Skipped;
        }
    };

    let profit = price - buy_price;
    let profit_pct = profit / buy_price * Decimal::ONE_HUNDRED;

    let dead_entry = PricePoint { price, at };
    position.dead_cross_history.push(dead_entry.clone());
    position.num_dead_crosses += 1;

    let entry = ProfitEntry {
        sequence_no: position.profit_history.len() as u64 + 1,
        profit: to_fixed(profit, 6),
        profit_pct: to_fixed(profit_pct, 4),
        dead_cross_entry: dead_entry,
        golden_cross_entry: position.golden_cross_history.last().cloned(),
    };
    // Newest first.
    position.profit_history.insert(0, entry);

    position.last_dead_cross_price = Some(price);
    position.last_dead_cross_at = Some(at);
    position.realized_profit = Some(profit);
    position.realized_profit_pct = Some(profit_pct);
    position.holding = false;

    tracing::info!(%family, %price, %profit, %profit_pct, "Position closed.");
    Outcome::Closed { profit, profit_pct }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn at(second: i64) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339("2024-05-01T19:00:00+07:00").unwrap()
            + chrono::Duration::seconds(second)
    }

    fn golden(position: &mut PositionState, price: Decimal, second: i64) -> Outcome {
        apply_cross(
            position,
            IndicatorFamily::Ema,
            Signal::GoldenCross,
            price,
            at(second),
        )
    }

    fn dead(position: &mut PositionState, price: Decimal, second: i64) -> Outcome {
        apply_cross(
            position,
            IndicatorFamily::Ema,
            Signal::DeadCross,
            price,
            at(second),
        )
    }

    #[test]
    fn golden_cross_opens_from_flat() {
        let mut position = PositionState::default();
        assert_eq!(golden(&mut position, dec!(100), 0), Outcome::Opened);

        assert!(position.holding);
        assert_eq!(position.num_golden_crosses, 1);
        assert_eq!(position.last_golden_cross_price, Some(dec!(100)));
        assert_eq!(position.golden_cross_history.len(), 1);
        assert_eq!(position.cross_history.len(), 1);
    }

    #[test]
    fn golden_cross_while_holding_is_skipped() {
        let mut position = PositionState::default();
        golden(&mut position, dec!(100), 0);

        assert_eq!(golden(&mut position, dec!(110), 60), Outcome::Skipped);
        // The counter and buy price are untouched, but the cross is still
        // on record.
        assert_eq!(position.num_golden_crosses, 1);
        assert_eq!(position.last_golden_cross_price, Some(dec!(100)));
        assert_eq!(position.cross_history.len(), 2);
    }

    #[test]
    fn dead_cross_closes_and_realizes_profit() {
        let mut position = PositionState::default();
        golden(&mut position, dec!(100), 0);

        let outcome = dead(&mut position, dec!(120), 60);
        assert_eq!(
            outcome,
            Outcome::Closed {
                profit: dec!(20),
                profit_pct: dec!(20),
            }
        );

        assert!(!position.holding);
        assert_eq!(position.num_dead_crosses, 1);
        assert_eq!(position.realized_profit, Some(dec!(20)));
        assert_eq!(position.profit_history.len(), 1);

        let entry = &position.profit_history[0];
        assert_eq!(entry.sequence_no, 1);
        assert_eq!(entry.profit, "20.000000");
        assert_eq!(entry.profit_pct, "20.0000");
        assert_eq!(entry.dead_cross_entry.price, dec!(120));
        assert_eq!(
            entry.golden_cross_entry.as_ref().unwrap().price,
            dec!(100)
        );
    }

    #[test]
    fn dead_cross_while_flat_is_skipped() {
        let mut position = PositionState::default();
        assert_eq!(dead(&mut position, dec!(120), 0), Outcome::Skipped);

        assert_eq!(position.realized_profit, None);
        assert_eq!(position.num_dead_crosses, 0);
        assert!(position.profit_history.is_empty());
        assert_eq!(position.cross_history.len(), 1);
    }

    #[test]
    fn profit_history_is_newest_first() {
        let mut position = PositionState::default();
        golden(&mut position, dec!(100), 0);
        dead(&mut position, dec!(110), 60);
        golden(&mut position, dec!(105), 120);
        dead(&mut position, dec!(126), 180);

        assert_eq!(position.profit_history.len(), 2);
        assert_eq!(position.profit_history[0].sequence_no, 2);
        assert_eq!(position.profit_history[0].profit, "21.000000");
        assert_eq!(position.profit_history[0].profit_pct, "20.0000");
        assert_eq!(position.profit_history[1].sequence_no, 1);
    }

    #[test]
    fn none_signal_records_nothing() {
        let mut position = PositionState::default();
        let outcome = apply_cross(
            &mut position,
            IndicatorFamily::Sma,
            Signal::None,
            dec!(100),
            at(0),
        );
        assert_eq!(outcome, Outcome::Ignored);
        assert_eq!(position, PositionState::default());
    }
}
