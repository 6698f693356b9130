// In crates/indicators/src/crossover.rs

use core_types::Signal;
use rust_decimal::Decimal;

/// Classifies a crossover by comparing the current short/long indicator
/// pair against the pair persisted by the previous run.
///
/// A Golden Cross requires the short average to have been strictly below
/// the long one and to be strictly above it now; a Dead Cross is the
/// mirror image. Equality on either side never claims a crossover, and a
/// first-ever observation (where callers pass `prev == current`) can
/// therefore never fire.
pub fn detect(short: Decimal, long: Decimal, prev_short: Decimal, prev_long: Decimal) -> Signal {
    if prev_short < prev_long && short > long {
        Signal::GoldenCross
    } else if prev_short > prev_long && short < long {
        Signal::DeadCross
    } else {
        Signal::None
    }
}
