// In crates/core-types/src/decimal.rs

use rust_decimal::Decimal;

/// Renders `value` with exactly `places` fractional digits.
///
/// Rounding is half-to-even, and the result is zero-padded so downstream
/// consumers always receive fixed-precision strings (e.g. `"100.00000"`
/// for a price at 5 places).
pub fn to_fixed(value: Decimal, places: u32) -> String {
    format!("{:.*}", places as usize, value.round_dp(places))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn pads_to_requested_precision() {
        assert_eq!(to_fixed(dec!(100), 5), "100.00000");
        assert_eq!(to_fixed(dec!(20), 4), "20.0000");
    }

    #[test]
    fn rounds_half_to_even() {
        assert_eq!(to_fixed(dec!(0.000015), 5), "0.00002");
        assert_eq!(to_fixed(dec!(0.000025), 5), "0.00002");
    }

    #[test]
    fn truncation_never_happens_without_rounding() {
        assert_eq!(to_fixed(dec!(1.123456789), 5), "1.12346");
    }
}
