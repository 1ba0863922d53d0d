//! Common utility functions for pricing calculations.
//!
//! This module provides rounding and currency formatting shared by the
//! pricing engine and the views that display its totals.

use rust_decimal::Decimal;

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// This follows standard financial rounding conventions where values at exactly
/// 0.005 are rounded up to 0.01 (away from zero).
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use fence_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(123.454)), dec!(123.45));
/// assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
/// assert_eq!(round_half_up(dec!(-123.455)), dec!(-123.46)); // Away from zero
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}

/// Formats a value as US dollars with thousands separators, e.g. `$13,980.00`.
///
/// Negative amounts are rendered as `-$12.50`.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use fence_core::calculations::common::format_money;
///
/// assert_eq!(format_money(dec!(13980)), "$13,980.00");
/// assert_eq!(format_money(dec!(0.005)), "$0.01");
/// ```
pub fn format_money(value: Decimal) -> String {
    let rounded = round_half_up(value);
    let text = format!("{:.2}", rounded.abs());
    let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}${grouped}.{cents}")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    // =========================================================================
    // round_half_up tests
    // =========================================================================

    #[test]
    fn round_half_up_rounds_down_below_midpoint() {
        let result = round_half_up(dec!(123.454));

        assert_eq!(result, dec!(123.45));
    }

    #[test]
    fn round_half_up_rounds_up_at_midpoint() {
        let result = round_half_up(dec!(123.455));

        assert_eq!(result, dec!(123.46));
    }

    #[test]
    fn round_half_up_handles_negative_values() {
        let result = round_half_up(dec!(-123.455));

        assert_eq!(result, dec!(-123.46)); // Away from zero
    }

    #[test]
    fn round_half_up_handles_large_values() {
        let result = round_half_up(dec!(999999.999));

        assert_eq!(result, dec!(1000000.00));
    }

    // =========================================================================
    // format_money tests
    // =========================================================================

    #[test]
    fn format_money_groups_thousands() {
        assert_eq!(format_money(dec!(1234567.891)), "$1,234,567.89");
    }

    #[test]
    fn format_money_small_values_have_no_separator() {
        assert_eq!(format_money(dec!(700)), "$700.00");
        assert_eq!(format_money(dec!(0)), "$0.00");
    }

    #[test]
    fn format_money_exact_group_boundary() {
        assert_eq!(format_money(dec!(100000)), "$100,000.00");
    }

    #[test]
    fn format_money_negative_amounts() {
        assert_eq!(format_money(dec!(-1500.5)), "-$1,500.50");
    }

    #[test]
    fn format_money_rounds_long_fractions() {
        assert_eq!(format_money(dec!(2700.0000000000000000001)), "$2,700.00");
    }
}
