//! Money helpers
//!
//! All amounts are `rust_decimal::Decimal` with 2 decimal places.

use rust_decimal::prelude::*;
use shared::models::Conjunction;

/// Monetary precision
pub const DECIMAL_PLACES: u32 = 2;

/// Currency used when none is configured
pub const DEFAULT_CURRENCY: &str = "USD";

/// Round half away from zero to 2 decimal places (display and totals)
#[inline]
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Truncate to 2 decimal places (benefit line discounts never round up)
#[inline]
pub fn round_down(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::ToZero)
}

/// Format an amount with its currency symbol, e.g. `$5.00`
pub fn format_currency(amount: Decimal, currency: &str) -> String {
    let rounded = round_half_up(amount);
    let symbol = match currency.to_ascii_uppercase().as_str() {
        "USD" | "CAD" | "AUD" => "$",
        "EUR" => "€",
        "GBP" => "£",
        "JPY" => "¥",
        _ => return format!("{:.2} {}", rounded, currency),
    };
    if rounded.is_sign_negative() {
        format!("-{}{:.2}", symbol, rounded.abs())
    } else {
        format!("{}{:.2}", symbol, rounded)
    }
}

/// Join strings with " and " / " or ", falling back to `empty` for no input
pub fn human_readable_conjoin(
    conjunction: Conjunction,
    strings: &[String],
    empty: Option<&str>,
) -> String {
    if strings.is_empty()
        && let Some(empty) = empty
    {
        return empty.to_string();
    }
    strings.join(&format!(" {} ", conjunction.word()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_down_truncates() {
        assert_eq!(round_down(Decimal::new(3339, 3)), Decimal::new(333, 2));
        assert_eq!(round_down(Decimal::new(-3339, 3)), Decimal::new(-333, 2));
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(Decimal::new(3335, 3)), Decimal::new(334, 2));
        assert_eq!(round_half_up(Decimal::new(3334, 3)), Decimal::new(333, 2));
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(Decimal::new(5, 0), "USD"), "$5.00");
        assert_eq!(format_currency(Decimal::new(1250, 2), "EUR"), "€12.50");
        assert_eq!(format_currency(Decimal::new(-3, 0), "GBP"), "-£3.00");
        assert_eq!(format_currency(Decimal::new(7, 0), "CHF"), "7.00 CHF");
    }

    #[test]
    fn test_human_readable_conjoin() {
        let items = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        assert_eq!(
            human_readable_conjoin(Conjunction::And, &items, None),
            "a and b and c"
        );
        assert_eq!(human_readable_conjoin(Conjunction::Or, &items[..2], None), "a or b");
        assert_eq!(
            human_readable_conjoin(Conjunction::And, &[], Some("Empty Condition")),
            "Empty Condition"
        );
        assert_eq!(human_readable_conjoin(Conjunction::Or, &[], None), "");
    }
}
