use crate::core::currency::{CurrencyCode, RateTable};
use rust_decimal::{Decimal, RoundingStrategy};

pub const SIGNIFICANT_DIGITS: u32 = 4;
const MIN_FRACTION_DIGITS: u32 = 4;

/// `rate(target) / rate(base)`, or `None` unless both rates are in the table.
pub fn rate_ratio(
    table: &RateTable,
    base: &CurrencyCode,
    target: &CurrencyCode,
) -> Option<Decimal> {
    let base_rate = table.rate(base)?;
    let target_rate = table.rate(target)?;
    target_rate.checked_div(base_rate)
}

/// Rounds to four significant digits, ties to even.
pub fn round_significant(value: Decimal) -> Decimal {
    value
        .round_sf_with_strategy(SIGNIFICANT_DIGITS, RoundingStrategy::MidpointNearestEven)
        .unwrap_or(value)
}

/// Renders a rounded ratio with at least four fractional digits, e.g. `0.2500`.
pub fn format_ratio(value: Decimal) -> String {
    let mut rendered = value.normalize();
    if rendered.scale() < MIN_FRACTION_DIGITS {
        rendered.rescale(MIN_FRACTION_DIGITS);
    }
    rendered.to_string()
}
