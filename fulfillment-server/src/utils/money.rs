//! Money calculation utilities using rust_decimal for precision
//!
//! Prices are stored as `REAL`; arithmetic happens on `Decimal` and is
//! rounded to 2 places (half away from zero) before going back to `f64`.

use rust_decimal::prelude::*;

const DECIMAL_PLACES: u32 = 2;

#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    round(value).to_f64().unwrap_or_default()
}

#[inline]
pub fn round(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// `unit_price × quantity`, rounded
pub fn line_total(unit_price: f64, quantity: u32) -> Decimal {
    round(to_decimal(unit_price) * Decimal::from(quantity))
}

/// Two-decimal display form (`12.5` → `"12.50"`)
pub fn format(value: Decimal) -> String {
    format!("{:.2}", round(value))
}
