//! Fixed-point rendering of currency amounts.

use std::str::FromStr;

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Render `amount` with exactly two decimals, rounding half away from zero.
///
/// Near the edge of `Decimal`'s range `rescale` cannot add fractional
/// digits, so missing zeros are padded onto the text.
pub fn format_amount(amount: Decimal) -> String {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    let text = rounded.to_string();
    match rounded.scale() {
        0 => format!("{}.00", text),
        1 => format!("{}0", text),
        _ => text,
    }
}

/// Like [`format_amount`] for a float.
///
/// The float is read through its shortest decimal representation, so
/// `100.005` rounds to `"100.01"` even though the nearest binary value lies
/// slightly below it.
pub fn format_amount_f64(amount: f64) -> String {
    let decimal = Decimal::from_str(&amount.to_string())
        .ok()
        .or_else(|| Decimal::from_f64(amount));
    match decimal {
        Some(d) => format_amount(d),
        None => format!("{:.2}", amount),
    }
}
