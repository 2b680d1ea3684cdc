//! Price formatting.
//!
//! Catalog prices are plain decimal amounts in the store currency (BRL). They
//! travel as JSON numbers and are held as [`Decimal`] so cart totals never
//! accumulate floating point error.

use rust_decimal::{Decimal, RoundingStrategy};

/// Currency symbol used by the storefront.
pub const CURRENCY_SYMBOL: &str = "R$";

/// Format a price for display (e.g., `R$ 179.90`).
#[must_use]
pub fn format_price(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{CURRENCY_SYMBOL} {rounded:.2}")
}
