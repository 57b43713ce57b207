//! Derived-balance aggregation rules.
//!
//! A wallet balance is the live SUM over the amounts of its transactions.
//! The store returns NULL for a SUM over zero rows, and the fallback for
//! that case is the scale-1 zero literal `0.0` - so an empty wallet renders
//! as `"0.0"` while any computed sum keeps the fixed 18-digit scale of the
//! amounts that produced it.

use rust_decimal::Decimal;

/// The balance of a wallet with no transactions.
#[must_use]
pub fn zero_balance() -> Decimal {
    Decimal::new(0, 1)
}

/// Resolves a SUM aggregate into a balance, applying the empty-wallet
/// fallback.
#[must_use]
pub fn balance_from_aggregate(sum: Option<Decimal>) -> Decimal {
    sum.unwrap_or_else(zero_balance)
}
