//! Amount normalization and balance aggregation rules.
//!
//! Transaction amounts are signed fixed-point decimals stored at a fixed
//! 18-digit fractional scale. Wallet balances are never stored; they are
//! aggregated live from transaction amounts with exact decimal arithmetic.

pub mod amount;
pub mod balance;

pub use amount::{AMOUNT_SCALE, AmountError, normalize_amount};
pub use balance::{balance_from_aggregate, zero_balance};
