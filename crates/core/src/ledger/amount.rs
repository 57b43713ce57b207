//! Transaction amount validation and normalization.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Amounts are `rust_decimal::Decimal` end to end and are stored at a fixed
//! fractional scale so that equal values always render identically.

use rust_decimal::Decimal;

/// Fractional digits every stored amount carries.
pub const AMOUNT_SCALE: u32 = 18;

/// Maximum digits allowed before the decimal point.
///
/// `Decimal` has a 96-bit significand, so at scale 18 the integral part is
/// capped at 10 digits to keep rescaling lossless.
pub const AMOUNT_MAX_INTEGRAL_DIGITS: u32 = 10;

/// Error types for amount validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    /// More fractional digits than the fixed scale supports.
    #[error("amount has {0} fractional digits, at most 18 are supported")]
    TooManyFractionalDigits(u32),

    /// More integral digits than the fixed-point representation supports.
    #[error("amount has {0} integral digits, at most 10 are supported")]
    TooManyIntegralDigits(u32),
}

/// Validates an amount and rescales it to exactly [`AMOUNT_SCALE`]
/// fractional digits.
///
/// The value itself is unchanged; only trailing zeros are appended, so an
/// input like `10.000000000000000001` round-trips exactly.
///
/// # Errors
///
/// Returns an error if the amount carries more than [`AMOUNT_SCALE`]
/// fractional digits or more than [`AMOUNT_MAX_INTEGRAL_DIGITS`] integral
/// digits.
pub fn normalize_amount(amount: Decimal) -> Result<Decimal, AmountError> {
    if amount.scale() > AMOUNT_SCALE {
        return Err(AmountError::TooManyFractionalDigits(amount.scale()));
    }

    let integral_digits = count_integral_digits(amount);
    if integral_digits > AMOUNT_MAX_INTEGRAL_DIGITS {
        return Err(AmountError::TooManyIntegralDigits(integral_digits));
    }

    let mut normalized = amount;
    normalized.rescale(AMOUNT_SCALE);
    Ok(normalized)
}

/// Counts the digits before the decimal point, ignoring sign.
///
/// Zero counts as zero digits, matching how fixed-point precision limits
/// are usually stated.
fn count_integral_digits(amount: Decimal) -> u32 {
    let integral = amount.abs().trunc();
    if integral.is_zero() {
        return 0;
    }

    let mut mantissa = integral.mantissa().unsigned_abs();
    // trunc() keeps the scale, so strip the fractional zeros first.
    for _ in 0..integral.scale() {
        mantissa /= 10;
    }

    let mut digits = 0;
    while mantissa > 0 {
        mantissa /= 10;
        digits += 1;
    }
    digits
}
