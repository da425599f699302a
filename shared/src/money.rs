//! Money calculation utilities using rust_decimal for precision
//!
//! Amounts travel as `f64` (JSON numbers) but every sum, product and
//! comparison goes through `Decimal`. Rounding to two places happens only
//! when an amount is rendered for display.

use rust_decimal::prelude::*;

use crate::order::OrderError;

/// Decimal places used when rendering amounts
const DECIMAL_PLACES: u32 = 2;

/// Maximum quantity on one line item
pub const MAX_COUNT: f64 = 100_000.0;
/// Maximum unit price on one line item
pub const MAX_PRICE: f64 = 1_000_000.0;
/// Maximum amount paid on one order
pub const MAX_AMOUNT_PAID: f64 = 1_000_000_000_000.0;

/// Convert a validated amount to Decimal.
///
/// Values outside Decimal's range saturate instead of collapsing to zero.
/// Amounts that can fail conversion go through [`checked_decimal`].
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or(if value.is_sign_negative() {
        Decimal::MIN
    } else {
        Decimal::MAX
    })
}

/// Convert an optional amount, treating unset as zero
#[inline]
pub fn to_decimal_or_zero(value: Option<f64>) -> Decimal {
    value.map(to_decimal).unwrap_or(Decimal::ZERO)
}

/// Convert f64 to Decimal, rejecting NaN, infinities and out-of-range values
pub fn checked_decimal(value: f64, field: &'static str) -> Result<Decimal, OrderError> {
    Decimal::from_f64(value).ok_or(OrderError::InvalidAmount { field, value })
}

/// `a * b`, or [`OrderError::AmountOverflow`]
pub fn checked_mul(a: Decimal, b: Decimal, field: &'static str) -> Result<Decimal, OrderError> {
    a.checked_mul(b).ok_or(OrderError::AmountOverflow { field })
}

/// Sum of amounts, or [`OrderError::AmountOverflow`]
pub fn checked_sum(
    values: impl IntoIterator<Item = Decimal>,
    field: &'static str,
) -> Result<Decimal, OrderError> {
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(v))
        .ok_or(OrderError::AmountOverflow { field })
}

/// Convert Decimal back to f64 without rounding
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}

/// Round to two decimal places (half away from zero)
#[inline]
pub fn round_for_display(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Render an amount with exactly two decimals, e.g. `13` -> `"13.00"`
pub fn format_amount(value: f64) -> String {
    match Decimal::from_f64(value) {
        Some(d) => format!("{:.2}", round_for_display(d)),
        None => format!("{:.2}", value),
    }
}

/// Validate that an amount is finite, non-negative and at most `max`
pub fn require_amount(value: f64, field: &'static str, max: f64) -> Result<f64, OrderError> {
    if !value.is_finite() || value < 0.0 {
        return Err(OrderError::InvalidAmount { field, value });
    }
    if value > max {
        return Err(OrderError::AmountTooLarge { field, value, max });
    }
    Ok(value)
}

/// Parse form input into an optional amount.
///
/// Blank input means "not entered yet" and yields `None`.
pub fn parse_amount(input: &str, field: &'static str, max: f64) -> Result<Option<f64>, OrderError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let value = trimmed
        .parse::<f64>()
        .map_err(|_| OrderError::InvalidInput {
            field,
            input: input.to_string(),
        })?;
    require_amount(value, field, max).map(Some)
}
