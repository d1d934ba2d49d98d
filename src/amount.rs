//! Money amounts, counted in the smallest unit of the currency.

use crate::Error;

/// The largest amount that fits in a SQLite integer column.
pub const MAX_AMOUNT: u64 = i64::MAX as u64;

/// Check that `amount` can be stored.
///
/// # Errors
///
/// Returns [Error::Validation] if `amount` is larger than [MAX_AMOUNT].
pub fn check_amount(amount: u64) -> Result<u64, Error> {
    if amount > MAX_AMOUNT {
        return Err(Error::Validation(format!(
            "amount must be at most {MAX_AMOUNT}"
        )));
    }

    Ok(amount)
}
