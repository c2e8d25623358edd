//! Splitting an amount into francs and cents.

use crate::{placeholder, Error};

/// Number of franc digits the code line has room for.
pub const FRANCS_WIDTH: usize = 8;
pub const CENTS_WIDTH: usize = 2;

/// Francs and cents of an amount, ready to be printed into the two amount
/// boxes of a slip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitAmount {
    /// Integer part without padding, or eight placeholders.
    pub francs: String,
    /// Always two characters.
    pub cents: String,
}

impl SplitAmount {
    /// The ten character amount field of the code line.
    pub fn code_line_part(&self) -> String {
        format!("{:0>w$}{}", self.francs, self.cents, w = FRANCS_WIDTH)
    }
}

/// Splits `amount` into francs and cents.
///
/// Cents are rounded to the nearest cent; a rounding carry goes into the
/// francs, so `0.999` becomes `1` franc `00`. Cents are zero padded on the
/// left (`0.05` gives `05`), not on the right, which would print `50` and
/// encode a different amount. On a not-for-payment slip the value is ignored
/// and both parts are placeholders.
pub fn split_amount(amount: f64, not_for_payment: bool) -> Result<SplitAmount, Error> {
    if not_for_payment {
        return Ok(SplitAmount {
            francs: placeholder(FRANCS_WIDTH),
            cents: placeholder(CENTS_WIDTH),
        });
    }
    validate(amount)?;
    let total_cents = (amount * 100.0).round() as u64;
    Ok(SplitAmount {
        francs: (total_cents / 100).to_string(),
        cents: format!("{:02}", total_cents % 100),
    })
}

/// Checks that `amount` fits into the amount boxes of a slip.
pub fn validate(amount: f64) -> Result<(), Error> {
    if !amount.is_finite() || amount < 0.0 || (amount * 100.0).round() >= 1e10 {
        return Err(Error::InvalidAmount(amount.to_string()));
    }
    Ok(())
}
