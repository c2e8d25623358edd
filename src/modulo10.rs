//! Recursive modulo 10 check digit used on Swiss payment slips.
//!
//! The same primitive protects the reference number and the amount field of
//! the code line.

use crate::Error;

const TABLE: [u8; 10] = [0, 9, 4, 6, 8, 2, 7, 1, 3, 5];

/// Computes the check digit over a string of decimal digits.
///
/// Fails with [`Error::InvalidInput`] if `digits` contains anything other
/// than `0`-`9`. An empty string has the check digit `0`.
pub fn check_digit(digits: &str) -> Result<u8, Error> {
    let mut carry = 0u8;
    for c in digits.chars() {
        let d = c
            .to_digit(10)
            .ok_or_else(|| Error::InvalidInput(digits.to_string()))?;
        carry = TABLE[(carry as usize + d as usize) % 10];
    }
    Ok((10 - carry) % 10)
}

/// Returns `digits` followed by its check digit.
pub fn with_check_digit(digits: &str) -> Result<String, Error> {
    Ok(format!("{digits}{}", check_digit(digits)?))
}
