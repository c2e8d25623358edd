//! ESR reference numbers: padding, banking customer ID prefix and check
//! digit.

use serde::{Deserialize, Serialize};

use crate::{
    break_into_blocks, is_digits, left_pad, modulo10, Align, SlipVariant,
    BANKING_CUST_ID_DEFAULT_LENGTH, BANKING_CUST_ID_MAX_LENGTH, PLACEHOLDER,
};

/// Width of a complete reference number on the code line.
pub const COMPLETE_LENGTH: usize = 27;

/// An already check-digited reference number, e.g. read back from a slip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Esr {
    number: String,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Length must be between 1 and 27.")]
    InvalidLength,
    #[error("Number must only consist of digits.")]
    InvalidFormat,
    #[error("Checksum is invalid.")]
    InvalidChecksum,
}

impl Esr {
    pub fn try_new(number: &str) -> Result<Self, Error> {
        let number = number.replace(' ', "");
        if number.is_empty() || number.len() > COMPLETE_LENGTH {
            return Err(Error::InvalidLength);
        }
        let number = number.trim_start_matches('0');
        // All zeros is a valid (if useless) reference.
        let number = if number.is_empty() { "0" } else { number };
        if !is_digits(number) {
            return Err(Error::InvalidFormat);
        }
        let (payload, check) = number.split_at(number.len() - 1);
        let expected = modulo10::check_digit(payload).map_err(|_| Error::InvalidFormat)?;
        if check != expected.to_string() {
            return Err(Error::InvalidChecksum);
        }
        Ok(Self { number: number.to_string() })
    }

    /// The digits without leading zeros, check digit included.
    pub fn to_raw(&self) -> String {
        self.number.clone()
    }
}

impl std::fmt::Display for Esr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let number = left_pad(&self.number, COMPLETE_LENGTH, '0');
        f.write_str(&break_into_blocks(&number, 5, Align::Right))
    }
}

/// Identifier a bank puts in front of its customers' reference numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankingCustomerId {
    id: String,
    length: usize,
}

impl BankingCustomerId {
    /// A customer ID with the default declared length of 6.
    pub fn new(id: &str) -> Result<Self, crate::Error> {
        Self::with_length(id, BANKING_CUST_ID_DEFAULT_LENGTH)
    }

    pub fn with_length(id: &str, length: usize) -> Result<Self, crate::Error> {
        if length > BANKING_CUST_ID_MAX_LENGTH {
            return Err(crate::Error::BankingCustomerIdLength {
                max: BANKING_CUST_ID_MAX_LENGTH,
                actual: length,
            });
        }
        if id.len() > length {
            return Err(crate::Error::BankingCustomerIdLength { max: length, actual: id.len() });
        }
        if !is_digits(id) {
            return Err(crate::Error::InvalidInput(id.to_string()));
        }
        Ok(Self { id: id.to_string(), length })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The declared length, which may exceed the length of the ID itself.
    pub fn length(&self) -> usize {
        self.length
    }

    /// The ID left padded with zeros to its declared length.
    pub fn padded(&self) -> String {
        left_pad(&self.id, self.length, '0')
    }
}

/// How [`compute_complete_reference_number`] lays out its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceOptions {
    pub variant: SlipVariant,
    /// Replace the reference by placeholders, without check digit.
    pub not_for_payment: bool,
    /// Group the result in blocks of five, aligned right.
    pub formatted: bool,
    /// Left pad the reference with zeros to the variant's width.
    pub fill_zeros: bool,
}

impl Default for ReferenceOptions {
    fn default() -> Self {
        Self {
            variant: SlipVariant::Orange,
            not_for_payment: false,
            formatted: true,
            fill_zeros: true,
        }
    }
}

/// Builds the reference number as printed on the slip, check digit included.
///
/// A `customer_id` is always zero filled: the reference is padded to the
/// remaining width and the padded ID is put in front of it, giving exactly
/// [`SlipVariant::max_reference_length`] digits. Without a customer ID the
/// reference is padded only when `fill_zeros` is set.
pub fn compute_complete_reference_number(
    reference: &str,
    customer_id: Option<&BankingCustomerId>,
    options: &ReferenceOptions,
) -> Result<String, crate::Error> {
    let max = options.variant.max_reference_length();
    let prefix_len = customer_id.map_or(0, BankingCustomerId::length);
    let actual = reference.chars().count() + prefix_len;
    if actual > max {
        return Err(crate::Error::ReferenceNumberLength { max, actual });
    }

    let complete = if options.not_for_payment {
        let mut placeholder = left_pad(reference, max, PLACEHOLDER);
        placeholder.push(PLACEHOLDER);
        placeholder
    } else if let Some(customer_id) = customer_id {
        let digits = customer_id.padded() + &left_pad(reference, max - customer_id.length(), '0');
        if digits.len() != max || !is_digits(&digits) {
            tracing::warn!(
                reference,
                customer_id = customer_id.id(),
                customer_id_length = customer_id.length(),
                max,
                "reference number with customer ID is malformed"
            );
            return Err(crate::Error::ReferenceNumber(digits));
        }
        modulo10::with_check_digit(&digits)?
    } else if options.fill_zeros {
        modulo10::with_check_digit(&left_pad(reference, max, '0'))?
    } else {
        modulo10::with_check_digit(reference)?
    };

    tracing::debug!(
        variant = ?options.variant,
        with_customer_id = customer_id.is_some(),
        not_for_payment = options.not_for_payment,
        complete = %complete,
        "computed complete reference number"
    );

    Ok(if options.formatted {
        break_into_blocks(&complete, 5, Align::Right)
    } else {
        complete
    })
}
