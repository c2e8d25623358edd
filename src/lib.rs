//! Data and encoding rules for Swiss payment slips: the orange ISR/BESR slip
//! with reference number and the red ES slip without one.
//!
//! The interesting part is the OCR code line printed at the bottom of an
//! orange slip, see [`code_line::compute_code_line`]. Everything is a pure
//! function of its inputs; [`PaymentSlipData`] holds the field values and
//! recomputes the derived strings on every read.

use serde::{Deserialize, Serialize};

pub mod amount;
pub mod code_line;
pub mod esr;
pub mod modulo10;
mod slip;

pub use amount::SplitAmount;
pub use code_line::AccountNumber;
pub use esr::{BankingCustomerId, ReferenceOptions};
pub use iban::Iban;
pub use slip::{Fields, PaymentSlipData};

/// Maximum reference number width of an orange slip, banking customer ID
/// included.
pub const REFNR_MAX_LENGTH: usize = 26;
/// Maximum reference number width of the base (red) slip layout.
pub const REFNR_BASE_MAX_LENGTH: usize = 20;
/// Upper bound for the declared length of a banking customer ID.
pub const BANKING_CUST_ID_MAX_LENGTH: usize = 10;
/// Declared banking customer ID length unless configured otherwise.
pub const BANKING_CUST_ID_DEFAULT_LENGTH: usize = 6;

/// Character printed instead of data on a not-for-payment (specimen) slip.
pub const PLACEHOLDER: char = 'X';

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("The field `{0}` is disabled on this slip.")]
    DisabledFieldAccess(&'static str),
    #[error("The field `{0}` is enabled but has no value.")]
    MissingField(&'static str),
    #[error("A reference number with customer ID may have at most {max} digits, got {actual}.")]
    ReferenceNumberLength { max: usize, actual: usize },
    #[error("The complete reference number `{0}` is malformed.")]
    ReferenceNumber(String),
    #[error("A banking customer ID may have at most {max} digits, got {actual}.")]
    BankingCustomerIdLength { max: usize, actual: usize },
    #[error("The account number `{0}` must have the form NN-NNNNNN-N.")]
    InvalidAccountFormat(String),
    #[error("Expected only the digits 0-9, found `{0}`.")]
    InvalidInput(String),
    #[error("The amount {0} is negative, not finite or has more than 8 franc digits.")]
    InvalidAmount(String),
    #[error("The field `{field}` has at most {max} lines.")]
    TooManyLines { field: &'static str, max: usize },
    #[error("The IBAN needs to start with CH or LI.")]
    InvalidIban,
    #[error("Invalid ESR reference number: {0}")]
    Esr(#[from] esr::Error),
}

/// The two slip generations.
///
/// Orange slips carry a reference number of up to 26 digits (plus check
/// digit), optionally prefixed by a banking customer ID. The base layout
/// used for red slips caps the reference at 20 digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlipVariant {
    #[default]
    Orange,
    Red,
}

impl SlipVariant {
    pub fn max_reference_length(self) -> usize {
        match self {
            SlipVariant::Orange => REFNR_MAX_LENGTH,
            SlipVariant::Red => REFNR_BASE_MAX_LENGTH,
        }
    }
}

/// Which side the blocks of [`break_into_blocks`] line up with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    /// First block is full, the last one may be short. Used for IBANs.
    Left,
    /// Last block is full, the first one may be short. Used for reference
    /// numbers.
    Right,
}

/// Inserts a space after every `block_size` characters.
pub fn break_into_blocks(unchunked: &str, block_size: usize, align: Align) -> String {
    if block_size == 0 {
        return unchunked.trim().to_string();
    }
    let mut chars: Vec<char> = unchunked.chars().collect();
    if align == Align::Right {
        chars.reverse();
    }
    let blocks = chars
        .chunks(block_size)
        .map(|c| c.iter().collect::<String>())
        .collect::<Vec<String>>()
        .join(" ");
    let blocks = match align {
        Align::Left => blocks,
        Align::Right => blocks.chars().rev().collect(),
    };
    blocks.trim().to_string()
}

/// Pads `s` on the left with `fill` up to `width` characters.
pub(crate) fn left_pad(s: &str, width: usize, fill: char) -> String {
    let len = s.chars().count();
    if len >= width {
        return s.to_string();
    }
    let mut padded: String = std::iter::repeat(fill).take(width - len).collect();
    padded.push_str(s);
    padded
}

pub(crate) fn placeholder(width: usize) -> String {
    std::iter::repeat(PLACEHOLDER).take(width).collect()
}

pub(crate) fn is_digits(s: &str) -> bool {
    s.chars().all(|c| c.is_ascii_digit())
}
