//! The OCR code line printed at the bottom right of an orange slip.
//!
//! Layout, for amount `2830.50`, reference `215703000075200334559000126` and
//! account `01-145-6`:
//!
//! ```text
//! 01 0000283050 9 > 215703000075200334559000126 +  010001456 >
//! ^  ^          ^   ^                             ^
//! |  amount     |   reference (27)                account (9)
//! type          check digit over type and amount
//! ```
//!
//! Scanning equipment reads this string back, so every width and delimiter
//! is fixed.

use std::sync::OnceLock;

use regex::Regex;

use crate::{amount, esr::COMPLETE_LENGTH, left_pad, modulo10, placeholder, Error};

const TYPE_WITH_AMOUNT: &str = "01";
const TYPE_WITHOUT_AMOUNT: &str = "04";
/// Fixed check digit of [`TYPE_WITHOUT_AMOUNT`].
const CHECK_WITHOUT_AMOUNT: &str = "2";
const ACCOUNT_WIDTH: usize = 9;

/// A postal account number such as `01-145-6`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountNumber {
    number: String,
}

fn account_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[0-9]{2}-[0-9]{1,6}-[0-9]$").expect("account pattern is valid")
    })
}

impl AccountNumber {
    /// The account shown on specimen slips.
    pub const PLACEHOLDER: &'static str = "XX-XXXXXX-X";

    pub fn try_new(number: &str) -> Result<Self, Error> {
        if !account_pattern().is_match(number) {
            return Err(Error::InvalidAccountFormat(number.to_string()));
        }
        Ok(Self { number: number.to_string() })
    }

    pub fn as_str(&self) -> &str {
        &self.number
    }

    /// The account without its two hyphens.
    pub fn digits(&self) -> String {
        self.number.replace('-', "")
    }

    /// Two digit prefix followed by the rest zero filled to seven digits.
    pub fn code_line_part(&self) -> String {
        let digits = self.digits();
        let (prefix, rest) = digits.split_at(2);
        format!("{prefix}{}", left_pad(rest, ACCOUNT_WIDTH - 2, '0'))
    }
}

impl std::str::FromStr for AccountNumber {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_new(s)
    }
}

impl std::fmt::Display for AccountNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.number)
    }
}

/// Assembles the code line.
///
/// `complete_reference` is the unformatted output of
/// [`crate::esr::compute_complete_reference_number`]; with `fill_zeros` it is
/// left padded to 27 characters. `amount` is `None` on slips where the payer
/// fills in the amount.
///
/// On a not-for-payment slip the type, amount, check digit and account are
/// replaced by placeholders and `account` may be `None`. Otherwise a missing
/// account makes the code line unavailable.
pub fn compute_code_line(
    amount: Option<f64>,
    complete_reference: &str,
    account: Option<&AccountNumber>,
    not_for_payment: bool,
    fill_zeros: bool,
) -> Result<String, Error> {
    let (slip_type, amount_part, amount_check) = match amount {
        Some(value) => {
            let amount_part = amount::split_amount(value, not_for_payment)?.code_line_part();
            let check = if not_for_payment {
                placeholder(1)
            } else {
                modulo10::check_digit(&format!("{TYPE_WITH_AMOUNT}{amount_part}"))?.to_string()
            };
            (TYPE_WITH_AMOUNT.to_string(), amount_part, check)
        }
        None => (TYPE_WITHOUT_AMOUNT.to_string(), String::new(), CHECK_WITHOUT_AMOUNT.to_string()),
    };
    let (slip_type, amount_check) = if not_for_payment {
        (placeholder(2), placeholder(1))
    } else {
        (slip_type, amount_check)
    };

    let reference_part = if fill_zeros {
        left_pad(complete_reference, COMPLETE_LENGTH, '0')
    } else {
        complete_reference.to_string()
    };
    let account_part = match account {
        _ if not_for_payment => placeholder(ACCOUNT_WIDTH),
        Some(account) => account.code_line_part(),
        None => return Err(Error::MissingField("account_number")),
    };

    let code_line =
        format!("{slip_type}{amount_part}{amount_check}>{reference_part}+ {account_part}>");
    tracing::debug!(%code_line, not_for_payment, fill_zeros, "computed code line");
    Ok(code_line)
}
