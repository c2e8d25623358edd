//! Field values of a payment slip, with per-field enablement and eager
//! validation. Derived strings are recomputed on every read.

use iban::{Iban, IbanLike};
use serde::{Deserialize, Serialize};

use crate::{
    amount::{self, SplitAmount},
    break_into_blocks,
    code_line::{self, AccountNumber},
    esr::{self, BankingCustomerId, Esr, ReferenceOptions},
    is_digits, left_pad, placeholder, Align, Error, SlipVariant, BANKING_CUST_ID_DEFAULT_LENGTH,
    BANKING_CUST_ID_MAX_LENGTH,
};

const IBAN_ALLOWED_COUNTRIES: [&str; 2] = ["CH", "LI"];
const IBAN_LENGTH: usize = 21;
const RECIPIENT_LINES: usize = 4;
const PAYER_LINES: usize = 5;
const PAYMENT_REASON_LINES: usize = 4;

/// Which fields a slip carries.
///
/// Reading or writing a disabled field fails with
/// [`Error::DisabledFieldAccess`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Fields {
    pub bank: bool,
    pub recipient: bool,
    pub account_number: bool,
    /// Disabled when the payer fills in the amount by hand.
    pub amount: bool,
    pub payer: bool,
    pub reference_number: bool,
    pub banking_customer_id: bool,
    pub iban: bool,
    pub payment_reason: bool,
}

impl Fields {
    pub fn for_variant(variant: SlipVariant) -> Self {
        let orange = variant == SlipVariant::Orange;
        Self {
            bank: true,
            recipient: true,
            account_number: true,
            amount: true,
            payer: true,
            reference_number: orange,
            banking_customer_id: false,
            iban: !orange,
            payment_reason: !orange,
        }
    }
}

impl Default for Fields {
    fn default() -> Self {
        Self::for_variant(SlipVariant::default())
    }
}

/// Field values of one payment slip.
///
/// Setters validate eagerly, so the derived strings (complete reference
/// number, code line) are computed from valid data on every read. On a
/// not-for-payment slip the getters of account, amount, reference number,
/// banking customer ID and IBAN return `X` placeholders instead.
#[derive(Debug, Clone)]
pub struct PaymentSlipData {
    variant: SlipVariant,
    fields: Fields,
    not_for_payment: bool,
    bank_name: String,
    bank_city: String,
    recipient_lines: Vec<String>,
    account_number: Option<AccountNumber>,
    amount: Option<f64>,
    payer_lines: Vec<String>,
    reference_number: Option<String>,
    banking_customer_id: String,
    banking_customer_id_length: usize,
    iban: Option<Iban>,
    payment_reason_lines: Vec<String>,
}

impl Default for PaymentSlipData {
    fn default() -> Self {
        Self::new(SlipVariant::default())
    }
}

macro_rules! ensure_enabled {
    ($self:ident, $field:ident) => {
        if !$self.fields.$field {
            return Err(Error::DisabledFieldAccess(stringify!($field)));
        }
    };
}

fn collect_lines<I, S>(lines: I, field: &'static str, max: usize) -> Result<Vec<String>, Error>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let lines: Vec<String> = lines.into_iter().map(Into::into).collect();
    if lines.len() > max {
        return Err(Error::TooManyLines { field, max });
    }
    Ok(lines)
}

fn check_reference_fits(
    variant: SlipVariant,
    fields: &Fields,
    reference_len: usize,
    customer_id_len: usize,
) -> Result<(), Error> {
    if !fields.reference_number {
        return Ok(());
    }
    let max = variant.max_reference_length();
    let actual = reference_len + if fields.banking_customer_id { customer_id_len } else { 0 };
    if actual > max {
        return Err(Error::ReferenceNumberLength { max, actual });
    }
    Ok(())
}

impl PaymentSlipData {
    pub fn new(variant: SlipVariant) -> Self {
        Self {
            variant,
            fields: Fields::for_variant(variant),
            not_for_payment: false,
            bank_name: String::new(),
            bank_city: String::new(),
            recipient_lines: vec![],
            account_number: None,
            amount: None,
            payer_lines: vec![],
            reference_number: None,
            banking_customer_id: String::new(),
            banking_customer_id_length: BANKING_CUST_ID_DEFAULT_LENGTH,
            iban: None,
            payment_reason_lines: vec![],
        }
    }

    pub fn variant(&self) -> SlipVariant {
        self.variant
    }

    /// Switches the slip type and resets the enabled fields to the defaults
    /// of `variant`. Values of fields that stay enabled are kept.
    pub fn set_variant(&mut self, variant: SlipVariant) -> Result<&mut Self, Error> {
        let fields = Fields::for_variant(variant);
        let customer_id_len = self.banking_customer_id_length;
        check_reference_fits(variant, &fields, self.reference_len(), customer_id_len)?;
        self.variant = variant;
        self.fields = fields;
        Ok(self)
    }

    pub fn fields(&self) -> Fields {
        self.fields
    }

    /// Enables or disables fields. Fails if the reference number would no
    /// longer fit next to the banking customer ID.
    pub fn set_fields(&mut self, fields: Fields) -> Result<&mut Self, Error> {
        let customer_id_len = self.banking_customer_id_length;
        check_reference_fits(self.variant, &fields, self.reference_len(), customer_id_len)?;
        self.fields = fields;
        Ok(self)
    }

    pub fn not_for_payment(&self) -> bool {
        self.not_for_payment
    }

    /// Turns the slip into a specimen that cannot be paid.
    pub fn set_not_for_payment(&mut self, not_for_payment: bool) -> &mut Self {
        self.not_for_payment = not_for_payment;
        self
    }

    pub fn set_bank(
        &mut self,
        name: impl Into<String>,
        city: impl Into<String>,
    ) -> Result<&mut Self, Error> {
        ensure_enabled!(self, bank);
        self.bank_name = name.into();
        self.bank_city = city.into();
        Ok(self)
    }

    pub fn bank_name(&self) -> Result<&str, Error> {
        ensure_enabled!(self, bank);
        Ok(&self.bank_name)
    }

    pub fn bank_city(&self) -> Result<&str, Error> {
        ensure_enabled!(self, bank);
        Ok(&self.bank_city)
    }

    pub fn set_recipient_lines<I, S>(&mut self, lines: I) -> Result<&mut Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ensure_enabled!(self, recipient);
        self.recipient_lines = collect_lines(lines, "recipient", RECIPIENT_LINES)?;
        Ok(self)
    }

    pub fn recipient_lines(&self) -> Result<&[String], Error> {
        ensure_enabled!(self, recipient);
        Ok(&self.recipient_lines)
    }

    pub fn set_payer_lines<I, S>(&mut self, lines: I) -> Result<&mut Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ensure_enabled!(self, payer);
        self.payer_lines = collect_lines(lines, "payer", PAYER_LINES)?;
        Ok(self)
    }

    pub fn payer_lines(&self) -> Result<&[String], Error> {
        ensure_enabled!(self, payer);
        Ok(&self.payer_lines)
    }

    pub fn set_payment_reason_lines<I, S>(&mut self, lines: I) -> Result<&mut Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ensure_enabled!(self, payment_reason);
        self.payment_reason_lines = collect_lines(lines, "payment_reason", PAYMENT_REASON_LINES)?;
        Ok(self)
    }

    pub fn payment_reason_lines(&self) -> Result<&[String], Error> {
        ensure_enabled!(self, payment_reason);
        Ok(&self.payment_reason_lines)
    }

    pub fn set_account_number(&mut self, account_number: &str) -> Result<&mut Self, Error> {
        ensure_enabled!(self, account_number);
        self.account_number = Some(account_number.parse()?);
        Ok(self)
    }

    pub fn account_number(&self) -> Result<String, Error> {
        ensure_enabled!(self, account_number);
        if self.not_for_payment {
            return Ok(AccountNumber::PLACEHOLDER.to_string());
        }
        self.account_number
            .as_ref()
            .map(ToString::to_string)
            .ok_or(Error::MissingField("account_number"))
    }

    pub fn set_amount(&mut self, amount: f64) -> Result<&mut Self, Error> {
        ensure_enabled!(self, amount);
        amount::validate(amount)?;
        self.amount = Some(amount);
        Ok(self)
    }

    pub fn amount(&self) -> Result<Option<f64>, Error> {
        ensure_enabled!(self, amount);
        Ok(self.amount)
    }

    /// Francs and cents as printed in the amount boxes.
    pub fn split_amount(&self) -> Result<SplitAmount, Error> {
        ensure_enabled!(self, amount);
        match self.amount {
            Some(value) => amount::split_amount(value, self.not_for_payment),
            None if self.not_for_payment => amount::split_amount(0.0, true),
            None => Err(Error::MissingField("amount")),
        }
    }

    pub fn amount_francs(&self) -> Result<String, Error> {
        Ok(self.split_amount()?.francs)
    }

    pub fn amount_cents(&self) -> Result<String, Error> {
        Ok(self.split_amount()?.cents)
    }

    /// Sets the reference number without check digit and without banking
    /// customer ID.
    pub fn set_reference_number(&mut self, reference_number: &str) -> Result<&mut Self, Error> {
        ensure_enabled!(self, reference_number);
        if !is_digits(reference_number) {
            return Err(Error::InvalidInput(reference_number.to_string()));
        }
        check_reference_fits(
            self.variant,
            &self.fields,
            reference_number.len(),
            self.banking_customer_id_length,
        )?;
        self.reference_number = Some(reference_number.to_string());
        Ok(self)
    }

    pub fn reference_number(&self) -> Result<String, Error> {
        ensure_enabled!(self, reference_number);
        if self.not_for_payment {
            return Ok(placeholder(self.variant.max_reference_length() - self.prefix_len()));
        }
        self.reference_number.clone().ok_or(Error::MissingField("reference_number"))
    }

    pub fn set_banking_customer_id(&mut self, id: &str) -> Result<&mut Self, Error> {
        ensure_enabled!(self, banking_customer_id);
        let id = BankingCustomerId::with_length(id, self.banking_customer_id_length)?;
        self.banking_customer_id = id.id().to_string();
        Ok(self)
    }

    /// Changes the declared customer ID length, usually 6.
    pub fn set_banking_customer_id_length(&mut self, length: usize) -> Result<&mut Self, Error> {
        ensure_enabled!(self, banking_customer_id);
        if length > BANKING_CUST_ID_MAX_LENGTH {
            return Err(Error::BankingCustomerIdLength {
                max: BANKING_CUST_ID_MAX_LENGTH,
                actual: length,
            });
        }
        if self.banking_customer_id.len() > length {
            return Err(Error::BankingCustomerIdLength {
                max: length,
                actual: self.banking_customer_id.len(),
            });
        }
        check_reference_fits(self.variant, &self.fields, self.reference_len(), length)?;
        self.banking_customer_id_length = length;
        Ok(self)
    }

    pub fn banking_customer_id_length(&self) -> Result<usize, Error> {
        ensure_enabled!(self, banking_customer_id);
        Ok(self.banking_customer_id_length)
    }

    /// The customer ID left padded with zeros to its declared length.
    pub fn banking_customer_id(&self) -> Result<String, Error> {
        ensure_enabled!(self, banking_customer_id);
        if self.not_for_payment {
            return Ok(placeholder(self.banking_customer_id_length));
        }
        Ok(left_pad(&self.banking_customer_id, self.banking_customer_id_length, '0'))
    }

    /// The reference number with banking customer ID and check digit.
    pub fn complete_reference_number(
        &self,
        formatted: bool,
        fill_zeros: bool,
    ) -> Result<String, Error> {
        let reference = self.reference_number()?;
        let customer_id = if self.fields.banking_customer_id {
            Some(BankingCustomerId::with_length(
                &self.banking_customer_id,
                self.banking_customer_id_length,
            )?)
        } else {
            None
        };
        let options = ReferenceOptions {
            variant: self.variant,
            not_for_payment: self.not_for_payment,
            formatted,
            fill_zeros,
        };
        esr::compute_complete_reference_number(&reference, customer_id.as_ref(), &options)
    }

    /// The complete reference number read back as an [`Esr`], checking its
    /// check digit. Fails on a not-for-payment slip, whose reference has none.
    pub fn esr(&self) -> Result<Esr, Error> {
        Ok(Esr::try_new(&self.complete_reference_number(false, true)?)?)
    }

    pub fn set_iban(&mut self, iban: &str) -> Result<&mut Self, Error> {
        ensure_enabled!(self, iban);
        let iban: Iban = iban.parse().map_err(|_| Error::InvalidIban)?;
        if !IBAN_ALLOWED_COUNTRIES.contains(&iban.country_code()) {
            return Err(Error::InvalidIban);
        }
        self.iban = Some(iban);
        Ok(self)
    }

    /// The IBAN in blocks of four.
    pub fn iban(&self) -> Result<String, Error> {
        ensure_enabled!(self, iban);
        let electronic = match &self.iban {
            _ if self.not_for_payment => placeholder(IBAN_LENGTH),
            Some(iban) => iban.electronic_str().to_string(),
            None => return Err(Error::MissingField("iban")),
        };
        Ok(break_into_blocks(&electronic, 4, Align::Left))
    }

    /// The OCR code line. Requires reference number and account number.
    pub fn code_line(&self, fill_zeros: bool) -> Result<String, Error> {
        ensure_enabled!(self, account_number);
        let complete_reference = self.complete_reference_number(false, fill_zeros)?;
        let amount = if !self.fields.amount {
            None
        } else if self.not_for_payment {
            Some(self.amount.unwrap_or_default())
        } else {
            Some(self.amount.ok_or(Error::MissingField("amount"))?)
        };
        code_line::compute_code_line(
            amount,
            &complete_reference,
            self.account_number.as_ref(),
            self.not_for_payment,
            fill_zeros,
        )
    }

    fn reference_len(&self) -> usize {
        self.reference_number.as_ref().map_or(0, String::len)
    }

    fn prefix_len(&self) -> usize {
        if self.fields.banking_customer_id {
            self.banking_customer_id_length
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[fixture]
    fn orange() -> PaymentSlipData {
        let mut slip = PaymentSlipData::new(SlipVariant::Orange);
        slip.set_fields(Fields { banking_customer_id: true, ..Fields::default() }).unwrap();
        slip.set_account_number("01-145-6")
            .unwrap()
            .set_amount(2830.50)
            .unwrap()
            .set_reference_number("7520033455900012")
            .unwrap()
            .set_banking_customer_id("215703")
            .unwrap();
        slip
    }

    fn specimen_code_line() -> String {
        format!("{}>{}+ {}>", "X".repeat(13), "X".repeat(27), "X".repeat(9))
    }

    #[rstest]
    fn orange_defaults() {
        let slip = PaymentSlipData::default();
        assert_eq!(slip.variant(), SlipVariant::Orange);
        assert!(slip.fields().reference_number);
        assert!(!slip.fields().banking_customer_id);
        assert!(!slip.fields().iban);
        assert!(!slip.not_for_payment());
    }

    #[rstest]
    fn orange_slip(orange: PaymentSlipData) {
        assert_eq!(orange.amount_francs().unwrap(), "2830");
        assert_eq!(orange.amount_cents().unwrap(), "50");
        assert_eq!(orange.banking_customer_id().unwrap(), "215703");
        assert_eq!(
            orange.complete_reference_number(true, true).unwrap(),
            "21 57030 00075 20033 45590 00126",
        );
        assert_eq!(
            orange.code_line(true).unwrap(),
            "0100002830509>215703000075200334559000126+ 010001456>",
        );
    }

    #[rstest]
    fn without_customer_id(mut orange: PaymentSlipData) {
        orange.set_fields(Fields::default()).unwrap();
        assert_eq!(
            orange.complete_reference_number(true, true).unwrap(),
            "00 00000 00075 20033 45590 00129",
        );
        assert_eq!(
            orange.banking_customer_id(),
            Err(Error::DisabledFieldAccess("banking_customer_id")),
        );
    }

    #[rstest]
    fn without_amount(mut orange: PaymentSlipData) {
        orange.set_fields(Fields { amount: false, ..Fields::default() }).unwrap();
        orange.set_reference_number("123456789").unwrap();
        assert_eq!(orange.code_line(true).unwrap(), "042>000000000000000001234567894+ 010001456>");
        assert_eq!(orange.amount(), Err(Error::DisabledFieldAccess("amount")));
        assert_eq!(orange.set_amount(1.0).err(), Some(Error::DisabledFieldAccess("amount")));
    }

    #[rstest]
    fn not_for_payment(mut orange: PaymentSlipData) {
        orange.set_not_for_payment(true);
        assert_eq!(orange.account_number().unwrap(), "XX-XXXXXX-X");
        assert_eq!(orange.amount_francs().unwrap(), "XXXXXXXX");
        assert_eq!(orange.amount_cents().unwrap(), "XX");
        assert_eq!(orange.banking_customer_id().unwrap(), "XXXXXX");
        assert_eq!(orange.reference_number().unwrap(), "X".repeat(20));
        assert_eq!(orange.complete_reference_number(false, true).unwrap(), "X".repeat(27));
        assert_eq!(
            orange.complete_reference_number(true, true).unwrap(),
            "XX XXXXX XXXXX XXXXX XXXXX XXXXX",
        );
        assert_eq!(orange.code_line(true).unwrap(), specimen_code_line());
    }

    #[rstest]
    fn reads_back_as_esr(mut orange: PaymentSlipData) {
        let esr = orange.esr().unwrap();
        assert_eq!(esr.to_raw(), "215703000075200334559000126");
        assert_eq!(esr.to_string(), "21 57030 00075 20033 45590 00126");

        orange.set_not_for_payment(true);
        assert_eq!(orange.esr(), Err(Error::Esr(esr::Error::InvalidFormat)));
    }

    #[rstest]
    fn not_for_payment_without_values() {
        let mut slip = PaymentSlipData::default();
        slip.set_not_for_payment(true);
        assert_eq!(slip.complete_reference_number(false, true).unwrap(), "X".repeat(27));
        assert_eq!(slip.code_line(true).unwrap(), specimen_code_line());
    }

    #[rstest]
    fn missing_values() {
        let slip = PaymentSlipData::default();
        assert_eq!(slip.account_number(), Err(Error::MissingField("account_number")));
        assert_eq!(slip.amount_francs(), Err(Error::MissingField("amount")));
        assert_eq!(slip.reference_number(), Err(Error::MissingField("reference_number")));
        assert_eq!(slip.code_line(true), Err(Error::MissingField("reference_number")));
    }

    #[rstest]
    fn reference_too_long_for_customer_id(mut orange: PaymentSlipData) {
        assert_eq!(
            orange.set_reference_number(&"1".repeat(21)).err(),
            Some(Error::ReferenceNumberLength { max: 26, actual: 27 }),
        );
        orange.set_reference_number(&"1".repeat(20)).unwrap();
        assert_eq!(
            orange.set_banking_customer_id_length(7).err(),
            Some(Error::ReferenceNumberLength { max: 26, actual: 27 }),
        );
    }

    #[rstest]
    fn enabling_customer_id_rechecks_reference() {
        let mut slip = PaymentSlipData::default();
        slip.set_reference_number(&"1".repeat(26)).unwrap();
        assert_eq!(
            slip.set_fields(Fields { banking_customer_id: true, ..Fields::default() }).err(),
            Some(Error::ReferenceNumberLength { max: 26, actual: 32 }),
        );
        assert!(!slip.fields().banking_customer_id);
    }

    #[rstest]
    fn customer_id_length(mut orange: PaymentSlipData) {
        assert_eq!(
            orange.set_banking_customer_id("1234567").err(),
            Some(Error::BankingCustomerIdLength { max: 6, actual: 7 }),
        );
        assert_eq!(
            orange.set_banking_customer_id_length(5).err(),
            Some(Error::BankingCustomerIdLength { max: 5, actual: 6 }),
        );
        assert_eq!(
            orange.set_banking_customer_id_length(11).err(),
            Some(Error::BankingCustomerIdLength { max: 10, actual: 11 }),
        );
        orange.set_banking_customer_id_length(8).unwrap();
        assert_eq!(orange.banking_customer_id().unwrap(), "00215703");
        assert_eq!(orange.complete_reference_number(false, true).unwrap().len(), 27);
    }

    #[rstest]
    fn invalid_inputs(mut orange: PaymentSlipData) {
        assert_eq!(
            orange.set_account_number("011456").err(),
            Some(Error::InvalidAccountFormat("011456".into())),
        );
        assert!(matches!(orange.set_reference_number("12a"), Err(Error::InvalidInput(_))));
        assert!(matches!(orange.set_amount(-5.0), Err(Error::InvalidAmount(_))));
        assert_eq!(
            orange.set_payer_lines(["1", "2", "3", "4", "5", "6"]).err(),
            Some(Error::TooManyLines { field: "payer", max: 5 }),
        );
    }

    #[rstest]
    fn red_slip() -> anyhow::Result<()> {
        let mut slip = PaymentSlipData::new(SlipVariant::Red);
        slip.set_iban("CH3808888123456789012")?
            .set_payment_reason_lines(["Invoice 42", "March"])?
            .set_account_number("80-470-3")?;
        assert_eq!(slip.iban()?, "CH38 0888 8123 4567 8901 2");
        assert_eq!(slip.payment_reason_lines()?, ["Invoice 42", "March"]);
        assert_eq!(slip.reference_number(), Err(Error::DisabledFieldAccess("reference_number")));
        assert_eq!(slip.code_line(true), Err(Error::DisabledFieldAccess("reference_number")));

        slip.set_not_for_payment(true);
        assert_eq!(slip.iban()?, "XXXX XXXX XXXX XXXX XXXX X");
        Ok(())
    }

    #[rstest]
    #[case("DE89370400440532013000")]
    #[case("CH38 0888 8123 4567 8901 3")]
    #[case("not an iban")]
    fn rejected_ibans(#[case] iban: &str) {
        let mut slip = PaymentSlipData::new(SlipVariant::Red);
        assert_eq!(slip.set_iban(iban).err(), Some(Error::InvalidIban));
    }

    #[rstest]
    fn switching_variant(mut orange: PaymentSlipData) -> anyhow::Result<()> {
        orange.set_bank("PostFinance", "Bern")?;
        orange.set_variant(SlipVariant::Red)?;
        assert_eq!(orange.fields(), Fields::for_variant(SlipVariant::Red));
        assert_eq!(orange.bank_name()?, "PostFinance");
        assert_eq!(orange.bank_city()?, "Bern");
        assert!(orange.recipient_lines()?.is_empty());
        assert_eq!(orange.set_iban("CH3808888123456789012").map(|_| ()), Ok(()));

        orange.set_variant(SlipVariant::Orange)?;
        assert_eq!(orange.reference_number()?, "7520033455900012");
        assert_eq!(orange.iban(), Err(Error::DisabledFieldAccess("iban")));
        Ok(())
    }

    #[rstest]
    fn fields_from_config() -> anyhow::Result<()> {
        let config = r#"{ "amount": false, "banking_customer_id": true }"#;
        let fields: Fields = serde_json::from_str(config)?;
        assert!(!fields.amount);
        assert!(fields.banking_customer_id);
        assert!(fields.reference_number);
        Ok(())
    }
}
