use esrslip::{Fields, PaymentSlipData, SlipVariant};

fn main() -> anyhow::Result<()> {
    // RUST_LOG=debug shows the computed reference numbers and code lines.
    tracing_subscriber::fmt::init();

    let mut slip = PaymentSlipData::new(SlipVariant::Orange);
    slip.set_fields(Fields { banking_customer_id: true, ..Fields::default() })?
        .set_recipient_lines(["Muster AG", "Bahnhofstrasse 5", "8001 Zürich"])?
        .set_account_number("01-145-6")?
        .set_amount(419.68)? // or disable `amount` in the fields
        .set_reference_number("7520033455900012")?
        .set_banking_customer_id("215703")?;

    println!("Amount:    {} {}", slip.amount_francs()?, slip.amount_cents()?);
    println!("Reference: {}", slip.complete_reference_number(true, true)?);
    println!("Code line: {}", slip.code_line(true)?);

    slip.set_not_for_payment(true);
    println!("Specimen:  {}", slip.code_line(true)?);

    Ok(())
}
