//! Checkout Example
//!
//! This example walks one card payment through the engine:
//! - Card and billing validation
//! - Fraud screening
//! - Tokenizing the card for storage and fingerprinting it for lookups
//! - Fee computation and receipt
//!
//! # Usage
//!
//! ```bash
//! PAYGUARD_SECRET_KEY=demo-secret cargo run --example checkout
//! ```

use chrono::Datelike;
use payguard_lib::{
    build_receipt, format_currency, generate_reference, mask_card_number, validate_billing_address,
    validate_card, BillingAddress, CardDetails, Currency, PaymentCrypto, PaymentRecord,
    PolicyConfig, Token, Transaction,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;

/// Stored card, keyed by its payment reference.
struct Vault {
    crypto: PaymentCrypto,
    tokens: HashMap<String, Token>,
}

impl Vault {
    fn new(crypto: PaymentCrypto) -> Self {
        Self {
            crypto,
            tokens: HashMap::new(),
        }
    }

    fn store(&mut self, reference: &str, card: &CardDetails) -> payguard_lib::Result<()> {
        let record = PaymentRecord::new()
            .with("card_number", card.number.clone())
            .with("expiry_month", i64::from(card.expiry_month))
            .with("expiry_year", i64::from(card.expiry_year));
        let token = self.crypto.tokenize(&record)?;
        self.tokens.insert(reference.to_string(), token);
        Ok(())
    }

    fn load(&self, reference: &str) -> payguard_lib::Result<Option<PaymentRecord>> {
        self.tokens
            .get(reference)
            .map(|token| self.crypto.detokenize(token))
            .transpose()
    }
}

fn checkout(
    vault: &mut Vault,
    config: &PolicyConfig,
    card: &CardDetails,
    address: &BillingAddress,
    amount: Decimal,
    ip_country: &str,
) -> Result<String, String> {
    let validation = validate_card(card);
    if !validation.valid {
        return Err(validation.errors.join("; "));
    }
    for warning in &validation.warnings {
        println!("  warning: {}", warning);
    }

    if !validate_billing_address(address) {
        return Err("Billing address incomplete".to_string());
    }
    if !config.limits.contains(amount) {
        return Err(format!("Amount {} outside accepted range", amount));
    }

    let transaction = Transaction::new(amount)
        .with_billing_country(address.country.clone())
        .with_ip_country(ip_country);
    let flags = config.fraud.evaluate(&transaction);
    if !flags.is_empty() {
        let names: Vec<&str> = flags.iter().map(|f| f.as_str()).collect();
        return Err(format!("Held for review: {}", names.join(", ")));
    }

    let reference = generate_reference();
    vault.store(&reference, card).map_err(|e| e.to_string())?;

    let fee = config.fees.fee(amount);
    let receipt = build_receipt(&reference, amount, Currency::Usd, Some("buyer@example.com"));
    println!(
        "  charged {} to {} (fee {})",
        format_currency(receipt.amount, receipt.currency.code()),
        mask_card_number(&card.number),
        format_currency(fee, "USD")
    );
    Ok(reference)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let crypto = PaymentCrypto::from_env()?;
    if !crypto.has_secret_key() {
        crypto.set_secret_key("demo-secret")?;
    }
    let mut vault = Vault::new(crypto);
    let config = PolicyConfig::default();
    let next_year = chrono::Utc::now().year() + 1;
    let address = BillingAddress::new("123 Market St", "San Francisco", "CA", "94105", "US");

    println!("Order 1: domestic card");
    let card = CardDetails::new("4532 0151 1283 0366", "123", 9, next_year);
    match checkout(&mut vault, &config, &card, &address, dec!(89.90), "US") {
        Ok(reference) => {
            println!("  approved: {}", reference);
            if let Some(stored) = vault.load(&reference)? {
                println!("  vault holds {:?}", stored);
            }
        }
        Err(reason) => println!("  declined: {}", reason),
    }

    println!("Order 2: mismatched IP country");
    let card = CardDetails::new("5555555555554444", "321", 3, next_year);
    match checkout(&mut vault, &config, &card, &address, dec!(450.00), "RU") {
        Ok(reference) => println!("  approved: {}", reference),
        Err(reason) => println!("  declined: {}", reason),
    }

    println!("Order 3: wrong CVV length for Amex");
    let card = CardDetails::new("378282246310005", "123", 3, next_year);
    match checkout(&mut vault, &config, &card, &address, dec!(20.00), "US") {
        Ok(reference) => println!("  approved: {}", reference),
        Err(reason) => println!("  declined: {}", reason),
    }

    Ok(())
}
