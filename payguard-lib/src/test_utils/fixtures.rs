//! Test fixtures and data generators.

use crate::billing::BillingAddress;
use crate::card::{luhn_check_digit, CardType};
use crate::crypto::PaymentRecord;
use rand::Rng;
use rust_decimal_macros::dec;
use serde_json::{json, Value};

/// Passphrase used by tests that need a keyed context.
pub const TEST_SECRET: &str = "payguard-test-secret";

/// Publicly documented test card numbers.
pub struct TestCards;

impl TestCards {
    /// Luhn-valid Visa.
    pub const VISA: &'static str = "4532015112830366";
    /// Luhn-valid Visa, the classic gateway test number.
    pub const VISA_ALT: &'static str = "4111111111111111";
    /// Luhn-valid Mastercard.
    pub const MASTERCARD: &'static str = "5555555555554444";
    /// Luhn-valid American Express.
    pub const AMEX: &'static str = "378282246310005";
    /// Luhn-valid Discover.
    pub const DISCOVER: &'static str = "6011111111111117";
    /// Luhn-valid JCB.
    pub const JCB: &'static str = "3530111333300000";
    /// Visa-shaped but fails the Luhn check.
    pub const INVALID: &'static str = "4000000000000001";

    /// Every valid number with its expected brand.
    pub const VALID: &'static [(&'static str, CardType)] = &[
        (Self::VISA, CardType::Visa),
        (Self::VISA_ALT, CardType::Visa),
        (Self::MASTERCARD, CardType::Mastercard),
        (Self::AMEX, CardType::Amex),
        (Self::DISCOVER, CardType::Discover),
        (Self::JCB, CardType::Jcb),
    ];

    /// A CVV that matches the brand's length.
    pub fn cvv_for(card_type: CardType) -> &'static str {
        match card_type.cvv_length() {
            4 => "1234",
            _ => "123",
        }
    }
}

/// Generate a random Luhn-valid number that starts with `prefix` and has
/// `length` digits in total.
///
/// # Panics
///
/// Panics if `prefix` is not all digits or is not shorter than `length`.
pub fn generate_card_number(prefix: &str, length: usize) -> String {
    assert!(prefix.bytes().all(|b| b.is_ascii_digit()), "prefix must be digits");
    assert!(prefix.len() < length, "prefix must leave room for the check digit");

    let mut rng = rand::thread_rng();
    let mut partial = String::with_capacity(length);
    partial.push_str(prefix);
    while partial.len() < length - 1 {
        partial.push(char::from(b'0' + rng.gen_range(0..10u8)));
    }
    let check = luhn_check_digit(&partial).expect("digits only");
    partial.push(char::from(b'0' + check));
    partial
}

/// A record holding full card details.
pub fn sample_card_record() -> PaymentRecord {
    PaymentRecord::new()
        .with("card_number", TestCards::VISA)
        .with("cvv", "123")
        .with("expiry", "12/2030")
        .with("cardholder", "Jane Q Public")
        .with("amount", dec!(99.99))
}

/// A transaction that raises every fraud indicator.
pub fn risky_transaction() -> Value {
    json!({
        "amount": 15000,
        "billing_country": "US",
        "ip_country": "RU",
        "recent_transaction_count": 8
    })
}

/// A transaction that raises none.
pub fn clean_transaction() -> Value {
    json!({
        "amount": 42.50,
        "billing_country": "US",
        "ip_country": "US",
        "recent_transaction_count": 1
    })
}

/// A valid US billing address.
pub fn sample_address() -> BillingAddress {
    BillingAddress::new("123 Market St", "San Francisco", "CA", "94105", "US")
}

/// A valid monthly subscription descriptor.
pub fn sample_subscription() -> Value {
    json!({
        "amount": 19.99,
        "interval": "month",
        "currency": "USD",
        "customer_id": "cus_test_001"
    })
}
