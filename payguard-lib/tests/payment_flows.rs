//! End-to-end behavior of the public API.

mod common;

use chrono::{Datelike, Utc};
use common::{card_record, keyed_crypto};
use payguard_lib::test_utils::{
    assert_malformed, assert_token_hides, clean_transaction, risky_transaction,
    sample_address, sample_subscription, TestCards,
};
use payguard_lib::{
    build_receipt, calculate_fee, check_fraud_indicators, classify_card, format_currency,
    generate_reference, validate_amount, validate_billing_address,
    validate_billing_address_json, validate_card, validate_card_number, validate_cvv,
    validate_expiry, validate_subscription_payment, CardDetails, CardType, Currency,
    FraudIndicator, PaymentCrypto, PaymentError, PaymentErrorCode, PaymentRecord,
    PolicyConfig, Token,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::json;
use std::collections::BTreeSet;

#[test]
fn known_cards_pass_luhn_and_fail_when_last_digit_changes() {
    for &(card, _) in TestCards::VALID {
        assert!(validate_card_number(card), "{card}");

        let last = card.as_bytes()[card.len() - 1] - b'0';
        let changed = (last + 9) % 10;
        let altered = format!("{}{}", &card[..card.len() - 1], changed);
        assert!(!validate_card_number(&altered), "{altered}");
    }
}

#[test]
fn known_cards_classify_by_brand() {
    assert_eq!(classify_card("4111111111111111"), CardType::Visa);
    assert_eq!(classify_card("5555555555554444"), CardType::Mastercard);
    assert_eq!(classify_card("378282246310005"), CardType::Amex);
    assert_eq!(classify_card("6011111111111117"), CardType::Discover);
    assert_eq!(classify_card("9999999999999995"), CardType::Unknown);
}

#[test]
fn expiry_rules_relative_to_today() {
    let year = Utc::now().year();
    assert!(!validate_expiry(13, year + 1));
    assert!(!validate_expiry(0, year + 1));
    assert!(!validate_expiry(12, year - 1));
    assert!(validate_expiry(12, year + 1));
    assert!(validate_expiry(Utc::now().month() as i32, year));
    assert!(!validate_expiry(12, (year + 1) % 100));
}

#[test]
fn cvv_length_depends_on_brand() {
    assert!(validate_cvv("123", CardType::Visa));
    assert!(validate_cvv("1234", CardType::Amex));
    assert!(!validate_cvv("1234", CardType::Visa));
    assert!(!validate_cvv("123", CardType::Amex));
    assert!(validate_cvv("123", CardType::Unknown));
    assert!(!validate_cvv("12a", CardType::Mastercard));
}

#[test]
fn combined_card_check_reports_each_failure() {
    let year = Utc::now().year();
    let good = CardDetails::new("378282246310005", "1234", 6, year + 2);
    assert!(validate_card(&good).valid);

    let bad = CardDetails::new("378282246310006", "123", 13, year + 2);
    let result = validate_card(&bad);
    assert!(!result.valid);
    assert_eq!(result.errors.len(), 3);
}

#[test]
fn tokenization_roundtrip_without_leaking_values() {
    let crypto = keyed_crypto();
    let record = card_record();
    let token = crypto.tokenize(&record).unwrap();

    assert_token_hides(&token, &record);
    assert_eq!(crypto.detokenize(&token).unwrap(), record);
}

#[test]
fn tokens_survive_storage_as_strings() {
    let crypto = keyed_crypto();
    let record = card_record();
    let stored = crypto.tokenize(&record).unwrap().into_string();

    let reloaded = Token::new(stored);
    assert_eq!(crypto.detokenize(&reloaded).unwrap(), record);
}

#[test]
fn tokens_from_another_key_are_rejected() {
    let issuer = keyed_crypto();
    let other = PaymentCrypto::with_secret_key("someone-else").unwrap();
    let token = issuer.tokenize(&card_record()).unwrap();

    let err = other.detokenize(&token).unwrap_err();
    assert_eq!(err.code(), PaymentErrorCode::TokenInvalid);
}

#[test]
fn keyed_operations_require_a_key() {
    let crypto = PaymentCrypto::new();
    assert!(matches!(
        crypto.tokenize(&card_record()),
        Err(PaymentError::Configuration(_))
    ));
    assert!(crypto.hash_data("x").unwrap_err().is_configuration());
    assert!(crypto.set_secret_key("").unwrap_err().is_configuration());
}

#[test]
fn integrity_hashes_are_salted_and_verify() {
    let crypto = keyed_crypto();
    let a = crypto.hash_data("4532015112830366").unwrap();
    let b = crypto.hash_data("4532015112830366").unwrap();

    assert_ne!(a, b);
    assert!(crypto.verify_hash("4532015112830366", &a).unwrap());
    assert!(crypto.verify_hash("4532015112830366", &b).unwrap());
    assert!(!crypto.verify_hash("4532015112830367", &a).unwrap());
    assert!(!crypto.verify_hash_str("4532015112830366", "garbage").unwrap());
}

#[test]
fn amount_bounds() {
    assert!(!validate_amount(dec!(0.00)));
    assert!(validate_amount(dec!(0.01)));
    assert!(validate_amount(dec!(10000.00)));
    assert!(!validate_amount(dec!(10000.01)));
}

#[test]
fn fees_follow_percentage_plus_flat() {
    assert_eq!(calculate_fee(dec!(100.00), None, None), dec!(3.20));
    assert_eq!(
        calculate_fee(dec!(500.00), Some(dec!(3.0)), Some(dec!(0.50))),
        dec!(15.50)
    );
}

#[test]
fn currency_formatting() {
    assert_eq!(format_currency(dec!(1234.5), "USD"), "$1,234.50");
    assert_eq!(format_currency(dec!(1234.5), "EUR"), "€1,234.50");
    assert_eq!(format_currency(dec!(1234.5), "JPY"), "¥1,235");
    assert_eq!(format_currency(dec!(1234.5), "SEK"), "SEK 1,234.50");
}

#[test]
fn fraud_flags_for_risky_and_clean_transactions() {
    let risky = check_fraud_indicators(&risky_transaction()).unwrap();
    assert!(risky.contains(&FraudIndicator::HighAmount));
    assert!(risky.contains(&FraudIndicator::CountryMismatch));
    assert!(risky.contains(&FraudIndicator::VelocityCheck));

    let clean = check_fraud_indicators(&clean_transaction()).unwrap();
    assert!(clean.is_empty());

    let mut whole_float_count = clean_transaction();
    whole_float_count["recent_transaction_count"] = json!(6.0);
    assert_eq!(
        check_fraud_indicators(&whole_float_count).unwrap(),
        BTreeSet::from([FraudIndicator::VelocityCheck])
    );
}

#[test]
fn malformed_fraud_input_is_an_error() {
    let err = check_fraud_indicators(&json!({"amount": "lots"})).unwrap_err();
    assert_eq!(err.code(), PaymentErrorCode::MalformedTransaction);

    let mut fractional_count = risky_transaction();
    fractional_count["recent_transaction_count"] = json!(2.5);
    assert_malformed(
        &check_fraud_indicators(&fractional_count),
        "recent_transaction_count",
    );
    assert_malformed(&check_fraud_indicators(&json!([])), "transaction");
}

#[test]
fn references_have_the_documented_shape() {
    let reference = generate_reference();
    assert!(reference.starts_with("PAY"));
    assert_eq!(reference.len(), 3 + 14 + 4);
    assert!(reference[3..]
        .chars()
        .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    assert_ne!(generate_reference(), generate_reference());
}

#[test]
fn checkout_flow() {
    let config = PolicyConfig::default();
    let crypto = keyed_crypto();
    let year = Utc::now().year();

    let details = CardDetails::new("5555 5555 5555 4444", "321", 1, year + 3);
    assert!(validate_card(&details).valid);

    let amount = dec!(249.99);
    assert!(config.limits.contains(amount));
    assert!(validate_billing_address_json(&json!({
        "street": "500 Oak Ave", "city": "Austin", "state": "TX",
        "zip": "78701-0001", "country": "US"
    })));

    let flags = config
        .fraud
        .evaluate_json(&json!({"amount": 249.99, "billing_country": "US", "ip_country": "us"}))
        .unwrap();
    assert!(flags.is_empty());

    let record = PaymentRecord::new()
        .with("card_number", details.number.clone())
        .with("cvv", details.cvv.clone())
        .with("amount", amount);
    let token = crypto.tokenize(&record).unwrap();
    let fingerprint = crypto.hash_data("5555555555554444").unwrap();

    let fee = config.fees.fee(amount);
    assert_eq!(fee, dec!(7.55));

    let receipt = build_receipt(generate_reference(), amount, Currency::Usd, None);
    assert_eq!(format_currency(receipt.amount, receipt.currency.code()), "$249.99");

    assert_eq!(crypto.detokenize(&token).unwrap().get_text("cvv"), Some("321"));
    assert!(crypto.verify_hash("5555555555554444", &fingerprint).unwrap());
}

#[test]
fn subscription_descriptors() {
    assert!(validate_subscription_payment(&sample_subscription()));
    assert!(validate_subscription_payment(&json!({
        "amount": 12.00, "interval": "week", "currency": "USD", "customer_id": "cus_9"
    })));
    assert!(!validate_subscription_payment(&json!({
        "amount": 12.00, "interval": "hourly", "currency": "USD", "customer_id": "cus_9"
    })));
}

#[test]
fn billing_addresses() {
    let address = sample_address();
    assert!(validate_billing_address(&address));
    assert!(validate_billing_address_json(
        &serde_json::to_value(&address).unwrap()
    ));

    let mut bad_zip = address;
    bad_zip.zip = "9410".into();
    assert!(!validate_billing_address(&bad_zip));
}

#[test]
fn huge_amounts_still_flag_and_format() {
    let mut huge = clean_transaction();
    huge["amount"] = json!(1e30);
    assert_eq!(
        check_fraud_indicators(&huge).unwrap(),
        BTreeSet::from([FraudIndicator::HighAmount])
    );
    assert!(format_currency(Decimal::MAX, "USD").ends_with(".00"));
}
