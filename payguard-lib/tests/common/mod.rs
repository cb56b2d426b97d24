//! Shared helpers for integration tests, built on the crate's `test-utils`
//! fixtures.

#![allow(dead_code)]

use payguard_lib::card::luhn_check_digit;
use payguard_lib::test_utils::{sample_card_record, TEST_SECRET};
use payguard_lib::{PaymentCrypto, PaymentRecord};

pub fn keyed_crypto() -> PaymentCrypto {
    PaymentCrypto::with_secret_key(TEST_SECRET).unwrap()
}

pub fn card_record() -> PaymentRecord {
    sample_card_record()
}

/// Complete `partial` with its Luhn check digit.
pub fn with_check_digit(partial: &str) -> String {
    let check = luhn_check_digit(partial).unwrap();
    format!("{partial}{check}")
}
