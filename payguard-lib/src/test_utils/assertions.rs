//! Test assertions and verification helpers.

use crate::crypto::{PaymentRecord, Token};
use crate::{PaymentError, Result};

/// Length of the longest substring shared by `a` and `b`.
pub fn longest_shared_substring(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut previous = vec![0usize; b.len() + 1];
    let mut best = 0;
    for i in 1..=a.len() {
        let mut current = vec![0usize; b.len() + 1];
        for j in 1..=b.len() {
            if a[i - 1] == b[j - 1] {
                current[j] = previous[j - 1] + 1;
                best = best.max(current[j]);
            }
        }
        previous = current;
    }
    best
}

/// Assert that no value of `record` shows through `token`.
///
/// # Panics
/// Panics if the token shares a substring longer than four characters with
/// any field value.
pub fn assert_token_hides(token: &Token, record: &PaymentRecord) {
    for (field, value) in record.iter() {
        let shared = longest_shared_substring(token.as_str(), &value.to_string());
        assert!(
            shared <= 4,
            "Token leaks {} characters of field {}",
            shared,
            field
        );
    }
}

/// Assert that a fraud check was rejected for the given attribute.
///
/// # Panics
/// Panics if the result is not a malformed-transaction error for `field`.
pub fn assert_malformed<T: std::fmt::Debug>(result: &Result<T>, field: &str) {
    match result {
        Err(PaymentError::MalformedTransaction { field: actual, .. }) => {
            assert_eq!(actual, field, "Wrong attribute reported");
        }
        other => panic!("Expected malformed transaction for {}, got {:?}", field, other),
    }
}
