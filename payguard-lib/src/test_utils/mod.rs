//! Test utilities for PayGuard.
//!
//! - Well-known card numbers per brand and Luhn-valid generators
//! - Sample transactions, addresses and subscription descriptors
//! - Assertion helpers for tokens and hashes
//!
//! ## Usage
//!
//! ```rust,ignore
//! use payguard_lib::test_utils::{assert_token_hides, TestCards};
//!
//! let record = PaymentRecord::new().with("card_number", TestCards::VISA);
//! let token = crypto.tokenize(&record)?;
//! assert_token_hides(&token, &record);
//! ```

mod assertions;
mod fixtures;

pub use fixtures::{
    clean_transaction, generate_card_number, risky_transaction, sample_address,
    sample_card_record, sample_subscription, TestCards, TEST_SECRET,
};

pub use assertions::{assert_malformed, assert_token_hides, longest_shared_substring};
