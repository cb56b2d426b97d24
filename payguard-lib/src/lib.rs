//! PayGuard library.
//!
//! Payment-data validation, tokenization and integrity hashing. Everything
//! except the keyed operations is a pure function of its inputs; the keyed
//! operations live on an explicit [`PaymentCrypto`] context rather than on
//! global state.
//!
//! # Features
//!
//! - **Card validation**: Luhn checksum, brand classification, expiry and CVV rules
//! - **Tokenization**: reversible, authenticated encryption of payment records
//! - **Integrity hashing**: salted keyed hashes with constant-time verification
//! - **Fraud indicators**: threshold rules over caller-supplied transaction attributes
//! - **Money utilities**: exact-decimal fees, currency formatting, amount limits, references
//!
//! # Example
//!
//! ```
//! use payguard_lib::{classify_card, validate_card_number, validate_cvv, CardType};
//! use payguard_lib::{PaymentCrypto, PaymentRecord};
//!
//! assert!(validate_card_number("4532015112830366"));
//! assert_eq!(classify_card("378282246310005"), CardType::Amex);
//! assert!(validate_cvv("1234", CardType::Amex));
//!
//! let crypto = PaymentCrypto::with_secret_key("merchant-secret")?;
//! let record = PaymentRecord::new().with("card_number", "4532015112830366");
//! let token = crypto.tokenize(&record)?;
//! assert_eq!(crypto.detokenize(&token)?, record);
//! # Ok::<(), payguard_lib::PaymentError>(())
//! ```

pub mod billing;
pub mod card;
pub mod config;
pub mod crypto;
pub mod errors;
pub mod fraud;
pub mod money;
pub mod prelude;
pub mod reference;

/// Test fixtures: known card numbers, transactions and addresses.
///
/// This module is only available with the `test-utils` feature or in test builds.
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use billing::{
    validate_billing_address, validate_billing_address_json, validate_subscription_payment,
    BillingAddress, BillingInterval, SubscriptionPayment,
};
pub use card::{
    classify_card, mask_card_number, validate_card, validate_card_number, validate_cvv,
    validate_expiry, CardDetails, CardNumber, CardType, ExpiryDate, ValidationResult,
};
pub use config::PolicyConfig;
pub use crypto::{HashedValue, PaymentCrypto, PaymentRecord, RecordValue, SecretKey, Token};
pub use errors::{PaymentError, PaymentErrorCode};
pub use fraud::{check_fraud_indicators, FraudIndicator, FraudRules, Transaction};
pub use money::{
    calculate_fee, format_currency, validate_amount, AmountLimits, Currency, FeeSchedule,
};
pub use reference::{build_receipt, generate_reference, PaymentReceipt};

/// Common result alias for PayGuard operations.
pub type Result<T> = std::result::Result<T, PaymentError>;
