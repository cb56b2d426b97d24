//! Prelude module for convenient imports.
//!
//! ```rust
//! use payguard_lib::prelude::*;
//! ```

// Card validation
pub use crate::card::{
    classify_card, validate_card, validate_card_number, validate_cvv, validate_expiry,
    CardDetails, CardType, ValidationResult,
};

// Error handling
pub use crate::errors::{PaymentError, PaymentErrorCode};
pub use crate::Result;

// Keyed operations
pub use crate::crypto::{HashedValue, PaymentCrypto, PaymentRecord, Token};

// Risk and money
pub use crate::fraud::{check_fraud_indicators, FraudIndicator};
pub use crate::money::{calculate_fee, format_currency, validate_amount, Currency};
pub use crate::reference::generate_reference;

// Configuration
pub use crate::config::PolicyConfig;
