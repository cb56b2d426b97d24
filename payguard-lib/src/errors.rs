//! Error types for PayGuard operations.
//!
//! Validation outcomes are never errors: a bad card number, CVV, expiry or
//! amount is reported as `false`. The variants below cover the conditions that
//! make an operation itself fail.

use std::fmt;

/// Error codes for FFI and harness integration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum PaymentErrorCode {
    /// Secret key missing or unusable
    Configuration = 1000,
    /// Token malformed, forged, tampered or issued under another key
    TokenInvalid = 2000,
    /// Fraud scorer received a wrongly shaped transaction
    MalformedTransaction = 3000,
    /// Invalid request/data
    InvalidData = 5000,
    /// Serialization error
    Serialization = 5002,
    /// Internal/unexpected error
    Internal = 9999,
}

/// Error type for PayGuard operations.
#[derive(Debug)]
pub enum PaymentError {
    /// No secret key is configured, or the supplied key is unusable.
    Configuration(String),

    /// Detokenization refused the token.
    TokenInvalid(String),

    /// The transaction mapping handed to the fraud scorer has the wrong shape.
    MalformedTransaction {
        /// Offending attribute
        field: String,
        /// What was wrong with it
        reason: String,
    },

    /// Invalid data provided.
    InvalidData {
        /// Field or parameter name
        field: String,
        /// Reason for invalidity
        reason: String,
    },

    /// Serialization/deserialization error.
    Serialization(String),

    /// Internal/unexpected error.
    Internal(String),
}

impl PaymentError {
    /// Get the error code for FFI/harness integration.
    pub fn code(&self) -> PaymentErrorCode {
        match self {
            Self::Configuration(_) => PaymentErrorCode::Configuration,
            Self::TokenInvalid(_) => PaymentErrorCode::TokenInvalid,
            Self::MalformedTransaction { .. } => PaymentErrorCode::MalformedTransaction,
            Self::InvalidData { .. } => PaymentErrorCode::InvalidData,
            Self::Serialization(_) => PaymentErrorCode::Serialization,
            Self::Internal(_) => PaymentErrorCode::Internal,
        }
    }

    /// Get the error message as an owned String (useful for FFI).
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Always false: nothing in the engine is worth retrying. Retry policy
    /// belongs to the caller.
    pub fn is_retryable(&self) -> bool {
        false
    }

    /// Returns true for the missing-key condition.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    /// Returns true when a token was rejected.
    pub fn is_token_invalid(&self) -> bool {
        matches!(self, Self::TokenInvalid(_))
    }

    /// Create a configuration error.
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration(reason.into())
    }

    /// Create a token rejection.
    pub fn token_invalid(reason: impl Into<String>) -> Self {
        Self::TokenInvalid(reason.into())
    }

    /// Create a malformed transaction error.
    pub fn malformed_transaction(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedTransaction {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid data error.
    pub fn invalid_data(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidData {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for PaymentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration(msg) => write!(f, "configuration error: {}", msg),
            Self::TokenInvalid(msg) => write!(f, "token invalid: {}", msg),
            Self::MalformedTransaction { field, reason } => {
                write!(f, "malformed transaction field {}: {}", field, reason)
            }
            Self::InvalidData { field, reason } => {
                write!(f, "invalid {}: {}", field, reason)
            }
            Self::Serialization(msg) => write!(f, "serialization error: {}", msg),
            Self::Internal(msg) => write!(f, "internal error: {}", msg),
        }
    }
}

impl std::error::Error for PaymentError {}

impl From<serde_json::Error> for PaymentError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
