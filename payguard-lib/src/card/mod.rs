//! Card Data Validation
//!
//! Format and checksum rules for card numbers, brand classification, and
//! the brand-dependent expiry/CVV rules.
//!
//! Every check here is a plain `bool`: a bad card is an expected outcome,
//! not an error. [`validate_card`] runs all of them together and collects
//! the reasons a card was refused.

mod brand;
mod fields;
mod luhn;

pub use brand::{classify_card, CardType};
pub use fields::{validate_cvv, validate_expiry, validate_expiry_at, ExpiryDate};
pub use luhn::{
    luhn_check_digit, luhn_checksum, normalize_card_number, validate_card_number, CardNumber,
    MAX_CARD_LENGTH, MIN_CARD_LENGTH,
};

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Mask all but the last four digits of a card number.
///
/// The input is normalized first. Inputs of four characters or fewer are
/// fully masked.
///
/// # Example
///
/// ```
/// use payguard_lib::card::mask_card_number;
///
/// assert_eq!(mask_card_number("4111 1111 1111 1111"), "************1111");
/// ```
pub fn mask_card_number(raw: &str) -> String {
    let normalized = normalize_card_number(raw);
    let chars: Vec<char> = normalized.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let visible = chars.len() - 4;
    chars
        .iter()
        .enumerate()
        .map(|(i, c)| if i < visible { '*' } else { *c })
        .collect()
}

/// Result of a combined card check.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Whether the card passed every check.
    pub valid: bool,
    /// Reasons the card was refused.
    pub errors: Vec<String>,
    /// Warnings (non-fatal issues).
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// Create a valid result.
    pub fn valid() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Create an invalid result with errors.
    pub fn invalid(errors: Vec<String>) -> Self {
        Self {
            valid: false,
            errors,
            warnings: Vec::new(),
        }
    }

    /// Add a warning.
    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }
}

/// Card fields as entered at checkout.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDetails {
    /// Raw card number; separators allowed.
    pub number: String,
    /// Card verification value.
    pub cvv: String,
    /// Expiry month, 1-12.
    pub expiry_month: i32,
    /// Four-digit expiry year.
    pub expiry_year: i32,
}

impl CardDetails {
    /// Create card details.
    pub fn new(
        number: impl Into<String>,
        cvv: impl Into<String>,
        expiry_month: i32,
        expiry_year: i32,
    ) -> Self {
        Self {
            number: number.into(),
            cvv: cvv.into(),
            expiry_month,
            expiry_year,
        }
    }

    /// Brand of the card number.
    pub fn card_type(&self) -> CardType {
        classify_card(&self.number)
    }
}

impl std::fmt::Debug for CardDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardDetails")
            .field("number", &mask_card_number(&self.number))
            .field("cvv", &"***")
            .field("expiry_month", &self.expiry_month)
            .field("expiry_year", &self.expiry_year)
            .finish()
    }
}

/// Run the number, expiry and CVV checks together against today's date.
pub fn validate_card(details: &CardDetails) -> ValidationResult {
    validate_card_at(details, Utc::now().date_naive())
}

/// [`validate_card`] evaluated against a fixed `today`.
pub fn validate_card_at(details: &CardDetails, today: NaiveDate) -> ValidationResult {
    let card_type = details.card_type();
    let mut errors = Vec::new();

    if !validate_card_number(&details.number) {
        errors.push("Card number failed format or checksum validation".to_string());
    }
    if !validate_expiry_at(details.expiry_month, details.expiry_year, today) {
        errors.push(format!(
            "Expiry {:02}/{} is invalid or in the past",
            details.expiry_month, details.expiry_year
        ));
    }
    if !validate_cvv(&details.cvv, card_type) {
        errors.push(format!(
            "CVV must be exactly {} digits for {}",
            card_type.cvv_length(),
            card_type
        ));
    }

    tracing::debug!(
        card = %mask_card_number(&details.number),
        card_type = %card_type,
        failures = errors.len(),
        "card validated"
    );

    let result = if errors.is_empty() {
        ValidationResult::valid()
    } else {
        ValidationResult::invalid(errors)
    };
    if card_type.is_known() {
        result
    } else {
        result.with_warning("Card brand could not be determined")
    }
}
