//! Card number normalization and Luhn checksum.
//!
//! Normalization strips the separators people type into card fields
//! (spaces, dashes, periods). A number is well-formed when what remains is
//! 12 to 19 ASCII digits, and valid when it also passes the Luhn check.

use crate::{PaymentError, Result};
use std::fmt;

/// Shortest accepted card number after normalization.
pub const MIN_CARD_LENGTH: usize = 12;

/// Longest accepted card number after normalization.
pub const MAX_CARD_LENGTH: usize = 19;

/// Doubled digit with 9 subtracted when the result reaches 10, indexed by digit.
const DOUBLE_TABLE: [u32; 10] = [0, 2, 4, 6, 8, 1, 3, 5, 7, 9];

/// Strip spaces, dashes and periods from a raw card number.
///
/// No other characters are touched, so `"4111-1111 1111.1111"` becomes
/// `"4111111111111111"` while `"4111x"` stays `"4111x"`.
pub fn normalize_card_number(raw: &str) -> String {
    raw.chars()
        .filter(|c| !matches!(c, ' ' | '-' | '.'))
        .collect()
}

/// Sum of the Luhn-weighted digits, not reduced modulo 10.
///
/// Returns `None` if `digits` contains anything other than ASCII digits.
pub fn luhn_checksum(digits: &str) -> Option<u32> {
    let mut sum = 0u32;
    for (position, byte) in digits.bytes().rev().enumerate() {
        if !byte.is_ascii_digit() {
            return None;
        }
        let digit = u32::from(byte - b'0');
        sum += if position % 2 == 1 {
            DOUBLE_TABLE[digit as usize]
        } else {
            digit
        };
    }
    Some(sum)
}

/// Compute the check digit that completes `partial` into a Luhn-valid number.
///
/// Returns `None` for empty or non-digit input.
///
/// # Example
///
/// ```
/// use payguard_lib::card::luhn_check_digit;
///
/// assert_eq!(luhn_check_digit("411111111111111"), Some(1));
/// ```
pub fn luhn_check_digit(partial: &str) -> Option<u8> {
    if partial.is_empty() {
        return None;
    }
    // Appending a zero shifts every existing digit one position left, which is
    // exactly the weighting they will have once the check digit is in place.
    let sum = luhn_checksum(&format!("{partial}0"))?;
    Some(((10 - sum % 10) % 10) as u8)
}

/// Validate a raw card number: normalize, check format, then apply Luhn.
///
/// Total over every input; malformed input is simply `false`.
///
/// # Example
///
/// ```
/// use payguard_lib::validate_card_number;
///
/// assert!(validate_card_number("4532 0151 1283 0366"));
/// assert!(!validate_card_number("4532015112830367"));
/// assert!(!validate_card_number("not a card"));
/// ```
pub fn validate_card_number(raw: &str) -> bool {
    let normalized = normalize_card_number(raw);
    if !is_well_formed(&normalized) {
        return false;
    }
    matches!(luhn_checksum(&normalized), Some(sum) if sum % 10 == 0)
}

fn is_well_formed(normalized: &str) -> bool {
    (MIN_CARD_LENGTH..=MAX_CARD_LENGTH).contains(&normalized.len())
        && normalized.bytes().all(|b| b.is_ascii_digit())
}

/// A normalized card number: 12-19 ASCII digits.
///
/// Holding a `CardNumber` proves the format rules hold; it does not prove the
/// Luhn check passes (see [`CardNumber::is_luhn_valid`]).
///
/// `Debug` and `Display` print the masked form so a `CardNumber` can be
/// logged without exposing the PAN.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct CardNumber(String);

impl CardNumber {
    /// Normalize and format-check a raw card number.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError::InvalidData`] if the normalized number is not
    /// 12-19 ASCII digits.
    pub fn parse(raw: &str) -> Result<Self> {
        let normalized = normalize_card_number(raw);
        if normalized.is_empty() {
            return Err(PaymentError::invalid_data("card_number", "empty"));
        }
        if !normalized.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PaymentError::invalid_data(
                "card_number",
                "contains non-digit characters",
            ));
        }
        if !is_well_formed(&normalized) {
            return Err(PaymentError::invalid_data(
                "card_number",
                format!(
                    "length {} outside {}-{}",
                    normalized.len(),
                    MIN_CARD_LENGTH,
                    MAX_CARD_LENGTH
                ),
            ));
        }
        Ok(Self(normalized))
    }

    /// The normalized digits.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of digits.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; kept alongside `len` for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether the digits pass the Luhn check.
    pub fn is_luhn_valid(&self) -> bool {
        matches!(luhn_checksum(&self.0), Some(sum) if sum % 10 == 0)
    }

    /// The last four digits.
    pub fn last_four(&self) -> &str {
        &self.0[self.0.len() - 4..]
    }
}

impl fmt::Debug for CardNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CardNumber")
            .field(&super::mask_card_number(&self.0))
            .finish()
    }
}

impl fmt::Display for CardNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&super::mask_card_number(&self.0))
    }
}
