//! Expiry date and CVV rules.

use super::brand::CardType;
use crate::{PaymentError, Result};
use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Card expiry as a (month, year) pair.
///
/// A card expiring in month M of year Y is usable through the last day of M.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ExpiryDate {
    // Field order matters: the derived ordering compares year first.
    year: i32,
    month: u32,
}

impl ExpiryDate {
    /// Create an expiry date.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError::InvalidData`] when the month is outside 1-12 or
    /// the year is not a four-digit calendar year.
    pub fn new(month: u32, year: i32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(PaymentError::invalid_data(
                "expiry_month",
                format!("{} is not in 1-12", month),
            ));
        }
        if !(1000..=9999).contains(&year) {
            return Err(PaymentError::invalid_data(
                "expiry_year",
                format!("{} is not a four-digit year", year),
            ));
        }
        Ok(Self { year, month })
    }

    /// Expiry month, 1-12.
    pub fn month(&self) -> u32 {
        self.month
    }

    /// Four-digit expiry year.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// Whether the card is expired on `today`.
    pub fn is_expired_at(&self, today: NaiveDate) -> bool {
        (self.year, self.month) < (today.year(), today.month())
    }

    /// Whether the card is expired now (UTC).
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now().date_naive())
    }
}

impl fmt::Display for ExpiryDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{}", self.month, self.year)
    }
}

impl FromStr for ExpiryDate {
    type Err = PaymentError;

    /// Parse `MM/YYYY`. Two-digit years are rejected rather than guessed.
    fn from_str(s: &str) -> Result<Self> {
        let (month, year) = s
            .trim()
            .split_once('/')
            .ok_or_else(|| PaymentError::invalid_data("expiry", "expected MM/YYYY"))?;
        if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PaymentError::invalid_data(
                "expiry_year",
                "expected a four-digit year",
            ));
        }
        let month: u32 = month
            .parse()
            .map_err(|_| PaymentError::invalid_data("expiry_month", "not a number"))?;
        let year: i32 = year
            .parse()
            .map_err(|_| PaymentError::invalid_data("expiry_year", "not a number"))?;
        Self::new(month, year)
    }
}

/// Validate an expiry month/year against today's date (UTC).
///
/// `false` when the month is outside 1-12, the year is not four digits, or
/// the (year, month) pair lies strictly before the current one. The current
/// month itself is still valid.
pub fn validate_expiry(month: i32, year: i32) -> bool {
    validate_expiry_at(month, year, Utc::now().date_naive())
}

/// [`validate_expiry`] evaluated against a fixed `today`.
pub fn validate_expiry_at(month: i32, year: i32, today: NaiveDate) -> bool {
    let Ok(month) = u32::try_from(month) else {
        return false;
    };
    ExpiryDate::new(month, year).map_or(false, |expiry| !expiry.is_expired_at(today))
}

/// Validate a CVV for a card brand.
///
/// Amex requires exactly four digits, every other brand (including
/// `Unknown`) exactly three. Surrounding whitespace is ignored; any other
/// non-digit character fails.
pub fn validate_cvv(cvv: &str, card_type: CardType) -> bool {
    let cvv = cvv.trim();
    cvv.len() == card_type.cvv_length() && cvv.bytes().all(|b| b.is_ascii_digit())
}
