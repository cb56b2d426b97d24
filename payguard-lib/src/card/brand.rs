//! Card brand classification from prefix and length.

use super::luhn::normalize_card_number;
use crate::{PaymentError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Card brand.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardType {
    /// Visa.
    Visa,
    /// Mastercard, including the 2-series BIN range.
    Mastercard,
    /// American Express.
    Amex,
    /// Discover.
    Discover,
    /// JCB.
    Jcb,
    /// No rule matched.
    Unknown,
}

impl CardType {
    /// Every brand, `Unknown` last.
    pub const ALL: [CardType; 6] = [
        Self::Visa,
        Self::Mastercard,
        Self::Amex,
        Self::Discover,
        Self::Jcb,
        Self::Unknown,
    ];

    /// Lowercase identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Visa => "visa",
            Self::Mastercard => "mastercard",
            Self::Amex => "amex",
            Self::Discover => "discover",
            Self::Jcb => "jcb",
            Self::Unknown => "unknown",
        }
    }

    /// Required CVV length for this brand.
    pub fn cvv_length(&self) -> usize {
        match self {
            Self::Amex => 4,
            _ => 3,
        }
    }

    /// Whether a rule matched.
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

impl fmt::Display for CardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CardType {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "visa" => Ok(Self::Visa),
            "mastercard" => Ok(Self::Mastercard),
            "amex" | "american_express" => Ok(Self::Amex),
            "discover" => Ok(Self::Discover),
            "jcb" => Ok(Self::Jcb),
            "unknown" => Ok(Self::Unknown),
            other => Err(PaymentError::invalid_data(
                "card_type",
                format!("unrecognized brand '{}'", other),
            )),
        }
    }
}

/// A single prefix/length rule.
struct BrandRule {
    card_type: CardType,
    /// Inclusive numeric ranges over the leading digits. Each range is
    /// compared against as many leading digits as its bounds have.
    prefixes: &'static [(u32, u32)],
    lengths: &'static [usize],
}

impl BrandRule {
    fn matches(&self, digits: &str) -> bool {
        self.lengths.contains(&digits.len())
            && self
                .prefixes
                .iter()
                .any(|&(low, high)| prefix_in_range(digits, low, high))
    }
}

fn prefix_in_range(digits: &str, low: u32, high: u32) -> bool {
    let width = decimal_width(low);
    digits
        .get(..width)
        .and_then(|lead| lead.parse::<u32>().ok())
        .map_or(false, |lead| (low..=high).contains(&lead))
}

fn decimal_width(mut value: u32) -> usize {
    let mut width = 1;
    while value >= 10 {
        value /= 10;
        width += 1;
    }
    width
}

/// Ordered rule table; the first match wins.
const BRAND_RULES: &[BrandRule] = &[
    BrandRule {
        card_type: CardType::Visa,
        prefixes: &[(4, 4)],
        lengths: &[13, 16, 19],
    },
    BrandRule {
        card_type: CardType::Mastercard,
        prefixes: &[(51, 55), (2221, 2720)],
        lengths: &[16],
    },
    BrandRule {
        card_type: CardType::Amex,
        prefixes: &[(34, 34), (37, 37)],
        lengths: &[15],
    },
    BrandRule {
        card_type: CardType::Discover,
        prefixes: &[(6011, 6011), (65, 65)],
        lengths: &[16],
    },
    BrandRule {
        card_type: CardType::Jcb,
        prefixes: &[(35, 35)],
        lengths: &[16],
    },
];

/// Classify a card number by brand.
///
/// The input is normalized first. Classification ignores the Luhn check, so
/// a number with a bad check digit still classifies when prefix and length
/// match.
///
/// # Example
///
/// ```
/// use payguard_lib::{classify_card, CardType};
///
/// assert_eq!(classify_card("4111 1111 1111 1111"), CardType::Visa);
/// assert_eq!(classify_card("378282246310005"), CardType::Amex);
/// assert_eq!(classify_card("9999"), CardType::Unknown);
/// ```
pub fn classify_card(card_number: &str) -> CardType {
    let digits = normalize_card_number(card_number);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return CardType::Unknown;
    }
    BRAND_RULES
        .iter()
        .find(|rule| rule.matches(&digits))
        .map_or(CardType::Unknown, |rule| rule.card_type)
}
