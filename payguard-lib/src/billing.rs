//! Billing address and subscription validation.

use crate::money::{validate_amount, AmountLimits, Currency};
use crate::{PaymentError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// A postal billing address.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingAddress {
    /// Street line, including the house number.
    pub street: String,
    /// City or locality.
    pub city: String,
    /// State, province or region.
    pub state: String,
    /// Postal code. US addresses need `NNNNN` or `NNNNN-NNNN`.
    pub zip: String,
    /// ISO 3166 alpha-2 country code.
    pub country: String,
}

impl BillingAddress {
    /// Create an address.
    pub fn new(
        street: impl Into<String>,
        city: impl Into<String>,
        state: impl Into<String>,
        zip: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        Self {
            street: street.into(),
            city: city.into(),
            state: state.into(),
            zip: zip.into(),
            country: country.into(),
        }
    }

    fn fields(&self) -> [&str; 5] {
        [
            self.street.as_str(),
            self.city.as_str(),
            self.state.as_str(),
            self.zip.as_str(),
            self.country.as_str(),
        ]
    }

    /// Whether the address is complete and, for US addresses, carries a
    /// well-formed ZIP code.
    pub fn is_valid(&self) -> bool {
        if self.fields().iter().any(|field| field.trim().is_empty()) {
            return false;
        }
        if self.country.trim().eq_ignore_ascii_case("US") {
            return is_us_zip(&self.zip);
        }
        true
    }
}

/// `NNNNN` or `NNNNN-NNNN`.
fn is_us_zip(zip: &str) -> bool {
    let bytes = zip.as_bytes();
    let digits = |range: &[u8]| range.iter().all(u8::is_ascii_digit);
    match bytes.len() {
        5 => digits(bytes),
        10 => digits(&bytes[..5]) && bytes[5] == b'-' && digits(&bytes[6..]),
        _ => false,
    }
}

/// Validate a typed billing address.
pub fn validate_billing_address(address: &BillingAddress) -> bool {
    address.is_valid()
}

/// Validate a billing address given as a JSON object.
///
/// Every required field must be present as a non-blank string. Extra keys
/// are ignored.
pub fn validate_billing_address_json(address: &Value) -> bool {
    let Some(object) = address.as_object() else {
        return false;
    };
    let text = |name: &str| object.get(name).and_then(Value::as_str).map(str::to_string);
    match (
        text("street"),
        text("city"),
        text("state"),
        text("zip"),
        text("country"),
    ) {
        (Some(street), Some(city), Some(state), Some(zip), Some(country)) => {
            BillingAddress::new(street, city, state, zip, country).is_valid()
        }
        _ => false,
    }
}

/// Recurring billing interval.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingInterval {
    /// Charged daily.
    Day,
    /// Charged weekly.
    Week,
    /// Charged monthly.
    Month,
    /// Charged yearly.
    Year,
}

impl BillingInterval {
    /// Interval name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }
}

impl fmt::Display for BillingInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BillingInterval {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "year" => Ok(Self::Year),
            other => Err(PaymentError::invalid_data(
                "interval",
                format!("unknown billing interval '{}'", other),
            )),
        }
    }
}

/// A recurring payment descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionPayment {
    /// Amount charged each interval.
    pub amount: Decimal,
    /// How often the amount is charged.
    pub interval: BillingInterval,
    /// Currency of the amount.
    pub currency: Currency,
    /// Subscriber identifier.
    pub customer_id: String,
}

impl SubscriptionPayment {
    /// Whether the amount lies within `limits`.
    pub fn is_valid_within(&self, limits: &AmountLimits) -> bool {
        limits.contains(self.amount)
    }
}

/// Validate a subscription descriptor given as a JSON object.
///
/// Requires `amount`, `interval`, `currency` and `customer_id`. The
/// interval must be one of `day`, `week`, `month`, `year`; the amount may be
/// a number or numeric string and must pass [`validate_amount`].
pub fn validate_subscription_payment(subscription: &Value) -> bool {
    let Some(object) = subscription.as_object() else {
        return false;
    };
    if ["amount", "interval", "currency", "customer_id"]
        .iter()
        .any(|field| !object.contains_key(*field))
    {
        return false;
    }

    let interval_ok = object
        .get("interval")
        .and_then(Value::as_str)
        .map_or(false, |interval| interval.parse::<BillingInterval>().is_ok());
    if !interval_ok {
        return false;
    }

    let amount = match object.get("amount") {
        Some(Value::Number(n)) => {
            let repr = n.to_string();
            Decimal::from_str(&repr)
                .or_else(|_| Decimal::from_scientific(&repr))
                .ok()
        }
        Some(Value::String(s)) => Decimal::from_str(s.trim()).ok(),
        _ => None,
    };
    amount.map_or(false, validate_amount)
}
