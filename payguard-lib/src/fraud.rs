//! Rule-based fraud indicators.
//!
//! Each rule looks at one attribute of a single transaction and raises a
//! named flag. Rules are independent and stateless; transaction history
//! (for the velocity count) is supplied by the caller.

use crate::{PaymentError, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// A named risk flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FraudIndicator {
    /// Amount above the configured threshold.
    HighAmount,
    /// Billing country differs from the IP geolocation country.
    CountryMismatch,
    /// Too many recent transactions from the same actor.
    VelocityCheck,
}

impl FraudIndicator {
    /// Stable flag name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HighAmount => "high_amount",
            Self::CountryMismatch => "country_mismatch",
            Self::VelocityCheck => "velocity_check",
        }
    }
}

impl fmt::Display for FraudIndicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transaction attributes the rules look at.
///
/// Absent attributes never raise a flag.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction amount in currency units.
    #[serde(default)]
    pub amount: Decimal,
    /// Country of the billing address.
    #[serde(default)]
    pub billing_country: Option<String>,
    /// Country the request IP geolocates to.
    #[serde(default)]
    pub ip_country: Option<String>,
    /// Transactions by the same actor in the lookback window.
    #[serde(default)]
    pub recent_transaction_count: u64,
}

impl Transaction {
    /// Create a transaction with only an amount.
    pub fn new(amount: Decimal) -> Self {
        Self {
            amount,
            ..Self::default()
        }
    }

    /// Set the billing country.
    pub fn with_billing_country(mut self, country: impl Into<String>) -> Self {
        self.billing_country = Some(country.into());
        self
    }

    /// Set the IP country.
    pub fn with_ip_country(mut self, country: impl Into<String>) -> Self {
        self.ip_country = Some(country.into());
        self
    }

    /// Set the recent transaction count.
    pub fn with_recent_transaction_count(mut self, count: u64) -> Self {
        self.recent_transaction_count = count;
        self
    }

    /// Read a transaction from a loosely typed JSON mapping.
    ///
    /// Missing or `null` attributes take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError::MalformedTransaction`] if `value` is not an
    /// object, `amount` is not a number, a country is not a string, or the
    /// count is not a non-negative whole number. Counts such as `8.0` are
    /// accepted; amounts beyond `Decimal`'s range saturate to its bounds.
    pub fn from_json(value: &Value) -> Result<Self> {
        let object = value.as_object().ok_or_else(|| {
            PaymentError::malformed_transaction("transaction", "expected a JSON object")
        })?;
        let field = |name: &str| object.get(name).filter(|v| !v.is_null());

        let amount = match field("amount") {
            None => Decimal::ZERO,
            Some(Value::Number(n)) => {
                let repr = n.to_string();
                match Decimal::from_str(&repr).or_else(|_| Decimal::from_scientific(&repr)) {
                    Ok(amount) => amount,
                    // Too many digits for Decimal: round tiny values, clamp
                    // huge ones so the threshold comparison still sees them.
                    Err(e) => match n.as_f64() {
                        Some(f) if f.is_finite() => Decimal::try_from(f).unwrap_or(
                            if f.is_sign_negative() {
                                Decimal::MIN
                            } else {
                                Decimal::MAX
                            },
                        ),
                        _ => {
                            return Err(PaymentError::malformed_transaction(
                                "amount",
                                e.to_string(),
                            ))
                        }
                    },
                }
            }
            Some(_) => {
                return Err(PaymentError::malformed_transaction(
                    "amount",
                    "expected a number",
                ))
            }
        };

        let country = |name: &str| -> Result<Option<String>> {
            match field(name) {
                None => Ok(None),
                Some(Value::String(s)) => Ok(Some(s.clone())),
                Some(_) => Err(PaymentError::malformed_transaction(
                    name,
                    "expected a string",
                )),
            }
        };

        let recent_transaction_count = match field("recent_transaction_count") {
            None => 0,
            Some(v) => whole_count(v).ok_or_else(|| {
                PaymentError::malformed_transaction(
                    "recent_transaction_count",
                    "expected a non-negative integer",
                )
            })?,
        };

        Ok(Self {
            amount,
            billing_country: country("billing_country")?,
            ip_country: country("ip_country")?,
            recent_transaction_count,
        })
    }
}

/// A non-negative integer, or a float with no fractional part.
fn whole_count(value: &Value) -> Option<u64> {
    value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0)
            .map(|f| f as u64)
    })
}

fn default_high_amount_threshold() -> Decimal {
    dec!(10000)
}

fn default_velocity_threshold() -> u64 {
    5
}

/// Thresholds for the fraud rules.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FraudRules {
    /// Amounts strictly above this raise [`FraudIndicator::HighAmount`].
    #[serde(default = "default_high_amount_threshold")]
    pub high_amount_threshold: Decimal,

    /// Counts strictly above this raise [`FraudIndicator::VelocityCheck`].
    #[serde(default = "default_velocity_threshold")]
    pub velocity_threshold: u64,
}

impl Default for FraudRules {
    fn default() -> Self {
        Self {
            high_amount_threshold: default_high_amount_threshold(),
            velocity_threshold: default_velocity_threshold(),
        }
    }
}

impl FraudRules {
    /// Set the high-amount threshold.
    pub fn with_high_amount_threshold(mut self, threshold: Decimal) -> Self {
        self.high_amount_threshold = threshold;
        self
    }

    /// Set the velocity threshold.
    pub fn with_velocity_threshold(mut self, threshold: u64) -> Self {
        self.velocity_threshold = threshold;
        self
    }

    /// Evaluate every rule against `transaction`.
    pub fn evaluate(&self, transaction: &Transaction) -> BTreeSet<FraudIndicator> {
        let mut indicators = BTreeSet::new();

        if transaction.amount > self.high_amount_threshold {
            indicators.insert(FraudIndicator::HighAmount);
        }

        if let (Some(billing), Some(ip)) = (&transaction.billing_country, &transaction.ip_country)
        {
            if !billing.trim().eq_ignore_ascii_case(ip.trim()) {
                indicators.insert(FraudIndicator::CountryMismatch);
            }
        }

        if transaction.recent_transaction_count > self.velocity_threshold {
            indicators.insert(FraudIndicator::VelocityCheck);
        }

        if !indicators.is_empty() {
            tracing::debug!(
                "Fraud indicators raised: {}",
                indicators
                    .iter()
                    .map(FraudIndicator::as_str)
                    .collect::<Vec<_>>()
                    .join(",")
            );
        }
        indicators
    }

    /// Evaluate a loosely typed JSON transaction.
    pub fn evaluate_json(&self, transaction: &Value) -> Result<BTreeSet<FraudIndicator>> {
        let transaction = Transaction::from_json(transaction).map_err(|e| {
            tracing::warn!("Rejected fraud check input: {}", e);
            e
        })?;
        Ok(self.evaluate(&transaction))
    }
}

/// Evaluate the default rules against a JSON transaction.
///
/// Recognized attributes: `amount`, `billing_country`, `ip_country`,
/// `recent_transaction_count`. Other keys are ignored.
///
/// # Example
///
/// ```
/// use payguard_lib::{check_fraud_indicators, FraudIndicator};
/// use serde_json::json;
///
/// let flags = check_fraud_indicators(&json!({
///     "amount": 15000,
///     "billing_country": "US",
///     "ip_country": "RU",
///     "recent_transaction_count": 8
/// }))?;
/// assert_eq!(flags.len(), 3);
/// assert!(flags.contains(&FraudIndicator::CountryMismatch));
/// # Ok::<(), payguard_lib::PaymentError>(())
/// ```
pub fn check_fraud_indicators(transaction: &Value) -> Result<BTreeSet<FraudIndicator>> {
    FraudRules::default().evaluate_json(transaction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_all_flags() {
        let flags = check_fraud_indicators(&json!({
            "amount": 15000,
            "billing_country": "US",
            "ip_country": "RU",
            "recent_transaction_count": 8
        }))
        .unwrap();
        let expected: BTreeSet<_> = [
            FraudIndicator::HighAmount,
            FraudIndicator::CountryMismatch,
            FraudIndicator::VelocityCheck,
        ]
        .into_iter()
        .collect();
        assert_eq!(flags, expected);
    }

    #[test]
    fn test_clean_transaction() {
        let flags = check_fraud_indicators(&json!({
            "amount": 49.99,
            "billing_country": "US",
            "ip_country": "US",
            "recent_transaction_count": 1
        }))
        .unwrap();
        assert!(flags.is_empty());
    }

    #[test]
    fn test_thresholds_are_strict() {
        let rules = FraudRules::default();
        let at_limit = Transaction::new(dec!(10000)).with_recent_transaction_count(5);
        assert!(rules.evaluate(&at_limit).is_empty());

        let over = Transaction::new(dec!(10000.01)).with_recent_transaction_count(6);
        assert_eq!(rules.evaluate(&over).len(), 2);
    }

    #[test]
    fn test_country_comparison() {
        let rules = FraudRules::default();
        let same = Transaction::new(dec!(1))
            .with_billing_country(" us ")
            .with_ip_country("US");
        assert!(rules.evaluate(&same).is_empty());

        let only_billing = Transaction::new(dec!(1)).with_billing_country("US");
        assert!(rules.evaluate(&only_billing).is_empty());
    }

    #[test]
    fn test_missing_and_null_attributes() {
        assert!(check_fraud_indicators(&json!({})).unwrap().is_empty());
        assert!(check_fraud_indicators(&json!({"amount": null, "ip_country": null}))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_malformed_input() {
        let cases = [
            (json!([1, 2]), "transaction"),
            (json!({"amount": "15000"}), "amount"),
            (json!({"billing_country": 1}), "billing_country"),
            (json!({"recent_transaction_count": -1}), "recent_transaction_count"),
            (json!({"recent_transaction_count": 2.5}), "recent_transaction_count"),
        ];
        for (input, expected_field) in cases {
            match check_fraud_indicators(&input) {
                Err(PaymentError::MalformedTransaction { field, .. }) => {
                    assert_eq!(field, expected_field)
                }
                other => panic!("expected malformed transaction, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_amount_beyond_decimal_range_saturates() {
        let flags = check_fraud_indicators(&json!({
            "amount": 1e30, "billing_country": "US", "ip_country": "US"
        }))
        .unwrap();
        assert_eq!(flags, BTreeSet::from([FraudIndicator::HighAmount]));

        let tx = Transaction::from_json(&json!({"amount": -1e30})).unwrap();
        assert_eq!(tx.amount, Decimal::MIN);
        assert!(FraudRules::default().evaluate(&tx).is_empty());

        let tiny = Transaction::from_json(&json!({"amount": 1e-30})).unwrap();
        assert!(tiny.amount < Decimal::ONE);
    }

    #[test]
    fn test_whole_float_count_accepted() {
        let flags = check_fraud_indicators(&json!({
            "amount": 15000.0, "recent_transaction_count": 8.0
        }))
        .unwrap();
        assert_eq!(
            flags,
            BTreeSet::from([FraudIndicator::HighAmount, FraudIndicator::VelocityCheck])
        );

        let tx = Transaction::from_json(&json!({"recent_transaction_count": 5.0})).unwrap();
        assert_eq!(tx.recent_transaction_count, 5);
    }

    #[test]
    fn test_custom_rules() {
        let rules = FraudRules::default()
            .with_high_amount_threshold(dec!(500))
            .with_velocity_threshold(0);
        let flags = rules
            .evaluate_json(&json!({"amount": 600, "recent_transaction_count": 1}))
            .unwrap();
        assert!(flags.contains(&FraudIndicator::HighAmount));
        assert!(flags.contains(&FraudIndicator::VelocityCheck));
    }

    #[test]
    fn test_indicator_names() {
        assert_eq!(FraudIndicator::VelocityCheck.to_string(), "velocity_check");
        assert_eq!(
            serde_json::to_string(&FraudIndicator::HighAmount).unwrap(),
            "\"high_amount\""
        );
    }
}
