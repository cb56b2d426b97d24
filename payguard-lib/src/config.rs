//! Policy configuration: fees, amount limits and fraud thresholds.
//!
//! Every field has a default, so a partial document only overrides what it
//! names:
//!
//! ```
//! use payguard_lib::PolicyConfig;
//! use rust_decimal_macros::dec;
//!
//! let config = PolicyConfig::from_json_str(r#"{"fraud": {"velocity_threshold": 10}}"#)?;
//! assert_eq!(config.fraud.velocity_threshold, 10);
//! assert_eq!(config.fraud.high_amount_threshold, dec!(10000));
//! assert_eq!(config.fees.percent_rate, dec!(2.9));
//! # Ok::<(), payguard_lib::PaymentError>(())
//! ```

use crate::fraud::FraudRules;
use crate::money::{AmountLimits, FeeSchedule};
use crate::Result;
use serde::{Deserialize, Serialize};

/// Business rules applied by the engine.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Processing fee schedule.
    #[serde(default)]
    pub fees: FeeSchedule,

    /// Accepted payment amount range.
    #[serde(default)]
    pub limits: AmountLimits,

    /// Fraud rule thresholds.
    #[serde(default)]
    pub fraud: FraudRules,
}

impl PolicyConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a (possibly partial) JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError::Serialization`](crate::PaymentError::Serialization)
    /// for malformed JSON or mistyped fields.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Set the fee schedule.
    pub fn with_fees(mut self, fees: FeeSchedule) -> Self {
        self.fees = fees;
        self
    }

    /// Set the amount limits.
    pub fn with_limits(mut self, limits: AmountLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Set the fraud thresholds.
    pub fn with_fraud_rules(mut self, fraud: FraudRules) -> Self {
        self.fraud = fraud;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PaymentError;
    use rust_decimal_macros::dec;

    #[test]
    fn test_defaults() {
        let config = PolicyConfig::new();
        assert_eq!(config.fees.flat_fee, dec!(0.30));
        assert_eq!(config.limits.min, dec!(0.01));
        assert_eq!(config.limits.max, dec!(10000.00));
        assert_eq!(config.fraud.velocity_threshold, 5);
        assert_eq!(PolicyConfig::from_json_str("{}").unwrap(), config);
    }

    #[test]
    fn test_partial_override() {
        let config = PolicyConfig::from_json_str(
            r#"{"fees": {"percent_rate": "3.5"}, "limits": {"max": 500}}"#,
        )
        .unwrap();
        assert_eq!(config.fees.percent_rate, dec!(3.5));
        assert_eq!(config.fees.flat_fee, dec!(0.30));
        assert_eq!(config.limits.max, dec!(500));
        assert_eq!(config.limits.min, dec!(0.01));
    }

    #[test]
    fn test_builders() {
        let config = PolicyConfig::new()
            .with_fees(FeeSchedule::new(dec!(1.5), dec!(0.10)))
            .with_limits(AmountLimits::new(dec!(1), dec!(50)))
            .with_fraud_rules(FraudRules::default().with_velocity_threshold(2));
        assert_eq!(config.fees.fee(dec!(100)), dec!(1.60));
        assert!(!config.limits.contains(dec!(0.50)));
        assert_eq!(config.fraud.velocity_threshold, 2);
    }

    #[test]
    fn test_malformed_json() {
        let err = PolicyConfig::from_json_str(r#"{"fraud": {"velocity_threshold": "many"}}"#)
            .unwrap_err();
        assert!(matches!(err, PaymentError::Serialization(_)));
        assert!(PolicyConfig::from_json_str("not json").is_err());
    }

    #[test]
    fn test_serialize_roundtrip() {
        let config = PolicyConfig::new().with_limits(AmountLimits::new(dec!(5), dec!(20)));
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(PolicyConfig::from_json_str(&json).unwrap(), config);
    }
}
