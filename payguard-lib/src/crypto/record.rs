//! Payment records and the tokens they are sealed into.

use crate::{PaymentError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A single value stored in a [`PaymentRecord`].
///
/// The set of kinds is closed on purpose: nested structures would need a
/// canonical form of their own.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum RecordValue {
    /// UTF-8 text (card numbers, CVVs, names).
    Text(String),
    /// Exact decimal number (amounts, counts).
    Number(Decimal),
    /// Boolean flag.
    Bool(bool),
}

impl RecordValue {
    /// The text, if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The number, if this is a numeric value.
    pub fn as_number(&self) -> Option<Decimal> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// The flag, if this is a boolean value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Number(_) => "number",
            Self::Bool(_) => "bool",
        }
    }

    fn from_json(field: &str, value: &Value) -> Result<Self> {
        match value {
            Value::String(s) => Ok(Self::Text(s.clone())),
            Value::Bool(b) => Ok(Self::Bool(*b)),
            Value::Number(n) => {
                let repr = n.to_string();
                Decimal::from_str(&repr)
                    .or_else(|_| Decimal::from_scientific(&repr))
                    .map(Self::Number)
                    .map_err(|e| PaymentError::invalid_data(field, e.to_string()))
            }
            Value::Null => Err(PaymentError::invalid_data(field, "null is not supported")),
            Value::Array(_) | Value::Object(_) => Err(PaymentError::invalid_data(
                field,
                "nested values are not supported",
            )),
        }
    }

    fn to_json(&self) -> Value {
        match self {
            Self::Text(s) => Value::String(s.clone()),
            Self::Bool(b) => Value::Bool(*b),
            Self::Number(n) => serde_json::Number::from_str(&n.to_string())
                .map(Value::Number)
                .unwrap_or_else(|_| Value::String(n.to_string())),
        }
    }
}

impl fmt::Display for RecordValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{}", n),
            Self::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for RecordValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for RecordValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<Decimal> for RecordValue {
    fn from(n: Decimal) -> Self {
        Self::Number(n)
    }
}

impl From<i64> for RecordValue {
    fn from(n: i64) -> Self {
        Self::Number(Decimal::from(n))
    }
}

impl From<bool> for RecordValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// Caller-defined payment data, keyed by field name.
///
/// Keys are kept sorted, which makes the serialized form canonical: two
/// records with the same fields produce the same bytes regardless of
/// insertion order.
///
/// `Debug` prints field names and value kinds only.
///
/// # Example
///
/// ```
/// use payguard_lib::PaymentRecord;
/// use rust_decimal_macros::dec;
///
/// let record = PaymentRecord::new()
///     .with("card_number", "4111111111111111")
///     .with("cvv", "123")
///     .with("amount", dec!(99.99));
/// assert_eq!(record.len(), 3);
/// assert_eq!(record.get_text("cvv"), Some("123"));
/// ```
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentRecord {
    fields: BTreeMap<String, RecordValue>,
}

impl PaymentRecord {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<RecordValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert a field, returning the previous value.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<RecordValue>,
    ) -> Option<RecordValue> {
        self.fields.insert(key.into(), value.into())
    }

    /// Remove a field.
    pub fn remove(&mut self, key: &str) -> Option<RecordValue> {
        self.fields.remove(key)
    }

    /// Look up a field.
    pub fn get(&self, key: &str) -> Option<&RecordValue> {
        self.fields.get(key)
    }

    /// Look up a text field.
    pub fn get_text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(RecordValue::as_text)
    }

    /// Look up a numeric field.
    pub fn get_number(&self, key: &str) -> Option<Decimal> {
        self.get(key).and_then(RecordValue::as_number)
    }

    /// Whether the field exists.
    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate fields in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RecordValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Convert a JSON object into a record.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError::InvalidData`] if `value` is not an object or
    /// holds null, arrays, nested objects, or numbers that do not fit a
    /// decimal.
    pub fn from_json(value: &Value) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| PaymentError::invalid_data("record", "expected a JSON object"))?;
        object
            .iter()
            .map(|(key, value)| Ok((key.clone(), RecordValue::from_json(key, value)?)))
            .collect::<Result<BTreeMap<_, _>>>()
            .map(|fields| Self { fields })
    }

    /// Render the record as a flat JSON object.
    pub fn to_json(&self) -> Value {
        let object: Map<String, Value> = self
            .fields
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect();
        Value::Object(object)
    }

    pub(crate) fn to_canonical_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(&self.fields)?)
    }

    pub(crate) fn from_canonical_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(Self {
            fields: serde_json::from_slice(bytes)?,
        })
    }
}

impl fmt::Debug for PaymentRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (key, value) in &self.fields {
            map.entry(key, &format_args!("<{}>", value.kind()));
        }
        map.finish()
    }
}

impl<K, V> FromIterator<(K, V)> for PaymentRecord
where
    K: Into<String>,
    V: Into<RecordValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Opaque token produced by [`PaymentCrypto::tokenize`](super::PaymentCrypto::tokenize).
///
/// Carries ciphertext only; safe to log and store.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(String);

impl Token {
    /// Wrap a token string received from storage or a peer.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The token string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the token string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<String> for Token {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Token {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
