//! Fees, currency formatting and amount limits.
//!
//! All arithmetic uses `rust_decimal::Decimal`; binary floats never touch a
//! money value. Rounding is half away from zero at the currency's minor-unit
//! precision (2 decimals, 0 for JPY).

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Currency with its display symbol and minor-unit precision.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Currency {
    /// US dollar.
    Usd,
    /// Euro.
    Eur,
    /// Pound sterling.
    Gbp,
    /// Japanese yen; no minor units.
    Jpy,
    /// Canadian dollar.
    Cad,
    /// Australian dollar.
    Aud,
    /// Any other ISO code, formatted with two decimals and no symbol.
    Other(String),
}

impl Currency {
    /// Resolve an ISO code, case-insensitively.
    pub fn from_code(code: &str) -> Self {
        let code = code.trim().to_ascii_uppercase();
        match code.as_str() {
            "USD" => Self::Usd,
            "EUR" => Self::Eur,
            "GBP" => Self::Gbp,
            "JPY" => Self::Jpy,
            "CAD" => Self::Cad,
            "AUD" => Self::Aud,
            _ => Self::Other(code),
        }
    }

    /// ISO code.
    pub fn code(&self) -> &str {
        match self {
            Self::Usd => "USD",
            Self::Eur => "EUR",
            Self::Gbp => "GBP",
            Self::Jpy => "JPY",
            Self::Cad => "CAD",
            Self::Aud => "AUD",
            Self::Other(code) => code,
        }
    }

    /// Display symbol, if the currency has one.
    pub fn symbol(&self) -> Option<&'static str> {
        match self {
            Self::Usd => Some("$"),
            Self::Eur => Some("€"),
            Self::Gbp => Some("£"),
            Self::Jpy => Some("¥"),
            Self::Cad => Some("C$"),
            Self::Aud => Some("A$"),
            Self::Other(_) => None,
        }
    }

    /// Number of decimal places in the currency's minor unit.
    pub fn minor_units(&self) -> u32 {
        match self {
            Self::Jpy => 0,
            _ => 2,
        }
    }

    /// Round half away from zero to the minor unit.
    pub fn round(&self, amount: Decimal) -> Decimal {
        amount.round_dp_with_strategy(self.minor_units(), RoundingStrategy::MidpointAwayFromZero)
    }
}

impl Default for Currency {
    fn default() -> Self {
        Self::Usd
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl From<&str> for Currency {
    fn from(code: &str) -> Self {
        Self::from_code(code)
    }
}

impl From<String> for Currency {
    fn from(code: String) -> Self {
        Self::from_code(&code)
    }
}

impl From<Currency> for String {
    fn from(currency: Currency) -> Self {
        currency.code().to_string()
    }
}

fn default_percent_rate() -> Decimal {
    dec!(2.9)
}

fn default_flat_fee() -> Decimal {
    dec!(0.30)
}

/// Processing fee: a percentage of the amount plus a flat component.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSchedule {
    /// Percentage of the amount (2.9 means 2.9%).
    #[serde(default = "default_percent_rate")]
    pub percent_rate: Decimal,
    /// Flat fee added per transaction.
    #[serde(default = "default_flat_fee")]
    pub flat_fee: Decimal,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            percent_rate: default_percent_rate(),
            flat_fee: default_flat_fee(),
        }
    }
}

impl FeeSchedule {
    /// Create a fee schedule.
    pub fn new(percent_rate: Decimal, flat_fee: Decimal) -> Self {
        Self {
            percent_rate,
            flat_fee,
        }
    }

    /// Set the percentage rate.
    pub fn with_percent_rate(mut self, percent_rate: Decimal) -> Self {
        self.percent_rate = percent_rate;
        self
    }

    /// Set the flat fee.
    pub fn with_flat_fee(mut self, flat_fee: Decimal) -> Self {
        self.flat_fee = flat_fee;
        self
    }

    /// Fee for `amount`, rounded to two decimals.
    pub fn fee(&self, amount: Decimal) -> Decimal {
        self.fee_for(amount, &Currency::Usd)
    }

    /// Fee for `amount`, rounded to the currency's minor unit.
    ///
    /// Saturates at `Decimal::MAX` instead of overflowing.
    pub fn fee_for(&self, amount: Decimal, currency: &Currency) -> Decimal {
        let raw = self
            .percent_rate
            .checked_div(Decimal::ONE_HUNDRED)
            .and_then(|fraction| amount.checked_mul(fraction))
            .and_then(|percentage| percentage.checked_add(self.flat_fee))
            .unwrap_or(Decimal::MAX);
        currency.round(raw)
    }
}

/// Compute a processing fee.
///
/// `percent_rate` defaults to 2.9 and `flat_fee` to 0.30.
///
/// # Example
///
/// ```
/// use payguard_lib::calculate_fee;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(calculate_fee(dec!(100.00), None, None), dec!(3.20));
/// assert_eq!(calculate_fee(dec!(500.00), Some(dec!(3.0)), Some(dec!(0.50))), dec!(15.50));
/// ```
pub fn calculate_fee(
    amount: Decimal,
    percent_rate: Option<Decimal>,
    flat_fee: Option<Decimal>,
) -> Decimal {
    let defaults = FeeSchedule::default();
    FeeSchedule::new(
        percent_rate.unwrap_or(defaults.percent_rate),
        flat_fee.unwrap_or(defaults.flat_fee),
    )
    .fee(amount)
}

/// Format an amount with the currency's symbol, thousands separators and
/// minor-unit precision.
///
/// Unknown codes render as `"<CODE> 1,234.50"`.
///
/// # Example
///
/// ```
/// use payguard_lib::format_currency;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_currency(dec!(1234.5), "USD"), "$1,234.50");
/// assert_eq!(format_currency(dec!(1234.5), "JPY"), "¥1,235");
/// assert_eq!(format_currency(dec!(99), "CHF"), "CHF 99.00");
/// ```
pub fn format_currency(amount: Decimal, currency_code: &str) -> String {
    let currency = Currency::from_code(currency_code);
    let rounded = currency.round(amount);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let body = group_thousands(rounded.abs(), currency.minor_units());
    match currency.symbol() {
        Some(symbol) => format!("{}{}{}", sign, symbol, body),
        None => format!("{} {}{}", currency.code(), sign, body),
    }
}

fn group_thousands(value: Decimal, scale: u32) -> String {
    let mut value = value;
    value.rescale(scale);
    let text = value.to_string();
    let (integer, fraction) = match text.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (text.as_str(), None),
    };

    let mut grouped = String::with_capacity(text.len() + integer.len() / 3);
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    // `rescale` cannot add digits once the mantissa is full, so pad here.
    let fraction = fraction.unwrap_or("");
    if scale > 0 {
        grouped.push('.');
        grouped.push_str(fraction);
        for _ in fraction.len()..scale as usize {
            grouped.push('0');
        }
    }
    grouped
}

fn default_min_amount() -> Decimal {
    dec!(0.01)
}

fn default_max_amount() -> Decimal {
    dec!(10000.00)
}

/// Inclusive bounds for a single payment amount.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmountLimits {
    /// Smallest accepted amount.
    #[serde(default = "default_min_amount")]
    pub min: Decimal,
    /// Largest accepted amount.
    #[serde(default = "default_max_amount")]
    pub max: Decimal,
}

impl Default for AmountLimits {
    fn default() -> Self {
        Self {
            min: default_min_amount(),
            max: default_max_amount(),
        }
    }
}

impl AmountLimits {
    /// Create limits.
    pub fn new(min: Decimal, max: Decimal) -> Self {
        Self { min, max }
    }

    /// Whether `amount` lies within the bounds.
    pub fn contains(&self, amount: Decimal) -> bool {
        self.min <= amount && amount <= self.max
    }
}

/// Whether `amount` is an acceptable payment: `0.01 <= amount <= 10000.00`.
///
/// Amounts below one cent (including 0.00 and fractions such as 0.001) are
/// rejected, as is anything above 10,000.00.
pub fn validate_amount(amount: Decimal) -> bool {
    AmountLimits::default().contains(amount)
}

/// [`validate_amount`] for textual input; unparseable text is `false`.
pub fn validate_amount_str(amount: &str) -> bool {
    Decimal::from_str(amount.trim()).map_or(false, validate_amount)
}
