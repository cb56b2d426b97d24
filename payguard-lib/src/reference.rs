//! Payment references and receipts.

use crate::money::Currency;
use chrono::{DateTime, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;

/// Prefix used by [`generate_reference`].
pub const REFERENCE_PREFIX: &str = "PAY";

const SUFFIX_ALPHABET: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const SUFFIX_LEN: usize = 4;
/// 36^4 distinct suffixes.
const SUFFIX_SPACE: u64 = 1_679_616;

static SUFFIX_COUNTER: AtomicU64 = AtomicU64::new(0);
static SUFFIX_WALK: OnceLock<(u64, u64)> = OnceLock::new();

/// Random `(offset, step)` with `step` coprime to 36^4 (neither even nor a
/// multiple of 3), so `offset + n * step` visits every suffix once per cycle.
fn suffix_walk() -> (u64, u64) {
    *SUFFIX_WALK.get_or_init(|| {
        let mut rng = rand::thread_rng();
        let offset = rng.gen_range(0..SUFFIX_SPACE);
        let residue = if rng.gen::<bool>() { 1 } else { 5 };
        let step = rng.gen_range(0..SUFFIX_SPACE / 6) * 6 + residue;
        (offset, step)
    })
}

fn next_suffix() -> String {
    let (offset, step) = suffix_walk();
    let n = SUFFIX_COUNTER.fetch_add(1, Ordering::Relaxed) % SUFFIX_SPACE;
    let mut value = (offset + n * step) % SUFFIX_SPACE;

    let mut suffix = [b'0'; SUFFIX_LEN];
    for slot in suffix.iter_mut().rev() {
        *slot = SUFFIX_ALPHABET[(value % 36) as usize];
        value /= 36;
    }
    suffix.iter().map(|&b| b as char).collect()
}

/// Generate a payment reference: `PAY` + UTC `YYYYMMDDHHMMSS` + four
/// uppercase alphanumerics.
///
/// References sort by creation second. The suffix is a shared counter pushed
/// through a random per-process permutation of the 36^4 suffix space: no
/// two calls in one process collide until 36^4 references have been issued,
/// and consecutive suffixes are not adjacent values. The suffix is not a
/// secret; anyone holding several references from one process can recover
/// the permutation.
///
/// # Example
///
/// ```
/// let reference = payguard_lib::generate_reference();
/// assert!(reference.starts_with("PAY"));
/// assert_eq!(reference.len(), 21);
/// ```
pub fn generate_reference() -> String {
    generate_reference_with_prefix(REFERENCE_PREFIX)
}

/// [`generate_reference`] with a caller-chosen prefix.
pub fn generate_reference_with_prefix(prefix: &str) -> String {
    format!(
        "{}{}{}",
        prefix,
        Utc::now().format("%Y%m%d%H%M%S"),
        next_suffix()
    )
}

/// Receipt status.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReceiptStatus {
    /// Payment settled.
    #[default]
    Completed,
}

/// Summary of a completed payment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentReceipt {
    /// Gateway or internal transaction identifier.
    pub transaction_id: String,
    /// Amount charged.
    pub amount: Decimal,
    /// Currency of the amount.
    pub currency: Currency,
    /// When the receipt was issued.
    pub timestamp: DateTime<Utc>,
    /// Settlement status.
    pub status: ReceiptStatus,
    /// Where the receipt is sent, if anywhere.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,
}

/// Build a receipt stamped with the current UTC time.
///
/// An empty email is treated as absent.
pub fn build_receipt(
    transaction_id: impl Into<String>,
    amount: Decimal,
    currency: Currency,
    customer_email: Option<&str>,
) -> PaymentReceipt {
    PaymentReceipt {
        transaction_id: transaction_id.into(),
        amount,
        currency,
        timestamp: Utc::now(),
        status: ReceiptStatus::Completed,
        customer_email: customer_email
            .filter(|email| !email.trim().is_empty())
            .map(str::to_string),
    }
}
