//! Tip records and leaderboard entries decoded from contract query results.

use serde::{Deserialize, Serialize};
use tipjar_primitives::amount::Amount;

use crate::{
    address::Address,
    decode::{decode_sequence, DecodeError, FromValue, PartialDecode},
    value::Value,
};

/// Default UI limit on the length of a tip message, in characters.
pub const DEFAULT_MESSAGE_CAP: usize = 100;

/// One tip as stored by the contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TipRecord {
    /// Sender, [`Address::unknown`] when not reported
    pub from: Address,
    /// Amount tipped, zero when not reported
    pub amount: Amount,
    /// Attached message, empty when not reported
    pub message: String,
    /// Ledger timestamp, if the contract records one
    pub timestamp: Option<u64>,
}

/// Accumulated total of one donor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// Donor
    pub address: Address,
    /// Sum of all tips of this donor
    pub total_donated: Amount,
}

fn optional<T: FromValue>(value: Option<&Value>) -> Result<Option<T>, DecodeError> {
    match value {
        None | Some(Value::Void) => Ok(None),
        Some(value) => T::from_value(value).map(Some),
    }
}

/// Records come either as symbol-keyed maps or as positional vecs of
/// `[from, amount, message, timestamp]`. Absent fields take their defaults,
/// present but ill-typed fields reject the record.
impl FromValue for TipRecord {
    fn from_value(value: &Value) -> Result<Self, DecodeError> {
        let (from, amount, message, timestamp) = match value {
            Value::Map(_) => (
                value.field("from"),
                value.field("amount"),
                value.field("message"),
                value.field("timestamp"),
            ),
            Value::Vec(fields) => (
                fields.first(),
                fields.get(1),
                fields.get(2),
                fields.get(3),
            ),
            other => {
                return Err(DecodeError::UnexpectedType {
                    expected: "tip record",
                    found: other.type_name(),
                })
            }
        };

        Ok(Self {
            from: optional(from)?.unwrap_or_else(Address::unknown),
            amount: optional(amount)?.unwrap_or(Amount::ZERO),
            message: optional(message)?.unwrap_or_default(),
            timestamp: optional(timestamp)?,
        })
    }
}

impl FromValue for LeaderboardEntry {
    fn from_value(value: &Value) -> Result<Self, DecodeError> {
        match value.as_vec() {
            Some([address, total]) => Ok(Self {
                address: Address::from_value(address)?,
                total_donated: Amount::from_value(total)?,
            }),
            Some(other) => Err(DecodeError::Invalid(format!(
                "expected a pair, got {} elements",
                other.len()
            ))),
            None => Err(DecodeError::UnexpectedType {
                expected: "pair",
                found: value.type_name(),
            }),
        }
    }
}

/// Decode the result of the tip history query, skipping malformed records.
pub fn decode_tip_history(value: &Value) -> PartialDecode<TipRecord> {
    decode_sequence(value, TipRecord::from_value)
}

/// Decode the result of the leaderboard query.
///
/// Accepts a vec of `(address, total)` pairs or a map of address to total.
/// Order is kept as the ledger returned it.
pub fn decode_leaderboard(value: &Value) -> PartialDecode<LeaderboardEntry> {
    let Some(entries) = value.as_map() else {
        return decode_sequence(value, LeaderboardEntry::from_value);
    };
    let mut out = PartialDecode::default();
    for entry in entries {
        let decoded = Address::from_value(&entry.key).and_then(|address| {
            Ok(LeaderboardEntry {
                address,
                total_donated: Amount::from_value(&entry.val)?,
            })
        });
        match decoded {
            Ok(item) => out.items.push(item),
            Err(_) => out.skipped += 1,
        }
    }
    out
}

/// A tip message is longer than the configured cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("message is {len} characters long, at most {cap} are allowed")]
pub struct MessageTooLong {
    /// Length of the rejected message, in characters
    pub len: usize,
    /// Configured cap
    pub cap: usize,
}

/// Check `message` against the UI-level length cap.
pub fn check_message_len(message: &str, cap: usize) -> Result<(), MessageTooLong> {
    let len = message.chars().count();
    if len > cap {
        return Err(MessageTooLong { len, cap });
    }
    Ok(())
}
