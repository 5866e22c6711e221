//! Ledger-side state reported by the RPC server.

use serde::{Deserialize, Serialize};

use tipjar_primitives::amount::Amount;

use crate::{
    address::Address,
    transaction::{SequenceNumber, TransactionHash},
};

/// Status of a transaction looked up by hash.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    /// Accepted, not yet in a closed ledger
    #[display(fmt = "PENDING")]
    Pending,
    /// Applied successfully
    #[display(fmt = "SUCCESS")]
    Success,
    /// Applied and failed
    #[display(fmt = "FAILED")]
    Failed,
    /// Unknown to the server, possibly not yet propagated
    #[display(fmt = "NOT_FOUND")]
    NotFound,
}

impl TransactionStatus {
    /// `true` for statuses that never change again.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Failed)
    }
}

/// Immediate answer of the server to a submission.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SendStatus {
    /// Queued for inclusion
    #[display(fmt = "PENDING")]
    Pending,
    /// Already queued earlier
    #[display(fmt = "DUPLICATE")]
    Duplicate,
    /// Not queued, the server is congested
    #[display(fmt = "TRY_AGAIN_LATER")]
    TryAgainLater,
    /// Rejected
    #[display(fmt = "ERROR")]
    Error,
}

/// Answer to a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendOutcome {
    /// Hash of the submitted transaction
    pub hash: TransactionHash,
    /// What happened to it
    pub status: SendStatus,
    /// Diagnostic accompanying [`SendStatus::Error`]
    pub error: Option<String>,
}

/// Current state of an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountState {
    /// The account
    pub id: Address,
    /// Last consumed sequence number
    pub sequence: SequenceNumber,
    /// Native balance, zero when the server does not report it
    #[serde(default)]
    pub balance: Amount,
}

/// Number of payments [`PaymentRecord`] listings return by default.
pub const DEFAULT_PAYMENT_LIMIT: u32 = 10;

/// How a listed payment relates to the account it was listed for.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum PaymentDirection {
    /// The account paid
    #[display(fmt = "sent")]
    Sent,
    /// The account was paid
    #[display(fmt = "received")]
    Received,
    /// The account was created and funded, or created another one
    #[display(fmt = "create_account")]
    CreateAccount,
}

/// Native payment touching an account, newest first in listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    /// Server assigned operation id
    pub id: String,
    /// Relation to the listed account
    pub direction: PaymentDirection,
    /// Transferred or starting amount
    pub amount: Amount,
    /// Paying or funding account
    pub from: Address,
    /// Paid or created account
    pub to: Address,
    /// ISO 8601 creation time, as reported
    pub created_at: Option<String>,
}

impl PaymentRecord {
    /// Direction of a plain payment from `from` as seen by `owner`.
    pub fn direction_for(owner: &Address, from: &Address) -> PaymentDirection {
        if owner == from {
            PaymentDirection::Sent
        } else {
            PaymentDirection::Received
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::restriction)]

    use super::*;

    #[test]
    fn statuses_use_rpc_spelling() {
        let status: TransactionStatus = serde_json::from_str("\"NOT_FOUND\"").unwrap();
        assert_eq!(status, TransactionStatus::NotFound);
        assert_eq!(status.to_string(), "NOT_FOUND");
        let send: SendStatus = serde_json::from_str("\"TRY_AGAIN_LATER\"").unwrap();
        assert_eq!(send, SendStatus::TryAgainLater);
    }

    #[test]
    fn balance_defaults_to_zero() {
        let account: AccountState = serde_json::from_str(
            r#"{"id": "GC6QXTLS3XSA3GJPHODE2ZSCQS2LFAOANOZKUFLKBJNXCRVYV6NJB3RI", "sequence": 7}"#,
        )
        .unwrap();
        assert_eq!(account.balance, Amount::ZERO);
    }

    #[test]
    fn payment_direction_follows_owner() {
        let alice: Address = "GC6QXTLS3XSA3GJPHODE2ZSCQS2LFAOANOZKUFLKBJNXCRVYV6NJB3RI"
            .parse()
            .unwrap();
        let bob: Address = "GAIH3ULLFQ4DGSECF2AR555KZ4KNDGEKN4AFI4SU2M7B43MGK3QJZNSR"
            .parse()
            .unwrap();
        assert_eq!(
            PaymentRecord::direction_for(&alice, &alice),
            PaymentDirection::Sent
        );
        assert_eq!(
            PaymentRecord::direction_for(&alice, &bob),
            PaymentDirection::Received
        );
        assert_eq!(
            serde_json::to_string(&PaymentDirection::CreateAccount).unwrap(),
            "\"create_account\""
        );
    }

    #[test]
    fn only_success_and_failure_are_terminal() {
        assert!(TransactionStatus::Success.is_terminal());
        assert!(TransactionStatus::Failed.is_terminal());
        assert!(!TransactionStatus::Pending.is_terminal());
        assert!(!TransactionStatus::NotFound.is_terminal());
    }
}
