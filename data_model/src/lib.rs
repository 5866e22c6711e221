//! Tipjar Data Model contains the ledger-facing structures of the tip client:
//! addresses, self-describing contract values, transaction envelopes,
//! simulation results and the tip records decoded from query results.

#![allow(clippy::module_name_repetitions)]

pub use tipjar_primitives::amount;

pub mod address;
pub mod codec;
pub mod decode;
pub mod ledger;
pub mod simulation;
pub mod tip;
pub mod transaction;
pub mod value;

/// The prelude re-exports most commonly used traits, structs and macros from this crate.
pub mod prelude {
    pub use tipjar_primitives::prelude::*;

    pub use super::{
        address::{Address, AddressError, AddressKind},
        codec::WireError,
        decode::{DecodeError, FromValue, PartialDecode},
        ledger::{
            AccountState, PaymentDirection, PaymentRecord, SendOutcome, SendStatus,
            TransactionStatus, DEFAULT_PAYMENT_LIMIT,
        },
        simulation::{
            AuthorizationEntry, LedgerKey, ResourceFootprint, SimulationOutcome,
            SimulationSuccess,
        },
        tip::{check_message_len, LeaderboardEntry, MessageTooLong, TipRecord},
        transaction::{
            AssembleError, AssembledEnvelope, ContractCallIntent, DecoratedSignature, Memo,
            MemoTooLong, Operation, PaymentOp, SequenceNumber, SorobanData, Transaction,
            TransactionEnvelope, TransactionHash, BASE_FEE,
        },
        value::{MapEntry, Value},
    };
}
