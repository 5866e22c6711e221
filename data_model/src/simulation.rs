//! Results of dry-running a transaction against the ledger.

use parity_scale_codec::{Decode, Encode};

use crate::{address::Address, value::Value};

/// Ledger entry touched by a contract call.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum LedgerKey {
    /// Account entry
    Account(Address),
    /// Contract storage slot
    ContractData {
        /// Owning contract
        contract: Address,
        /// Storage key
        key: Value,
    },
    /// Contract code blob
    ContractCode {
        /// Hash of the code
        hash: [u8; 32],
    },
}

/// Set of ledger entries a contract call reads and writes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Encode, Decode)]
pub struct ResourceFootprint {
    /// Entries only read
    pub read_only: Vec<LedgerKey>,
    /// Entries read and written
    pub read_write: Vec<LedgerKey>,
}

/// Authorization the call requires from one party.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct AuthorizationEntry {
    /// Authorizing address; `None` means the transaction source account,
    /// which authorizes by signing the envelope.
    pub address: Option<Address>,
    /// Invocation tree being authorized
    pub invocation: Value,
}

/// Successful dry run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationSuccess {
    /// Entries the call touches
    pub footprint: ResourceFootprint,
    /// Authorizations the call needs
    pub authorization: Vec<AuthorizationEntry>,
    /// Resource fee on top of the inclusion fee
    pub min_resource_fee: u64,
    /// What the call returned
    pub return_value: Value,
    /// Ledger the simulation ran against
    pub latest_ledger: u32,
}

/// Outcome of a dry run. Errors are never retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimulationOutcome {
    /// The call would succeed
    Success(SimulationSuccess),
    /// The ledger rejected the call, with its diagnostic
    Error(String),
}

impl SimulationOutcome {
    /// The success payload, if any.
    pub fn success(self) -> Option<SimulationSuccess> {
        match self {
            Self::Success(success) => Some(success),
            Self::Error(_) => None,
        }
    }
}
