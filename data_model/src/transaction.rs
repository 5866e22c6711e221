//! Transactions, their envelopes and hashes.

use core::{fmt, str::FromStr};

use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use sha2::{Digest, Sha256};
use tipjar_primitives::amount::Amount;

use crate::{
    address::Address,
    codec::{self, WireError},
    simulation::{AuthorizationEntry, ResourceFootprint, SimulationSuccess},
    value::Value,
};

/// Inclusion fee of a plain operation, in base units.
pub const BASE_FEE: u32 = 100;

/// Longest text memo accepted by the ledger, in bytes.
pub const MAX_MEMO_TEXT_LEN: usize = 28;

/// Account sequence number. A transaction must carry the successor of the
/// source account's current sequence.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Encode,
    Decode,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
pub struct SequenceNumber(pub i64);

impl SequenceNumber {
    /// Sequence number to use for the next transaction.
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

/// Memo attached to a transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Encode, Decode)]
pub enum Memo {
    /// No memo
    #[default]
    None,
    /// Short text
    Text(String),
}

impl Memo {
    /// Text memo.
    ///
    /// # Errors
    /// If `text` is longer than [`MAX_MEMO_TEXT_LEN`] bytes.
    pub fn text(text: impl Into<String>) -> Result<Self, MemoTooLong> {
        let text = text.into();
        if text.len() > MAX_MEMO_TEXT_LEN {
            return Err(MemoTooLong(text.len()));
        }
        Ok(Self::Text(text))
    }
}

/// Memo text exceeds [`MAX_MEMO_TEXT_LEN`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("memo is {0} bytes long, at most {MAX_MEMO_TEXT_LEN} are allowed")]
pub struct MemoTooLong(pub usize);

/// Call of a contract method. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct ContractCallIntent {
    contract: Address,
    method: String,
    args: Vec<Value>,
    caller: Address,
}

impl ContractCallIntent {
    /// Construct [`Self`].
    pub fn new(
        contract: Address,
        method: impl Into<String>,
        args: Vec<Value>,
        caller: Address,
    ) -> Self {
        Self {
            contract,
            method: method.into(),
            args,
            caller,
        }
    }

    /// Called contract.
    pub fn contract(&self) -> &Address {
        &self.contract
    }

    /// Called method.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Ordered arguments.
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// Account on whose behalf the call is made.
    pub fn caller(&self) -> &Address {
        &self.caller
    }
}

/// Native asset transfer.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct PaymentOp {
    /// Receiving account
    pub destination: Address,
    /// Transferred amount
    pub amount: Amount,
}

/// The single operation of a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum Operation {
    /// Contract call
    InvokeContract(ContractCallIntent),
    /// Payment
    Payment(PaymentOp),
}

/// Resources a contract call is allowed to consume, filled in from
/// simulation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Encode, Decode)]
pub struct SorobanData {
    /// Entries the call touches
    pub footprint: ResourceFootprint,
    /// Authorizations attached to the call
    pub authorization: Vec<AuthorizationEntry>,
    /// Resource fee included in the transaction fee
    pub resource_fee: u64,
}

/// Unsigned transaction.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct Transaction {
    /// Paying and sequence-providing account
    pub source: Address,
    /// Maximum total fee, in base units
    pub fee: u32,
    /// Sequence number consumed by this transaction
    pub sequence: SequenceNumber,
    /// Upper time bound, seconds since the Unix epoch
    pub max_time: Option<u64>,
    /// Attached memo
    pub memo: Memo,
    /// The operation
    pub operation: Operation,
    /// Contract resources, present on assembled contract calls
    pub soroban: Option<SorobanData>,
}

impl Transaction {
    /// Hash identifying this transaction on the network with the given
    /// passphrase.
    pub fn hash(&self, network_passphrase: &str) -> TransactionHash {
        let network_id = Sha256::digest(network_passphrase.as_bytes());
        let mut hasher = Sha256::new();
        hasher.update(network_id);
        hasher.update(self.encode());
        TransactionHash(hasher.finalize().into())
    }

    /// The contract call, if this transaction is one.
    pub fn contract_call(&self) -> Option<&ContractCallIntent> {
        match &self.operation {
            Operation::InvokeContract(intent) => Some(intent),
            Operation::Payment(_) => None,
        }
    }
}

/// Signature together with a hint of the signing key.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct DecoratedSignature {
    /// Last four bytes of the public key
    pub hint: [u8; 4],
    /// Signature bytes
    pub signature: Vec<u8>,
}

/// Transaction with its signatures, the unit exchanged with signers and the
/// network.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct TransactionEnvelope {
    /// Signed payload
    pub tx: Transaction,
    /// Signatures, empty before signing
    pub signatures: Vec<DecoratedSignature>,
}

impl TransactionEnvelope {
    /// Wire form handed to signers and to `sendTransaction`.
    pub fn to_envelope_string(&self) -> String {
        codec::to_wire(self)
    }

    /// Parse the wire form.
    ///
    /// # Errors
    /// If `encoded` is not a valid envelope.
    pub fn from_envelope_string(encoded: &str) -> Result<Self, WireError> {
        codec::from_wire(encoded)
    }

    /// Hash of the enclosed transaction.
    pub fn hash(&self, network_passphrase: &str) -> TransactionHash {
        self.tx.hash(network_passphrase)
    }

    /// `true` once at least one signature is attached.
    pub fn is_signed(&self) -> bool {
        !self.signatures.is_empty()
    }
}

/// 32-byte transaction hash, displayed as lowercase hex.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, SerializeDisplay, DeserializeFromStr,
)]
pub struct TransactionHash(pub [u8; 32]);

impl fmt::Display for TransactionHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl FromStr for TransactionHash {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0_u8; 32];
        hex::decode_to_slice(s.trim(), &mut bytes)?;
        Ok(Self(bytes))
    }
}

/// Reasons simulation data cannot be applied to a transaction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssembleError {
    /// Only contract calls take simulation data.
    #[error("transaction is not a contract call")]
    NotContractCall,
    /// The fee the simulation asks for is more than the transaction allows.
    #[error("required fee {required} exceeds ceiling {ceiling}")]
    FeeAboveCeiling {
        /// Inclusion plus resource fee
        required: u64,
        /// Fee the transaction was built with
        ceiling: u32,
    },
}

/// Unsigned transaction whose fee and resources are resolved, ready for
/// signing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledEnvelope(Transaction);

impl AssembledEnvelope {
    /// Apply a successful simulation to a contract call built with its fee
    /// ceiling as `fee`.
    ///
    /// The resulting fee is [`BASE_FEE`] plus the simulated resource fee.
    ///
    /// # Errors
    /// See [`AssembleError`].
    pub fn assemble(
        mut tx: Transaction,
        simulation: &SimulationSuccess,
    ) -> Result<Self, AssembleError> {
        if tx.contract_call().is_none() {
            return Err(AssembleError::NotContractCall);
        }
        let ceiling = tx.fee;
        let required = u64::from(BASE_FEE).saturating_add(simulation.min_resource_fee);
        let fee = u32::try_from(required)
            .ok()
            .filter(|fee| *fee <= ceiling)
            .ok_or(AssembleError::FeeAboveCeiling { required, ceiling })?;

        tx.fee = fee;
        tx.soroban = Some(SorobanData {
            footprint: simulation.footprint.clone(),
            authorization: simulation.authorization.clone(),
            resource_fee: simulation.min_resource_fee,
        });
        Ok(Self(tx))
    }

    /// Wrap a transaction that needs no simulation, such as a payment.
    pub fn without_resources(tx: Transaction) -> Self {
        Self(tx)
    }

    /// The transaction.
    pub fn transaction(&self) -> &Transaction {
        &self.0
    }

    /// Unsigned envelope.
    pub fn envelope(&self) -> TransactionEnvelope {
        TransactionEnvelope {
            tx: self.0.clone(),
            signatures: Vec::new(),
        }
    }

    /// Wire form of the unsigned envelope.
    pub fn to_envelope_string(&self) -> String {
        self.envelope().to_envelope_string()
    }

    /// Hash of the transaction.
    pub fn hash(&self, network_passphrase: &str) -> TransactionHash {
        self.0.hash(network_passphrase)
    }
}
