//! Terminal outcomes of the write path and their user-facing classes.

use core::fmt;

use tipjar_data_model::prelude::*;

/// Which party refused a transaction before it got a hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionSource {
    /// The signer declined or failed
    Wallet,
    /// The RPC server refused the submission
    Network,
    /// Local validation before anything was sent
    Preflight,
}

/// Refusal of a transaction before it was assigned a hash.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason}")]
pub struct Rejection {
    /// Who refused
    pub origin: RejectionSource,
    /// Why
    pub reason: String,
}

impl Rejection {
    /// Construct [`Self`].
    pub fn new(origin: RejectionSource, reason: impl Into<String>) -> Self {
        Self {
            origin,
            reason: reason.into(),
        }
    }
}

/// Terminal state reached by the submission coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// Applied successfully
    Succeeded(TransactionHash),
    /// Applied and failed
    Failed {
        /// The failed transaction
        hash: TransactionHash,
        /// Failure description
        reason: String,
    },
    /// No terminal status within the polling bound. The transaction may
    /// still be applied later.
    TimedOut(TransactionHash),
    /// Refused before a hash was assigned
    RejectedBeforeSubmit(Rejection),
    /// Polling stopped by the caller
    Cancelled(TransactionHash),
}

impl SubmissionOutcome {
    /// Hash of the transaction, if it was submitted.
    pub fn hash(&self) -> Option<&TransactionHash> {
        match self {
            Self::Succeeded(hash)
            | Self::Failed { hash, .. }
            | Self::TimedOut(hash)
            | Self::Cancelled(hash) => Some(hash),
            Self::RejectedBeforeSubmit(_) => None,
        }
    }

    /// `Ok` only for [`SubmissionOutcome::Succeeded`].
    ///
    /// # Errors
    /// Every other outcome, as the matching [`TransactionError`].
    pub fn into_result(self) -> Result<TransactionHash, TransactionError> {
        match self {
            Self::Succeeded(hash) => Ok(hash),
            Self::Failed { hash, .. } => Err(TransactionError::OnChainFailure(hash)),
            Self::TimedOut(hash) => Err(TransactionError::ConfirmationTimeout(hash)),
            Self::RejectedBeforeSubmit(rejection) => {
                Err(TransactionError::RejectedBeforeSubmit(rejection))
            }
            Self::Cancelled(hash) => Err(TransactionError::Cancelled(hash)),
        }
    }

    /// User-facing notice for this outcome.
    pub fn notice(&self) -> Notice {
        match self.clone().into_result() {
            Ok(hash) => Notice {
                class: MessageClass::Succeeded,
                hash: Some(hash),
            },
            Err(err) => err.notice(),
        }
    }
}

/// Failure of a write-path attempt. One per attempt, nothing is swallowed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransactionError {
    /// The amount could not be converted.
    #[error("invalid amount: {0}")]
    InvalidAmount(#[from] AmountError),
    /// The ledger rejected the dry run.
    #[error("simulation failed: {0}")]
    SimulationFailed(String),
    /// Refused before a hash was assigned.
    #[error("rejected before submission: {0}")]
    RejectedBeforeSubmit(Rejection),
    /// Applied and failed.
    #[error("transaction {0} failed on chain")]
    OnChainFailure(TransactionHash),
    /// Outcome unknown after the polling bound.
    #[error("transaction {0} was not confirmed in time")]
    ConfirmationTimeout(TransactionHash),
    /// Polling stopped by the caller, outcome unknown.
    #[error("stopped waiting for transaction {0}")]
    Cancelled(TransactionHash),
}

impl TransactionError {
    pub(crate) fn preflight(reason: impl Into<String>) -> Self {
        Self::RejectedBeforeSubmit(Rejection::new(RejectionSource::Preflight, reason))
    }

    /// Hash of the transaction, if it got one.
    pub fn hash(&self) -> Option<&TransactionHash> {
        match self {
            Self::OnChainFailure(hash) | Self::ConfirmationTimeout(hash) | Self::Cancelled(hash) => {
                Some(hash)
            }
            Self::InvalidAmount(_) | Self::SimulationFailed(_) | Self::RejectedBeforeSubmit(_) => {
                None
            }
        }
    }

    /// Message class shown to the user.
    pub fn class(&self) -> MessageClass {
        match self {
            Self::InvalidAmount(_) => MessageClass::AmountInvalid,
            Self::RejectedBeforeSubmit(rejection) => match rejection.origin {
                RejectionSource::Wallet => MessageClass::RejectedByWallet,
                RejectionSource::Network => MessageClass::RejectedByNetwork,
                RejectionSource::Preflight => MessageClass::AmountInvalid,
            },
            Self::SimulationFailed(_) => MessageClass::RejectedByNetwork,
            Self::OnChainFailure(_) => MessageClass::FailedOnChain,
            Self::ConfirmationTimeout(_) | Self::Cancelled(_) => MessageClass::ConfirmationTimedOut,
        }
    }

    /// User-facing notice for this error.
    pub fn notice(&self) -> Notice {
        Notice {
            class: self.class(),
            hash: self.hash().copied(),
        }
    }
}

/// Human-readable class of a write-path outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, displaydoc::Display)]
pub enum MessageClass {
    /// Tip sent, thank you!
    Succeeded,
    /// The amount or recipient is not valid
    AmountInvalid,
    /// The transaction was rejected by the wallet
    RejectedByWallet,
    /// The transaction was rejected by the network
    RejectedByNetwork,
    /// The transaction failed on chain
    FailedOnChain,
    /// Confirmation timed out, the transaction may still complete
    ConfirmationTimedOut,
}

/// Message class paired with the transaction hash when one exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Notice {
    /// What to tell the user
    pub class: MessageClass,
    /// Hash to look the transaction up with
    pub hash: Option<TransactionHash>,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.hash {
            Some(hash) => write!(f, "{} (transaction {hash})", self.class),
            None => write!(f, "{}", self.class),
        }
    }
}
