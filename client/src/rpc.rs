//! Ledger RPC capability.

use std::sync::Arc;

use async_trait::async_trait;
use http::StatusCode;
use tipjar_data_model::prelude::*;

/// Failure talking to the RPC server.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    /// The request never produced a response.
    #[error("transport failure: {0:#}")]
    Transport(eyre::Report),
    /// The server answered with a non-success HTTP status.
    #[error("server responded with HTTP {0}")]
    Http(StatusCode),
    /// The server answered with a JSON-RPC error object.
    #[error("server error {code}: {message}")]
    Server {
        /// JSON-RPC error code
        code: i64,
        /// Server supplied description
        message: String,
    },
    /// The response could not be understood.
    #[error("malformed response: {0}")]
    Malformed(String),
    /// The looked up account does not exist.
    #[error("account {0} does not exist")]
    AccountNotFound(Address),
}

/// Operations the pipeline needs from the ledger.
#[async_trait]
pub trait LedgerRpc: Send + Sync {
    /// Dry-run `envelope` and report resources, authorizations and the
    /// return value.
    async fn simulate(&self, envelope: &TransactionEnvelope)
        -> Result<SimulationOutcome, RpcError>;

    /// Submit a signed envelope.
    async fn submit(&self, envelope: &TransactionEnvelope) -> Result<SendOutcome, RpcError>;

    /// Look up the status of a submitted transaction.
    async fn get_transaction(&self, hash: &TransactionHash)
        -> Result<TransactionStatus, RpcError>;

    /// Load the current sequence number and native balance of an account.
    async fn get_account(&self, address: &Address) -> Result<AccountState, RpcError>;

    /// Up to `limit` most recent native payments touching `address`, newest
    /// first.
    async fn recent_payments(
        &self,
        address: &Address,
        limit: u32,
    ) -> Result<Vec<PaymentRecord>, RpcError>;
}

#[async_trait]
impl<T: LedgerRpc + ?Sized> LedgerRpc for Arc<T> {
    async fn simulate(
        &self,
        envelope: &TransactionEnvelope,
    ) -> Result<SimulationOutcome, RpcError> {
        (**self).simulate(envelope).await
    }

    async fn submit(&self, envelope: &TransactionEnvelope) -> Result<SendOutcome, RpcError> {
        (**self).submit(envelope).await
    }

    async fn get_transaction(
        &self,
        hash: &TransactionHash,
    ) -> Result<TransactionStatus, RpcError> {
        (**self).get_transaction(hash).await
    }

    async fn get_account(&self, address: &Address) -> Result<AccountState, RpcError> {
        (**self).get_account(address).await
    }

    async fn recent_payments(
        &self,
        address: &Address,
        limit: u32,
    ) -> Result<Vec<PaymentRecord>, RpcError> {
        (**self).recent_payments(address, limit).await
    }
}
