//! Contains the tip jar client. Reads degrade to empty values, writes end in
//! exactly one typed outcome.

use std::sync::Arc;

use tipjar_data_model::prelude::*;
use tipjar_logger::{debug, warn};
use tokio_util::sync::CancellationToken;

use crate::{
    builder::TransactionBuilder,
    config::Config,
    error::TransactionError,
    http::{Method, RequestBuilder},
    http_default::DefaultRequestBuilder,
    json_rpc::JsonRpcLedger,
    query::{Leaderboard, QueryExecutor, TipHistory, TotalDonated},
    rpc::{LedgerRpc, RpcError},
    signer::Signer,
    submit::SubmissionCoordinator,
};

/// Tip jar client
#[derive(Clone)]
pub struct Client {
    /// Validated configuration
    config: Config,
    /// Ledger access shared by every component
    rpc: Arc<dyn LedgerRpc>,
    /// Read path
    queries: QueryExecutor,
    /// Envelope construction
    builder: TransactionBuilder,
    /// Signing, submission and confirmation
    coordinator: SubmissionCoordinator,
}

impl Client {
    /// Client talking JSON-RPC to the configured endpoint.
    pub fn new(config: Config, signer: Arc<dyn Signer>) -> Self {
        let rpc = Arc::new(JsonRpcLedger::new(config.rpc_url.clone()));
        Self::with_rpc(config, rpc, signer)
    }

    /// Client over any [`LedgerRpc`] implementation.
    pub fn with_rpc(config: Config, rpc: Arc<dyn LedgerRpc>, signer: Arc<dyn Signer>) -> Self {
        let queries = QueryExecutor::new(Arc::clone(&rpc), config.contract_id.clone());
        let builder = TransactionBuilder::new(
            Arc::clone(&rpc),
            config.contract_id.clone(),
            config.transaction,
        );
        let coordinator = SubmissionCoordinator::new(
            Arc::clone(&rpc),
            signer,
            config.network_passphrase.clone(),
            &config.transaction,
        );
        Self {
            config,
            rpc,
            queries,
            builder,
            coordinator,
        }
    }

    /// Configuration the client was built with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Executor for raw or custom queries.
    pub fn queries(&self) -> &QueryExecutor {
        &self.queries
    }

    /// Donate `amount` with `message` and wait for confirmation.
    ///
    /// # Errors
    /// Every outcome except success, see [`TransactionError`].
    pub async fn donate(
        &self,
        from: &Address,
        amount: &str,
        message: &str,
        cancel: &CancellationToken,
    ) -> Result<TransactionHash, TransactionError> {
        let envelope = self.builder.build_donation(from, amount, message).await?;
        self.coordinator.submit(&envelope, cancel).await.into_result()
    }

    /// Send a native payment and wait for confirmation.
    ///
    /// # Errors
    /// Every outcome except success, see [`TransactionError`].
    pub async fn pay(
        &self,
        from: &Address,
        destination: &str,
        amount: &str,
        memo: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<TransactionHash, TransactionError> {
        let envelope = self
            .builder
            .build_payment(from, destination, amount, memo)
            .await?;
        self.coordinator.submit(&envelope, cancel).await.into_result()
    }

    /// Total donated by `user`, zero when unknown.
    pub async fn total_donated(&self, user: &Address) -> Amount {
        let query = TotalDonated { user: user.clone() };
        self.queries.execute(&query, user).await
    }

    /// Every tip, empty when unavailable.
    pub async fn tip_history(&self, caller: &Address) -> Vec<TipRecord> {
        self.queries.execute(&TipHistory, caller).await
    }

    /// Per-donor totals, empty when unavailable.
    pub async fn leaderboard(&self, caller: &Address) -> Vec<LeaderboardEntry> {
        self.queries.execute(&Leaderboard, caller).await
    }

    /// Whether `address` exists on the ledger. Lookup failures count as
    /// absent.
    pub async fn account_exists(&self, address: &Address) -> bool {
        match self.rpc.get_account(address).await {
            Ok(_) => true,
            Err(RpcError::AccountNotFound(_)) => false,
            Err(err) => {
                warn!(%address, %err, "Account lookup failed");
                false
            }
        }
    }

    /// Native balance of `address`, `None` when the account cannot be
    /// loaded.
    pub async fn balance(&self, address: &Address) -> Option<Amount> {
        match self.rpc.get_account(address).await {
            Ok(account) => Some(account.balance),
            Err(RpcError::AccountNotFound(_)) => None,
            Err(err) => {
                warn!(%address, %err, "Balance lookup failed");
                None
            }
        }
    }

    /// Up to `limit` latest payments touching `address`, newest first.
    /// Empty when unavailable.
    pub async fn recent_payments(&self, address: &Address, limit: u32) -> Vec<PaymentRecord> {
        match self.rpc.recent_payments(address, limit).await {
            Ok(payments) => payments,
            Err(err) => {
                warn!(%address, %err, "Payment history unavailable");
                Vec::new()
            }
        }
    }

    /// Ask the test network's funding service to create and fund
    /// `address`. `false` when no service is configured or funding failed.
    pub async fn fund_testnet_account(&self, address: &Address) -> bool {
        let Some(url) = &self.config.friendbot_url else {
            debug!("No funding service configured");
            return false;
        };
        let request = DefaultRequestBuilder::new(Method::GET, url.as_str())
            .query_param("addr", address.as_str())
            .body_empty();

        match tokio::task::spawn_blocking(move || request.send()).await {
            Ok(Ok(response)) if response.status().is_success() => {
                debug!(%address, "Account funded");
                true
            }
            Ok(Ok(response)) => {
                warn!(%address, status = %response.status(), "Funding refused");
                false
            }
            Ok(Err(err)) => {
                warn!(%address, %err, "Funding request failed");
                false
            }
            Err(err) => {
                warn!(%address, %err, "Funding task failed");
                false
            }
        }
    }

    /// Check `message` against the configured length cap.
    ///
    /// # Errors
    /// When the message has more characters than the cap.
    pub fn check_message(&self, message: &str) -> Result<(), MessageTooLong> {
        check_message_len(message, self.config.transaction.message_cap)
    }
}
