//! Write path, first half: from a typed intent to an assembled envelope.

use std::{
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

use tipjar_data_model::prelude::*;
use tipjar_logger::debug;

use crate::{
    config::TransactionPolicy,
    error::{Rejection, RejectionSource, TransactionError},
    rpc::{LedgerRpc, RpcError},
};

/// Contract method receiving donations.
pub const DONATION_METHOD: &str = "buy_coffee";

/// Builds and assembles unsigned transactions.
#[derive(Clone)]
pub struct TransactionBuilder {
    rpc: Arc<dyn LedgerRpc>,
    contract: Address,
    policy: TransactionPolicy,
}

impl TransactionBuilder {
    /// Builder for calls to `contract` under `policy`.
    pub fn new(rpc: Arc<dyn LedgerRpc>, contract: Address, policy: TransactionPolicy) -> Self {
        Self {
            rpc,
            contract,
            policy,
        }
    }

    /// Donation of `amount` from `from` with an attached `message`.
    ///
    /// The message is forwarded as is. Length limits are a UI concern, see
    /// [`check_message_len`].
    ///
    /// # Errors
    /// - [`TransactionError::InvalidAmount`] when `amount` is not a decimal
    /// - [`TransactionError::SimulationFailed`] when the source account cannot
    ///   be loaded, the ledger rejects the dry run or its fee is above the
    ///   ceiling
    pub async fn build_donation(
        &self,
        from: &Address,
        amount: &str,
        message: &str,
    ) -> Result<AssembledEnvelope, TransactionError> {
        let amount: Amount = amount.parse()?;
        let intent = ContractCallIntent::new(
            self.contract.clone(),
            DONATION_METHOD,
            vec![
                Value::Address(from.clone()),
                Value::from(amount),
                Value::from(message),
            ],
            from.clone(),
        );
        debug!(%from, %amount, "Building donation");
        self.build_contract_call(intent).await
    }

    /// Any contract call, simulated and assembled. The caller of the intent
    /// is the transaction source.
    ///
    /// # Errors
    /// [`TransactionError::SimulationFailed`], see [`Self::build_donation`].
    pub async fn build_contract_call(
        &self,
        intent: ContractCallIntent,
    ) -> Result<AssembledEnvelope, TransactionError> {
        let source = intent.caller().clone();
        let account = self
            .rpc
            .get_account(&source)
            .await
            .map_err(|err| TransactionError::SimulationFailed(err.to_string()))?;

        let tx = Transaction {
            source,
            fee: self.policy.contract_fee_ceiling,
            sequence: account.sequence.next(),
            max_time: self.max_time(),
            memo: Memo::None,
            operation: Operation::InvokeContract(intent),
            soroban: None,
        };
        let unsigned = TransactionEnvelope {
            tx,
            signatures: Vec::new(),
        };

        let simulation = match self.rpc.simulate(&unsigned).await {
            Ok(SimulationOutcome::Success(success)) => success,
            Ok(SimulationOutcome::Error(detail)) => {
                debug!(%detail, "Simulation rejected the call");
                return Err(TransactionError::SimulationFailed(detail));
            }
            Err(err) => return Err(TransactionError::SimulationFailed(err.to_string())),
        };
        debug!(
            resource_fee = simulation.min_resource_fee,
            latest_ledger = simulation.latest_ledger,
            "Simulation succeeded"
        );

        AssembledEnvelope::assemble(unsigned.tx, &simulation)
            .map_err(|err| TransactionError::SimulationFailed(err.to_string()))
    }

    /// Plain transfer of the native asset at the fixed payment fee.
    ///
    /// # Errors
    /// - [`TransactionError::InvalidAmount`] when `amount` is not a decimal
    /// - [`TransactionError::RejectedBeforeSubmit`] when the destination is
    ///   not an existing account, the amount is zero, the memo is too long or
    ///   the ledger cannot be reached
    pub async fn build_payment(
        &self,
        from: &Address,
        destination: &str,
        amount: &str,
        memo: Option<&str>,
    ) -> Result<AssembledEnvelope, TransactionError> {
        let destination: Address = destination
            .parse()
            .map_err(|err| TransactionError::preflight(format!("invalid destination: {err}")))?;
        if !destination.is_account() {
            return Err(TransactionError::preflight(
                "destination must be an account address",
            ));
        }
        let amount: Amount = amount.parse()?;
        if amount.is_zero() {
            return Err(TransactionError::preflight("amount must be positive"));
        }
        let memo = match memo {
            Some(text) => {
                Memo::text(text).map_err(|err| TransactionError::preflight(err.to_string()))?
            }
            None => Memo::None,
        };

        match self.rpc.get_account(&destination).await {
            Ok(_) => {}
            Err(RpcError::AccountNotFound(_)) => {
                return Err(TransactionError::preflight(
                    "destination account does not exist",
                ))
            }
            Err(err) => return Err(network_rejection(&err)),
        }
        let account = self
            .rpc
            .get_account(from)
            .await
            .map_err(|err| network_rejection(&err))?;

        debug!(%from, %destination, %amount, "Building payment");
        Ok(AssembledEnvelope::without_resources(Transaction {
            source: from.clone(),
            fee: self.policy.payment_fee,
            sequence: account.sequence.next(),
            max_time: self.max_time(),
            memo,
            operation: Operation::Payment(PaymentOp {
                destination,
                amount,
            }),
            soroban: None,
        }))
    }

    fn max_time(&self) -> Option<u64> {
        let now = SystemTime::now().duration_since(UNIX_EPOCH).ok()?;
        Some(now.saturating_add(self.policy.timeout).as_secs())
    }
}

fn network_rejection(err: &RpcError) -> TransactionError {
    TransactionError::RejectedBeforeSubmit(Rejection::new(
        RejectionSource::Network,
        err.to_string(),
    ))
}
