//! Read path: simulate-only contract calls decoded into domain records.
//!
//! Queries are total. Any transport fault, simulation error or undecodable
//! result collapses into the query's empty value, so callers always get
//! something renderable. Nothing is retried here.

use std::sync::Arc;

use tipjar_data_model::{
    prelude::*,
    tip::{decode_leaderboard, decode_tip_history},
};
use tipjar_logger::{debug, warn};

use crate::rpc::LedgerRpc;

/// Contract method returning the total donated by one address.
pub const TOTAL_DONATED_METHOD: &str = "total_donated";
/// Contract method returning every tip.
pub const TIP_HISTORY_METHOD: &str = "tip_history";
/// Contract method returning per-donor totals.
pub const LEADERBOARD_METHOD: &str = "leaderboard";

/// A read-only contract method together with its decoder.
pub trait ContractQuery {
    /// Decoded result
    type Output;

    /// Contract method name.
    fn method(&self) -> &'static str;

    /// Ordered call arguments.
    fn args(&self) -> Vec<Value>;

    /// Decode the returned value, falling back to [`Self::empty`] where
    /// the value is unusable.
    fn decode(&self, value: &Value) -> Self::Output;

    /// Result reported when the query cannot be answered.
    fn empty(&self) -> Self::Output;
}

/// Sum of all tips of one address.
#[derive(Debug, Clone)]
pub struct TotalDonated {
    /// Donor
    pub user: Address,
}

impl ContractQuery for TotalDonated {
    type Output = Amount;

    fn method(&self) -> &'static str {
        TOTAL_DONATED_METHOD
    }

    fn args(&self) -> Vec<Value> {
        vec![Value::Address(self.user.clone())]
    }

    fn decode(&self, value: &Value) -> Amount {
        Amount::from_value(value).unwrap_or_else(|err| {
            warn!(%err, "Undecodable total, reporting zero");
            Amount::ZERO
        })
    }

    fn empty(&self) -> Amount {
        Amount::ZERO
    }
}

/// Every tip, in ledger order.
#[derive(Debug, Clone, Copy, Default)]
pub struct TipHistory;

impl ContractQuery for TipHistory {
    type Output = Vec<TipRecord>;

    fn method(&self) -> &'static str {
        TIP_HISTORY_METHOD
    }

    fn args(&self) -> Vec<Value> {
        Vec::new()
    }

    fn decode(&self, value: &Value) -> Vec<TipRecord> {
        let decoded = decode_tip_history(value);
        if decoded.skipped > 0 {
            warn!(skipped = decoded.skipped, "Skipped malformed tip records");
        }
        decoded.items
    }

    fn empty(&self) -> Vec<TipRecord> {
        Vec::new()
    }
}

/// Per-donor totals, in ledger order.
#[derive(Debug, Clone, Copy, Default)]
pub struct Leaderboard;

impl ContractQuery for Leaderboard {
    type Output = Vec<LeaderboardEntry>;

    fn method(&self) -> &'static str {
        LEADERBOARD_METHOD
    }

    fn args(&self) -> Vec<Value> {
        Vec::new()
    }

    fn decode(&self, value: &Value) -> Vec<LeaderboardEntry> {
        let decoded = decode_leaderboard(value);
        if decoded.skipped > 0 {
            warn!(skipped = decoded.skipped, "Skipped malformed leaderboard entries");
        }
        decoded.items
    }

    fn empty(&self) -> Vec<LeaderboardEntry> {
        Vec::new()
    }
}

/// Runs read-only calls against one contract.
#[derive(Clone)]
pub struct QueryExecutor {
    rpc: Arc<dyn LedgerRpc>,
    contract: Address,
}

impl QueryExecutor {
    /// Executor for `contract`.
    pub fn new(rpc: Arc<dyn LedgerRpc>, contract: Address) -> Self {
        Self { rpc, contract }
    }

    /// Run a typed query on behalf of `caller`.
    pub async fn execute<Q: ContractQuery + Sync>(&self, query: &Q, caller: &Address) -> Q::Output {
        match self.query_value(query.method(), query.args(), caller).await {
            Some(value) => query.decode(&value),
            None => query.empty(),
        }
    }

    /// Simulate `method(args)` and return the raw result, `None` on any
    /// failure.
    pub async fn query_value(
        &self,
        method: &str,
        args: Vec<Value>,
        caller: &Address,
    ) -> Option<Value> {
        let envelope = self.envelope(method, args, caller);
        match self.rpc.simulate(&envelope).await {
            Ok(SimulationOutcome::Success(success)) => {
                debug!(method, "Query answered");
                Some(success.return_value)
            }
            Ok(SimulationOutcome::Error(detail)) => {
                warn!(method, %detail, "Query rejected by simulation");
                None
            }
            Err(err) => {
                warn!(method, %err, "Query failed");
                None
            }
        }
    }

    /// Queries are never submitted, so a synthetic sequence number is used
    /// instead of loading the caller's account.
    fn envelope(&self, method: &str, args: Vec<Value>, caller: &Address) -> TransactionEnvelope {
        let intent = ContractCallIntent::new(self.contract.clone(), method, args, caller.clone());
        TransactionEnvelope {
            tx: Transaction {
                source: caller.clone(),
                fee: BASE_FEE,
                sequence: SequenceNumber::default().next(),
                max_time: None,
                memo: Memo::None,
                operation: Operation::InvokeContract(intent),
                soroban: None,
            },
            signatures: Vec::new(),
        }
    }
}
