#![allow(clippy::restriction, dead_code)]

use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use async_trait::async_trait;
use tipjar_client::{config::TransactionPolicy, prelude::*};
use tipjar_data_model::prelude::*;
use tokio::time::Instant;

pub const PASSPHRASE: &str = "Tip Jar Test Network";
pub const ALICE: &str = "GC6QXTLS3XSA3GJPHODE2ZSCQS2LFAOANOZKUFLKBJNXCRVYV6NJB3RI";
pub const BOB: &str = "GAIH3ULLFQ4DGSECF2AR555KZ4KNDGEKN4AFI4SU2M7B43MGK3QJZNSR";
pub const CONTRACT: &str = "CAYRJABAYNE4Q5PYYILXIUZOWKCHJGMURXXWAD7MXGFHGRRSUG5CCIKF";

pub fn alice() -> Address {
    ALICE.parse().unwrap()
}

pub fn success(return_value: Value) -> SimulationOutcome {
    SimulationOutcome::Success(SimulationSuccess {
        footprint: ResourceFootprint::default(),
        authorization: Vec::new(),
        min_resource_fee: 25_000,
        return_value,
        latest_ledger: 1_000,
    })
}

/// In-memory ledger with a scripted sequence of transaction statuses.
///
/// Every account exists at sequence 41. Once the script runs out, every
/// poll reports [`TransactionStatus::Pending`].
pub struct MockLedger {
    simulation: SimulationOutcome,
    send_status: SendStatus,
    send_error: Option<String>,
    statuses: Mutex<VecDeque<TransactionStatus>>,
    unreachable: bool,
    submit_unreachable: bool,
    polls_unreachable: bool,
    simulated: Mutex<Vec<TransactionEnvelope>>,
    submitted: Mutex<Vec<TransactionEnvelope>>,
    polls: Mutex<Vec<Instant>>,
}

impl Default for MockLedger {
    fn default() -> Self {
        Self {
            simulation: success(Value::Void),
            send_status: SendStatus::Pending,
            send_error: None,
            statuses: Mutex::new(VecDeque::new()),
            unreachable: false,
            submit_unreachable: false,
            polls_unreachable: false,
            simulated: Mutex::new(Vec::new()),
            submitted: Mutex::new(Vec::new()),
            polls: Mutex::new(Vec::new()),
        }
    }
}

impl MockLedger {
    /// Ledger failing every call with a transport error.
    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Self::default()
        }
    }

    /// Ledger that loses the connection on `sendTransaction`.
    pub fn failing_submit() -> Self {
        Self {
            submit_unreachable: true,
            ..Self::default()
        }
    }

    /// Ledger that accepts submissions but fails every status poll.
    pub fn failing_polls() -> Self {
        Self {
            polls_unreachable: true,
            ..Self::default()
        }
    }

    pub fn with_simulation(mut self, simulation: SimulationOutcome) -> Self {
        self.simulation = simulation;
        self
    }

    pub fn with_statuses(self, statuses: impl IntoIterator<Item = TransactionStatus>) -> Self {
        *self.statuses.lock().unwrap() = statuses.into_iter().collect();
        self
    }

    pub fn with_send_status(mut self, status: SendStatus, error: Option<&str>) -> Self {
        self.send_status = status;
        self.send_error = error.map(ToOwned::to_owned);
        self
    }

    pub fn simulated(&self) -> Vec<TransactionEnvelope> {
        self.simulated.lock().unwrap().clone()
    }

    pub fn submitted(&self) -> Vec<TransactionEnvelope> {
        self.submitted.lock().unwrap().clone()
    }

    pub fn poll_times(&self) -> Vec<Instant> {
        self.polls.lock().unwrap().clone()
    }

    fn check_reachable(&self) -> Result<(), RpcError> {
        refuse_if(self.unreachable)
    }
}

fn refuse_if(unreachable: bool) -> Result<(), RpcError> {
    if unreachable {
        return Err(RpcError::Transport(eyre::eyre!("connection refused")));
    }
    Ok(())
}

#[async_trait]
impl LedgerRpc for MockLedger {
    async fn simulate(
        &self,
        envelope: &TransactionEnvelope,
    ) -> Result<SimulationOutcome, RpcError> {
        self.check_reachable()?;
        self.simulated.lock().unwrap().push(envelope.clone());
        Ok(self.simulation.clone())
    }

    async fn submit(&self, envelope: &TransactionEnvelope) -> Result<SendOutcome, RpcError> {
        self.check_reachable()?;
        refuse_if(self.submit_unreachable)?;
        self.submitted.lock().unwrap().push(envelope.clone());
        Ok(SendOutcome {
            hash: envelope.hash(PASSPHRASE),
            status: self.send_status,
            error: self.send_error.clone(),
        })
    }

    async fn get_transaction(
        &self,
        _hash: &TransactionHash,
    ) -> Result<TransactionStatus, RpcError> {
        self.check_reachable()?;
        self.polls.lock().unwrap().push(Instant::now());
        refuse_if(self.polls_unreachable)?;
        Ok(self
            .statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(TransactionStatus::Pending))
    }

    async fn get_account(&self, address: &Address) -> Result<AccountState, RpcError> {
        self.check_reachable()?;
        Ok(AccountState {
            id: address.clone(),
            sequence: SequenceNumber(41),
            balance: "10000".parse().unwrap(),
        })
    }

    async fn recent_payments(
        &self,
        address: &Address,
        limit: u32,
    ) -> Result<Vec<PaymentRecord>, RpcError> {
        self.check_reachable()?;
        let payments = self
            .submitted
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter_map(|envelope| match &envelope.tx.operation {
                Operation::Payment(payment) => Some(PaymentRecord {
                    id: envelope.hash(PASSPHRASE).to_string(),
                    direction: PaymentRecord::direction_for(address, &envelope.tx.source),
                    amount: payment.amount,
                    from: envelope.tx.source.clone(),
                    to: payment.destination.clone(),
                    created_at: None,
                }),
                Operation::InvokeContract(_) => None,
            })
            .filter(|record| record.from == *address || record.to == *address)
            .take(limit as usize)
            .collect();
        Ok(payments)
    }
}

/// How [`MockSigner`] answers a signing request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Wallet {
    /// Signs what it was given
    #[default]
    Honest,
    /// Refuses to sign
    Declining,
    /// Bumps the fee before signing
    Tampering,
    /// Answers with text that is not an envelope
    Garbling,
}

/// Wallet following one [`Wallet`] behaviour for every request.
#[derive(Default)]
pub struct MockSigner {
    wallet: Wallet,
    calls: AtomicUsize,
}

impl MockSigner {
    pub fn new(wallet: Wallet) -> Self {
        Self {
            wallet,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn declining() -> Self {
        Self::new(Wallet::Declining)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Signer for MockSigner {
    async fn sign(&self, envelope: &str, network_passphrase: &str) -> Result<String, SignerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert_eq!(network_passphrase, PASSPHRASE);
        match self.wallet {
            Wallet::Declining => return Err(SignerError::Declined),
            Wallet::Garbling => return Ok("definitely not an envelope".to_owned()),
            Wallet::Honest | Wallet::Tampering => {}
        }
        let mut envelope = TransactionEnvelope::from_envelope_string(envelope)
            .map_err(|err| SignerError::Other(err.to_string()))?;
        if self.wallet == Wallet::Tampering {
            envelope.tx.fee += 1_000;
        }
        envelope.signatures.push(DecoratedSignature {
            hint: [0xA1, 0xB2, 0xC3, 0xD4],
            signature: vec![7; 64],
        });
        Ok(envelope.to_envelope_string())
    }
}

pub fn config() -> Config {
    Config {
        network_passphrase: PASSPHRASE.to_owned(),
        rpc_url: "http://127.0.0.1:8000/soroban/rpc".parse().unwrap(),
        contract_id: CONTRACT.parse().unwrap(),
        friendbot_url: None,
        transaction: TransactionPolicy::default(),
        logger: tipjar_logger::Config::default(),
    }
}

pub fn client(ledger: &Arc<MockLedger>, signer: &Arc<MockSigner>) -> Client {
    tipjar_logger::test_logger();
    Client::with_rpc(config(), ledger.clone(), signer.clone())
}

pub fn coordinator(ledger: &Arc<MockLedger>, signer: &Arc<MockSigner>) -> SubmissionCoordinator {
    tipjar_logger::test_logger();
    SubmissionCoordinator::new(
        ledger.clone(),
        signer.clone(),
        PASSPHRASE,
        &TransactionPolicy::default(),
    )
}
