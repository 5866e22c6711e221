//! Write path, second half: signing, submission and confirmation.

use std::{sync::Arc, time::Duration};

use tipjar_data_model::prelude::*;
use tipjar_logger::{debug, info, warn};
use tokio_util::sync::CancellationToken;

use crate::{
    config::TransactionPolicy,
    error::{Rejection, RejectionSource, SubmissionOutcome},
    rpc::LedgerRpc,
    signer::Signer,
};

/// Reason attached to transactions the ledger applied and failed.
pub const ON_CHAIN_FAILURE: &str = "on-chain failure";

/// Where a submission currently is.
#[derive(Debug)]
enum State {
    Built,
    AwaitingSignature,
    Submitting(TransactionEnvelope),
    Polling { hash: TransactionHash, attempt: u32 },
    Done(SubmissionOutcome),
}

/// Drives an assembled envelope to a terminal [`SubmissionOutcome`].
///
/// Nothing is retried. A new attempt starts over from a freshly built
/// envelope.
#[derive(Clone)]
pub struct SubmissionCoordinator {
    rpc: Arc<dyn LedgerRpc>,
    signer: Arc<dyn Signer>,
    network_passphrase: String,
    poll_interval: Duration,
    poll_attempts: u32,
}

impl SubmissionCoordinator {
    /// Coordinator polling as `policy` prescribes.
    pub fn new(
        rpc: Arc<dyn LedgerRpc>,
        signer: Arc<dyn Signer>,
        network_passphrase: impl Into<String>,
        policy: &TransactionPolicy,
    ) -> Self {
        Self {
            rpc,
            signer,
            network_passphrase: network_passphrase.into(),
            poll_interval: policy.poll_interval,
            poll_attempts: policy.poll_attempts,
        }
    }

    /// Sign, submit and wait for `envelope`.
    ///
    /// Signing may take as long as the wallet does. Once submitted, the
    /// status is polled every poll interval up to the configured number of
    /// attempts. Triggering `cancel` stops polling before the next request.
    pub async fn submit(
        &self,
        envelope: &AssembledEnvelope,
        cancel: &CancellationToken,
    ) -> SubmissionOutcome {
        let mut state = State::Built;
        loop {
            debug!(?state, "Submission step");
            state = match state {
                State::Built => State::AwaitingSignature,
                State::AwaitingSignature => self.sign(envelope).await,
                State::Submitting(signed) => self.send(&signed).await,
                State::Polling { hash, attempt } => self.poll(hash, attempt, cancel).await,
                State::Done(outcome) => {
                    info!(?outcome, "Submission finished");
                    return outcome;
                }
            };
        }
    }

    async fn sign(&self, envelope: &AssembledEnvelope) -> State {
        let signed = match self
            .signer
            .sign(&envelope.to_envelope_string(), &self.network_passphrase)
            .await
        {
            Ok(signed) => signed,
            Err(err) => return rejected(RejectionSource::Wallet, err.to_string()),
        };
        match TransactionEnvelope::from_envelope_string(&signed) {
            Ok(signed) if signed.tx == *envelope.transaction() => State::Submitting(signed),
            Ok(_) => rejected(
                RejectionSource::Wallet,
                "signer returned a different transaction",
            ),
            Err(err) => rejected(
                RejectionSource::Wallet,
                format!("signer returned an unreadable envelope: {err}"),
            ),
        }
    }

    async fn send(&self, signed: &TransactionEnvelope) -> State {
        let outcome = match self.rpc.submit(signed).await {
            Ok(outcome) => outcome,
            Err(err) => return rejected(RejectionSource::Network, err.to_string()),
        };

        match outcome.status {
            SendStatus::Pending | SendStatus::Duplicate => {
                let local = signed.hash(&self.network_passphrase);
                if local != outcome.hash {
                    warn!(%local, remote = %outcome.hash, "Server reported a different hash");
                }
                State::Polling {
                    hash: outcome.hash,
                    attempt: 0,
                }
            }
            SendStatus::TryAgainLater => {
                rejected(RejectionSource::Network, "server is busy, try again later")
            }
            SendStatus::Error => rejected(
                RejectionSource::Network,
                outcome
                    .error
                    .unwrap_or_else(|| "transaction rejected".to_owned()),
            ),
        }
    }

    async fn poll(&self, hash: TransactionHash, attempt: u32, cancel: &CancellationToken) -> State {
        if attempt >= self.poll_attempts {
            return State::Done(SubmissionOutcome::TimedOut(hash));
        }

        tokio::select! {
            biased;
            () = cancel.cancelled() => return State::Done(SubmissionOutcome::Cancelled(hash)),
            () = tokio::time::sleep(self.poll_interval) => {}
        }

        match self.rpc.get_transaction(&hash).await {
            Ok(TransactionStatus::Success) => State::Done(SubmissionOutcome::Succeeded(hash)),
            Ok(TransactionStatus::Failed) => State::Done(SubmissionOutcome::Failed {
                hash,
                reason: ON_CHAIN_FAILURE.to_owned(),
            }),
            Ok(status @ (TransactionStatus::Pending | TransactionStatus::NotFound)) => {
                debug!(%hash, %status, attempt, "Not yet confirmed");
                State::Polling {
                    hash,
                    attempt: attempt + 1,
                }
            }
            Err(err) => {
                warn!(%hash, %err, attempt, "Status poll failed");
                State::Polling {
                    hash,
                    attempt: attempt + 1,
                }
            }
        }
    }
}

fn rejected(source: RejectionSource, reason: impl Into<String>) -> State {
    State::Done(SubmissionOutcome::RejectedBeforeSubmit(Rejection::new(
        source, reason,
    )))
}
