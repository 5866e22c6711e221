//! Client for the tip jar contract: reads tip statistics and drives
//! donations through simulation, external signing, submission and
//! confirmation.

pub mod builder;
/// Module with the tip jar client itself
pub mod client;
pub mod config;
pub mod error;
/// Module with general communication primitives like an HTTP request builder.
pub mod http;
mod http_default;
pub mod json_rpc;
pub mod query;
pub mod rpc;
pub mod signer;
pub mod submit;

pub use http_default::{DefaultRequest, DefaultRequestBuilder};
pub use tipjar_data_model as data_model;

/// Module containing the most used items of the client.
pub mod prelude {
    pub use crate::{
        builder::{TransactionBuilder, DONATION_METHOD},
        client::Client,
        config::{Config, TransactionPolicy},
        error::{
            MessageClass, Notice, Rejection, RejectionSource, SubmissionOutcome,
            TransactionError,
        },
        json_rpc::JsonRpcLedger,
        query::{ContractQuery, Leaderboard, QueryExecutor, TipHistory, TotalDonated},
        rpc::{LedgerRpc, RpcError},
        signer::{Signer, SignerError},
        submit::SubmissionCoordinator,
    };
    pub use tokio_util::sync::CancellationToken;
}
