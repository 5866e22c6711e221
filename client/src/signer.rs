//! External signing capability.
//!
//! Keys never reach this crate. A wallet, browser extension or hardware
//! device implements [`Signer`] and returns the signed envelope.

use async_trait::async_trait;

/// Reasons a signer did not return a signed envelope.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignerError {
    /// The user refused to sign.
    #[error("signing was declined")]
    Declined,
    /// The wallet is locked.
    #[error("wallet is locked")]
    Locked,
    /// No wallet is connected.
    #[error("no signer is available")]
    Unavailable,
    /// Anything else reported by the wallet.
    #[error("signer failed: {0}")]
    Other(String),
}

/// Signs envelopes in their wire form.
#[async_trait]
pub trait Signer: Send + Sync {
    /// Sign `envelope` for the network identified by `network_passphrase`
    /// and return the signed envelope in wire form.
    ///
    /// May suspend for as long as the wallet takes to answer.
    async fn sign(&self, envelope: &str, network_passphrase: &str) -> Result<String, SignerError>;
}
