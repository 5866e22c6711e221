//! Module for client-related configuration and structs

use std::{borrow::Cow, path::Path, time::Duration};

use error_stack::ResultExt;
use tipjar_data_model::{address::Address, tip, transaction::BASE_FEE};
use url::Url;

mod user;

pub use user::{ParseError, Root as UserConfig, Transaction as UserTransaction};

/// Passphrase of the public test network.
pub const DEFAULT_NETWORK_PASSPHRASE: &str = "Test SDF Network ; September 2015";
/// Public test network RPC endpoint.
pub const DEFAULT_RPC_URL: &str = "https://soroban-testnet.stellar.org";
/// Tip jar contract deployed on the test network.
pub const DEFAULT_CONTRACT_ID: &str = "CAYRJABAYNE4Q5PYYILXIUZOWKCHJGMURXXWAD7MXGFHGRRSUG5CCIKF";
/// Test network account funding service.
pub const DEFAULT_FRIENDBOT_URL: &str = "https://friendbot.stellar.org";

#[allow(missing_docs)]
pub const DEFAULT_CONTRACT_FEE_CEILING: u32 = 1_000_000;
#[allow(missing_docs)]
pub const DEFAULT_PAYMENT_FEE: u32 = BASE_FEE;
#[allow(missing_docs)]
pub const DEFAULT_TRANSACTION_TIMEOUT: Duration = Duration::from_secs(30);
#[allow(missing_docs)]
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);
#[allow(missing_docs)]
pub const DEFAULT_POLL_ATTEMPTS: u32 = 15;
#[allow(missing_docs)]
pub const DEFAULT_MESSAGE_CAP: usize = tip::DEFAULT_MESSAGE_CAP;

/// Environment variable overriding the network passphrase
pub const ENV_NETWORK_PASSPHRASE: &str = "TIPJAR_NETWORK_PASSPHRASE";
/// Environment variable overriding the RPC endpoint
pub const ENV_RPC_URL: &str = "TIPJAR_RPC_URL";
/// Environment variable overriding the contract id
pub const ENV_CONTRACT_ID: &str = "TIPJAR_CONTRACT_ID";

/// Source of environment variables.
pub trait ReadEnv {
    /// Value of `key`, if set.
    fn read_env(&self, key: &str) -> Option<Cow<'_, str>>;
}

impl<F> ReadEnv for F
where
    F: Fn(&str) -> Option<Cow<'static, str>>,
{
    fn read_env(&self, key: &str) -> Option<Cow<'_, str>> {
        self(key)
    }
}

/// Process environment. Non-unicode values are ignored.
pub fn std_env(key: &str) -> Option<Cow<'static, str>> {
    match std::env::var(key) {
        Ok(value) => Some(Cow::from(value)),
        Err(std::env::VarError::NotPresent) => None,
        Err(_) => {
            tipjar_logger::warn!(key, "Found non-unicode characters in env var, ignoring");
            None
        }
    }
}

/// Limits and timings of the write path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransactionPolicy {
    /// Fee contract calls are built with, the upper bound of the assembled fee
    pub contract_fee_ceiling: u32,
    /// Fee of plain payments
    pub payment_fee: u32,
    /// Validity window of a built transaction
    pub timeout: Duration,
    /// Pause before each status poll
    pub poll_interval: Duration,
    /// Number of status polls before giving up
    pub poll_attempts: u32,
    /// UI limit on tip message length, in characters
    pub message_cap: usize,
}

impl Default for TransactionPolicy {
    fn default() -> Self {
        Self {
            contract_fee_ceiling: DEFAULT_CONTRACT_FEE_CEILING,
            payment_fee: DEFAULT_PAYMENT_FEE,
            timeout: DEFAULT_TRANSACTION_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            poll_attempts: DEFAULT_POLL_ATTEMPTS,
            message_cap: DEFAULT_MESSAGE_CAP,
        }
    }
}

/// Complete client configuration
#[derive(Clone, Debug)]
pub struct Config {
    /// Passphrase identifying the network transactions are signed for
    pub network_passphrase: String,
    /// JSON-RPC endpoint
    pub rpc_url: Url,
    /// Tip jar contract
    pub contract_id: Address,
    /// Account funding service, test networks only
    pub friendbot_url: Option<Url>,
    /// Write-path policy
    pub transaction: TransactionPolicy,
    /// Logger configuration
    pub logger: tipjar_logger::Config,
}

/// An error type for [`Config::load`]
#[derive(thiserror::Error, Debug, Copy, Clone)]
#[error("Failed to load configuration")]
pub struct LoadError;

impl Config {
    /// Loads configuration from a TOML file, applying environment overrides
    ///
    /// # Errors
    /// - unable to read or deserialize the file
    /// - the config is invalid
    pub fn load(path: impl AsRef<Path>) -> error_stack::Result<Self, LoadError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .change_context(LoadError)
            .attach_printable_lazy(|| format!("Error while reading file {}", path.display()))?;
        let user: UserConfig = toml::from_str(&contents)
            .change_context(LoadError)
            .attach_printable("Error while deserializing file contents as TOML")?;
        user.with_env(&std_env).parse().change_context(LoadError)
    }
}
