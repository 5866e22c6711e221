//! User configuration view.

use std::time::Duration;

use error_stack::Report;
use serde::{Deserialize, Serialize};
use tipjar_data_model::address::Address;
use url::Url;

use super::{
    ReadEnv, TransactionPolicy, DEFAULT_CONTRACT_FEE_CEILING, DEFAULT_CONTRACT_ID,
    DEFAULT_FRIENDBOT_URL, DEFAULT_MESSAGE_CAP, DEFAULT_NETWORK_PASSPHRASE, DEFAULT_PAYMENT_FEE,
    DEFAULT_POLL_ATTEMPTS, DEFAULT_POLL_INTERVAL, DEFAULT_RPC_URL, DEFAULT_TRANSACTION_TIMEOUT,
    ENV_CONTRACT_ID, ENV_NETWORK_PASSPHRASE, ENV_RPC_URL,
};

/// Root of the user configuration. Every field is optional and falls back
/// to the public test network.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
#[allow(missing_docs)]
pub struct Root {
    pub network_passphrase: Option<String>,
    pub rpc_url: Option<String>,
    pub contract_id: Option<String>,
    /// Empty string disables account funding
    pub friendbot_url: Option<String>,
    pub transaction: Transaction,
    pub logger: tipjar_logger::UserConfigLayer,
}

/// Write-path settings. Durations are in milliseconds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
#[allow(missing_docs)]
pub struct Transaction {
    pub fee_ceiling: Option<u32>,
    pub payment_fee: Option<u32>,
    pub timeout_ms: Option<u64>,
    pub poll_interval_ms: Option<u64>,
    pub poll_attempts: Option<u32>,
    pub message_cap: Option<usize>,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum ParseError {
    #[error("Failed to parse URL `{url}`")]
    InvalidUrl { url: String },
    #[error("Unsupported URL scheme: `{scheme}`")]
    UnsupportedUrlScheme { scheme: String },
    #[error("Contract id `{id}` is not a contract address")]
    InvalidContractId { id: String },
    #[error("Network passphrase must not be empty")]
    EmptyPassphrase,
    #[error("Number of poll attempts must be greater than zero")]
    ZeroPollAttempts,
    #[error("Transaction fees must be greater than zero")]
    ZeroFee,
    #[error("Payment fee must not exceed the contract fee ceiling")]
    PaymentFeeAboveCeiling,
}

/// Collects every validation error instead of stopping at the first one.
struct Emitter {
    report: Option<Report<ParseError>>,
}

impl Emitter {
    fn new() -> Self {
        Self { report: None }
    }

    fn emit(&mut self, report: Report<ParseError>) {
        match &mut self.report {
            Some(existing) => existing.extend_one(report),
            None => self.report = Some(report),
        }
    }

    fn into_result(self) -> error_stack::Result<(), ParseError> {
        self.report.map_or(Ok(()), Err)
    }
}

fn parse_url(field: &str, raw: &str) -> error_stack::Result<Url, ParseError> {
    let url = Url::parse(raw).map_err(|err| {
        Report::new(ParseError::InvalidUrl {
            url: raw.to_owned(),
        })
        .attach_printable(format!("Field: {field}"))
        .attach_printable(err.to_string())
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(Report::new(ParseError::UnsupportedUrlScheme {
            scheme: scheme.to_string(),
        })
        .attach_printable(format!("Field: {field}"))
        .attach_printable("Note: only `http` and `https` protocols are supported")),
    }
}

fn parse_contract_id(id: String) -> error_stack::Result<Address, ParseError> {
    match id.parse::<Address>() {
        Ok(address) if address.is_contract() => Ok(address),
        Ok(_) => Err(Report::new(ParseError::InvalidContractId { id })
            .attach_printable("Note: contract ids start with `C`")),
        Err(err) => {
            Err(Report::new(ParseError::InvalidContractId { id }).attach_printable(err.to_string()))
        }
    }
}

/// Combine two results, keeping the errors of both.
fn join<A, B>(
    a: error_stack::Result<A, ParseError>,
    b: error_stack::Result<B, ParseError>,
) -> error_stack::Result<(A, B), ParseError> {
    match (a, b) {
        (Ok(a), Ok(b)) => Ok((a, b)),
        (Err(report), Ok(_)) | (Ok(_), Err(report)) => Err(report),
        (Err(mut report), Err(other)) => {
            report.extend_one(other);
            Err(report)
        }
    }
}

impl Root {
    /// Overrides the network triple with the `TIPJAR_*` environment
    /// variables that are set.
    #[must_use]
    pub fn with_env(mut self, env: &impl ReadEnv) -> Self {
        if let Some(value) = env.read_env(ENV_NETWORK_PASSPHRASE) {
            self.network_passphrase = Some(value.into_owned());
        }
        if let Some(value) = env.read_env(ENV_RPC_URL) {
            self.rpc_url = Some(value.into_owned());
        }
        if let Some(value) = env.read_env(ENV_CONTRACT_ID) {
            self.contract_id = Some(value.into_owned());
        }
        self
    }

    /// Validates user configuration for semantic errors and constructs a complete
    /// [`super::Config`].
    ///
    /// # Errors
    /// If a set of validity errors occurs.
    pub fn parse(self) -> error_stack::Result<super::Config, ParseError> {
        let Self {
            network_passphrase,
            rpc_url,
            contract_id,
            friendbot_url,
            transaction:
                Transaction {
                    fee_ceiling,
                    payment_fee,
                    timeout_ms,
                    poll_interval_ms,
                    poll_attempts,
                    message_cap,
                },
            logger,
        } = self;

        let mut emitter = Emitter::new();

        let network_passphrase =
            network_passphrase.unwrap_or_else(|| DEFAULT_NETWORK_PASSPHRASE.to_owned());
        if network_passphrase.trim().is_empty() {
            emitter.emit(Report::new(ParseError::EmptyPassphrase));
        }

        let rpc_url = parse_url("rpc_url", rpc_url.as_deref().unwrap_or(DEFAULT_RPC_URL));
        let friendbot_url = match friendbot_url.as_deref() {
            Some("") => Ok(None),
            raw => parse_url("friendbot_url", raw.unwrap_or(DEFAULT_FRIENDBOT_URL)).map(Some),
        };
        let contract_id =
            parse_contract_id(contract_id.unwrap_or_else(|| DEFAULT_CONTRACT_ID.to_owned()));

        let policy = TransactionPolicy {
            contract_fee_ceiling: fee_ceiling.unwrap_or(DEFAULT_CONTRACT_FEE_CEILING),
            payment_fee: payment_fee.unwrap_or(DEFAULT_PAYMENT_FEE),
            timeout: timeout_ms.map_or(DEFAULT_TRANSACTION_TIMEOUT, Duration::from_millis),
            poll_interval: poll_interval_ms.map_or(DEFAULT_POLL_INTERVAL, Duration::from_millis),
            poll_attempts: poll_attempts.unwrap_or(DEFAULT_POLL_ATTEMPTS),
            message_cap: message_cap.unwrap_or(DEFAULT_MESSAGE_CAP),
        };
        if policy.poll_attempts == 0 {
            emitter.emit(Report::new(ParseError::ZeroPollAttempts));
        }
        if policy.contract_fee_ceiling == 0 || policy.payment_fee == 0 {
            emitter.emit(
                Report::new(ParseError::ZeroFee)
                    .attach_printable(format!("fee_ceiling: {}", policy.contract_fee_ceiling))
                    .attach_printable(format!("payment_fee: {}", policy.payment_fee)),
            );
        } else if policy.payment_fee > policy.contract_fee_ceiling {
            emitter.emit(
                Report::new(ParseError::PaymentFeeAboveCeiling)
                    .attach_printable(format!("fee_ceiling: {}", policy.contract_fee_ceiling))
                    .attach_printable(format!("payment_fee: {}", policy.payment_fee)),
            );
        }

        let ((rpc_url, friendbot_url), (contract_id, ())) = join(
            join(rpc_url, friendbot_url),
            join(contract_id, emitter.into_result()),
        )?;

        Ok(super::Config {
            network_passphrase,
            rpc_url,
            contract_id,
            friendbot_url,
            transaction: policy,
            logger: logger.complete(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::{borrow::Cow, collections::HashMap};

    use super::*;

    fn config_sample() -> toml::Table {
        toml::toml! {
            network_passphrase = "Standalone Network ; February 2017"
            rpc_url = "http://localhost:8000/soroban/rpc"
            contract_id = "CAYRJABAYNE4Q5PYYILXIUZOWKCHJGMURXXWAD7MXGFHGRRSUG5CCIKF"

            [transaction]
            fee_ceiling = 500000
            poll_interval_ms = 500
            poll_attempts = 4

            [logger]
            level = "DEBUG"
            format = "compact"
        }
    }

    fn mock_env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<Cow<'static, str>> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| map.get(key).cloned().map(Cow::from)
    }

    #[test]
    fn parse_full_toml_config() {
        let config = config_sample().try_into::<Root>().unwrap().parse().unwrap();

        assert_eq!(config.network_passphrase, "Standalone Network ; February 2017");
        assert_eq!(config.transaction.contract_fee_ceiling, 500_000);
        assert_eq!(config.transaction.poll_interval, Duration::from_millis(500));
        assert_eq!(config.transaction.poll_attempts, 4);
        assert_eq!(config.transaction.payment_fee, DEFAULT_PAYMENT_FEE);
        assert_eq!(config.logger.level, tipjar_logger::Level::Debug);
    }

    #[test]
    fn empty_config_is_testnet() {
        let config = Root::default().parse().unwrap();

        assert_eq!(config.network_passphrase, DEFAULT_NETWORK_PASSPHRASE);
        assert_eq!(config.rpc_url.as_str(), "https://soroban-testnet.stellar.org/");
        assert_eq!(config.contract_id.as_str(), DEFAULT_CONTRACT_ID);
        assert_eq!(
            config.friendbot_url.map(String::from).as_deref(),
            Some("https://friendbot.stellar.org/")
        );
        assert_eq!(config.transaction, TransactionPolicy::default());
    }

    #[test]
    fn env_overrides_the_network_triple() {
        let env = mock_env(&[
            (ENV_RPC_URL, "https://rpc.example.org"),
            (ENV_NETWORK_PASSPHRASE, "Public Global Stellar Network ; September 2015"),
        ]);
        let config = config_sample()
            .try_into::<Root>()
            .unwrap()
            .with_env(&env)
            .parse()
            .unwrap();

        assert_eq!(config.rpc_url.as_str(), "https://rpc.example.org/");
        assert_eq!(
            config.network_passphrase,
            "Public Global Stellar Network ; September 2015"
        );
    }

    #[test]
    fn rpc_url_scheme_support() {
        fn with_scheme(scheme: &str) -> error_stack::Result<super::super::Config, ParseError> {
            config_sample()
                .try_into::<Root>()
                .unwrap()
                .with_env(&mock_env(&[(ENV_RPC_URL, &format!("{scheme}://127.0.0.1:8000"))]))
                .parse()
        }

        let _ = with_scheme("http").expect("should be fine");
        let _ = with_scheme("https").expect("should be fine");
        let _ = with_scheme("ws").expect_err("not supported");
    }

    #[test]
    fn reports_every_error_at_once() {
        let user = Root {
            network_passphrase: Some(" ".to_owned()),
            contract_id: Some("GC6QXTLS3XSA3GJPHODE2ZSCQS2LFAOANOZKUFLKBJNXCRVYV6NJB3RI".to_owned()),
            transaction: Transaction {
                poll_attempts: Some(0),
                payment_fee: Some(2_000_000),
                ..Transaction::default()
            },
            ..Root::default()
        };

        let report = user.parse().expect_err("config is invalid");
        let errors: Vec<&ParseError> = report.frames().filter_map(|f| f.downcast_ref()).collect();

        assert!(errors.contains(&&ParseError::EmptyPassphrase));
        assert!(errors.contains(&&ParseError::ZeroPollAttempts));
        assert!(errors.contains(&&ParseError::PaymentFeeAboveCeiling));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ParseError::InvalidContractId { .. })));
    }
}
