//! [`LedgerRpc`] over JSON-RPC 2.0 and HTTP.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use eyre::eyre;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tipjar_data_model::{codec, prelude::*};
use tipjar_logger::debug;
use url::Url;

use crate::{
    http::{json_headers, Headers, Method, RequestBuilder, Response},
    http_default::DefaultRequestBuilder,
    rpc::{LedgerRpc, RpcError},
};

/// Handles a JSON-RPC HTTP response.
pub trait ResponseHandler<T = Vec<u8>> {
    /// What is the output of the handler
    type Output;

    /// Handles HTTP response
    fn handle(self, response: Response<T>) -> Self::Output;
}

/// Describes an HTTP response that could not be understood.
struct ResponseReport(String);

impl ResponseReport {
    /// Constructs report with provided message
    fn with_msg<S>(msg: S, response: &Response<Vec<u8>>) -> Self
    where
        S: AsRef<str>,
    {
        let status = response.status();
        let body = String::from_utf8_lossy(response.body());
        let msg = msg.as_ref();

        Self(format!("{msg}; status: {status}; response body: {body}"))
    }
}

impl From<ResponseReport> for RpcError {
    #[inline]
    fn from(report: ResponseReport) -> Self {
        RpcError::Malformed(report.0)
    }
}

#[derive(Serialize)]
struct Request<'a, P> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: P,
}

#[derive(Deserialize)]
struct ResponseEnvelope<R> {
    result: Option<R>,
    error: Option<ErrorObject>,
}

#[derive(Deserialize)]
struct ErrorObject {
    code: i64,
    message: String,
}

/// Unwrap the JSON-RPC envelope. `Ok(None)` is a `null` result.
fn decode_result<R: DeserializeOwned>(response: &Response<Vec<u8>>) -> Result<Option<R>, RpcError> {
    if !response.status().is_success() {
        return Err(RpcError::Http(response.status()));
    }
    let envelope: ResponseEnvelope<R> = serde_json::from_slice(response.body())
        .map_err(|err| ResponseReport::with_msg(format!("Invalid JSON-RPC response: {err}"), response))?;
    if let Some(ErrorObject { code, message }) = envelope.error {
        return Err(RpcError::Server { code, message });
    }
    Ok(envelope.result)
}

fn required<R: DeserializeOwned>(response: &Response<Vec<u8>>) -> Result<R, RpcError> {
    decode_result(response)?
        .ok_or_else(|| ResponseReport::with_msg("Missing JSON-RPC result", response).into())
}

fn from_wire<T: parity_scale_codec::DecodeLimit>(what: &str, encoded: &str) -> Result<T, RpcError> {
    codec::from_wire(encoded).map_err(|err| RpcError::Malformed(format!("{what}: {err}")))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SimulateTransactionResult {
    error: Option<String>,
    transaction_data: Option<String>,
    min_resource_fee: Option<String>,
    #[serde(default)]
    results: Vec<HostFunctionResult>,
    #[serde(default)]
    latest_ledger: u32,
}

#[derive(Deserialize)]
struct HostFunctionResult {
    #[serde(default)]
    auth: Vec<String>,
    xdr: String,
}

/// Handles `simulateTransaction` responses.
#[derive(Clone, Copy, Default)]
pub struct SimulateResponseHandler;

impl ResponseHandler for SimulateResponseHandler {
    type Output = Result<SimulationOutcome, RpcError>;

    fn handle(self, response: Response<Vec<u8>>) -> Self::Output {
        let raw: SimulateTransactionResult = required(&response)?;
        if let Some(error) = raw.error {
            return Ok(SimulationOutcome::Error(error));
        }

        let footprint = match raw.transaction_data {
            Some(data) => from_wire("transactionData", &data)?,
            None => ResourceFootprint::default(),
        };
        let min_resource_fee = match raw.min_resource_fee {
            Some(fee) => fee
                .parse()
                .map_err(|_| RpcError::Malformed(format!("minResourceFee `{fee}`")))?,
            None => 0,
        };
        let (authorization, return_value) = match raw.results.into_iter().next() {
            Some(HostFunctionResult { auth, xdr }) => (
                auth.iter()
                    .map(|entry| from_wire("auth", entry))
                    .collect::<Result<Vec<_>, _>>()?,
                from_wire("xdr", &xdr)?,
            ),
            None => (Vec::new(), Value::Void),
        };

        Ok(SimulationOutcome::Success(SimulationSuccess {
            footprint,
            authorization,
            min_resource_fee,
            return_value,
            latest_ledger: raw.latest_ledger,
        }))
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendTransactionResult {
    hash: TransactionHash,
    status: SendStatus,
    #[serde(alias = "errorResultXdr")]
    error_result: Option<String>,
}

/// Handles `sendTransaction` responses.
#[derive(Clone, Copy, Default)]
pub struct SendResponseHandler;

impl ResponseHandler for SendResponseHandler {
    type Output = Result<SendOutcome, RpcError>;

    fn handle(self, response: Response<Vec<u8>>) -> Self::Output {
        let raw: SendTransactionResult = required(&response)?;
        Ok(SendOutcome {
            hash: raw.hash,
            status: raw.status,
            error: raw.error_result,
        })
    }
}

#[derive(Deserialize)]
struct GetTransactionResult {
    status: TransactionStatus,
}

/// Handles `getTransaction` responses.
#[derive(Clone, Copy, Default)]
pub struct StatusResponseHandler;

impl ResponseHandler for StatusResponseHandler {
    type Output = Result<TransactionStatus, RpcError>;

    fn handle(self, response: Response<Vec<u8>>) -> Self::Output {
        required::<GetTransactionResult>(&response).map(|raw| raw.status)
    }
}

#[derive(Deserialize)]
struct GetAccountResult {
    id: Address,
    sequence: String,
    balance: Option<String>,
}

/// Handles `getAccount` responses. A `null` result means the account does
/// not exist.
pub struct AccountResponseHandler<'a>(&'a Address);

impl ResponseHandler for AccountResponseHandler<'_> {
    type Output = Result<AccountState, RpcError>;

    fn handle(self, response: Response<Vec<u8>>) -> Self::Output {
        let raw: GetAccountResult = decode_result(&response)?
            .ok_or_else(|| RpcError::AccountNotFound(self.0.clone()))?;
        let sequence = raw
            .sequence
            .parse()
            .map_err(|_| RpcError::Malformed(format!("sequence `{}`", raw.sequence)))?;
        let balance = match raw.balance {
            Some(balance) => balance
                .parse()
                .map_err(|_| RpcError::Malformed(format!("balance `{balance}`")))?,
            None => Amount::ZERO,
        };
        Ok(AccountState {
            id: raw.id,
            sequence: SequenceNumber(sequence),
            balance,
        })
    }
}

#[derive(Deserialize)]
struct GetPaymentsResult {
    #[serde(default)]
    records: Vec<OperationRecord>,
}

#[derive(Deserialize)]
struct OperationRecord {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    created_at: Option<String>,
    from: Option<Address>,
    to: Option<Address>,
    amount: Option<Amount>,
    funder: Option<Address>,
    account: Option<Address>,
    starting_balance: Option<Amount>,
}

impl OperationRecord {
    /// `Ok(None)` for operations other than payments and account creations.
    fn into_payment(self, owner: &Address) -> Result<Option<PaymentRecord>, RpcError> {
        let missing = |field: &str| {
            RpcError::Malformed(format!("{} record {}: no `{field}`", self.kind, self.id))
        };
        let (direction, from, to, amount) = match self.kind.as_str() {
            "payment" => {
                let from = self.from.ok_or_else(|| missing("from"))?;
                (
                    PaymentRecord::direction_for(owner, &from),
                    from,
                    self.to.ok_or_else(|| missing("to"))?,
                    self.amount.ok_or_else(|| missing("amount"))?,
                )
            }
            "create_account" => (
                PaymentDirection::CreateAccount,
                self.funder.ok_or_else(|| missing("funder"))?,
                self.account.ok_or_else(|| missing("account"))?,
                self.starting_balance
                    .ok_or_else(|| missing("starting_balance"))?,
            ),
            _ => return Ok(None),
        };
        Ok(Some(PaymentRecord {
            id: self.id,
            direction,
            amount,
            from,
            to,
            created_at: self.created_at,
        }))
    }
}

/// Handles `getPayments` responses for the account it was created with.
pub struct PaymentsResponseHandler<'a>(&'a Address);

impl ResponseHandler for PaymentsResponseHandler<'_> {
    type Output = Result<Vec<PaymentRecord>, RpcError>;

    fn handle(self, response: Response<Vec<u8>>) -> Self::Output {
        let raw: GetPaymentsResult = required(&response)?;
        let mut payments = Vec::with_capacity(raw.records.len());
        for record in raw.records {
            if let Some(payment) = record.into_payment(self.0)? {
                payments.push(payment);
            }
        }
        Ok(payments)
    }
}

/// Ledger RPC client speaking JSON-RPC 2.0 over HTTP.
///
/// Requests are blocking `attohttpc` calls run on tokio's blocking pool.
pub struct JsonRpcLedger {
    url: Url,
    headers: Headers,
    next_id: AtomicU64,
}

impl JsonRpcLedger {
    /// Client for the server at `url`.
    pub fn new(url: Url) -> Self {
        Self {
            url,
            headers: json_headers(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Add extra headers, such as an API key, to every request.
    #[must_use]
    pub fn with_headers(mut self, headers: Headers) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Endpoint of this client.
    pub fn url(&self) -> &Url {
        &self.url
    }

    async fn call<P, H, T>(&self, method: &'static str, params: P, handler: H) -> Result<T, RpcError>
    where
        P: Serialize,
        H: ResponseHandler<Output = Result<T, RpcError>>,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = serde_json::to_vec(&Request {
            jsonrpc: "2.0",
            id,
            method,
            params,
        })
        .map_err(|err| RpcError::Transport(eyre!(err)))?;
        debug!(method, id, url = %self.url, "JSON-RPC request");

        let request = DefaultRequestBuilder::new(Method::POST, self.url.as_str())
            .headers(&self.headers)
            .body(body);
        let response = tokio::task::spawn_blocking(move || request.send())
            .await
            .map_err(|err| RpcError::Transport(eyre!(err)))?
            .map_err(RpcError::Transport)?;

        handler.handle(response)
    }
}

#[derive(Serialize)]
struct EnvelopeParams {
    transaction: String,
}

#[derive(Serialize)]
struct HashParams {
    hash: String,
}

#[derive(Serialize)]
struct AddressParams<'a> {
    address: &'a str,
}

#[derive(Serialize)]
struct PaymentsParams<'a> {
    account: &'a str,
    limit: u32,
    order: &'static str,
}

#[async_trait]
impl LedgerRpc for JsonRpcLedger {
    async fn simulate(
        &self,
        envelope: &TransactionEnvelope,
    ) -> Result<SimulationOutcome, RpcError> {
        let params = EnvelopeParams {
            transaction: envelope.to_envelope_string(),
        };
        self.call("simulateTransaction", params, SimulateResponseHandler)
            .await
    }

    async fn submit(&self, envelope: &TransactionEnvelope) -> Result<SendOutcome, RpcError> {
        let params = EnvelopeParams {
            transaction: envelope.to_envelope_string(),
        };
        self.call("sendTransaction", params, SendResponseHandler)
            .await
    }

    async fn get_transaction(
        &self,
        hash: &TransactionHash,
    ) -> Result<TransactionStatus, RpcError> {
        let params = HashParams {
            hash: hash.to_string(),
        };
        self.call("getTransaction", params, StatusResponseHandler)
            .await
    }

    async fn get_account(&self, address: &Address) -> Result<AccountState, RpcError> {
        let params = AddressParams {
            address: address.as_str(),
        };
        self.call("getAccount", params, AccountResponseHandler(address))
            .await
    }

    async fn recent_payments(
        &self,
        address: &Address,
        limit: u32,
    ) -> Result<Vec<PaymentRecord>, RpcError> {
        let params = PaymentsParams {
            account: address.as_str(),
            limit,
            order: "desc",
        };
        self.call("getPayments", params, PaymentsResponseHandler(address))
            .await
    }
}
