use std::collections::HashMap;

pub use http::{Method, Response, StatusCode};

/// Header name to value.
pub type Headers = HashMap<String, String>;

/// Builds a single HTTP request for a pluggable backend.
///
/// The client fills the builder and the backend's [`Self::Output`] does the
/// sending, so the crate is not tied to one HTTP library.
pub trait RequestBuilder: Sized {
    /// Request ready to be sent
    type Output;

    /// Start a request.
    fn new(method: Method, url: &str) -> Self;

    /// Append `key=value` to the query string.
    #[must_use]
    fn query_param(self, key: &str, value: &str) -> Self;

    /// Set one header. Invalid names or values fail when sending.
    #[must_use]
    fn header(self, name: &str, value: &str) -> Self;

    /// Set every header of `headers`.
    #[must_use]
    fn headers(self, headers: &Headers) -> Self {
        headers
            .iter()
            .fold(self, |builder, (name, value)| builder.header(name, value))
    }

    /// Finish with `data` as the body.
    fn body(self, data: Vec<u8>) -> Self::Output;

    /// Finish without a body.
    fn body_empty(self) -> Self::Output {
        self.body(Vec::new())
    }
}

/// Headers of a JSON-RPC request.
pub fn json_headers() -> Headers {
    HashMap::from([("Content-Type".to_owned(), "application/json".to_owned())])
}
