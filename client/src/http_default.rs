use attohttpc::{
    body, header::HeaderName, RequestBuilder as AttoHttpRequestBuilder,
    Response as AttoHttpResponse,
};
use eyre::{Result, WrapErr};

use crate::http::{Method, RequestBuilder, Response};

type Bytes = Vec<u8>;

/// [`RequestBuilder`] backed by the blocking `attohttpc` client.
///
/// The first invalid header is kept and reported when the request is sent.
pub struct DefaultRequestBuilder(Result<AttoHttpRequestBuilder>);

/// Request produced by [`DefaultRequestBuilder`].
pub struct DefaultRequest(Result<AttoHttpRequestBuilder<body::Bytes<Bytes>>>);

impl DefaultRequest {
    /// Send the request and read the whole body. Blocks the calling thread.
    ///
    /// # Errors
    /// An invalid header, a connection failure or an unreadable body.
    pub fn send(self) -> Result<Response<Bytes>> {
        let mut builder = self.0?;
        let target = {
            let inspector = builder.inspect();
            format!("{} {}", inspector.method(), inspector.url())
        };
        let response = builder
            .send()
            .wrap_err_with(|| format!("Failed to send {target}"))?;
        into_response(response).wrap_err_with(|| format!("Failed to read response of {target}"))
    }
}

impl RequestBuilder for DefaultRequestBuilder {
    type Output = DefaultRequest;

    fn new(method: Method, url: &str) -> Self {
        Self(Ok(AttoHttpRequestBuilder::new(method, url)))
    }

    fn query_param(self, key: &str, value: &str) -> Self {
        Self(self.0.map(|builder| builder.param(key, value)))
    }

    fn header(self, name: &str, value: &str) -> Self {
        Self(self.0.and_then(|builder| {
            let parsed = HeaderName::from_bytes(name.as_bytes())
                .wrap_err_with(|| format!("Invalid header name `{name}`"))?;
            builder
                .try_header(parsed, value)
                .wrap_err_with(|| format!("Invalid value of header `{name}`"))
        }))
    }

    fn body(self, data: Bytes) -> Self::Output {
        DefaultRequest(self.0.map(|builder| builder.bytes(data)))
    }
}

fn into_response(response: AttoHttpResponse) -> Result<Response<Bytes>> {
    let (status, headers, reader) = response.split();
    let mut out = Response::new(reader.bytes()?);
    *out.status_mut() = status;
    *out.headers_mut() = headers;
    Ok(out)
}
