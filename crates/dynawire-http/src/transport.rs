//! The HTTP transport capability.
//!
//! TLS, proxies, connection pooling and timeouts all live behind this trait.

use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use http_body_util::BodyExt;
use http_body_util::combinators::UnsyncBoxBody;

/// Boxed error used by transports and response bodies.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Response body type produced by a [`Transport`].
pub type TransportBody = UnsyncBoxBody<Bytes, BoxError>;

/// Future returned by [`Transport::send`].
pub type TransportFuture<'a> =
    Pin<Box<dyn Future<Output = Result<http::Response<TransportBody>, BoxError>> + Send + 'a>>;

/// Sends one HTTP request and yields the response head with a streaming body.
pub trait Transport: Send + Sync {
    /// Perform the round trip. Errors are reported as-is to the caller of
    /// the dispatcher.
    fn send(&self, request: http::Request<Bytes>) -> TransportFuture<'_>;
}

/// Default transport backed by a [`reqwest::Client`].
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Wrap a preconfigured client (timeouts, proxies, TLS roots).
    #[must_use]
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: http::Request<Bytes>) -> TransportFuture<'_> {
        Box::pin(async move {
            let request = reqwest::Request::try_from(request)?;
            let response: http::Response<reqwest::Body> = self.client.execute(request).await?.into();
            Ok::<_, BoxError>(
                response.map(|body| body.map_err(|e| Box::new(e) as BoxError).boxed_unsync()),
            )
        })
    }
}

/// Wrap buffered bytes as a fresh [`TransportBody`].
#[must_use]
pub fn buffered_body(data: Bytes) -> TransportBody {
    http_body_util::Full::new(data)
        .map_err(|never| match never {})
        .boxed_unsync()
}
