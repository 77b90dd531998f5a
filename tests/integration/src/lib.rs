//! Integration tests for dynawire.
//!
//! Most tests start an in-process HTTP/1.1 server on `127.0.0.1` and drive a
//! real [`Dispatcher`] through the default reqwest transport. Tests that need
//! DynamoDB Local are marked `#[ignore]`.
//!
//! Run the ignored ones with:
//! ```text
//! DYNAMODB_ENDPOINT=http://localhost:8000 cargo test -p dynawire-integration -- --ignored
//! ```

use std::net::SocketAddr;
use std::sync::{Arc, Once};

use bytes::Bytes;
use dynawire_auth::{AnonymousSigner, Credentials, SigV4Signer, Signer};
use dynawire_http::{Dispatcher, DispatcherConfig, HttpTransport};
use dynawire_model::ErrorClassifier;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use parking_lot::Mutex;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

#[cfg(test)]
mod test_dispatch;
#[cfg(test)]
mod test_dynamodb_local;
#[cfg(test)]
mod test_limits;

static INIT: Once = Once::new();

/// Access key used by signed test dispatchers.
pub const TEST_ACCESS_KEY: &str = "AKIDEXAMPLE";
/// Secret key used by signed test dispatchers.
pub const TEST_SECRET_KEY: &str = "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY";
/// Request id returned by [`json_response`].
pub const TEST_REQUEST_ID: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789ABCDEF";

/// Initialize tracing (once).
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// A request as seen by the [`MockServer`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// Request method.
    pub method: http::Method,
    /// Request target.
    pub uri: http::Uri,
    /// Headers as received on the wire.
    pub headers: http::HeaderMap,
    /// Full request body.
    pub body: Bytes,
}

impl RecordedRequest {
    /// Header value as a string, if present and visible ASCII.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

type Handler = Arc<dyn Fn(&RecordedRequest) -> http::Response<Full<Bytes>> + Send + Sync>;

/// A local HTTP/1.1 server that records requests and answers with a handler.
#[derive(Debug)]
pub struct MockServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    task: JoinHandle<()>,
}

impl MockServer {
    /// Bind to an ephemeral port and serve every connection with `handler`.
    pub async fn start<F>(handler: F) -> Self
    where
        F: Fn(&RecordedRequest) -> http::Response<Full<Bytes>> + Send + Sync + 'static,
    {
        init_tracing();

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock server");
        let addr = listener.local_addr().expect("mock server address");
        let handler: Handler = Arc::new(handler);
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&requests);

        let task = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let handler = Arc::clone(&handler);
                let recorded = Arc::clone(&recorded);
                tokio::spawn(async move {
                    let service = service_fn(move |req: http::Request<Incoming>| {
                        let handler = Arc::clone(&handler);
                        let recorded = Arc::clone(&recorded);
                        async move {
                            let (parts, body) = req.into_parts();
                            let body = body.collect().await?.to_bytes();
                            let request = RecordedRequest {
                                method: parts.method,
                                uri: parts.uri,
                                headers: parts.headers,
                                body,
                            };
                            let response = handler(&request);
                            recorded.lock().push(request);
                            Ok::<_, hyper::Error>(response)
                        }
                    });
                    if let Err(err) = http1::Builder::new()
                        .serve_connection(TokioIo::new(stream), service)
                        .await
                    {
                        tracing::debug!(error = %err, "mock connection closed");
                    }
                });
            }
        });

        Self {
            addr,
            requests,
            task,
        }
    }

    /// Base URL of the server.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// `host:port` of the server.
    #[must_use]
    pub fn authority(&self) -> String {
        self.addr.to_string()
    }

    /// Every request received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// A DynamoDB-style JSON response.
#[must_use]
pub fn json_response(status: u16, body: impl Into<Bytes>) -> http::Response<Full<Bytes>> {
    http::Response::builder()
        .status(status)
        .header("content-type", "application/x-amz-json-1.0")
        .header("x-amzn-requestid", TEST_REQUEST_ID)
        .body(Full::new(body.into()))
        .expect("valid response")
}

/// A DynamoDB error envelope for `code`.
#[must_use]
pub fn error_body(code: &str, message: &str) -> String {
    serde_json::json!({
        "__type": format!("com.amazonaws.dynamodb.v20120810#{code}"),
        "message": message,
    })
    .to_string()
}

/// A reqwest transport that never goes through a system proxy.
#[must_use]
pub fn direct_transport() -> Arc<HttpTransport> {
    let client = reqwest::Client::builder()
        .no_proxy()
        .build()
        .expect("build reqwest client");
    Arc::new(HttpTransport::new(client))
}

/// Signer with the fixed test credentials.
#[must_use]
pub fn test_signer() -> SigV4Signer {
    SigV4Signer::new(Credentials::new(TEST_ACCESS_KEY, TEST_SECRET_KEY), "us-east-1")
        .expect("valid signer")
}

/// Config with the direct transport, `signer` and `max_response_size`.
#[must_use]
pub fn config_for(endpoint: &str, signer: Arc<dyn Signer>, max_response_size: u64) -> DispatcherConfig {
    DispatcherConfig::builder()
        .endpoint(endpoint)
        .signer(signer)
        .error_builder(Arc::new(ErrorClassifier::dynamodb()))
        .transport(direct_transport())
        .max_response_size(max_response_size)
        .build()
}

/// A SigV4-signing dispatcher pointed at `endpoint`.
#[must_use]
pub fn signed_dispatcher(endpoint: &str) -> Dispatcher {
    Dispatcher::new(config_for(
        endpoint,
        Arc::new(test_signer()),
        dynawire_http::DEFAULT_MAX_RESPONSE_SIZE,
    ))
    .expect("valid dispatcher")
}

/// An unsigned dispatcher pointed at `endpoint` with a custom size cap.
#[must_use]
pub fn anonymous_dispatcher(endpoint: &str, max_response_size: u64) -> Dispatcher {
    Dispatcher::new(config_for(endpoint, Arc::new(AnonymousSigner), max_response_size))
        .expect("valid dispatcher")
}
