//! Signed request dispatch.
//!
//! One call to [`Dispatcher::send`] is one round trip:
//!
//! 1. Build `POST <endpoint>` with the `awsJson1_0` headers.
//! 2. Sign (last mutation before the request leaves the process).
//! 3. Transmit; transport failures are returned untouched.
//! 4. `200 OK` yields a size-capped body; anything else is drained once and
//!    classified into a [`ServiceError`](dynawire_model::ServiceError).

use std::borrow::Cow;
use std::sync::Arc;

use bytes::Bytes;
use dynawire_auth::Signer;
use dynawire_model::{ErrorBuilder, Operation, RequestSnapshot, ResponseSnapshot};
use tracing::debug;

use crate::body::{LimitedBody, ResponseBody, drain};
use crate::config::DispatcherConfig;
use crate::debug::{DebugOptions, format_request, format_response};
use crate::error::{ConfigError, DispatchError};
use crate::transport::{HttpTransport, Transport, buffered_body};

/// Content type of the DynamoDB JSON protocol.
pub const CONTENT_TYPE: &str = "application/x-amz-json-1.0";

/// Header naming the operation.
pub const TARGET_HEADER: &str = "x-amz-target";

/// Sends operations to one endpoint.
///
/// Holds only immutable state after [`Dispatcher::new`], so a single
/// dispatcher can serve any number of concurrent callers through `&self`
/// or an `Arc`.
pub struct Dispatcher {
    endpoint: http::Uri,
    host: http::HeaderValue,
    signer: Arc<dyn Signer>,
    error_builder: Arc<dyn ErrorBuilder>,
    transport: Arc<dyn Transport>,
    max_response_size: u64,
    target_prefix: String,
    debug: DebugOptions,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("endpoint", &self.endpoint)
            .field("max_response_size", &self.max_response_size)
            .field("target_prefix", &self.target_prefix)
            .field("debug", &self.debug)
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    /// Validate `config` and take ownership of it.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the endpoint is not an absolute
    /// `http`/`https` URI, the target prefix is not header-safe, or the size
    /// cap is zero.
    pub fn new(config: DispatcherConfig) -> Result<Self, ConfigError> {
        let endpoint = parse_endpoint(&config.endpoint)?;
        let host = endpoint
            .authority()
            .and_then(|authority| http::HeaderValue::from_str(authority.as_str()).ok())
            .ok_or_else(|| ConfigError::InvalidEndpoint {
                endpoint: config.endpoint.clone(),
                reason: "missing host".to_owned(),
            })?;

        if http::HeaderValue::from_str(&config.target_prefix).is_err() {
            return Err(ConfigError::InvalidTargetPrefix(config.target_prefix));
        }
        if config.max_response_size == 0 {
            return Err(ConfigError::ZeroResponseLimit);
        }

        let transport = config
            .transport
            .unwrap_or_else(|| Arc::new(HttpTransport::default()));

        debug!(
            endpoint = %endpoint,
            max_response_size = config.max_response_size,
            "created dispatcher"
        );

        Ok(Self {
            endpoint,
            host,
            signer: config.signer,
            error_builder: config.error_builder,
            transport,
            max_response_size: config.max_response_size,
            target_prefix: config.target_prefix,
            debug: config.debug,
        })
    }

    /// The validated endpoint.
    #[must_use]
    pub fn endpoint(&self) -> &http::Uri {
        &self.endpoint
    }

    /// The success body size cap.
    #[must_use]
    pub fn max_response_size(&self) -> u64 {
        self.max_response_size
    }

    /// Qualify a bare operation name with the configured prefix.
    ///
    /// Names already containing `.` are returned unchanged.
    #[must_use]
    pub fn normalize_target<'a>(&self, target: &'a str) -> Cow<'a, str> {
        normalize_target(&self.target_prefix, target)
    }

    /// Send a typed operation.
    ///
    /// # Errors
    ///
    /// See [`Dispatcher::send`].
    pub async fn send_operation(
        &self,
        operation: Operation,
        body: impl Into<Bytes>,
    ) -> Result<ResponseBody, DispatchError> {
        self.send(&operation.target(), body).await
    }

    /// Send `body` to the operation named by `target`.
    ///
    /// On `200 OK` returns the response body, capped at the configured size.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::Transport`] if the round trip failed; the
    ///   transport's error is passed through unchanged.
    /// - [`DispatchError::Service`] for any other status, carrying the
    ///   classified error with the drained response body.
    /// - [`DispatchError::InvalidTarget`] if `target` cannot be sent as a
    ///   header value.
    pub async fn send(
        &self,
        target: &str,
        body: impl Into<Bytes>,
    ) -> Result<ResponseBody, DispatchError> {
        let body: Bytes = body.into();
        let target = self.normalize_target(target);
        let target_value = http::HeaderValue::from_str(&target)
            .map_err(|_| DispatchError::InvalidTarget(target.clone().into_owned()))?;

        let (mut parts, ()) = http::Request::builder()
            .method(http::Method::POST)
            .uri(self.endpoint.clone())
            .header(http::header::CONTENT_TYPE, CONTENT_TYPE)
            .header(TARGET_HEADER, target_value)
            .header(http::header::HOST, self.host.clone())
            .body(())?
            .into_parts();

        self.signer.sign_request(&mut parts, &body);

        if self.debug.requests {
            self.debug.emit(&format_request(&parts, &body));
        }

        let request_snapshot = RequestSnapshot::from_parts(&parts);
        debug!(operation = %target, bytes = body.len(), "sending request");

        let response = self
            .transport
            .send(http::Request::from_parts(parts, body.clone()))
            .await
            .map_err(DispatchError::Transport)?;
        let (response_parts, mut response_body) = response.into_parts();

        if self.debug.responses {
            let buffered = drain(response_body).await;
            self.debug.emit(&format_response(&response_parts, &buffered));
            response_body = buffered_body(buffered);
        }

        if response_parts.status != http::StatusCode::OK {
            let raw = drain(response_body).await;
            let err = self.error_builder.build_error(
                request_snapshot,
                body,
                ResponseSnapshot::from_parts(&response_parts),
                raw,
            );
            debug!(
                operation = %target,
                status = %response_parts.status,
                kind = %err.kind,
                exception = %err.exception,
                "service returned an error"
            );
            return Err(DispatchError::from(err));
        }

        debug!(operation = %target, "request succeeded");
        Ok(LimitedBody::new(response_body, self.max_response_size))
    }
}

/// Qualify a bare operation name with `prefix`; names containing `.` pass
/// through unchanged.
///
/// # Examples
///
/// ```
/// use dynawire_http::dispatch::normalize_target;
///
/// assert_eq!(normalize_target("DynamoDB_20120810.", "PutItem"), "DynamoDB_20120810.PutItem");
/// assert_eq!(
///     normalize_target("DynamoDB_20120810.", "DynamoDBStreams_20120810.GetRecords"),
///     "DynamoDBStreams_20120810.GetRecords"
/// );
/// ```
#[must_use]
pub fn normalize_target<'a>(prefix: &str, target: &'a str) -> Cow<'a, str> {
    if target.contains('.') {
        Cow::Borrowed(target)
    } else {
        Cow::Owned(format!("{prefix}{target}"))
    }
}

fn parse_endpoint(endpoint: &str) -> Result<http::Uri, ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidEndpoint {
        endpoint: endpoint.to_owned(),
        reason: reason.to_owned(),
    };
    let uri: http::Uri = endpoint.parse().map_err(|e: http::uri::InvalidUri| invalid(&e.to_string()))?;
    match uri.scheme_str() {
        Some("http" | "https") => Ok(uri),
        Some(_) => Err(invalid("scheme must be http or https")),
        None => Err(invalid("missing scheme")),
    }
}
