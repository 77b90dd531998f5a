//! Classification of DynamoDB error responses.
//!
//! The service answers every failed call with a small JSON envelope:
//!
//! ```json
//! {
//!   "__type": "com.amazonaws.dynamodb.v20120810#ResourceNotFoundException",
//!   "message": "Requested resource not found"
//! }
//! ```
//!
//! The short exception name after `#` is looked up in an [`ErrorTable`] to
//! produce an [`ErrorKind`](crate::ErrorKind). HTTP status codes take no
//! part in the decision: many distinct exceptions share `400`.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use serde::de::{Deserialize, Deserializer, IgnoredAny, MapAccess, Visitor};
use tracing::debug;

use crate::error::{RequestSnapshot, ResponseSnapshot, ServiceError};
use crate::mapping::ErrorTable;

/// Capability that turns a failed exchange into a [`ServiceError`].
///
/// The response body is handed over fully drained. Implementations must not
/// fail; anything they cannot make sense of becomes
/// [`ErrorKind::Unknown`](crate::ErrorKind::Unknown).
pub trait ErrorBuilder: Send + Sync {
    /// Build the structured error for a non-success response.
    fn build_error(
        &self,
        request: RequestSnapshot,
        request_body: Bytes,
        response: ResponseSnapshot,
        response_body: Bytes,
    ) -> ServiceError;
}

impl<F> ErrorBuilder for F
where
    F: Fn(RequestSnapshot, Bytes, ResponseSnapshot, Bytes) -> ServiceError + Send + Sync,
{
    fn build_error(
        &self,
        request: RequestSnapshot,
        request_body: Bytes,
        response: ResponseSnapshot,
        response_body: Bytes,
    ) -> ServiceError {
        self(request, request_body, response, response_body)
    }
}

/// The JSON error envelope.
///
/// Keys match case-insensitively and the last matching key in the document
/// wins. `null` leaves a field empty; unrecognized keys are skipped.
#[derive(Debug, Default)]
struct ErrorEnvelope {
    error_type: String,
    message: String,
}

impl<'de> Deserialize<'de> for ErrorEnvelope {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(ErrorEnvelopeVisitor)
    }
}

struct ErrorEnvelopeVisitor;

impl<'de> Visitor<'de> for ErrorEnvelopeVisitor {
    type Value = ErrorEnvelope;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a JSON error envelope object")
    }

    fn visit_map<M: MapAccess<'de>>(self, mut map: M) -> Result<Self::Value, M::Error> {
        let mut envelope = ErrorEnvelope::default();
        while let Some(key) = map.next_key::<String>()? {
            let slot = if key.eq_ignore_ascii_case("__type") {
                &mut envelope.error_type
            } else if key.eq_ignore_ascii_case("message") {
                &mut envelope.message
            } else {
                map.next_value::<IgnoredAny>()?;
                continue;
            };
            if let Some(value) = map.next_value::<Option<String>>()? {
                *slot = value;
            }
        }
        Ok(envelope)
    }
}

/// Table-driven [`ErrorBuilder`].
#[derive(Debug, Clone)]
pub struct ErrorClassifier {
    table: Arc<ErrorTable>,
}

impl ErrorClassifier {
    /// Create a classifier over an already-built table.
    #[must_use]
    pub fn new(table: Arc<ErrorTable>) -> Self {
        Self { table }
    }

    /// Create a classifier over the built-in DynamoDB table.
    #[must_use]
    pub fn dynamodb() -> Self {
        Self::new(Arc::new(ErrorTable::dynamodb()))
    }

    /// The table this classifier reads from.
    #[must_use]
    pub fn table(&self) -> &ErrorTable {
        &self.table
    }

    /// Classify a raw error body without any request/response context.
    #[must_use]
    pub fn classify(&self, response_body: &[u8]) -> ServiceError {
        let mut err = ServiceError::default();
        match serde_json::from_slice::<ErrorEnvelope>(response_body) {
            Ok(envelope) => self.apply_envelope(&mut err, envelope),
            Err(parse_err) => err.message = parse_err.to_string(),
        }
        err
    }

    /// Build a fully populated [`ServiceError`].
    #[must_use]
    pub fn build(
        &self,
        request: RequestSnapshot,
        request_body: Bytes,
        response: ResponseSnapshot,
        response_body: Bytes,
    ) -> ServiceError {
        let mut err = self.classify(&response_body);
        if let Some(entry) = self.table.get(&err.exception) {
            if entry.expected_status != response.status.as_u16() {
                debug!(
                    exception = %err.exception,
                    expected = entry.expected_status,
                    actual = response.status.as_u16(),
                    "error status differs from the mapped status"
                );
            }
        }
        err.request = Some(request);
        err.request_body = request_body;
        err.response = Some(response);
        err.response_body = response_body;
        err
    }

    fn apply_envelope(&self, err: &mut ServiceError, envelope: ErrorEnvelope) {
        err.raw_type = envelope.error_type;
        err.message = envelope.message;
        let mut parts = err.raw_type.split('#');
        if let (Some(_), Some(exception)) = (parts.next(), parts.next()) {
            err.exception = exception.to_owned();
            if let Some(entry) = self.table.get(exception) {
                err.kind = entry.kind;
            }
        }
    }
}

impl ErrorBuilder for ErrorClassifier {
    fn build_error(
        &self,
        request: RequestSnapshot,
        request_body: Bytes,
        response: ResponseSnapshot,
        response_body: Bytes,
    ) -> ServiceError {
        self.build(request, request_body, response, response_body)
    }
}
