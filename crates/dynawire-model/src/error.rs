//! Normalized DynamoDB error kinds and the structured service error.
//!
//! DynamoDB reports failures as a JSON envelope whose `__type` field carries a
//! vendor identifier such as `com.amazonaws.dynamodb.v20120810#ResourceNotFoundException`.
//! Callers branch on [`ErrorKind`] instead of matching those strings.

use std::fmt;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Prefix used by the string representation of [`ServiceError`].
pub const ERROR_NAMESPACE: &str = "dynawire";

/// Vendor-independent classification of a service error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ErrorKind {
    /// No mapping matched, or the error envelope could not be parsed.
    #[default]
    Unknown,
    /// Conditional put/update failed; condition not met.
    ConditionFailed,
    /// Item collection (local secondary index) too large.
    CollectionSizeExceeded,
    /// Exceeded provisioned throughput for a table or shard.
    ThroughputExceeded,
    /// Resource referenced by key not found.
    NotFound,
    /// Internal server error.
    InternalFailure,
    /// Authentication or authorization failure.
    Auth,
    /// One of the many forms of invalid input.
    InvalidParameter,
    /// Service unavailable.
    ServiceUnavailable,
    /// The service is throttling requests.
    Throttling,
    /// Resource is busy: creating an existing table, deleting a table in
    /// `CREATING` state, and so on.
    ResourceInUse,
    /// Stream shard iterator is no longer valid.
    ExpiredIterator,
    /// Stream data older than the retention window was requested.
    TrimmedData,
}

impl ErrorKind {
    /// Returns the variant name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::ConditionFailed => "ConditionFailed",
            Self::CollectionSizeExceeded => "CollectionSizeExceeded",
            Self::ThroughputExceeded => "ThroughputExceeded",
            Self::NotFound => "NotFound",
            Self::InternalFailure => "InternalFailure",
            Self::Auth => "Auth",
            Self::InvalidParameter => "InvalidParameter",
            Self::ServiceUnavailable => "ServiceUnavailable",
            Self::Throttling => "Throttling",
            Self::ResourceInUse => "ResourceInUse",
            Self::ExpiredIterator => "ExpiredIterator",
            Self::TrimmedData => "TrimmedData",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Owned copy of the outgoing request line and headers, as sent.
#[derive(Debug, Clone)]
pub struct RequestSnapshot {
    /// HTTP method.
    pub method: http::Method,
    /// Full request URI.
    pub uri: http::Uri,
    /// Request headers after signing.
    pub headers: http::HeaderMap,
}

impl RequestSnapshot {
    /// Snapshot the given request parts.
    #[must_use]
    pub fn from_parts(parts: &http::request::Parts) -> Self {
        Self {
            method: parts.method.clone(),
            uri: parts.uri.clone(),
            headers: parts.headers.clone(),
        }
    }
}

/// Owned copy of the response status line and headers.
#[derive(Debug, Clone)]
pub struct ResponseSnapshot {
    /// HTTP status code.
    pub status: http::StatusCode,
    /// HTTP version.
    pub version: http::Version,
    /// Response headers.
    pub headers: http::HeaderMap,
}

impl ResponseSnapshot {
    /// Snapshot the given response parts.
    #[must_use]
    pub fn from_parts(parts: &http::response::Parts) -> Self {
        Self {
            status: parts.status,
            version: parts.version,
            headers: parts.headers.clone(),
        }
    }

    /// The `x-amzn-requestid` header, when the service sent one.
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        self.headers
            .get("x-amzn-requestid")
            .and_then(|v| v.to_str().ok())
    }
}

/// A classified error returned by the service.
///
/// Built by an [`ErrorBuilder`](crate::classify::ErrorBuilder) from a non-200
/// response. The request and response snapshots and both bodies are kept for
/// diagnostics; the response body is always fully buffered.
#[derive(Debug, Clone, Default)]
pub struct ServiceError {
    /// Normalized classification.
    pub kind: ErrorKind,
    /// Unmodified `__type` value from the service. Empty if the envelope
    /// could not be parsed.
    pub raw_type: String,
    /// Short exception name: the part of `raw_type` after `#`.
    pub exception: String,
    /// Service-supplied message, or the envelope parse error.
    pub message: String,
    /// The request that produced this error.
    pub request: Option<RequestSnapshot>,
    /// Raw request body bytes.
    pub request_body: Bytes,
    /// The response status line and headers.
    pub response: Option<ResponseSnapshot>,
    /// Raw response body bytes.
    pub response_body: Bytes,
}

impl ServiceError {
    /// Create an error with only the classification fields set.
    #[must_use]
    pub fn new(
        kind: ErrorKind,
        exception: impl Into<String>,
        raw_type: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            raw_type: raw_type.into(),
            exception: exception.into(),
            message: message.into(),
            ..Self::default()
        }
    }

    /// HTTP status of the response, if one was attached.
    #[must_use]
    pub fn status(&self) -> Option<http::StatusCode> {
        self.response.as_ref().map(|r| r.status)
    }

    /// Service request id of the response, if one was attached.
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        self.response.as_ref().and_then(ResponseSnapshot::request_id)
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let exception = if self.exception.is_empty() {
            &self.raw_type
        } else {
            &self.exception
        };
        write!(
            f,
            "{ERROR_NAMESPACE}.Error({}): {exception}: {}",
            self.kind, self.message
        )
    }
}

impl std::error::Error for ServiceError {}
