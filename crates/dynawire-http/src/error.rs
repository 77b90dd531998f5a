//! Dispatch and configuration errors.

use dynawire_model::{ErrorKind, ServiceError};

use crate::transport::BoxError;

/// Errors returned by [`Dispatcher::send`](crate::Dispatcher::send).
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// The transport failed before a response arrived (connection refused,
    /// DNS, timeout, TLS). Passed through as the transport reported it.
    #[error("{0}")]
    Transport(#[source] BoxError),

    /// The service answered with a non-200 status.
    #[error(transparent)]
    Service(Box<ServiceError>),

    /// The operation target cannot be sent as an `X-Amz-Target` header.
    #[error("invalid operation target: {0:?}")]
    InvalidTarget(String),

    /// The HTTP request could not be assembled.
    #[error("failed to build request: {0}")]
    Request(#[from] http::Error),
}

impl DispatchError {
    /// The classified service error, if the service answered.
    #[must_use]
    pub fn service_error(&self) -> Option<&ServiceError> {
        match self {
            Self::Service(err) => Some(&**err),
            _ => None,
        }
    }

    /// The normalized kind, if the service answered.
    #[must_use]
    pub fn kind(&self) -> Option<ErrorKind> {
        self.service_error().map(|err| err.kind)
    }

    /// Whether the failure happened in the transport.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

impl From<ServiceError> for DispatchError {
    fn from(err: ServiceError) -> Self {
        Self::Service(Box::new(err))
    }
}

/// Errors raised while validating a [`DispatcherConfig`](crate::DispatcherConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The endpoint is not an absolute `http` or `https` URI.
    #[error("invalid endpoint {endpoint:?}: {reason}")]
    InvalidEndpoint {
        /// The rejected endpoint.
        endpoint: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The target prefix cannot be carried in a header.
    #[error("invalid target prefix: {0:?}")]
    InvalidTargetPrefix(String),

    /// The response size cap is zero.
    #[error("max response size must be greater than zero")]
    ZeroResponseLimit,
}
