//! DynamoDB operation targets and error taxonomy for dynawire.
//!
//! This crate holds everything about the wire protocol that does not need an
//! HTTP client: the operation names sent in `X-Amz-Target`, the normalized
//! [`ErrorKind`] enumeration, the injected [`ErrorTable`] of vendor codes, and
//! the [`ErrorClassifier`] that turns an error envelope into a [`ServiceError`].
// "DynamoDB" appears in virtually every doc comment in this crate.
#![allow(clippy::doc_markdown)]

pub mod classify;
pub mod error;
pub mod mapping;
pub mod operations;

pub use classify::{ErrorBuilder, ErrorClassifier};
pub use error::{ERROR_NAMESPACE, ErrorKind, RequestSnapshot, ResponseSnapshot, ServiceError};
pub use mapping::{ErrorMapping, ErrorTable, TableError};
pub use operations::{DYNAMODB_TARGET_PREFIX, Operation, STREAMS_TARGET_PREFIX};
