//! Vendor error identifier to [`ErrorKind`] mapping table.
//!
//! The table is injected data: built once at startup, then shared read-only
//! (usually behind an `Arc`) for the lifetime of the process.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::ErrorKind;

/// Errors raised while loading a mapping table.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    /// The mapping document was not a JSON array of mapping entries.
    #[error("invalid error mapping document: {0}")]
    InvalidDocument(#[from] serde_json::Error),
}

/// One mapping entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorMapping {
    /// Short exception name as reported by the service.
    pub code: String,
    /// HTTP status the service normally pairs with this code. Diagnostic
    /// only; classification never looks at it.
    pub expected_status: u16,
    /// Normalized kind for this code.
    pub kind: ErrorKind,
}

impl ErrorMapping {
    /// Create a new mapping entry.
    #[must_use]
    pub fn new(code: impl Into<String>, expected_status: u16, kind: ErrorKind) -> Self {
        Self {
            code: code.into(),
            expected_status,
            kind,
        }
    }
}

/// Built-in mappings for DynamoDB, DynamoDB Streams and the common AWS
/// query-protocol error codes.
const DYNAMODB_MAPPINGS: &[(&str, u16, ErrorKind)] = &[
    // DynamoDB-specific
    ("AccessDeniedException", 400, ErrorKind::Auth),
    ("ConditionalCheckFailedException", 400, ErrorKind::ConditionFailed),
    ("IncompleteSignatureException", 400, ErrorKind::Auth),
    ("ItemCollectionSizeLimitExceededException", 400, ErrorKind::CollectionSizeExceeded),
    ("LimitExceededException", 400, ErrorKind::ThroughputExceeded),
    ("MissingAuthenticationTokenException", 400, ErrorKind::Auth),
    ("ProvisionedThroughputExceededException", 400, ErrorKind::ThroughputExceeded),
    ("RequestLimitExceeded", 400, ErrorKind::ThroughputExceeded),
    ("ResourceInUseException", 400, ErrorKind::ResourceInUse),
    ("ResourceNotFoundException", 400, ErrorKind::NotFound),
    ("ThrottlingException", 400, ErrorKind::Throttling),
    ("UnrecognizedClientException", 400, ErrorKind::Auth),
    ("ValidationException", 400, ErrorKind::InvalidParameter),
    ("SerializationException", 400, ErrorKind::InvalidParameter),
    ("InternalServerError", 500, ErrorKind::InternalFailure),
    // DynamoDB Streams
    ("ExpiredIteratorException", 400, ErrorKind::ExpiredIterator),
    ("TrimmedDataAccessException", 400, ErrorKind::TrimmedData),
    // Common AWS errors
    ("IncompleteSignature", 400, ErrorKind::Auth),
    ("InternalFailure", 500, ErrorKind::InternalFailure),
    ("InvalidAction", 400, ErrorKind::InvalidParameter),
    ("InvalidClientTokenId", 403, ErrorKind::Auth),
    ("InvalidParameterCombination", 400, ErrorKind::InvalidParameter),
    ("InvalidParameterValue", 400, ErrorKind::InvalidParameter),
    ("InvalidQueryParameter", 400, ErrorKind::InvalidParameter),
    ("MalformedQueryString", 404, ErrorKind::InvalidParameter),
    ("MissingAction", 400, ErrorKind::InvalidParameter),
    ("MissingAuthenticationToken", 403, ErrorKind::Auth),
    ("MissingParameter", 400, ErrorKind::InvalidParameter),
    ("OptInRequired", 403, ErrorKind::Auth),
    ("RequestExpired", 400, ErrorKind::Auth),
    ("ServiceUnavailable", 503, ErrorKind::ServiceUnavailable),
    ("Throttling", 400, ErrorKind::Throttling),
    ("ValidationError", 400, ErrorKind::InvalidParameter),
];

/// Immutable lookup table from exception name to mapping entry.
///
/// Keeps entries in injection order for iteration and an index by code for
/// lookup. When a code is injected twice the later entry wins the lookup;
/// both remain visible through [`ErrorTable::iter`].
#[derive(Debug, Clone, Default)]
pub struct ErrorTable {
    entries: Vec<ErrorMapping>,
    by_code: HashMap<String, usize>,
}

impl ErrorTable {
    /// Build a table from mapping entries.
    #[must_use]
    pub fn new(mappings: impl IntoIterator<Item = ErrorMapping>) -> Self {
        let entries: Vec<ErrorMapping> = mappings.into_iter().collect();
        let by_code = entries
            .iter()
            .enumerate()
            .map(|(idx, entry)| (entry.code.clone(), idx))
            .collect();
        Self { entries, by_code }
    }

    /// Build the built-in DynamoDB table.
    #[must_use]
    pub fn dynamodb() -> Self {
        Self::new(
            DYNAMODB_MAPPINGS
                .iter()
                .map(|&(code, status, kind)| ErrorMapping::new(code, status, kind)),
        )
    }

    /// Build a table from a JSON array of
    /// `{"code": .., "expectedStatus": .., "kind": ..}` objects.
    pub fn from_json_slice(data: &[u8]) -> Result<Self, TableError> {
        let mappings: Vec<ErrorMapping> = serde_json::from_slice(data)?;
        Ok(Self::new(mappings))
    }

    /// Look up the mapping for a short exception name.
    #[must_use]
    pub fn get(&self, code: &str) -> Option<&ErrorMapping> {
        self.by_code.get(code).map(|&idx| &self.entries[idx])
    }

    /// Iterate over entries in injection order.
    pub fn iter(&self) -> impl Iterator<Item = &ErrorMapping> {
        self.entries.iter()
    }

    /// Number of injected entries, duplicates included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
