//! DynamoDB and DynamoDB Streams operation targets.
//!
//! Both services speak `awsJson1_0` and name the operation in the
//! `X-Amz-Target` header:
//!
//! ```text
//! X-Amz-Target: DynamoDB_20120810.PutItem
//! X-Amz-Target: DynamoDBStreams_20120810.GetRecords
//! ```

use std::fmt;

/// Target prefix for the DynamoDB API version this crate speaks.
pub const DYNAMODB_TARGET_PREFIX: &str = "DynamoDB_20120810.";

/// Target prefix for the DynamoDB Streams API version this crate speaks.
pub const STREAMS_TARGET_PREFIX: &str = "DynamoDBStreams_20120810.";

/// Known DynamoDB and DynamoDB Streams operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Operation {
    // Table management
    /// Create a new table.
    CreateTable,
    /// Delete a table.
    DeleteTable,
    /// Describe a table.
    DescribeTable,
    /// List all tables.
    ListTables,
    /// Update provisioned throughput, indexes or stream settings.
    UpdateTable,
    /// Describe account-level throughput limits.
    DescribeLimits,

    // Time to live
    /// Describe the TTL configuration of a table.
    DescribeTimeToLive,
    /// Enable or disable TTL on a table.
    UpdateTimeToLive,

    // Tagging
    /// Add tags to a resource.
    TagResource,
    /// Remove tags from a resource.
    UntagResource,
    /// List tags on a resource.
    ListTagsOfResource,

    // Item CRUD
    /// Put (insert or replace) an item.
    PutItem,
    /// Get an item by primary key.
    GetItem,
    /// Update an item.
    UpdateItem,
    /// Delete an item by primary key.
    DeleteItem,

    // Query & Scan
    /// Query items by key condition.
    Query,
    /// Scan all items in a table.
    Scan,

    // Batch operations
    /// Batch get items from multiple tables.
    BatchGetItem,
    /// Batch write (put/delete) items to multiple tables.
    BatchWriteItem,

    // Transactions
    /// Read several items atomically.
    TransactGetItems,
    /// Write several items atomically.
    TransactWriteItems,

    // Streams
    /// Describe a stream and its shards.
    DescribeStream,
    /// List streams, optionally for one table.
    ListStreams,
    /// Obtain an iterator for a shard.
    GetShardIterator,
    /// Read stream records from a shard iterator.
    GetRecords,
}

impl Operation {
    /// Returns the AWS operation name string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateTable => "CreateTable",
            Self::DeleteTable => "DeleteTable",
            Self::DescribeTable => "DescribeTable",
            Self::ListTables => "ListTables",
            Self::UpdateTable => "UpdateTable",
            Self::DescribeLimits => "DescribeLimits",
            Self::DescribeTimeToLive => "DescribeTimeToLive",
            Self::UpdateTimeToLive => "UpdateTimeToLive",
            Self::TagResource => "TagResource",
            Self::UntagResource => "UntagResource",
            Self::ListTagsOfResource => "ListTagsOfResource",
            Self::PutItem => "PutItem",
            Self::GetItem => "GetItem",
            Self::UpdateItem => "UpdateItem",
            Self::DeleteItem => "DeleteItem",
            Self::Query => "Query",
            Self::Scan => "Scan",
            Self::BatchGetItem => "BatchGetItem",
            Self::BatchWriteItem => "BatchWriteItem",
            Self::TransactGetItems => "TransactGetItems",
            Self::TransactWriteItems => "TransactWriteItems",
            Self::DescribeStream => "DescribeStream",
            Self::ListStreams => "ListStreams",
            Self::GetShardIterator => "GetShardIterator",
            Self::GetRecords => "GetRecords",
        }
    }

    /// Parse an operation name string into an `Operation`.
    ///
    /// Accepts bare names only; use [`Operation::from_target`] for
    /// prefixed `X-Amz-Target` values.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "CreateTable" => Some(Self::CreateTable),
            "DeleteTable" => Some(Self::DeleteTable),
            "DescribeTable" => Some(Self::DescribeTable),
            "ListTables" => Some(Self::ListTables),
            "UpdateTable" => Some(Self::UpdateTable),
            "DescribeLimits" => Some(Self::DescribeLimits),
            "DescribeTimeToLive" => Some(Self::DescribeTimeToLive),
            "UpdateTimeToLive" => Some(Self::UpdateTimeToLive),
            "TagResource" => Some(Self::TagResource),
            "UntagResource" => Some(Self::UntagResource),
            "ListTagsOfResource" => Some(Self::ListTagsOfResource),
            "PutItem" => Some(Self::PutItem),
            "GetItem" => Some(Self::GetItem),
            "UpdateItem" => Some(Self::UpdateItem),
            "DeleteItem" => Some(Self::DeleteItem),
            "Query" => Some(Self::Query),
            "Scan" => Some(Self::Scan),
            "BatchGetItem" => Some(Self::BatchGetItem),
            "BatchWriteItem" => Some(Self::BatchWriteItem),
            "TransactGetItems" => Some(Self::TransactGetItems),
            "TransactWriteItems" => Some(Self::TransactWriteItems),
            "DescribeStream" => Some(Self::DescribeStream),
            "ListStreams" => Some(Self::ListStreams),
            "GetShardIterator" => Some(Self::GetShardIterator),
            "GetRecords" => Some(Self::GetRecords),
            _ => None,
        }
    }

    /// Parse a fully qualified `X-Amz-Target` value.
    ///
    /// The prefix must match the service the operation belongs to.
    #[must_use]
    pub fn from_target(target: &str) -> Option<Self> {
        let (prefix, name) = target.split_at(target.find('.')? + 1);
        Self::from_name(name).filter(|op| op.target_prefix() == prefix)
    }

    /// Whether this operation belongs to the DynamoDB Streams API.
    #[must_use]
    pub fn is_streams(&self) -> bool {
        matches!(
            self,
            Self::DescribeStream | Self::ListStreams | Self::GetShardIterator | Self::GetRecords
        )
    }

    /// Returns the `X-Amz-Target` prefix for this operation's service.
    #[must_use]
    pub fn target_prefix(&self) -> &'static str {
        if self.is_streams() {
            STREAMS_TARGET_PREFIX
        } else {
            DYNAMODB_TARGET_PREFIX
        }
    }

    /// Returns the fully qualified `X-Amz-Target` value.
    #[must_use]
    pub fn target(&self) -> String {
        format!("{}{}", self.target_prefix(), self.as_str())
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
