//! Dispatcher configuration.
//!
//! A [`DispatcherConfig`] is built once, handed to
//! [`Dispatcher::new`](crate::Dispatcher::new) and never mutated again; the
//! dispatcher owns it from then on.

use std::env;
use std::fmt;
use std::sync::Arc;

use dynawire_auth::Signer;
use dynawire_model::{DYNAMODB_TARGET_PREFIX, ErrorBuilder};
use typed_builder::TypedBuilder;

use crate::body::DEFAULT_MAX_RESPONSE_SIZE;
use crate::debug::DebugOptions;
use crate::transport::Transport;

/// Region used when none is configured.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Dispatcher configuration.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use dynawire_auth::AnonymousSigner;
/// use dynawire_http::DispatcherConfig;
/// use dynawire_model::ErrorClassifier;
///
/// let config = DispatcherConfig::builder()
///     .endpoint("http://localhost:8000")
///     .signer(Arc::new(AnonymousSigner))
///     .error_builder(Arc::new(ErrorClassifier::dynamodb()))
///     .build();
/// assert_eq!(config.max_response_size, 5 * 1024 * 1024);
/// assert_eq!(config.target_prefix, "DynamoDB_20120810.");
/// ```
#[derive(Clone, TypedBuilder)]
pub struct DispatcherConfig {
    /// Service endpoint, e.g. `https://dynamodb.us-east-1.amazonaws.com`.
    #[builder(setter(into))]
    pub endpoint: String,

    /// Signs every request right before it is sent.
    pub signer: Arc<dyn Signer>,

    /// Turns non-200 responses into structured errors.
    pub error_builder: Arc<dyn ErrorBuilder>,

    /// HTTP transport. A default [`HttpTransport`](crate::HttpTransport) is
    /// created when unset.
    #[builder(default, setter(strip_option))]
    pub transport: Option<Arc<dyn Transport>>,

    /// Cap on the bytes readable from a success body.
    #[builder(default = DEFAULT_MAX_RESPONSE_SIZE)]
    pub max_response_size: u64,

    /// Prefix added to targets that are not already qualified.
    #[builder(default = DYNAMODB_TARGET_PREFIX.to_owned(), setter(into))]
    pub target_prefix: String,

    /// Wire-level debug logging.
    #[builder(default)]
    pub debug: DebugOptions,
}

impl fmt::Debug for DispatcherConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatcherConfig")
            .field("endpoint", &self.endpoint)
            .field("signer", &"...")
            .field("error_builder", &"...")
            .field("transport", &self.transport.as_ref().map(|_| "..."))
            .field("max_response_size", &self.max_response_size)
            .field("target_prefix", &self.target_prefix)
            .field("debug", &self.debug)
            .finish()
    }
}

impl DispatcherConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `DYNAMODB_ENDPOINT` | `https://dynamodb.<region>.amazonaws.com` |
    /// | `AWS_REGION` / `DEFAULT_REGION` | `us-east-1` |
    /// | `DYNAWIRE_MAX_RESPONSE_SIZE` | `5242880` |
    /// | `DYNAWIRE_DEBUG_REQUESTS` | `false` |
    /// | `DYNAWIRE_DEBUG_RESPONSES` | `false` |
    #[must_use]
    pub fn from_env(signer: Arc<dyn Signer>, error_builder: Arc<dyn ErrorBuilder>) -> Self {
        let endpoint = env::var("DYNAMODB_ENDPOINT")
            .unwrap_or_else(|_| default_endpoint(&region_from_env()));
        let max_response_size = env::var("DYNAWIRE_MAX_RESPONSE_SIZE")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_MAX_RESPONSE_SIZE);
        let debug = DebugOptions {
            requests: env_bool("DYNAWIRE_DEBUG_REQUESTS", false),
            responses: env_bool("DYNAWIRE_DEBUG_RESPONSES", false),
            ..DebugOptions::default()
        };

        Self::builder()
            .endpoint(endpoint)
            .signer(signer)
            .error_builder(error_builder)
            .max_response_size(max_response_size)
            .debug(debug)
            .build()
    }
}

/// The public DynamoDB endpoint for `region`.
#[must_use]
pub fn default_endpoint(region: &str) -> String {
    format!("https://dynamodb.{region}.amazonaws.com")
}

/// Region from `AWS_REGION`, then `DEFAULT_REGION`, then [`DEFAULT_REGION`].
#[must_use]
pub fn region_from_env() -> String {
    env::var("AWS_REGION")
        .or_else(|_| env::var("DEFAULT_REGION"))
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_REGION.to_owned())
}

fn env_bool(key: &str, default: bool) -> bool {
    env::var(key).map_or(default, |v| parse_bool(&v))
}

fn parse_bool(value: &str) -> bool {
    matches!(value, "1" | "true" | "yes" | "TRUE" | "YES" | "True")
}
