//! HTTP dispatch for the DynamoDB JSON protocol.
//!
//! A [`Dispatcher`] turns an operation name and a JSON body into a signed
//! `POST` with the `awsJson1_0` headers, sends it through a [`Transport`],
//! and returns either a size-capped success body or a classified
//! [`ServiceError`](dynawire_model::ServiceError).
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use dynawire_auth::{Credentials, SigV4Signer};
//! use dynawire_http::{Dispatcher, DispatcherConfig};
//! use dynawire_model::ErrorClassifier;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//! let signer = SigV4Signer::new(Credentials::from_env()?, "us-east-1")?;
//! let dispatcher = Dispatcher::new(
//!     DispatcherConfig::builder()
//!         .endpoint("https://dynamodb.us-east-1.amazonaws.com")
//!         .signer(Arc::new(signer))
//!         .error_builder(Arc::new(ErrorClassifier::dynamodb()))
//!         .build(),
//! )?;
//!
//! let body = dispatcher.send("ListTables", "{}").await?;
//! let json = body.collect_bytes().await?;
//! # let _ = json;
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`body`] - Size-limited response bodies
//! - [`config`] - Dispatcher configuration and environment loading
//! - [`debug`] - Wire-level debug snapshots
//! - [`dispatch`] - The dispatcher itself
//! - [`error`] - Dispatch and configuration errors
//! - [`transport`] - The HTTP transport capability
#![allow(clippy::doc_markdown)]

pub mod body;
pub mod config;
pub mod debug;
pub mod dispatch;
pub mod error;
pub mod transport;

pub use body::{DEFAULT_MAX_RESPONSE_SIZE, LimitedBody, ResponseBody};
pub use config::{DEFAULT_REGION, DispatcherConfig, default_endpoint, region_from_env};
pub use debug::{DebugOptions, DebugSink, tracing_sink};
pub use dispatch::{CONTENT_TYPE, Dispatcher, TARGET_HEADER, normalize_target};
pub use error::{ConfigError, DispatchError};
pub use transport::{BoxError, HttpTransport, Transport, TransportBody, TransportFuture, buffered_body};
