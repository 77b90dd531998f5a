//! dynawire - send one signed DynamoDB JSON request from the command line.
//!
//! The response body is printed to stdout. A service error is printed to
//! stderr as a JSON object with its normalized kind, and the process exits
//! with status 1.
//!
//! # Usage
//!
//! ```text
//! dynawire ListTables
//! dynawire --endpoint http://localhost:8000 GetItem '{"TableName":"t","Key":{"pk":{"S":"a"}}}'
//! echo '{"TableName":"t"}' | dynawire DescribeTable -
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `DYNAMODB_ENDPOINT` | `https://dynamodb.<region>.amazonaws.com` | Service endpoint |
//! | `AWS_REGION` | `us-east-1` | Signing region |
//! | `AWS_ACCESS_KEY_ID` | *(unset)* | Access key; requests are unsigned without it |
//! | `AWS_SECRET_ACCESS_KEY` | *(unset)* | Secret key |
//! | `AWS_SESSION_TOKEN` | *(unset)* | Session token for temporary credentials |
//! | `DYNAWIRE_MAX_RESPONSE_SIZE` | `5242880` | Success body cap in bytes |
//! | `DYNAWIRE_DEBUG_REQUESTS` | `false` | Log outgoing requests |
//! | `DYNAWIRE_DEBUG_RESPONSES` | `false` | Log incoming responses |
//! | `LOG_LEVEL` | `warn` | Log level filter |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |

mod cli;

use std::io::Read as _;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use bytes::Bytes;
use clap::Parser;
use dynawire_auth::{AnonymousSigner, Credentials, SigV4Signer, Signer};
use dynawire_http::{
    DispatchError, Dispatcher, DispatcherConfig, ResponseBody, default_endpoint, region_from_env,
};
use dynawire_model::{ErrorClassifier, ServiceError};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;

/// Initialize the tracing subscriber on stderr.
///
/// Uses `RUST_LOG` if set, otherwise falls back to `log_level`.
fn init_tracing(log_level: &str) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

/// Pick a signer: SigV4 when credentials are configured, anonymous otherwise.
fn build_signer(cli: &Cli, region: &str) -> Result<Arc<dyn Signer>> {
    if cli.anonymous {
        return Ok(Arc::new(AnonymousSigner));
    }
    match Credentials::from_env() {
        Ok(credentials) => {
            info!(
                access_key_id = %credentials.access_key_id(),
                region = %region,
                "signing requests with SigV4"
            );
            let signer = SigV4Signer::new(credentials, region)
                .context("failed to configure SigV4 signer")?;
            Ok(Arc::new(signer))
        }
        Err(err) => {
            warn!(error = %err, "no credentials configured, sending unsigned requests");
            Ok(Arc::new(AnonymousSigner))
        }
    }
}

fn build_config(cli: &Cli) -> Result<DispatcherConfig> {
    let region = cli.region.clone().unwrap_or_else(region_from_env);
    let signer = build_signer(cli, &region)?;
    let mut config = DispatcherConfig::from_env(signer, Arc::new(ErrorClassifier::dynamodb()));

    if let Some(endpoint) = &cli.endpoint {
        config.endpoint.clone_from(endpoint);
    } else if cli.region.is_some() && std::env::var("DYNAMODB_ENDPOINT").is_err() {
        config.endpoint = default_endpoint(&region);
    }
    if cli.debug {
        config.debug.requests = true;
        config.debug.responses = true;
    }
    Ok(config)
}

fn read_body(body: &str) -> Result<String> {
    if body != "-" {
        return Ok(body.to_owned());
    }
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("failed to read request body from stdin")?;
    Ok(buf)
}

async fn read_response(response: ResponseBody) -> Result<Bytes> {
    response
        .collect_bytes()
        .await
        .map_err(|e| anyhow::anyhow!(e))
        .context("failed to read response body")
}

fn render_success(data: &[u8], raw: bool) -> String {
    if !raw {
        if let Ok(value) = serde_json::from_slice::<serde_json::Value>(data) {
            if let Ok(pretty) = serde_json::to_string_pretty(&value) {
                return pretty;
            }
        }
    }
    String::from_utf8_lossy(data).into_owned()
}

fn render_service_error(err: &ServiceError) -> serde_json::Value {
    serde_json::json!({
        "kind": err.kind,
        "exception": err.exception,
        "type": err.raw_type,
        "message": err.message,
        "status": err.status().map(|status| status.as_u16()),
        "requestId": err.request_id(),
    })
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "warn".to_owned());
    let log_level = if cli.debug {
        format!("{log_level},dynawire::wire=debug")
    } else {
        log_level
    };
    init_tracing(&log_level)?;

    let body = read_body(&cli.body)?;
    let dispatcher = Dispatcher::new(build_config(&cli)?).context("invalid configuration")?;

    match dispatcher.send(&cli.target, body).await {
        Ok(response) => {
            let data = read_response(response).await?;
            println!("{}", render_success(&data, cli.raw));
            Ok(ExitCode::SUCCESS)
        }
        Err(DispatchError::Service(err)) => {
            eprintln!("{}", serde_json::to_string_pretty(&render_service_error(&err))?);
            Ok(ExitCode::FAILURE)
        }
        Err(err) => Err(err).context("request failed"),
    }
}
