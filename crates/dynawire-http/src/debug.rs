//! Wire-level debug instrumentation.
//!
//! When enabled, the dispatcher hands a pre-formatted snapshot of each
//! request and/or response to a [`DebugSink`]. The sink only observes; it
//! cannot change the request or the outcome.

use std::fmt::{self, Write as _};
use std::sync::Arc;

/// Receives formatted request/response snapshots.
pub type DebugSink = Arc<dyn Fn(&str) + Send + Sync>;

/// Headers whose values never appear in debug output.
const REDACTED_HEADERS: &[&str] = &["authorization", "x-amz-security-token"];

/// Which exchanges to log, and where.
#[derive(Clone)]
pub struct DebugOptions {
    /// Log every outgoing request and its body.
    pub requests: bool,
    /// Log every incoming response and its body. Forces the body to be
    /// buffered in memory before it is returned.
    pub responses: bool,
    /// Where snapshots go. Defaults to a `tracing` debug event on the
    /// `dynawire::wire` target.
    pub sink: DebugSink,
}

impl DebugOptions {
    /// Log both directions to `sink`.
    #[must_use]
    pub fn all(sink: DebugSink) -> Self {
        Self {
            requests: true,
            responses: true,
            sink,
        }
    }

    pub(crate) fn emit(&self, message: &str) {
        (self.sink)(message);
    }
}

impl Default for DebugOptions {
    fn default() -> Self {
        Self {
            requests: false,
            responses: false,
            sink: tracing_sink(),
        }
    }
}

impl fmt::Debug for DebugOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DebugOptions")
            .field("requests", &self.requests)
            .field("responses", &self.responses)
            .field("sink", &"...")
            .finish()
    }
}

/// A sink that emits each snapshot as a `tracing` debug event.
#[must_use]
pub fn tracing_sink() -> DebugSink {
    Arc::new(|message: &str| {
        tracing::debug!(target: "dynawire::wire", "{message}");
    })
}

/// Format an outgoing request for the debug sink.
#[must_use]
pub fn format_request(parts: &http::request::Parts, body: &[u8]) -> String {
    let mut out = format!(
        "Request: {} {} {:?}\n",
        parts.method, parts.uri, parts.version
    );
    write_headers(&mut out, &parts.headers);
    let _ = write!(out, "\nRequest Body: {}\n", String::from_utf8_lossy(body));
    out
}

/// Format an incoming response for the debug sink.
#[must_use]
pub fn format_response(parts: &http::response::Parts, body: &[u8]) -> String {
    let mut out = format!("Response: {:?} {}\n", parts.version, parts.status);
    write_headers(&mut out, &parts.headers);
    let _ = write!(out, "\nBody: {}\n", String::from_utf8_lossy(body));
    out
}

fn write_headers(out: &mut String, headers: &http::HeaderMap) {
    for (name, value) in headers {
        if REDACTED_HEADERS.contains(&name.as_str()) {
            let _ = writeln!(out, "{name}: <redacted>");
        } else {
            let _ = writeln!(out, "{name}: {}", String::from_utf8_lossy(value.as_bytes()));
        }
    }
}
