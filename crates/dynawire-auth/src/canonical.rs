//! Canonical request construction for AWS Signature Version 4, client side.
//!
//! ```text
//! HTTPRequestMethod\n
//! CanonicalURI\n
//! CanonicalQueryString\n
//! CanonicalHeaders\n\n
//! SignedHeaders\n
//! HashedPayload
//! ```
//!
//! Inputs are taken as they will appear on the wire: the path and query are
//! already percent-encoded. Services other than S3 (DynamoDB included) sign
//! the path encoded a second time, so every wire segment is encoded again
//! here.

use std::collections::BTreeMap;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

/// Everything except the RFC 3986 unreserved set (`A-Z a-z 0-9 - _ . ~`).
const RESERVED: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

fn uri_encode(input: &str) -> String {
    utf8_percent_encode(input, RESERVED).to_string()
}

/// Build the full canonical request string from its components.
///
/// # Examples
///
/// ```
/// use dynawire_auth::canonical::build_canonical_request;
///
/// let canonical = build_canonical_request(
///     "POST",
///     "/",
///     "",
///     &[("host", "dynamodb.us-east-1.amazonaws.com")],
///     &["host"],
///     "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855",
/// );
/// assert!(canonical.starts_with("POST\n/\n\nhost:dynamodb.us-east-1.amazonaws.com\n"));
/// ```
#[must_use]
pub fn build_canonical_request(
    method: &str,
    path: &str,
    query: &str,
    headers: &[(&str, &str)],
    signed_headers: &[&str],
    payload_hash: &str,
) -> String {
    [
        method.to_owned(),
        build_canonical_uri(path),
        build_canonical_query_string(query),
        build_canonical_headers(headers, signed_headers),
        String::new(),
        build_signed_headers_string(signed_headers),
        payload_hash.to_owned(),
    ]
    .join("\n")
}

/// Build the canonical URI from a wire path.
///
/// `.` and `..` segments are resolved, then each remaining segment is
/// URI-encoded once more. A trailing slash is kept; an empty path is `/`.
///
/// # Examples
///
/// ```
/// use dynawire_auth::canonical::build_canonical_uri;
///
/// assert_eq!(build_canonical_uri("/tables/a%20b"), "/tables/a%2520b");
/// assert_eq!(build_canonical_uri("/a/./b/../c"), "/a/c");
/// ```
#[must_use]
pub fn build_canonical_uri(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    let mut uri = String::with_capacity(path.len() + 1);
    for segment in &segments {
        uri.push('/');
        uri.push_str(&uri_encode(segment));
    }
    if uri.is_empty() || (path.ends_with('/') && !segments.is_empty()) {
        uri.push('/');
    }
    uri
}

/// Build the canonical query string from a wire query.
///
/// Each name and value is decoded and re-encoded with the unreserved set,
/// then the pairs are sorted by name and value. A parameter without `=` gets
/// an empty value.
#[must_use]
pub fn build_canonical_query_string(query: &str) -> String {
    let mut pairs: Vec<(String, String)> = query
        .split('&')
        .filter(|param| !param.is_empty())
        .map(|param| {
            let (name, value) = param.split_once('=').unwrap_or((param, ""));
            (reencode(name), reencode(value))
        })
        .collect();
    pairs.sort();

    pairs
        .into_iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join("&")
}

fn reencode(component: &str) -> String {
    uri_encode(&percent_decode_str(component).decode_utf8_lossy())
}

/// Build the canonical headers block (without the trailing blank line).
///
/// Names are lowercased and only those listed in `signed_headers` are kept.
/// Values are trimmed with inner runs of whitespace collapsed to one space;
/// repeated headers are joined with `,` in the order given.
#[must_use]
pub fn build_canonical_headers(headers: &[(&str, &str)], signed_headers: &[&str]) -> String {
    let signed: Vec<String> = signed_headers.iter().map(|h| h.to_ascii_lowercase()).collect();

    let mut values: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (name, value) in headers {
        let name = name.to_ascii_lowercase();
        if signed.contains(&name) {
            let normalized = value.split_whitespace().collect::<Vec<_>>().join(" ");
            values.entry(name).or_default().push(normalized);
        }
    }

    values
        .iter()
        .map(|(name, values)| format!("{name}:{}", values.join(",")))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Build the `SignedHeaders` value: sorted, deduplicated lowercase names
/// joined by `;`.
///
/// # Examples
///
/// ```
/// use dynawire_auth::canonical::build_signed_headers_string;
///
/// assert_eq!(
///     build_signed_headers_string(&["x-amz-target", "Host", "content-type"]),
///     "content-type;host;x-amz-target"
/// );
/// ```
#[must_use]
pub fn build_signed_headers_string(signed_headers: &[&str]) -> String {
    let mut names: Vec<String> = signed_headers.iter().map(|h| h.to_ascii_lowercase()).collect();
    names.sort_unstable();
    names.dedup();
    names.join(";")
}
