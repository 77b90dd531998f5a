//! AWS Signature Version 4 request signing.
//!
//! 1. Stamp the request with `x-amz-date` (and `x-amz-security-token` for
//!    temporary credentials).
//! 2. Build the canonical request over `host`, `content-type` and every
//!    `x-amz-*` header.
//! 3. Build the string to sign from the timestamp, credential scope and
//!    canonical request hash.
//! 4. Derive the signing key with the HMAC-SHA256 chain and sign.
//! 5. Attach the `Authorization` header.

use chrono::{DateTime, Utc};
use hmac::{Hmac, KeyInit, Mac};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::canonical::{build_canonical_request, build_signed_headers_string};
use crate::credentials::Credentials;
use crate::error::AuthError;
use crate::signer::Signer;

/// The signing algorithm identifier.
const SIGNING_ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// Service name used in the credential scope for DynamoDB.
pub const DYNAMODB_SERVICE: &str = "dynamodb";

type HmacSha256 = Hmac<Sha256>;

/// Signs requests with AWS Signature Version 4.
#[derive(Debug, Clone)]
pub struct SigV4Signer {
    credentials: Credentials,
    region: String,
    service: String,
}

impl SigV4Signer {
    /// Create a signer for DynamoDB in `region`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::EmptyRegion`] for an empty region and
    /// [`AuthError::InvalidHeaderValue`] when a credential or the region
    /// could not be carried in a request header.
    pub fn new(credentials: Credentials, region: impl Into<String>) -> Result<Self, AuthError> {
        let region = region.into();
        if region.is_empty() {
            return Err(AuthError::EmptyRegion);
        }
        ensure_header_safe(credentials.access_key_id(), "access key id")?;
        ensure_header_safe(&region, "region")?;
        if let Some(token) = credentials.session_token() {
            ensure_header_safe(token, "session token")?;
        }
        Ok(Self {
            credentials,
            region,
            service: DYNAMODB_SERVICE.to_owned(),
        })
    }

    /// Sign for a different service name (e.g. `dynamodb` for Streams too,
    /// or a custom name for a compatible emulator).
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidHeaderValue`] if the name is not header-safe.
    pub fn with_service(mut self, service: impl Into<String>) -> Result<Self, AuthError> {
        let service = service.into();
        ensure_header_safe(&service, "service")?;
        self.service = service;
        Ok(self)
    }

    /// The region in the credential scope.
    #[must_use]
    pub fn region(&self) -> &str {
        &self.region
    }

    /// The service in the credential scope.
    #[must_use]
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Sign `parts` as of `now`.
    pub fn sign_at(&self, parts: &mut http::request::Parts, body: &[u8], now: DateTime<Utc>) {
        let timestamp = now.format("%Y%m%dT%H%M%SZ").to_string();
        let date = now.format("%Y%m%d").to_string();

        parts.headers.remove(http::header::AUTHORIZATION);
        insert_header(parts, "x-amz-date", &timestamp);
        if let Some(token) = self.credentials.session_token() {
            insert_header(parts, "x-amz-security-token", token);
        }
        if !parts.headers.contains_key(http::header::HOST) {
            if let Some(authority) = parts.uri.authority().map(ToString::to_string) {
                insert_header(parts, "host", &authority);
            }
        }

        let credential_scope = format!("{date}/{}/{}/aws4_request", self.region, self.service);
        let authorization = {
            let header_pairs: Vec<(&str, &str)> = parts
                .headers
                .iter()
                .filter(|(name, _)| is_signable(name.as_str()))
                .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.as_str(), v)))
                .collect();
            let mut signed_headers: Vec<&str> = header_pairs.iter().map(|(name, _)| *name).collect();
            signed_headers.sort_unstable();
            signed_headers.dedup();

            let canonical_request = build_canonical_request(
                parts.method.as_str(),
                parts.uri.path(),
                parts.uri.query().unwrap_or(""),
                &header_pairs,
                &signed_headers,
                &hash_payload(body),
            );
            debug!(canonical_request, "Built canonical request");

            let canonical_hash = hex::encode(Sha256::digest(canonical_request.as_bytes()));
            let string_to_sign = build_string_to_sign(&timestamp, &credential_scope, &canonical_hash);
            let signing_key = derive_signing_key(
                self.credentials.secret_access_key(),
                &date,
                &self.region,
                &self.service,
            );
            let signature = compute_signature(&signing_key, &string_to_sign);

            format!(
                "{SIGNING_ALGORITHM} Credential={}/{credential_scope}, SignedHeaders={}, Signature={signature}",
                self.credentials.access_key_id(),
                build_signed_headers_string(&signed_headers),
            )
        };

        insert_header(parts, http::header::AUTHORIZATION.as_str(), &authorization);
    }
}

impl Signer for SigV4Signer {
    fn sign_request(&self, parts: &mut http::request::Parts, body: &[u8]) {
        self.sign_at(parts, body, Utc::now());
    }
}

/// Build the SigV4 string to sign.
///
/// # Examples
///
/// ```
/// use dynawire_auth::sigv4::build_string_to_sign;
///
/// let sts = build_string_to_sign(
///     "20130524T000000Z",
///     "20130524/us-east-1/dynamodb/aws4_request",
///     "7344ae5b7ee6c3e7e6b0fe0640412a37625d1fbfff95c48bbb2dc43964946972",
/// );
/// assert!(sts.starts_with("AWS4-HMAC-SHA256\n20130524T000000Z\n"));
/// ```
#[must_use]
pub fn build_string_to_sign(
    timestamp: &str,
    credential_scope: &str,
    canonical_request_hash: &str,
) -> String {
    format!("{SIGNING_ALGORITHM}\n{timestamp}\n{credential_scope}\n{canonical_request_hash}")
}

/// Derive the SigV4 signing key.
///
/// ```text
/// DateKey              = HMAC-SHA256("AWS4" + secret_key, date)
/// DateRegionKey        = HMAC-SHA256(DateKey, region)
/// DateRegionServiceKey = HMAC-SHA256(DateRegionKey, service)
/// SigningKey           = HMAC-SHA256(DateRegionServiceKey, "aws4_request")
/// ```
#[must_use]
pub fn derive_signing_key(secret_key: &str, date: &str, region: &str, service: &str) -> Vec<u8> {
    let date_key = hmac_sha256(format!("AWS4{secret_key}").as_bytes(), date.as_bytes());
    let date_region_key = hmac_sha256(&date_key, region.as_bytes());
    let date_region_service_key = hmac_sha256(&date_region_key, service.as_bytes());
    hmac_sha256(&date_region_service_key, b"aws4_request")
}

/// Hex-encoded HMAC-SHA256 of `data` under `signing_key`.
#[must_use]
pub fn compute_signature(signing_key: &[u8], data: &str) -> String {
    hex::encode(hmac_sha256(signing_key, data.as_bytes()))
}

/// Hex-encoded SHA-256 of a payload.
///
/// # Examples
///
/// ```
/// use dynawire_auth::sigv4::hash_payload;
///
/// assert_eq!(
///     hash_payload(b""),
///     "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
/// );
/// ```
#[must_use]
pub fn hash_payload(payload: &[u8]) -> String {
    hex::encode(Sha256::digest(payload))
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can accept keys of any length");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

fn is_signable(name: &str) -> bool {
    name == "host" || name == "content-type" || name.starts_with("x-amz-")
}

fn insert_header(parts: &mut http::request::Parts, name: &'static str, value: &str) {
    match http::HeaderValue::from_str(value) {
        Ok(hv) => {
            parts.headers.insert(name, hv);
        }
        Err(_) => warn!(header = name, "dropping header value that is not valid in HTTP"),
    }
}

fn ensure_header_safe(value: &str, what: &'static str) -> Result<(), AuthError> {
    if value.bytes().all(|b| b.is_ascii_graphic()) {
        Ok(())
    } else {
        Err(AuthError::InvalidHeaderValue(what))
    }
}
