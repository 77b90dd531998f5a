//! Error types for request signing.

/// Errors that can occur while configuring a request signer.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// A required credential environment variable is not set.
    #[error("Missing credential: {0} is not set")]
    MissingCredential(&'static str),

    /// A credential or scope component cannot be carried in an HTTP header.
    #[error("Invalid {0}: must be visible ASCII")]
    InvalidHeaderValue(&'static str),

    /// The region is empty.
    #[error("Region must not be empty")]
    EmptyRegion,
}
