//! The request signing capability.

/// Mutates an outgoing request in place so the service will accept it.
///
/// Called exactly once per request, after every other header is set and
/// right before the request is handed to the transport. Implementations
/// usually add an `Authorization` header derived from the request and body.
pub trait Signer: Send + Sync {
    /// Sign the request whose body is `body`.
    fn sign_request(&self, parts: &mut http::request::Parts, body: &[u8]);
}

impl<F> Signer for F
where
    F: Fn(&mut http::request::Parts, &[u8]) + Send + Sync,
{
    fn sign_request(&self, parts: &mut http::request::Parts, body: &[u8]) {
        self(parts, body);
    }
}

/// Leaves requests unsigned. Useful against DynamoDB Local and emulators
/// that skip signature validation.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnonymousSigner;

impl Signer for AnonymousSigner {
    fn sign_request(&self, _parts: &mut http::request::Parts, _body: &[u8]) {}
}
