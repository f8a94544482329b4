//! JWT signature verification and bearer token extraction

use std::collections::HashSet;
use std::sync::Arc;

use axum::http::HeaderValue;
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, Validation};
use serde_json::Value;

use crate::error::AuthError;
use crate::keys::KeyProvider;

/// The only signing algorithm accepted.
pub const SIGNING_ALGORITHM: Algorithm = Algorithm::RS256;

/// Verifies bearer tokens and returns their raw payload.
///
/// Expiry and not-before are deliberately left unchecked here; freshness is
/// decided by the denylist checker.
#[derive(Clone)]
pub struct TokenCodec {
    keys: Arc<dyn KeyProvider>,
}

impl TokenCodec {
    pub fn new(keys: Arc<dyn KeyProvider>) -> Self {
        Self { keys }
    }

    /// Verify signature, audience and issuer, then return the untrusted payload.
    pub fn decode(&self, token: &str) -> Result<Value, AuthError> {
        let material = self.keys.current();

        let mut validation = Validation::new(SIGNING_ALGORITHM);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.required_spec_claims = HashSet::from(["aud".to_string(), "iss".to_string()]);
        validation.set_audience(&[&material.audience]);
        validation.set_issuer(&[&material.issuer]);

        let token_data =
            decode::<Value>(token, &material.decoding_key, &validation).map_err(|e| {
                tracing::debug!(error = %e, "JWT validation failed");
                map_jwt_error(e.kind())
            })?;

        Ok(token_data.claims)
    }
}

fn map_jwt_error(kind: &ErrorKind) -> AuthError {
    match kind {
        ErrorKind::InvalidSignature
        | ErrorKind::InvalidAlgorithm
        | ErrorKind::InvalidRsaKey(_)
        | ErrorKind::Crypto(_) => AuthError::InvalidSignature,
        ErrorKind::InvalidAudience | ErrorKind::InvalidIssuer | ErrorKind::MissingRequiredClaim(_) => {
            AuthError::AudienceMismatch
        }
        _ => AuthError::MalformedToken,
    }
}

/// Extract bearer token from Authorization header
pub fn extract_bearer_token(header: &HeaderValue) -> Result<String, AuthError> {
    let header_str = header
        .to_str()
        .map_err(|_| AuthError::InvalidAuthorizationFormat)?;

    match header_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
        _ => Err(AuthError::InvalidAuthorizationFormat),
    }
}
