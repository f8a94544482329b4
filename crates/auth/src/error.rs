//! Authentication errors

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::claims::TokenKind;
use crate::roles::{AccessTier, Role};

/// Authentication and authorization failure.
///
/// Every variant is terminal for the request. Field-level detail is kept for
/// logs only; responses carry a generic message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("authorization header missing")]
    MissingAuthorization,

    #[error("authorization header is not a bearer token")]
    InvalidAuthorizationFormat,

    #[error("token is malformed")]
    MalformedToken,

    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("token audience or issuer does not match")]
    AudienceMismatch,

    #[error("token claims failed validation: {}", .fields.join(", "))]
    SchemaViolation { fields: Vec<&'static str> },

    #[error("{actual} token presented where {expected} is required")]
    TokenKindMismatch {
        expected: TokenKind,
        actual: TokenKind,
    },

    #[error("role {role} is not allowed for {tier}")]
    InsufficientRole { role: Role, tier: AccessTier },

    #[error("subject not found")]
    SubjectNotFound,

    #[error("account is blocked")]
    AccountBlocked,

    #[error("email address is not verified")]
    EmailUnverified,

    #[error("token has been revoked")]
    RevokedToken,

    #[error("token is not valid yet")]
    TokenNotYetValid,

    #[error("auth store unavailable")]
    StoreUnavailable,
}

impl AuthError {
    /// HTTP status for this failure.
    ///
    /// `SubjectNotFound` is reported as 401 so callers cannot probe which
    /// subject ids exist.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingAuthorization
            | AuthError::InvalidAuthorizationFormat
            | AuthError::MalformedToken
            | AuthError::InvalidSignature
            | AuthError::AudienceMismatch
            | AuthError::SchemaViolation { .. }
            | AuthError::TokenKindMismatch { .. }
            | AuthError::SubjectNotFound
            | AuthError::RevokedToken
            | AuthError::TokenNotYetValid => StatusCode::UNAUTHORIZED,
            AuthError::InsufficientRole { .. }
            | AuthError::AccountBlocked
            | AuthError::EmailUnverified => StatusCode::FORBIDDEN,
            AuthError::StoreUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable identifier used as the `reason` field in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::MissingAuthorization => "missing_authorization",
            AuthError::InvalidAuthorizationFormat => "invalid_authorization_format",
            AuthError::MalformedToken => "malformed_token",
            AuthError::InvalidSignature => "invalid_signature",
            AuthError::AudienceMismatch => "audience_mismatch",
            AuthError::SchemaViolation { .. } => "schema_violation",
            AuthError::TokenKindMismatch { .. } => "token_kind_mismatch",
            AuthError::InsufficientRole { .. } => "insufficient_role",
            AuthError::SubjectNotFound => "subject_not_found",
            AuthError::AccountBlocked => "account_blocked",
            AuthError::EmailUnverified => "email_unverified",
            AuthError::RevokedToken => "revoked_token",
            AuthError::TokenNotYetValid => "token_not_yet_valid",
            AuthError::StoreUnavailable => "store_unavailable",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let (code, message) = match status {
            StatusCode::UNAUTHORIZED => ("UNAUTHORIZED", "Unauthorized"),
            StatusCode::FORBIDDEN => ("FORBIDDEN", "Forbidden"),
            _ => ("INTERNAL_ERROR", "Internal server error"),
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}
