//! JWT claims types and structural validation
//!
//! A decoded payload is an untrusted `serde_json::Value` until
//! [`validate_claims`] turns it into [`TokenClaims`].

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::AuthError;
use crate::roles::Role;

lazy_static::lazy_static! {
    /// Canonical hyphenated UUID v4 with an RFC 4122 variant nibble
    static ref UUID_V4_REGEX: Regex = Regex::new(
        r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-4[0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$"
    )
    .unwrap();
}

/// Identifier of an authenticated principal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct SubjectId(String);

impl SubjectId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SubjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SubjectId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Purpose of a token. Each kind has its own revocation namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "token_kind", rename_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub enum TokenKind {
    Access,
    Refresh,
    Email,
    ResetPassword,
}

impl TokenKind {
    /// Parse the wire spelling carried in the `kind` claim.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "access" => Some(TokenKind::Access),
            "refresh" => Some(TokenKind::Refresh),
            "email" => Some(TokenKind::Email),
            "resetPassword" => Some(TokenKind::ResetPassword),
            _ => None,
        }
    }

    pub fn as_tag(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
            TokenKind::Email => "email",
            TokenKind::ResetPassword => "resetPassword",
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_tag())
    }
}

/// Validated token claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenClaims {
    /// Subject id
    pub id: SubjectId,
    /// Role at issuance time (may be stale)
    pub role: Role,
    /// Token id (UUID v4)
    pub jti: Uuid,
    /// Issued at
    pub iat: i64,
    /// Expires at
    pub exp: i64,
    /// Not before
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,
    /// Audience
    pub aud: String,
    /// Issuer
    pub iss: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    /// Purpose the token was issued for
    pub kind: TokenKind,
}

/// Structurally validate a decoded payload.
///
/// All failing fields are reported, always in the order
/// `id, role, jti, iat, exp, nbf, aud, iss, active, kind`. A payload that is not a
/// JSON object reports the single field `claims`.
pub fn validate_claims(raw: Value) -> Result<TokenClaims, AuthError> {
    let Value::Object(map) = raw else {
        return Err(AuthError::SchemaViolation {
            fields: vec!["claims"],
        });
    };

    let mut failed = Vec::new();

    let id = required(&mut failed, "id", non_empty_string(&map, "id"));
    let role = required(
        &mut failed,
        "role",
        string(&map, "role").and_then(Role::from_tag),
    );
    let jti = required(&mut failed, "jti", uuid_v4(&map, "jti"));
    let iat = required(&mut failed, "iat", integer(&map, "iat"));
    let exp = required(&mut failed, "exp", integer(&map, "exp"));
    let nbf = optional(&mut failed, "nbf", &map, |v| v.as_i64());
    let aud = required(&mut failed, "aud", string(&map, "aud").map(str::to_owned));
    let iss = required(&mut failed, "iss", string(&map, "iss").map(str::to_owned));
    let active = optional(&mut failed, "active", &map, Value::as_bool);
    let kind = required(
        &mut failed,
        "kind",
        string(&map, "kind").and_then(TokenKind::from_tag),
    );

    match (id, role, jti, iat, exp, aud, iss, kind) {
        (
            Some(id),
            Some(role),
            Some(jti),
            Some(iat),
            Some(exp),
            Some(aud),
            Some(iss),
            Some(kind),
        ) if failed.is_empty() => {
            Ok(TokenClaims {
                id: SubjectId::new(id),
                role,
                jti,
                iat,
                exp,
                nbf,
                aud,
                iss,
                active,
                kind,
            })
        }
        _ => {
            tracing::debug!(fields = ?failed, "Token claims failed validation");
            Err(AuthError::SchemaViolation { fields: failed })
        }
    }
}

fn required<T>(failed: &mut Vec<&'static str>, field: &'static str, value: Option<T>) -> Option<T> {
    if value.is_none() {
        failed.push(field);
    }
    value
}

/// Absent and `null` are both accepted; a present value must parse.
fn optional<T>(
    failed: &mut Vec<&'static str>,
    field: &'static str,
    map: &Map<String, Value>,
    parse: impl Fn(&Value) -> Option<T>,
) -> Option<T> {
    match map.get(field) {
        None | Some(Value::Null) => None,
        Some(value) => {
            let parsed = parse(value);
            if parsed.is_none() {
                failed.push(field);
            }
            parsed
        }
    }
}

fn string<'a>(map: &'a Map<String, Value>, field: &str) -> Option<&'a str> {
    map.get(field).and_then(Value::as_str)
}

fn non_empty_string(map: &Map<String, Value>, field: &str) -> Option<String> {
    string(map, field)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_owned)
}

fn integer(map: &Map<String, Value>, field: &str) -> Option<i64> {
    map.get(field).and_then(Value::as_i64)
}

fn uuid_v4(map: &Map<String, Value>, field: &str) -> Option<Uuid> {
    string(map, field)
        .filter(|s| UUID_V4_REGEX.is_match(s))
        .and_then(|s| Uuid::parse_str(s).ok())
}
