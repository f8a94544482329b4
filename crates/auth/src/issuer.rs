//! Token issuance for login, refresh and one-time email flows

use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use uuid::Uuid;

use crate::claims::{TokenClaims, TokenKind};
use crate::codec::SIGNING_ALGORITHM;
use crate::keys::KeyError;
use crate::subject::{AccountStatus, Subject};

/// A freshly signed token and the claims it carries.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub kind: TokenKind,
    pub claims: TokenClaims,
}

/// Lifetime of each token kind.
#[derive(Debug, Clone, Copy)]
pub struct TokenLifetimes {
    pub access: Duration,
    pub refresh: Duration,
    pub email: Duration,
    pub reset_password: Duration,
}

impl Default for TokenLifetimes {
    fn default() -> Self {
        Self {
            access: Duration::minutes(15),
            refresh: Duration::days(7),
            email: Duration::days(1),
            reset_password: Duration::hours(1),
        }
    }
}

impl TokenLifetimes {
    pub fn for_kind(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => self.access,
            TokenKind::Refresh => self.refresh,
            TokenKind::Email => self.email,
            TokenKind::ResetPassword => self.reset_password,
        }
    }
}

/// Signs RS256 tokens verifiable by [`TokenCodec`](crate::TokenCodec).
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    audience: String,
    issuer: String,
    lifetimes: TokenLifetimes,
}

impl TokenIssuer {
    pub fn from_rsa_pem(
        private_key_pem: &[u8],
        audience: impl Into<String>,
        issuer: impl Into<String>,
    ) -> Result<Self, KeyError> {
        let encoding_key = EncodingKey::from_rsa_pem(private_key_pem)
            .map_err(|e| KeyError::InvalidPrivateKey(e.to_string()))?;

        Ok(Self {
            encoding_key,
            audience: audience.into(),
            issuer: issuer.into(),
            lifetimes: TokenLifetimes::default(),
        })
    }

    pub fn with_lifetimes(mut self, lifetimes: TokenLifetimes) -> Self {
        self.lifetimes = lifetimes;
        self
    }

    /// Issue a token of `kind` for `subject` with a fresh UUID v4 `jti`.
    pub fn issue(
        &self,
        subject: &Subject,
        kind: TokenKind,
    ) -> Result<IssuedToken, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let claims = TokenClaims {
            id: subject.id.clone(),
            role: subject.role,
            jti: Uuid::new_v4(),
            iat: now.timestamp(),
            exp: (now + self.lifetimes.for_kind(kind)).timestamp(),
            nbf: None,
            aud: self.audience.clone(),
            iss: self.issuer.clone(),
            active: Some(subject.account_status == AccountStatus::Active),
            kind,
        };

        self.sign(claims)
    }

    /// Sign caller-supplied claims as-is. The token kind is the one the
    /// claims carry.
    pub fn sign(&self, claims: TokenClaims) -> Result<IssuedToken, jsonwebtoken::errors::Error> {
        let kind = claims.kind;
        let token = encode(&Header::new(SIGNING_ALGORITHM), &claims, &self.encoding_key)?;

        tracing::debug!(
            subject_id = %claims.id,
            token_id = %claims.jti,
            kind = %kind,
            "Token issued"
        );

        Ok(IssuedToken {
            token,
            kind,
            claims,
        })
    }
}
