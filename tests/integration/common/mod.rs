//! Common test utilities and fixtures for integration tests
//!
//! Provides an in-memory authentication stack signed with the fixture RSA
//! keys, plus helpers for issuing tokens and building requests.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header::AUTHORIZATION, Method, Request},
    Router,
};
use bazaar_auth::{
    AccountStatus, Authenticator, DenylistChecker, ExpiryPolicy, InMemoryDenylistStore,
    InMemorySubjectStore, KeyMaterial, Role, StaticKeyProvider, Subject, SubjectId,
    SubjectResolver, TokenClaims, TokenCodec, TokenIssuer, TokenKind,
};
use chrono::Utc;
use uuid::Uuid;

pub const PRIVATE_KEY: &[u8] = include_bytes!("../../../crates/auth/testdata/signing_key.pem");
pub const PUBLIC_KEY: &[u8] = include_bytes!("../../../crates/auth/testdata/signing_key.pub.pem");
pub const FOREIGN_PRIVATE_KEY: &[u8] =
    include_bytes!("../../../crates/auth/testdata/foreign_key.pem");

pub const AUDIENCE: &str = "bazaar";
pub const ISSUER: &str = "bazaar-auth";
pub const FIXED_JTI: &str = "11111111-1111-4111-8111-111111111111";

/// Authentication stack backed by in-memory stores
pub struct TestApp {
    pub auth: Authenticator,
    pub subjects: InMemorySubjectStore,
    pub denylist: InMemoryDenylistStore,
    pub issuer: TokenIssuer,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_policy(ExpiryPolicy::default())
    }

    pub fn with_policy(policy: ExpiryPolicy) -> Self {
        let subjects = InMemorySubjectStore::new();
        let denylist = InMemoryDenylistStore::new();
        let material = KeyMaterial::from_rsa_pem(PUBLIC_KEY, AUDIENCE, ISSUER).unwrap();

        let auth = Authenticator::new(
            TokenCodec::new(Arc::new(StaticKeyProvider::new(material))),
            SubjectResolver::new(Arc::new(subjects.clone())),
            DenylistChecker::new(Arc::new(denylist.clone()), policy),
        );

        Self {
            auth,
            subjects,
            denylist,
            issuer: TokenIssuer::from_rsa_pem(PRIVATE_KEY, AUDIENCE, ISSUER).unwrap(),
        }
    }

    pub fn router(&self) -> Router {
        bazaar_app::create_app(self.auth.clone())
    }

    /// Store an active, verified subject
    pub fn add_subject(&self, id: &str, role: Role) -> Subject {
        self.add_subject_with(id, role, AccountStatus::Active, true)
    }

    pub fn add_subject_with(
        &self,
        id: &str,
        role: Role,
        status: AccountStatus,
        verified: bool,
    ) -> Subject {
        let subject = Subject {
            id: SubjectId::new(id),
            role,
            account_status: status,
            is_email_verified: verified,
        };
        self.subjects.upsert(subject.clone());
        subject
    }

    /// Claims for subject `id` carrying `role`, valid for the next hour
    pub fn claims(&self, id: &str, role: Role) -> TokenClaims {
        let now = Utc::now().timestamp();
        TokenClaims {
            id: SubjectId::new(id),
            role,
            jti: Uuid::parse_str(FIXED_JTI).unwrap(),
            iat: now,
            exp: now + 3600,
            nbf: None,
            aud: AUDIENCE.to_string(),
            iss: ISSUER.to_string(),
            active: None,
            kind: TokenKind::Access,
        }
    }

    pub fn sign(&self, claims: TokenClaims) -> String {
        self.issuer.sign(claims).unwrap().token
    }

    pub fn token(&self, id: &str, role: Role) -> String {
        self.sign(self.claims(id, role))
    }
}

/// Sign an arbitrary JSON payload with the fixture key
pub fn sign_raw(payload: &serde_json::Value) -> String {
    jsonwebtoken::encode(
        &jsonwebtoken::Header::new(jsonwebtoken::Algorithm::RS256),
        payload,
        &jsonwebtoken::EncodingKey::from_rsa_pem(PRIVATE_KEY).unwrap(),
    )
    .unwrap()
}

pub fn request(method: Method, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
