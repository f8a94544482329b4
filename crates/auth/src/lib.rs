//! Bearer token authentication for the Bazaar marketplace API
//!
//! Verifies RS256 JWTs, validates their claims, enforces access tiers against
//! both the token and the live subject record, and checks revocation. Axum
//! extractors work with any state implementing `FromRef<S>` for
//! `Authenticator`.

mod claims;
mod codec;
mod config;
mod context;
mod denylist;
mod error;
mod extractors;
mod issuer;
mod keys;
mod memory;
mod pipeline;
mod postgres;
mod roles;
mod subject;

pub use claims::{validate_claims, SubjectId, TokenClaims, TokenKind};
pub use codec::{extract_bearer_token, TokenCodec, SIGNING_ALGORITHM};
pub use config::{AuthConfig, ConfigError};
pub use context::AuthContext;
pub use denylist::{DenylistChecker, DenylistEntry, DenylistStore, ExpiryPolicy};
pub use error::AuthError;
pub use extractors::{AccessUser, AdminUser, SuperAdminUser, VerifiedUser};
pub use issuer::{IssuedToken, TokenIssuer, TokenLifetimes};
pub use keys::{KeyError, KeyMaterial, KeyProvider, RotatingKeyProvider, StaticKeyProvider};
pub use memory::{InMemoryDenylistStore, InMemorySubjectStore};
pub use pipeline::{Authenticator, Strategy};
pub use postgres::{PgDenylistStore, PgSubjectStore};
pub use roles::{authorize_role, AccessTier, Role};
pub use subject::{AccountStatus, StoreError, Subject, SubjectResolver, SubjectStore};
