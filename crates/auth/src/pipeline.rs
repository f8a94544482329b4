//! Authentication pipeline
//!
//! `decode → validate claims → token kind → authorize claim role →
//! load subject → check subject usable → authorize subject role → not-before
//! → denylist`, stopping at the first failure.

use std::sync::Arc;

use crate::claims::{validate_claims, SubjectId, TokenClaims, TokenKind};
use crate::codec::TokenCodec;
use crate::config::AuthConfig;
use crate::context::AuthContext;
use crate::denylist::{DenylistChecker, DenylistEntry, DenylistStore};
use crate::error::AuthError;
use crate::keys::{KeyError, StaticKeyProvider};
use crate::roles::AccessTier;
use crate::subject::{SubjectResolver, SubjectStore};

/// Route-level authentication settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Strategy {
    pub tier: AccessTier,
    /// Revocation namespace the token is checked against
    pub token_kind: TokenKind,
    /// `None` defers to the authenticator's configured default
    pub require_verified_email: Option<bool>,
}

impl Strategy {
    pub fn for_tier(tier: AccessTier) -> Self {
        Self {
            tier,
            token_kind: TokenKind::Access,
            require_verified_email: None,
        }
    }

    pub fn access() -> Self {
        Self::for_tier(AccessTier::Access)
    }

    pub fn admin_access() -> Self {
        Self::for_tier(AccessTier::Admin)
    }

    pub fn super_admin_access() -> Self {
        Self::for_tier(AccessTier::SuperAdmin)
    }

    pub fn with_token_kind(mut self, kind: TokenKind) -> Self {
        self.token_kind = kind;
        self
    }

    pub fn require_verified_email(mut self, required: bool) -> Self {
        self.require_verified_email = Some(required);
        self
    }

    pub fn name(&self) -> &'static str {
        self.tier.as_str()
    }
}

/// Authenticates bearer tokens against a [`Strategy`].
///
/// Cheap to clone; every collaborator sits behind an `Arc`.
#[derive(Clone)]
pub struct Authenticator {
    codec: TokenCodec,
    resolver: SubjectResolver,
    denylist: DenylistChecker,
    require_verified_email: bool,
}

impl Authenticator {
    pub fn new(codec: TokenCodec, resolver: SubjectResolver, denylist: DenylistChecker) -> Self {
        Self {
            codec,
            resolver,
            denylist,
            require_verified_email: false,
        }
    }

    /// Wire an authenticator from configuration and the two stores.
    pub fn from_config(
        config: &AuthConfig,
        subjects: Arc<dyn SubjectStore>,
        denylist: Arc<dyn DenylistStore>,
    ) -> Result<Self, KeyError> {
        let keys = StaticKeyProvider::new(config.key_material()?);

        Ok(Self::new(
            TokenCodec::new(Arc::new(keys)),
            SubjectResolver::new(subjects),
            DenylistChecker::new(denylist, config.expiry_policy),
        )
        .with_verified_email_default(config.require_verified_email))
    }

    pub fn with_verified_email_default(mut self, required: bool) -> Self {
        self.require_verified_email = required;
        self
    }

    /// Authenticate with the default strategy for `tier`.
    pub async fn authenticate_tier(
        &self,
        tier: AccessTier,
        token: &str,
    ) -> Result<AuthContext, AuthError> {
        self.authenticate(&Strategy::for_tier(tier), token).await
    }

    pub async fn authenticate(
        &self,
        strategy: &Strategy,
        token: &str,
    ) -> Result<AuthContext, AuthError> {
        let claims = match self.codec.decode(token).and_then(validate_claims) {
            Ok(claims) => claims,
            Err(e) => {
                log_rejection(strategy, None, &e);
                return Err(e);
            }
        };

        let subject_id = claims.id.clone();
        match self.authorize(strategy, claims).await {
            Ok(ctx) => {
                tracing::debug!(
                    strategy = strategy.name(),
                    subject_id = %subject_id,
                    role = %ctx.subject.role,
                    "Authentication accepted"
                );
                Ok(ctx)
            }
            Err(e) => {
                log_rejection(strategy, Some(&subject_id), &e);
                Err(e)
            }
        }
    }

    /// Revoke the token behind `ctx` in the `kind` namespace (logout).
    pub async fn revoke(&self, ctx: &AuthContext, kind: TokenKind) -> Result<(), AuthError> {
        self.denylist
            .revoke(DenylistEntry {
                subject_id: ctx.subject.id.clone(),
                token_id: ctx.claims.jti,
                kind,
                expires_at: ctx.claims.exp,
            })
            .await
    }

    async fn authorize(
        &self,
        strategy: &Strategy,
        claims: TokenClaims,
    ) -> Result<AuthContext, AuthError> {
        if claims.kind != strategy.token_kind {
            return Err(AuthError::TokenKindMismatch {
                expected: strategy.token_kind,
                actual: claims.kind,
            });
        }

        strategy.tier.authorize(claims.role)?;

        let subject = self.resolver.load(&claims.id).await?;
        self.resolver.assert_usable(
            &subject,
            strategy
                .require_verified_email
                .unwrap_or(self.require_verified_email),
        )?;

        // the live role may differ from the one baked into the token
        strategy.tier.authorize(subject.role)?;

        self.denylist.ensure_started(claims.nbf)?;
        self.denylist
            .ensure_not_revoked(&subject.id, claims.jti, claims.exp, strategy.token_kind)
            .await?;

        Ok(AuthContext::new(subject, claims))
    }
}

pub(crate) fn log_rejection(
    strategy: &Strategy,
    subject_id: Option<&SubjectId>,
    error: &AuthError,
) {
    let subject_id = subject_id.map(SubjectId::as_str);
    if matches!(error, AuthError::StoreUnavailable) {
        tracing::error!(
            strategy = strategy.name(),
            reason = error.kind(),
            subject_id,
            "Authentication failed"
        );
    } else {
        tracing::warn!(
            strategy = strategy.name(),
            reason = error.kind(),
            subject_id,
            "Authentication rejected"
        );
    }
}
