//! Token revocation (denylist) checks
//!
//! The codec never rejects on `exp` or `nbf`. Whether a token outside its
//! validity window is still accepted is decided here by [`ExpiryPolicy`].

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::claims::{SubjectId, TokenKind};
use crate::error::AuthError;
use crate::subject::StoreError;

/// A revoked token, kept until `expires_at` (the token's own `exp`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DenylistEntry {
    pub subject_id: SubjectId,
    pub token_id: Uuid,
    pub kind: TokenKind,
    pub expires_at: i64,
}

/// Storage for revoked token ids.
///
/// An `insert` must be visible to every `exists` issued after it returns.
#[async_trait::async_trait]
pub trait DenylistStore: Send + Sync {
    async fn exists(
        &self,
        subject_id: &SubjectId,
        token_id: Uuid,
        kind: TokenKind,
    ) -> Result<bool, StoreError>;

    async fn insert(&self, entry: DenylistEntry) -> Result<(), StoreError>;
}

/// How token expiry is enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryPolicy {
    /// Tokens whose `exp` is more than `leeway_secs` in the past count as
    /// revoked; tokens whose `nbf` is more than `leeway_secs` ahead are not
    /// valid yet.
    Enforce { leeway_secs: i64 },
    /// Only explicit revocation ends a token's life; `exp` and `nbf` are ignored.
    DenylistOnly,
}

impl Default for ExpiryPolicy {
    fn default() -> Self {
        ExpiryPolicy::Enforce { leeway_secs: 0 }
    }
}

#[derive(Clone)]
pub struct DenylistChecker {
    store: Arc<dyn DenylistStore>,
    policy: ExpiryPolicy,
}

impl DenylistChecker {
    pub fn new(store: Arc<dyn DenylistStore>, policy: ExpiryPolicy) -> Self {
        match policy {
            ExpiryPolicy::Enforce { leeway_secs } => {
                tracing::info!(leeway_secs, "Denylist checker enforcing token expiry")
            }
            ExpiryPolicy::DenylistOnly => tracing::warn!(
                "Denylist checker ignoring token expiry; tokens live until revoked"
            ),
        }
        Self { store, policy }
    }

    pub fn policy(&self) -> ExpiryPolicy {
        self.policy
    }

    /// Whether the token is revoked, either explicitly or by expiry policy.
    pub async fn is_revoked(
        &self,
        subject_id: &SubjectId,
        token_id: Uuid,
        token_expiry: i64,
        kind: TokenKind,
    ) -> Result<bool, AuthError> {
        self.is_revoked_at(subject_id, token_id, token_expiry, kind, Utc::now().timestamp())
            .await
    }

    /// Fail with `RevokedToken` when [`is_revoked`](Self::is_revoked) holds.
    pub async fn ensure_not_revoked(
        &self,
        subject_id: &SubjectId,
        token_id: Uuid,
        token_expiry: i64,
        kind: TokenKind,
    ) -> Result<(), AuthError> {
        if self
            .is_revoked(subject_id, token_id, token_expiry, kind)
            .await?
        {
            return Err(AuthError::RevokedToken);
        }
        Ok(())
    }

    /// Fail with `TokenNotYetValid` when an enforcing policy sees a future `nbf`.
    pub fn ensure_started(&self, not_before: Option<i64>) -> Result<(), AuthError> {
        self.ensure_started_at(not_before, Utc::now().timestamp())
    }

    fn ensure_started_at(&self, not_before: Option<i64>, now: i64) -> Result<(), AuthError> {
        match (self.policy, not_before) {
            (ExpiryPolicy::Enforce { leeway_secs }, Some(nbf))
                if nbf.saturating_sub(leeway_secs) > now =>
            {
                tracing::debug!(nbf, now, "Token used before nbf");
                Err(AuthError::TokenNotYetValid)
            }
            _ => Ok(()),
        }
    }

    /// Record a revocation. Used by logout flows.
    pub async fn revoke(&self, entry: DenylistEntry) -> Result<(), AuthError> {
        let subject_id = entry.subject_id.clone();
        let token_id = entry.token_id;
        self.store.insert(entry).await.map_err(|e| {
            tracing::error!(error = %e, subject_id = %subject_id, token_id = %token_id, "Failed to revoke token");
            AuthError::StoreUnavailable
        })?;
        tracing::info!(subject_id = %subject_id, token_id = %token_id, "Token revoked");
        Ok(())
    }

    async fn is_revoked_at(
        &self,
        subject_id: &SubjectId,
        token_id: Uuid,
        token_expiry: i64,
        kind: TokenKind,
        now: i64,
    ) -> Result<bool, AuthError> {
        if let ExpiryPolicy::Enforce { leeway_secs } = self.policy {
            if token_expiry.saturating_add(leeway_secs) < now {
                tracing::debug!(subject_id = %subject_id, token_id = %token_id, exp = token_expiry, "Token past expiry");
                return Ok(true);
            }
        }

        self.store
            .exists(subject_id, token_id, kind)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, subject_id = %subject_id, "Failed to query denylist");
                AuthError::StoreUnavailable
            })
    }
}
