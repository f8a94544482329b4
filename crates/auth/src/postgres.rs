//! Postgres-backed subject and denylist stores
//!
//! Uses runtime `sqlx::query_as` (not macros) so the crate builds without a
//! live database. Schema lives in `migrations/`.

use chrono::{TimeZone, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::claims::{SubjectId, TokenKind};
use crate::denylist::{DenylistEntry, DenylistStore};
use crate::subject::{StoreError, Subject, SubjectStore};

/// Reads subjects from the `users` table.
#[derive(Clone)]
pub struct PgSubjectStore {
    pool: PgPool,
}

impl PgSubjectStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl SubjectStore for PgSubjectStore {
    async fn find_by_id(&self, id: &SubjectId) -> Result<Option<Subject>, StoreError> {
        let subject: Option<Subject> = sqlx::query_as(
            r#"
            SELECT id, role, account_status, is_email_verified
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(subject)
    }
}

/// Revoked tokens in the `revoked_tokens` table.
#[derive(Clone)]
pub struct PgDenylistStore {
    pool: PgPool,
}

impl PgDenylistStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Delete entries whose token expired before now.
    ///
    /// Only call this when expiry is enforced; under denylist-only a purged
    /// token becomes valid again.
    pub async fn purge_expired(&self) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM revoked_tokens WHERE expires_at < NOW()")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[async_trait::async_trait]
impl DenylistStore for PgDenylistStore {
    async fn exists(
        &self,
        subject_id: &SubjectId,
        token_id: Uuid,
        kind: TokenKind,
    ) -> Result<bool, StoreError> {
        let (exists,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM revoked_tokens
                WHERE subject_id = $1 AND token_id = $2 AND kind = $3
            )
            "#,
        )
        .bind(subject_id)
        .bind(token_id)
        .bind(kind)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn insert(&self, entry: DenylistEntry) -> Result<(), StoreError> {
        let expires_at = Utc
            .timestamp_opt(entry.expires_at, 0)
            .single()
            .ok_or_else(|| StoreError::Corrupt(format!("invalid expiry {}", entry.expires_at)))?;

        sqlx::query(
            r#"
            INSERT INTO revoked_tokens (subject_id, token_id, kind, expires_at, revoked_at)
            VALUES ($1, $2, $3, $4, NOW())
            ON CONFLICT (subject_id, token_id, kind) DO NOTHING
            "#,
        )
        .bind(&entry.subject_id)
        .bind(entry.token_id)
        .bind(entry.kind)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
