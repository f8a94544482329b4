//! Subject records and resolution
//!
//! The subject record is the source of truth for role and account status at
//! decision time; claims may be stale.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::claims::SubjectId;
use crate::error::AuthError;
use crate::roles::Role;

/// Account status of a subject
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, sqlx::Type)]
#[sqlx(type_name = "account_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Active,
    Blocked,
}

/// Read-only snapshot of the authenticated principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Subject {
    pub id: SubjectId,
    pub role: Role,
    pub account_status: AccountStatus,
    pub is_email_verified: bool,
}

impl Subject {
    pub fn is_blocked(&self) -> bool {
        self.account_status == AccountStatus::Blocked
    }
}

/// Errors raised by subject and denylist stores.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("corrupt record: {0}")]
    Corrupt(String),

    #[error("store lock poisoned")]
    Poisoned,
}

/// Read access to subject records.
#[async_trait::async_trait]
pub trait SubjectStore: Send + Sync {
    async fn find_by_id(&self, id: &SubjectId) -> Result<Option<Subject>, StoreError>;
}

/// Loads subjects and checks they may authenticate.
#[derive(Clone)]
pub struct SubjectResolver {
    store: Arc<dyn SubjectStore>,
}

impl SubjectResolver {
    pub fn new(store: Arc<dyn SubjectStore>) -> Self {
        Self { store }
    }

    pub async fn load(&self, id: &SubjectId) -> Result<Subject, AuthError> {
        match self.store.find_by_id(id).await {
            Ok(Some(subject)) => Ok(subject),
            Ok(None) => Err(AuthError::SubjectNotFound),
            Err(e) => {
                tracing::error!(error = %e, subject_id = %id, "Failed to load subject");
                Err(AuthError::StoreUnavailable)
            }
        }
    }

    /// Reject blocked subjects, and unverified ones when the flow needs a
    /// confirmed email.
    pub fn assert_usable(
        &self,
        subject: &Subject,
        require_verified_email: bool,
    ) -> Result<(), AuthError> {
        if subject.is_blocked() {
            return Err(AuthError::AccountBlocked);
        }
        if require_verified_email && !subject.is_email_verified {
            return Err(AuthError::EmailUnverified);
        }
        Ok(())
    }
}
