//! In-memory subject and denylist stores
//!
//! Used by tests and local development. Writes are visible to every read
//! issued after they return.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use uuid::Uuid;

use crate::claims::{SubjectId, TokenKind};
use crate::denylist::{DenylistEntry, DenylistStore};
use crate::subject::{StoreError, Subject, SubjectStore};

#[derive(Debug, Clone, Default)]
pub struct InMemorySubjectStore {
    subjects: Arc<RwLock<HashMap<SubjectId, Subject>>>,
}

impl InMemorySubjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a subject record.
    pub fn upsert(&self, subject: Subject) {
        self.subjects
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(subject.id.clone(), subject);
    }

    pub fn remove(&self, id: &SubjectId) -> Option<Subject> {
        self.subjects
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(id)
    }
}

#[async_trait::async_trait]
impl SubjectStore for InMemorySubjectStore {
    async fn find_by_id(&self, id: &SubjectId) -> Result<Option<Subject>, StoreError> {
        let subjects = self.subjects.read().map_err(|_| StoreError::Poisoned)?;
        Ok(subjects.get(id).cloned())
    }
}

type DenylistKey = (SubjectId, Uuid, TokenKind);

#[derive(Debug, Clone, Default)]
pub struct InMemoryDenylistStore {
    entries: Arc<RwLock<HashMap<DenylistKey, i64>>>,
}

impl InMemoryDenylistStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop entries whose token expired before `now`. Returns how many went.
    ///
    /// Only safe with an enforcing expiry policy: under denylist-only, a
    /// purged token becomes valid again.
    pub fn purge_expired(&self, now: i64) -> Result<usize, StoreError> {
        let mut entries = self.entries.write().map_err(|_| StoreError::Poisoned)?;
        let before = entries.len();
        entries.retain(|_, expires_at| *expires_at >= now);
        let purged = before - entries.len();
        if purged > 0 {
            tracing::debug!(purged, "Purged expired denylist entries");
        }
        Ok(purged)
    }
}

#[async_trait::async_trait]
impl DenylistStore for InMemoryDenylistStore {
    async fn exists(
        &self,
        subject_id: &SubjectId,
        token_id: Uuid,
        kind: TokenKind,
    ) -> Result<bool, StoreError> {
        let entries = self.entries.read().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.contains_key(&(subject_id.clone(), token_id, kind)))
    }

    async fn insert(&self, entry: DenylistEntry) -> Result<(), StoreError> {
        let mut entries = self.entries.write().map_err(|_| StoreError::Poisoned)?;
        entries.insert(
            (entry.subject_id, entry.token_id, entry.kind),
            entry.expires_at,
        );
        Ok(())
    }
}
