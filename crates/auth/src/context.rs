//! Authorization context for authenticated subjects

use serde::Serialize;

use crate::claims::{SubjectId, TokenClaims};
use crate::roles::Role;
use crate::subject::Subject;

/// Outcome of a successful authentication: the live subject record and the
/// validated claims of the presented token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthContext {
    pub subject: Subject,
    pub claims: TokenClaims,
}

impl AuthContext {
    pub fn new(subject: Subject, claims: TokenClaims) -> Self {
        Self { subject, claims }
    }

    pub fn subject_id(&self) -> &SubjectId {
        &self.subject.id
    }

    /// Live role from the subject record, not the possibly stale claim.
    pub fn role(&self) -> Role {
        self.subject.role
    }
}
