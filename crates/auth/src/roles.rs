//! Role tags and tier authorization
//!
//! Tiers are enforced with explicit exclusion lists rather than a rank, so a
//! higher role does not automatically pass a lower tier.

use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// Role carried by a subject and mirrored into its tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub enum Role {
    User,
    Admin,
    SuperAdmin,
}

impl Role {
    /// Parse the wire spelling used in token claims.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "user" => Some(Role::User),
            "admin" => Some(Role::Admin),
            "superAdmin" => Some(Role::SuperAdmin),
            _ => None,
        }
    }

    pub fn as_tag(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
            Role::SuperAdmin => "superAdmin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_tag())
    }
}

/// Authorization strictness level of a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccessTier {
    Access,
    Admin,
    SuperAdmin,
}

impl AccessTier {
    /// Roles rejected by this tier.
    ///
    /// The admin tier rejects both `user` and `superAdmin`, so only `admin`
    /// passes it.
    pub fn denied_roles(&self) -> &'static [Role] {
        match self {
            AccessTier::Access => &[],
            AccessTier::Admin => &[Role::User, Role::SuperAdmin],
            AccessTier::SuperAdmin => &[Role::User, Role::Admin],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AccessTier::Access => "access",
            AccessTier::Admin => "admin-access",
            AccessTier::SuperAdmin => "super-admin-access",
        }
    }

    /// Reject `role` if it is on this tier's exclusion list.
    pub fn authorize(&self, role: Role) -> Result<(), AuthError> {
        authorize_role(role, self.denied_roles()).map_err(|_| AuthError::InsufficientRole {
            role,
            tier: *self,
        })
    }
}

impl std::fmt::Display for AccessTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fail with `InsufficientRole` when `role` is in `denied`.
///
/// The error reports the `Access` tier; use [`AccessTier::authorize`] to
/// attach the tier that was actually being checked.
pub fn authorize_role(role: Role, denied: &[Role]) -> Result<(), AuthError> {
    if denied.contains(&role) {
        return Err(AuthError::InsufficientRole {
            role,
            tier: AccessTier::Access,
        });
    }
    Ok(())
}
