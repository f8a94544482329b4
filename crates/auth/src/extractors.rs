//! Axum extractors for authentication
//!
//! Generic over any state `S` where `Authenticator: FromRef<S>`.
//! This is axum's idiomatic nested-state pattern.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::codec::extract_bearer_token;
use crate::context::AuthContext;
use crate::error::AuthError;
use crate::pipeline::{log_rejection, Authenticator, Strategy};

async fn authenticate_parts<S>(
    parts: &Parts,
    state: &S,
    strategy: Strategy,
) -> Result<AuthContext, AuthError>
where
    Authenticator: FromRef<S>,
    S: Send + Sync,
{
    let authenticator = Authenticator::from_ref(state);

    let token = match parts
        .headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingAuthorization)
        .and_then(extract_bearer_token)
    {
        Ok(token) => token,
        Err(e) => {
            log_rejection(&strategy, None, &e);
            return Err(e);
        }
    };

    authenticator.authenticate(&strategy, &token).await
}

/// Any active subject (`access` strategy)
#[derive(Debug)]
pub struct AccessUser(pub AuthContext);

impl<S> FromRequestParts<S> for AccessUser
where
    Authenticator: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        authenticate_parts(parts, state, Strategy::access())
            .await
            .map(AccessUser)
    }
}

/// Active subject with a confirmed email address.
///
/// For flows such as posting advertisements or starting chats.
#[derive(Debug)]
pub struct VerifiedUser(pub AuthContext);

impl<S> FromRequestParts<S> for VerifiedUser
where
    Authenticator: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        authenticate_parts(parts, state, Strategy::access().require_verified_email(true))
            .await
            .map(VerifiedUser)
    }
}

/// Admin subject (`admin-access` strategy).
///
/// Rejects every other role with 403 FORBIDDEN, `superAdmin` included.
#[derive(Debug)]
pub struct AdminUser(pub AuthContext);

impl<S> FromRequestParts<S> for AdminUser
where
    Authenticator: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        authenticate_parts(parts, state, Strategy::admin_access())
            .await
            .map(AdminUser)
    }
}

/// Super-admin subject (`super-admin-access` strategy)
#[derive(Debug)]
pub struct SuperAdminUser(pub AuthContext);

impl<S> FromRequestParts<S> for SuperAdminUser
where
    Authenticator: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        authenticate_parts(parts, state, Strategy::super_admin_access())
            .await
            .map(SuperAdminUser)
    }
}
