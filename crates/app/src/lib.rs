//! Bazaar application composition root
//!
//! Wires the authenticator into an axum router. Each protected route picks
//! its strategy through the extractor it takes.

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use bazaar_auth::{
    AccessUser, AdminUser, AuthContext, AuthError, Authenticator, SuperAdminUser, TokenKind,
};
use serde::Serialize;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub auth: Authenticator,
}

impl FromRef<AppState> for Authenticator {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}

/// Authenticated subject as seen by the API.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: String,
    pub role: String,
    pub email_verified: bool,
    pub token_expires_at: i64,
}

impl From<&AuthContext> for MeResponse {
    fn from(ctx: &AuthContext) -> Self {
        Self {
            id: ctx.subject.id.to_string(),
            role: ctx.role().to_string(),
            email_verified: ctx.subject.is_email_verified,
            token_expires_at: ctx.claims.exp,
        }
    }
}

/// Create the main application router with all routes
pub fn create_app(auth: Authenticator) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/", get(|| async { "Bazaar API v0.0.1-SNAPSHOT" }))
        .route("/v1/me", get(me))
        .route("/v1/admin/me", get(admin_me))
        .route("/v1/super-admin/me", get(super_admin_me))
        .route("/v1/auth/logout", post(logout))
        .with_state(AppState { auth })
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

async fn me(AccessUser(ctx): AccessUser) -> Json<MeResponse> {
    Json(MeResponse::from(&ctx))
}

async fn admin_me(AdminUser(ctx): AdminUser) -> Json<MeResponse> {
    Json(MeResponse::from(&ctx))
}

async fn super_admin_me(SuperAdminUser(ctx): SuperAdminUser) -> Json<MeResponse> {
    Json(MeResponse::from(&ctx))
}

/// Revoke the presented access token
async fn logout(
    State(state): State<AppState>,
    AccessUser(ctx): AccessUser,
) -> Result<StatusCode, AuthError> {
    state.auth.revoke(&ctx, TokenKind::Access).await?;
    Ok(StatusCode::NO_CONTENT)
}
