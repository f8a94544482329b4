//! Authentication configuration
//!
//! Loaded from environment variables (12-factor).

use std::env;

use thiserror::Error;

use crate::denylist::ExpiryPolicy;
use crate::keys::{KeyError, KeyMaterial};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Authentication configuration
#[derive(Clone)]
pub struct AuthConfig {
    /// PEM-encoded RSA public key used to verify token signatures
    pub public_key_pem: String,
    pub audience: String,
    pub issuer: String,
    /// Default for strategies that do not set it explicitly
    pub require_verified_email: bool,
    pub expiry_policy: ExpiryPolicy,
}

impl std::fmt::Debug for AuthConfig {
    #[mutants::skip]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("public_key_pem", &"[REDACTED]")
            .field("audience", &self.audience)
            .field("issuer", &self.issuer)
            .field("require_verified_email", &self.require_verified_email)
            .field("expiry_policy", &self.expiry_policy)
            .finish()
    }
}

impl AuthConfig {
    /// Load configuration from environment variables.
    ///
    /// The public key comes from `AUTH_PUBLIC_KEY` (inline PEM) or, failing
    /// that, the file named by `AUTH_PUBLIC_KEY_FILE`.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let public_key_pem = match env::var("AUTH_PUBLIC_KEY") {
            Ok(pem) if !pem.trim().is_empty() => pem,
            _ => {
                let path = required("AUTH_PUBLIC_KEY_FILE")?;
                std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
                    path: path.clone(),
                    source,
                })?
            }
        };

        let require_verified_email = match env::var("AUTH_REQUIRE_VERIFIED_EMAIL") {
            Ok(value) => parse_bool("AUTH_REQUIRE_VERIFIED_EMAIL", &value)?,
            Err(_) => false,
        };

        let leeway_secs = match env::var("AUTH_EXPIRY_LEEWAY_SECS") {
            Ok(value) => value.parse::<i64>().map_err(|e| ConfigError::Invalid {
                name: "AUTH_EXPIRY_LEEWAY_SECS",
                reason: e.to_string(),
            })?,
            Err(_) => 0,
        };

        let expiry_policy = match env::var("AUTH_EXPIRY_POLICY").as_deref() {
            Err(_) | Ok("enforce") => ExpiryPolicy::Enforce { leeway_secs },
            Ok("denylist-only") => ExpiryPolicy::DenylistOnly,
            Ok(other) => {
                return Err(ConfigError::Invalid {
                    name: "AUTH_EXPIRY_POLICY",
                    reason: format!("expected 'enforce' or 'denylist-only', got '{}'", other),
                })
            }
        };

        Ok(Self {
            public_key_pem,
            audience: required("AUTH_AUDIENCE")?,
            issuer: required("AUTH_ISSUER")?,
            require_verified_email,
            expiry_policy,
        })
    }

    /// Parse the configured key into verification material.
    pub fn key_material(&self) -> Result<KeyMaterial, KeyError> {
        KeyMaterial::from_rsa_pem(
            self.public_key_pem.as_bytes(),
            self.audience.clone(),
            self.issuer.clone(),
        )
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::Missing(name))
}

fn parse_bool(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        other => Err(ConfigError::Invalid {
            name,
            reason: format!("expected a boolean, got '{}'", other),
        }),
    }
}
