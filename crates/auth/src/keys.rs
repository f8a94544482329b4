//! Verification key material
//!
//! The public key and the expected audience/issuer travel together so a
//! rotation never pairs a new key with stale expectations.

use std::sync::{Arc, RwLock};

use jsonwebtoken::DecodingKey;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum KeyError {
    #[error("invalid RSA public key: {0}")]
    InvalidPublicKey(String),

    #[error("invalid RSA private key: {0}")]
    InvalidPrivateKey(String),
}

/// Public key plus the `aud`/`iss` values tokens must carry.
#[derive(Clone)]
pub struct KeyMaterial {
    pub(crate) decoding_key: DecodingKey,
    pub audience: String,
    pub issuer: String,
}

impl KeyMaterial {
    /// Build key material from a PEM-encoded RSA public key.
    pub fn from_rsa_pem(
        public_key_pem: &[u8],
        audience: impl Into<String>,
        issuer: impl Into<String>,
    ) -> Result<Self, KeyError> {
        let decoding_key = DecodingKey::from_rsa_pem(public_key_pem)
            .map_err(|e| KeyError::InvalidPublicKey(e.to_string()))?;

        Ok(Self {
            decoding_key,
            audience: audience.into(),
            issuer: issuer.into(),
        })
    }
}

impl std::fmt::Debug for KeyMaterial {
    #[mutants::skip]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("decoding_key", &"[RSA PUBLIC KEY]")
            .field("audience", &self.audience)
            .field("issuer", &self.issuer)
            .finish()
    }
}

/// Supplies the key material the codec verifies against.
pub trait KeyProvider: Send + Sync {
    fn current(&self) -> Arc<KeyMaterial>;
}

/// Fixed key material for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct StaticKeyProvider {
    material: Arc<KeyMaterial>,
}

impl StaticKeyProvider {
    pub fn new(material: KeyMaterial) -> Self {
        Self {
            material: Arc::new(material),
        }
    }
}

impl KeyProvider for StaticKeyProvider {
    fn current(&self) -> Arc<KeyMaterial> {
        Arc::clone(&self.material)
    }
}

/// Key material that can be swapped out-of-band.
///
/// Decisions already in flight keep the `Arc` they were handed.
#[derive(Debug, Clone)]
pub struct RotatingKeyProvider {
    material: Arc<RwLock<Arc<KeyMaterial>>>,
}

impl RotatingKeyProvider {
    pub fn new(material: KeyMaterial) -> Self {
        Self {
            material: Arc::new(RwLock::new(Arc::new(material))),
        }
    }

    /// Replace the key material used by subsequent decodes.
    pub fn rotate(&self, material: KeyMaterial) {
        let mut guard = self
            .material
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Arc::new(material);
        tracing::info!(
            audience = %guard.audience,
            issuer = %guard.issuer,
            "Verification key rotated"
        );
    }
}

impl KeyProvider for RotatingKeyProvider {
    fn current(&self) -> Arc<KeyMaterial> {
        let guard = self
            .material
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(&guard)
    }
}
