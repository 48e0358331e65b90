//! Issuer/verifier agreement.

use crate::algorithm::Algorithm;
use crate::config::ConfigError;
use serde::{Deserialize, Serialize};

/// Parameters every token is bound to.
///
/// Issuer and verifier must hold the same value; a token minted under one
/// `JwtConfig` fails verification under any other issuer, audience or
/// algorithm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Value of the `iss` claim.
    pub issuer: String,

    /// Value of the `aud` claim.
    pub audience: String,

    /// Signing algorithm; also fixes the curve of the signing key.
    pub algorithm: Algorithm,

    /// Key identifier written to the `kid` header, if any.
    #[serde(default)]
    pub key_id: Option<String>,
}

impl JwtConfig {
    pub fn new(
        issuer: impl Into<String>,
        audience: impl Into<String>,
        algorithm: Algorithm,
    ) -> Self {
        Self {
            issuer: issuer.into(),
            audience: audience.into(),
            algorithm,
            key_id: None,
        }
    }

    /// Tag tokens with a key identifier (used across key rotations).
    pub fn with_key_id(mut self, key_id: impl Into<String>) -> Self {
        self.key_id = Some(key_id.into());
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.issuer.trim().is_empty() {
            return Err(ConfigError::Invalid("jwt.issuer must not be empty".into()));
        }
        if self.audience.trim().is_empty() {
            return Err(ConfigError::Invalid("jwt.audience must not be empty".into()));
        }
        if let Some(kid) = &self.key_id {
            if kid.trim().is_empty() {
                return Err(ConfigError::Invalid("jwt.key_id must not be empty".into()));
            }
        }
        Ok(())
    }
}
