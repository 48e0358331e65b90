//! Configuration types for vouchsign.
//!
//! A deployment describes itself in a single YAML file (`vouchsign.yaml`):
//!
//! ```yaml
//! jwt:
//!   issuer: vouchers.example.com
//!   audience: pos-scanners
//!   algorithm: ES256
//!   key_id: key-v2
//! keys:
//!   curve: P-256
//!   private_key_env: VOUCHSIGN_PRIVATE_KEY
//!   public_key_file: keys/public.pem
//! ttl:
//!   user_seconds: 300
//!   print_seconds: 2592000
//! ```

pub mod jwt;
pub mod keys;
pub mod ttl;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub use jwt::JwtConfig;
pub use keys::KeyConfig;
pub use ttl::TtlConfig;

/// Complete vouchsign configuration loaded from a file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VouchsignConfig {
    /// Token issuer/audience/algorithm agreement.
    pub jwt: JwtConfig,

    /// Where key material is read from.
    #[serde(default)]
    pub keys: KeyConfig,

    /// Default lifetimes per token kind.
    #[serde(default)]
    pub ttl: TtlConfig,
}

/// Errors raised while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("unsupported curve: {0}")]
    UnsupportedCurve(String),

    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Configuration error: {0}")]
    Invalid(String),
}

impl VouchsignConfig {
    /// Load and validate configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse and validate configuration from YAML content.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the sections against each other.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.jwt.validate()?;
        self.ttl.validate()?;

        if let Some(curve) = self.keys.curve {
            if curve != self.jwt.algorithm.curve() {
                return Err(ConfigError::Invalid(format!(
                    "keys.curve {} cannot sign {} (requires {})",
                    curve,
                    self.jwt.algorithm,
                    self.jwt.algorithm.curve()
                )));
            }
        }

        Ok(())
    }
}
