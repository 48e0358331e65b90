//! Key material location.

use crate::algorithm::Curve;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where the signing and verification keys are read from.
///
/// Keys are PEM documents. Environment variables take precedence over files.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct KeyConfig {
    /// Curve used when generating a fresh key pair. Must match the
    /// configured algorithm.
    #[serde(default)]
    pub curve: Option<Curve>,

    /// Environment variable containing the PKCS#8 private key.
    #[serde(default)]
    pub private_key_env: Option<String>,

    /// Path to the PKCS#8 private key file.
    #[serde(default)]
    pub private_key_file: Option<PathBuf>,

    /// Environment variable containing the SPKI public key.
    #[serde(default)]
    pub public_key_env: Option<String>,

    /// Path to the SPKI public key file.
    #[serde(default)]
    pub public_key_file: Option<PathBuf>,
}

impl KeyConfig {
    /// Resolve the private key PEM from environment or file.
    pub fn resolve_private_key(&self) -> Result<Option<String>, std::io::Error> {
        resolve(self.private_key_env.as_deref(), self.private_key_file.as_ref())
    }

    /// Resolve the public key PEM from environment or file.
    pub fn resolve_public_key(&self) -> Result<Option<String>, std::io::Error> {
        resolve(self.public_key_env.as_deref(), self.public_key_file.as_ref())
    }
}

fn resolve(env_var: Option<&str>, path: Option<&PathBuf>) -> Result<Option<String>, std::io::Error> {
    if let Some(env_var) = env_var {
        if let Ok(key) = std::env::var(env_var) {
            return Ok(Some(key));
        }
    }

    if let Some(path) = path {
        if path.exists() {
            let key = std::fs::read_to_string(path)?;
            return Ok(Some(key.trim().to_string()));
        }
    }

    Ok(None)
}
