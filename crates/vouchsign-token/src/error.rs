//! Error types for token issuance and key handling.
//!
//! Verification failures are not errors; see [`crate::VerificationFailure`].

use thiserror::Error;
use vouchsign_core::{Algorithm, ConfigError, Curve};

/// Errors raised by key management and token issuance.
///
/// All of these indicate a programming or configuration mistake on the
/// issuing side and should be surfaced immediately.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Curve name outside the supported set.
    #[error("unsupported curve: {0}")]
    UnsupportedCurve(String),

    /// Exported key material could not be parsed.
    #[error("failed to import key: {0}")]
    KeyImport(String),

    /// Key could not be serialized.
    #[error("failed to export key: {0}")]
    KeyExport(String),

    /// The configured algorithm cannot be used with the key's curve.
    #[error("algorithm {algorithm} cannot be used with a {curve} key")]
    AlgorithmMismatch { algorithm: Algorithm, curve: Curve },

    /// Claims do not match their `typ` discriminator.
    #[error("invalid claims: {0}")]
    ClaimsValidation(String),

    /// TTL pushes `exp` out of the representable range.
    #[error("invalid ttl: {0} seconds")]
    InvalidTtl(u64),

    /// Rejected issuer/verifier configuration.
    #[error("configuration error: {0}")]
    Config(ConfigError),

    /// Failed to serialize/deserialize a token segment.
    #[error("token serialization error: {0}")]
    Serialization(String),
}

impl From<ConfigError> for TokenError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::UnsupportedCurve(name) => TokenError::UnsupportedCurve(name),
            other => TokenError::Config(other),
        }
    }
}

impl From<serde_json::Error> for TokenError {
    fn from(err: serde_json::Error) -> Self {
        TokenError::Serialization(err.to_string())
    }
}
