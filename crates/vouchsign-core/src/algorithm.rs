//! Elliptic curves and the JOSE signing algorithms bound to them.

use crate::config::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Curves a voucher signing key can live on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Curve {
    #[serde(rename = "P-256")]
    P256,
    #[serde(rename = "P-384")]
    P384,
    #[serde(rename = "P-521")]
    P521,
    #[serde(rename = "secp256k1")]
    Secp256k1,
}

impl Curve {
    /// Every supported curve, in the order key import probes them.
    pub const ALL: [Curve; 4] = [Curve::P256, Curve::P384, Curve::P521, Curve::Secp256k1];

    /// Canonical curve name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Curve::P256 => "P-256",
            Curve::P384 => "P-384",
            Curve::P521 => "P-521",
            Curve::Secp256k1 => "secp256k1",
        }
    }

    /// The only algorithm allowed to sign with a key on this curve.
    pub fn algorithm(&self) -> Algorithm {
        match self {
            Curve::P256 => Algorithm::ES256,
            Curve::P384 => Algorithm::ES384,
            Curve::P521 => Algorithm::ES512,
            Curve::Secp256k1 => Algorithm::ES256K,
        }
    }

    /// Length of a raw `r || s` signature on this curve.
    pub fn signature_len(&self) -> usize {
        match self {
            Curve::P256 | Curve::Secp256k1 => 64,
            Curve::P384 => 96,
            Curve::P521 => 132,
        }
    }
}

impl fmt::Display for Curve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Curve {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "p-256" | "p256" | "prime256v1" | "secp256r1" => Ok(Curve::P256),
            "p-384" | "p384" | "secp384r1" => Ok(Curve::P384),
            "p-521" | "p521" | "secp521r1" => Ok(Curve::P521),
            "secp256k1" | "k256" => Ok(Curve::Secp256k1),
            _ => Err(ConfigError::UnsupportedCurve(s.to_string())),
        }
    }
}

/// JWS algorithm identifiers understood by third-party verifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Algorithm {
    ES256,
    ES384,
    ES512,
    ES256K,
}

impl Algorithm {
    /// JOSE `alg` header value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::ES256 => "ES256",
            Algorithm::ES384 => "ES384",
            Algorithm::ES512 => "ES512",
            Algorithm::ES256K => "ES256K",
        }
    }

    /// The curve a key must be on to sign under this algorithm.
    pub fn curve(&self) -> Curve {
        match self {
            Algorithm::ES256 => Curve::P256,
            Algorithm::ES384 => Curve::P384,
            Algorithm::ES512 => Curve::P521,
            Algorithm::ES256K => Curve::Secp256k1,
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ES256" => Ok(Algorithm::ES256),
            "ES384" => Ok(Algorithm::ES384),
            "ES512" => Ok(Algorithm::ES512),
            "ES256K" => Ok(Algorithm::ES256K),
            _ => Err(ConfigError::UnsupportedAlgorithm(s.to_string())),
        }
    }
}
