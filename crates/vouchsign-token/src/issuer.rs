//! Token issuance.

use crate::claims::{RedemptionClaims, TokenPayload};
use crate::error::TokenError;
use crate::jws::{self, Header};
use crate::keys::PrivateKey;
use chrono::Utc;
use vouchsign_core::JwtConfig;

/// Signs redemption claims into compact ECDSA JWS tokens.
///
/// The issuer holds only its immutable [`JwtConfig`]; it is cheap to clone and
/// can be shared between threads.
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    config: JwtConfig,
}

impl TokenIssuer {
    /// Create an issuer bound to `config`.
    pub fn new(config: JwtConfig) -> Result<Self, TokenError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &JwtConfig {
        &self.config
    }

    /// Fail unless `key` is on the curve the configured algorithm requires.
    pub fn check_key(&self, key: &PrivateKey) -> Result<(), TokenError> {
        let algorithm = self.config.algorithm;
        if key.curve() != algorithm.curve() {
            return Err(TokenError::AlgorithmMismatch {
                algorithm,
                curve: key.curve(),
            });
        }
        Ok(())
    }

    /// Sign `claims` with `key`, valid for `ttl_seconds` from now.
    pub fn generate_token(
        &self,
        claims: &RedemptionClaims,
        key: &PrivateKey,
        ttl_seconds: u64,
    ) -> Result<String, TokenError> {
        self.generate_token_at(claims, key, ttl_seconds, Utc::now().timestamp())
    }

    /// Sign `claims` as if issued at `issued_at` (seconds since the Unix epoch).
    pub fn generate_token_at(
        &self,
        claims: &RedemptionClaims,
        key: &PrivateKey,
        ttl_seconds: u64,
        issued_at: i64,
    ) -> Result<String, TokenError> {
        self.check_key(key)?;
        claims.validate()?;

        let exp = i64::try_from(ttl_seconds)
            .ok()
            .and_then(|ttl| issued_at.checked_add(ttl))
            .ok_or(TokenError::InvalidTtl(ttl_seconds))?;

        let header = Header::new(self.config.algorithm, self.config.key_id.clone());
        let payload = TokenPayload {
            claims: claims.clone(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
            iat: issued_at,
            exp,
        };

        let signing_input = format!("{}.{}", jws::encode_json(&header)?, jws::encode_json(&payload)?);
        let signature = key.sign(signing_input.as_bytes())?;

        tracing::debug!(
            vid = %claims.vid(),
            typ = %claims.kind(),
            kid = ?self.config.key_id,
            exp,
            "Issued redemption token"
        );

        Ok(format!("{}.{}", signing_input, jws::encode_segment(&signature)))
    }
}
