//! Token verification.
//!
//! Verification is the boundary between untrusted redemption attempts and the
//! voucher domain. It never returns an error: every problem with a presented
//! token becomes an invalid [`VerificationResult`].

use crate::claims::TokenPayload;
use crate::error::TokenError;
use crate::jws::{self, Header};
use crate::keys::PublicKey;
use chrono::Utc;
use serde::Serialize;
use std::fmt;
use vouchsign_core::JwtConfig;

/// Why a token was rejected. For logs and metrics only; never echo it back
/// to whoever presented the token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationFailure {
    /// Not three base64url segments, or a segment is not the expected JSON.
    Malformed,
    /// Header `alg` differs from the configured algorithm.
    AlgorithmMismatch,
    /// Supplied public key is not on the configured algorithm's curve.
    KeyMismatch,
    /// Signature does not verify under the supplied public key.
    BadSignature,
    /// Signed payload does not decode into redemption claims.
    InvalidClaims,
    IssuerMismatch,
    AudienceMismatch,
    Expired,
}

impl fmt::Display for VerificationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            VerificationFailure::Malformed => "malformed token",
            VerificationFailure::AlgorithmMismatch => "unexpected algorithm",
            VerificationFailure::KeyMismatch => "public key does not match algorithm",
            VerificationFailure::BadSignature => "bad signature",
            VerificationFailure::InvalidClaims => "invalid claims",
            VerificationFailure::IssuerMismatch => "issuer mismatch",
            VerificationFailure::AudienceMismatch => "audience mismatch",
            VerificationFailure::Expired => "token expired",
        };
        f.write_str(reason)
    }
}

/// Outcome of verifying a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationResult {
    pub is_valid: bool,
    /// Present only when `is_valid` is true.
    pub payload: Option<TokenPayload>,
    /// Present only when `is_valid` is false.
    pub failure: Option<VerificationFailure>,
}

impl VerificationResult {
    fn valid(payload: TokenPayload) -> Self {
        Self {
            is_valid: true,
            payload: Some(payload),
            failure: None,
        }
    }

    fn invalid(failure: VerificationFailure) -> Self {
        Self {
            is_valid: false,
            payload: None,
            failure: Some(failure),
        }
    }
}

/// Verifies tokens minted under a [`JwtConfig`].
#[derive(Debug, Clone)]
pub struct TokenVerifier {
    config: JwtConfig,
}

impl TokenVerifier {
    /// Create a verifier bound to `config`.
    pub fn new(config: JwtConfig) -> Result<Self, TokenError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &JwtConfig {
        &self.config
    }

    /// Verify `token` against `public_key` at the current time.
    pub fn verify_token(&self, token: &str, public_key: &PublicKey) -> VerificationResult {
        self.verify_token_at(token, public_key, Utc::now().timestamp())
    }

    /// Verify `token` against `public_key` as of `now` (seconds since the Unix epoch).
    pub fn verify_token_at(&self, token: &str, public_key: &PublicKey, now: i64) -> VerificationResult {
        match self.check(token, public_key, now) {
            Ok(payload) => {
                tracing::debug!(vid = %payload.vid(), typ = %payload.typ(), "Token verified");
                VerificationResult::valid(payload)
            }
            Err(failure) => {
                tracing::debug!(reason = %failure, "Token verification failed");
                VerificationResult::invalid(failure)
            }
        }
    }

    fn check(&self, token: &str, public_key: &PublicKey, now: i64) -> Result<TokenPayload, VerificationFailure> {
        let parts = jws::split_compact(token.trim()).ok_or(VerificationFailure::Malformed)?;
        let header: Header = jws::decode_json(parts.header).ok_or(VerificationFailure::Malformed)?;
        let signature = jws::decode_segment(parts.signature).ok_or(VerificationFailure::Malformed)?;

        // Nothing in the payload is trusted until the signature checks out
        let algorithm = self.config.algorithm;
        if header.alg != algorithm.as_str() {
            return Err(VerificationFailure::AlgorithmMismatch);
        }
        if public_key.curve() != algorithm.curve() {
            return Err(VerificationFailure::KeyMismatch);
        }
        if !public_key.verify(parts.signing_input.as_bytes(), &signature) {
            return Err(VerificationFailure::BadSignature);
        }

        // Signed, so a bad shape means a faulty issuer rather than tampering
        let payload: TokenPayload =
            jws::decode_json(parts.payload).ok_or(VerificationFailure::InvalidClaims)?;
        if payload.claims.validate().is_err() {
            return Err(VerificationFailure::InvalidClaims);
        }
        if payload.iss != self.config.issuer {
            return Err(VerificationFailure::IssuerMismatch);
        }
        if payload.aud != self.config.audience {
            return Err(VerificationFailure::AudienceMismatch);
        }
        if payload.exp <= now {
            return Err(VerificationFailure::Expired);
        }

        Ok(payload)
    }
}

/// Read the unverified `kid` header so the caller can pick the public key.
///
/// The value is attacker-controlled until the token has been verified.
pub fn key_id_hint(token: &str) -> Option<String> {
    let parts = jws::split_compact(token.trim())?;
    let header: Header = jws::decode_json(parts.header)?;
    header.kid
}

/// Decode a token without checking anything (for debugging).
pub fn inspect_token_unverified(token: &str) -> Result<TokenInfo, TokenError> {
    let parts = jws::split_compact(token.trim())
        .ok_or_else(|| TokenError::Serialization("expected header.payload.signature".to_string()))?;
    let header: Header = jws::decode_json(parts.header)
        .ok_or_else(|| TokenError::Serialization("header is not base64url JSON".to_string()))?;
    let payload: serde_json::Value = jws::decode_json(parts.payload)
        .ok_or_else(|| TokenError::Serialization("payload is not base64url JSON".to_string()))?;
    let signature_len = jws::decode_segment(parts.signature)
        .map(|sig| sig.len())
        .unwrap_or(0);

    Ok(TokenInfo {
        header,
        payload,
        signature_len,
    })
}

/// Decoded but unverified token contents.
#[derive(Debug, Clone)]
pub struct TokenInfo {
    pub header: Header,
    pub payload: serde_json::Value,
    /// Decoded signature length in bytes (0 if not base64url).
    pub signature_len: usize,
}
