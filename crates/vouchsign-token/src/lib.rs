//! # vouchsign-token
//!
//! Short-lived, signed tokens that authorize redeeming a discount voucher.
//!
//! This crate provides functionality for:
//! - Generating, exporting and importing ECDSA key pairs (P-256, P-384, P-521, secp256k1)
//! - Issuing user-scoped and print-batch-scoped redemption tokens
//! - Verifying tokens offline with nothing but the issuer's public key
//!
//! ## Token Kinds
//!
//! | `typ`   | Claims           | Typical TTL | Presented as           |
//! |---------|------------------|-------------|------------------------|
//! | `user`  | `vid`, `uid`     | minutes     | QR code in the app     |
//! | `print` | `vid`, `btc`, `lmt` | up to 30 days | printed QR / deep link |
//!
//! ## Wire Format
//!
//! Tokens are compact JWS (`header.payload.signature`) signed with ES256,
//! ES384, ES512 or ES256K, so point-of-sale scanners can verify them with any
//! JOSE library given the public key and algorithm name.
//!
//! ## Key Rotation
//!
//! Set [`JwtConfig::key_id`] to tag tokens with the key that signed them.
//! Verifiers read the tag with [`key_id_hint`], look the public key up in
//! their own registry and call [`TokenVerifier::verify_token`]. Keep retired
//! public keys around for as long as the longest TTL in use.

pub mod claims;
pub mod error;
pub mod issuer;
pub mod jws;
pub mod keys;
pub mod verifier;

pub use claims::{ClaimKind, RedemptionClaims, TokenPayload, UnvalidatedClaims};
pub use error::TokenError;
pub use issuer::TokenIssuer;
pub use keys::{
    KeyPair, PrivateKey, PublicKey, export_private_key, export_public_key, generate_key_pair,
    import_private_key, import_public_key, load_public_key_file,
};
pub use verifier::{
    TokenInfo, TokenVerifier, VerificationFailure, VerificationResult, inspect_token_unverified,
    key_id_hint,
};
pub use vouchsign_core::{Algorithm, Curve, JwtConfig};
