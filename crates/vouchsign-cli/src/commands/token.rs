//! Token management commands.
//!
//! `vouchsign token mint` - Mint a user or print-batch redemption token.
//! `vouchsign token verify` - Verify a token and print its payload.
//! `vouchsign token inspect` - Decode a token without verifying it.

use super::{
    load_config_file, read_path_or_value, resolve_private_key, resolve_public_key,
    resolve_settings,
};
use crate::JwtArgs;
use anyhow::Context;
use std::fs;
use std::path::PathBuf;
use vouchsign_token::{
    ClaimKind, RedemptionClaims, TokenIssuer, TokenVerifier, UnvalidatedClaims,
    inspect_token_unverified,
};

/// Claim fields as given on the command line.
#[derive(Debug, Clone, Default)]
pub struct MintClaims {
    pub vid: String,
    pub typ: Option<String>,
    pub uid: Option<String>,
    pub batch: Option<String>,
    pub limit: Option<u32>,
}

impl TryFrom<MintClaims> for RedemptionClaims {
    type Error = anyhow::Error;

    fn try_from(args: MintClaims) -> anyhow::Result<Self> {
        let typ = args.typ.unwrap_or_else(|| {
            if args.uid.is_some() {
                ClaimKind::User.to_string()
            } else {
                ClaimKind::Print.to_string()
            }
        });

        let claims = RedemptionClaims::try_from(UnvalidatedClaims {
            vid: args.vid,
            typ,
            uid: args.uid,
            btc: args.batch,
            lmt: args.limit,
        })?;
        Ok(claims)
    }
}

/// Parse a TTL like "300", "90s", "5m", "24h" or "7d" into seconds.
fn parse_ttl(s: &str) -> anyhow::Result<u64> {
    let s = s.trim().to_lowercase();

    let (digits, unit) = match s.char_indices().last() {
        Some((idx, c)) if c.is_ascii_alphabetic() => (&s[..idx], c),
        _ => (s.as_str(), 's'),
    };
    let value: u64 = digits
        .parse()
        .with_context(|| format!("Invalid TTL '{}'", s))?;

    let multiplier = match unit {
        's' => 1,
        'm' => 60,
        'h' => 60 * 60,
        'd' => 24 * 60 * 60,
        other => anyhow::bail!("Invalid TTL unit '{}' (use s, m, h or d)", other),
    };

    value
        .checked_mul(multiplier)
        .with_context(|| format!("TTL '{}' is too large", s))
}

/// Mint a new redemption token.
pub fn mint(
    jwt: &JwtArgs,
    private_key: Option<String>,
    claims: MintClaims,
    ttl: Option<String>,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let claims = RedemptionClaims::try_from(claims)?;

    let file = load_config_file(jwt)?;
    let key_sources = file.as_ref().map(|c| c.keys.clone()).unwrap_or_default();
    let key = resolve_private_key(private_key, &key_sources)?;
    let settings = resolve_settings(jwt, file, Some(key.curve()))?;

    let ttl_seconds = match &ttl {
        Some(ttl) => parse_ttl(ttl)?,
        None => match claims.kind() {
            ClaimKind::User => settings.ttl.user_seconds,
            ClaimKind::Print => settings.ttl.print_seconds,
        },
    };

    let issuer = TokenIssuer::new(settings.jwt)?;
    let token = issuer.generate_token(&claims, &key, ttl_seconds)?;

    if let Some(output_path) = output {
        fs::write(&output_path, &token)
            .with_context(|| format!("Failed to write {}", output_path.display()))?;
        println!("✔ Token written to: {}", output_path.display());
        println!("  Type: {}", claims.kind());
        println!("  Voucher: {}", claims.vid());
        if let Some(uid) = claims.uid() {
            println!("  User: {}", uid);
        }
        if let Some(batch) = claims.batch() {
            println!("  Batch: {} (limit {})", batch, claims.limit().unwrap_or_default());
        }
        println!("  Algorithm: {}", issuer.config().algorithm);
        if let Some(kid) = &issuer.config().key_id {
            println!("  Key ID: {}", kid);
        }
        println!("  Expires in: {}s", ttl_seconds);
    } else {
        println!("{}", token);
    }

    Ok(())
}

/// Verify a token and print its payload.
pub fn verify(jwt: &JwtArgs, public_key: Option<String>, token: String) -> anyhow::Result<()> {
    let token_str = read_path_or_value(&token)?;

    let file = load_config_file(jwt)?;
    let key_sources = file.as_ref().map(|c| c.keys.clone()).unwrap_or_default();
    let key = resolve_public_key(public_key, &key_sources)?;
    let settings = resolve_settings(jwt, file, Some(key.curve()))?;

    let verifier = TokenVerifier::new(settings.jwt)?;
    let result = verifier.verify_token(&token_str, &key);

    match (result.is_valid, result.payload) {
        (true, Some(payload)) => {
            println!("✔ Token is valid");
            println!();
            println!("{}", serde_json::to_string_pretty(&payload)?);
            Ok(())
        }
        _ => {
            let reason = result
                .failure
                .map(|f| f.to_string())
                .unwrap_or_else(|| "unknown".to_string());
            tracing::warn!(reason = %reason, "Token verification failed");
            anyhow::bail!("✖ Token verification failed: {}", reason)
        }
    }
}

/// Decode a token without verification.
pub fn inspect(token: String) -> anyhow::Result<()> {
    let token_str = read_path_or_value(&token)?;
    let info = inspect_token_unverified(&token_str)?;

    println!("Token Information (unverified):");
    println!("  Algorithm: {}", info.header.alg);
    println!(
        "  Key ID: {}",
        info.header.kid.as_deref().unwrap_or("(none)")
    );
    println!("  Signature: {} bytes", info.signature_len);
    println!();
    println!("{}", serde_json::to_string_pretty(&info.payload)?);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use vouchsign_token::{Curve, KeyPair, export_private_key, export_public_key};

    fn jwt_args() -> JwtArgs {
        JwtArgs {
            issuer: Some("vouchers.example.com".into()),
            audience: Some("pos-scanners".into()),
            ..Default::default()
        }
    }

    fn user_claims() -> MintClaims {
        MintClaims {
            vid: "voucher-001".into(),
            uid: Some("user-123".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_ttl() {
        assert_eq!(parse_ttl("300").unwrap(), 300);
        assert_eq!(parse_ttl("90s").unwrap(), 90);
        assert_eq!(parse_ttl("5m").unwrap(), 300);
        assert_eq!(parse_ttl("24h").unwrap(), 86_400);
        assert_eq!(parse_ttl("30d").unwrap(), 2_592_000);
        assert!(parse_ttl("5w").is_err());
        assert!(parse_ttl("h").is_err());
        assert!(parse_ttl("").is_err());
    }

    #[test]
    fn test_claims_inference() {
        let claims = RedemptionClaims::try_from(user_claims()).unwrap();
        assert_eq!(claims.kind(), ClaimKind::User);

        let print = RedemptionClaims::try_from(MintClaims {
            vid: "voucher-print-001".into(),
            batch: Some("BATCH2024Q1".into()),
            limit: Some(100),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(print.limit(), Some(100));

        let incomplete = RedemptionClaims::try_from(MintClaims {
            vid: "v1".into(),
            batch: Some("B1".into()),
            ..Default::default()
        });
        assert!(incomplete.is_err());
    }

    #[test]
    fn test_mint_and_verify_with_files() {
        let dir = tempdir().unwrap();
        let private_path = dir.path().join("private.pem");
        let public_path = dir.path().join("public.pem");
        let token_path = dir.path().join("token.jwt");

        let keypair = KeyPair::generate(Curve::P256);
        keypair.save_to_files(&private_path, &public_path).unwrap();

        mint(
            &jwt_args(),
            Some(private_path.to_string_lossy().to_string()),
            user_claims(),
            Some("5m".into()),
            Some(token_path.clone()),
        )
        .unwrap();

        assert!(token_path.exists());
        verify(
            &jwt_args(),
            Some(public_path.to_string_lossy().to_string()),
            token_path.to_string_lossy().to_string(),
        )
        .unwrap();
        inspect(token_path.to_string_lossy().to_string()).unwrap();
    }

    #[test]
    fn test_mint_with_inline_pem_and_config_file() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("vouchsign.yaml");
        let token_path = dir.path().join("token.jwt");
        fs::write(
            &config_path,
            "jwt:\n  issuer: vouchers.example.com\n  audience: pos-scanners\n  algorithm: ES256K\n  key_id: key-v1\n",
        )
        .unwrap();

        let keypair = KeyPair::generate(Curve::Secp256k1);
        let args = JwtArgs {
            config: Some(config_path),
            ..Default::default()
        };

        mint(
            &args,
            Some(export_private_key(keypair.private_key()).unwrap()),
            MintClaims {
                vid: "voucher-print-001".into(),
                batch: Some("BATCH2024Q1".into()),
                limit: Some(100),
                ..Default::default()
            },
            None,
            Some(token_path.clone()),
        )
        .unwrap();

        let token = fs::read_to_string(&token_path).unwrap();
        assert_eq!(vouchsign_token::key_id_hint(&token).as_deref(), Some("key-v1"));
        verify(
            &args,
            Some(export_public_key(keypair.public_key()).unwrap()),
            token,
        )
        .unwrap();
    }

    #[test]
    fn test_verify_with_wrong_key_fails() {
        let dir = tempdir().unwrap();
        let token_path = dir.path().join("token.jwt");

        let signer = KeyPair::generate(Curve::P256);
        let other = KeyPair::generate(Curve::P256);

        mint(
            &jwt_args(),
            Some(export_private_key(signer.private_key()).unwrap()),
            user_claims(),
            None,
            Some(token_path.clone()),
        )
        .unwrap();

        let err = verify(
            &jwt_args(),
            Some(export_public_key(other.public_key()).unwrap()),
            token_path.to_string_lossy().to_string(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("bad signature"));
    }

    #[test]
    fn test_mint_rejects_algorithm_mismatch() {
        let keypair = KeyPair::generate(Curve::P384);
        let args = JwtArgs {
            algorithm: Some("ES256".into()),
            ..jwt_args()
        };

        let err = mint(
            &args,
            Some(export_private_key(keypair.private_key()).unwrap()),
            user_claims(),
            None,
            None,
        )
        .unwrap_err();
        assert!(err.to_string().contains("cannot be used"));
    }
}
