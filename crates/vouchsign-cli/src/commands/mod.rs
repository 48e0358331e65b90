//! CLI command implementations for vouchsign.

pub mod keys;
pub mod token;

use crate::JwtArgs;
use anyhow::Context;
use std::fs;
use std::path::Path;
use vouchsign_core::{Algorithm, Curve, JwtConfig, KeyConfig, TtlConfig, VouchsignConfig};
use vouchsign_token::{
    KeyPair, PrivateKey, PublicKey, import_private_key, import_public_key, load_public_key_file,
};

/// Settings after merging the config file with command-line flags.
pub(crate) struct Settings {
    pub jwt: JwtConfig,
    pub ttl: TtlConfig,
}

/// Read `value` from a file if it names one, otherwise use it verbatim.
pub(crate) fn read_path_or_value(value: &str) -> anyhow::Result<String> {
    let path = Path::new(value);
    if path.exists() {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        return Ok(content.trim().to_string());
    }
    Ok(value.trim().to_string())
}

/// Resolve a private key from a path, PEM text, or the config file's key sources.
pub(crate) fn resolve_private_key(
    key: Option<String>,
    keys: &KeyConfig,
) -> anyhow::Result<PrivateKey> {
    let pem = match key {
        // Key file on disk
        Some(key) if Path::new(&key).exists() => {
            let keypair = KeyPair::load_from_file(Path::new(&key))
                .with_context(|| format!("Failed to load private key from {}", key))?;
            return Ok(keypair.private_key().clone());
        }
        Some(key) => key,
        None => keys.resolve_private_key()?.context(
            "Private key not provided. Pass --private-key <path> or set VOUCHSIGN_PRIVATE_KEY",
        )?,
    };

    import_private_key(&pem).context("Failed to parse private key. Expected a PKCS#8 PEM document")
}

/// Resolve a public key from a path, PEM text, or the config file's key sources.
pub(crate) fn resolve_public_key(
    key: Option<String>,
    keys: &KeyConfig,
) -> anyhow::Result<PublicKey> {
    let pem = match key {
        Some(key) if Path::new(&key).exists() => {
            return load_public_key_file(Path::new(&key))
                .with_context(|| format!("Failed to load public key from {}", key));
        }
        Some(key) => key,
        None => keys.resolve_public_key()?.context(
            "Public key not provided. Pass --public-key <path> or set VOUCHSIGN_PUBLIC_KEY",
        )?,
    };

    import_public_key(&pem)
        .context("Failed to parse public key. Expected a SubjectPublicKeyInfo PEM document")
}

/// Load `--config` if one was given.
pub(crate) fn load_config_file(args: &JwtArgs) -> anyhow::Result<Option<VouchsignConfig>> {
    args.config
        .as_ref()
        .map(|path| {
            VouchsignConfig::from_file(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))
        })
        .transpose()
}

/// Merge the config file with the individual flags; flags win.
///
/// `key_curve` supplies the algorithm when neither source names one.
pub(crate) fn resolve_settings(
    args: &JwtArgs,
    file: Option<VouchsignConfig>,
    key_curve: Option<Curve>,
) -> anyhow::Result<Settings> {
    let (file_jwt, ttl) = match file {
        Some(config) => (Some(config.jwt), config.ttl),
        None => (None, TtlConfig::default()),
    };

    let issuer = args
        .issuer
        .clone()
        .or_else(|| file_jwt.as_ref().map(|jwt| jwt.issuer.clone()))
        .context("Issuer not provided. Pass --issuer or --config")?;
    let audience = args
        .audience
        .clone()
        .or_else(|| file_jwt.as_ref().map(|jwt| jwt.audience.clone()))
        .context("Audience not provided. Pass --audience or --config")?;

    let algorithm = match &args.algorithm {
        Some(name) => name.parse::<Algorithm>()?,
        None => file_jwt
            .as_ref()
            .map(|jwt| jwt.algorithm)
            .or_else(|| key_curve.map(|curve| curve.algorithm()))
            .context("Algorithm not provided. Pass --algorithm or --config")?,
    };

    let key_id = args
        .kid
        .clone()
        .or_else(|| file_jwt.and_then(|jwt| jwt.key_id));

    let jwt = JwtConfig {
        issuer,
        audience,
        algorithm,
        key_id,
    };
    jwt.validate()?;

    Ok(Settings { jwt, ttl })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_flags_only() {
        let args = JwtArgs {
            issuer: Some("iss".into()),
            audience: Some("aud".into()),
            ..Default::default()
        };
        let settings = resolve_settings(&args, None, Some(Curve::P384)).unwrap();
        assert_eq!(settings.jwt.algorithm, Algorithm::ES384);
        assert_eq!(settings.ttl.user_seconds, 300);
    }

    #[test]
    fn test_missing_algorithm() {
        let args = JwtArgs {
            issuer: Some("iss".into()),
            audience: Some("aud".into()),
            ..Default::default()
        };
        assert!(resolve_settings(&args, None, None).is_err());
    }

    #[test]
    fn test_flags_override_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            "jwt:\n  issuer: from-file\n  audience: scanners\n  algorithm: ES256\n  key_id: key-v1\nttl:\n  user_seconds: 60\n"
        )
        .unwrap();

        let args = JwtArgs {
            config: Some(file.path().to_path_buf()),
            issuer: Some("from-flag".into()),
            ..Default::default()
        };
        let file = load_config_file(&args).unwrap();
        let settings = resolve_settings(&args, file, None).unwrap();
        assert_eq!(settings.jwt.issuer, "from-flag");
        assert_eq!(settings.jwt.audience, "scanners");
        assert_eq!(settings.jwt.key_id.as_deref(), Some("key-v1"));
        assert_eq!(settings.ttl.user_seconds, 60);
    }

    #[test]
    fn test_resolve_keys_from_files_and_pem() {
        let dir = tempfile::tempdir().unwrap();
        let private_path = dir.path().join("private.pem");
        let public_path = dir.path().join("public.pem");
        let keypair = KeyPair::generate(Curve::P521);
        keypair.save_to_files(&private_path, &public_path).unwrap();

        let keys = KeyConfig::default();
        let private =
            resolve_private_key(Some(private_path.to_string_lossy().to_string()), &keys).unwrap();
        let public =
            resolve_public_key(Some(public_path.to_string_lossy().to_string()), &keys).unwrap();
        assert_eq!(private.public_key(), public);

        let pem = vouchsign_token::export_public_key(keypair.public_key()).unwrap();
        assert_eq!(resolve_public_key(Some(pem), &keys).unwrap(), public);

        assert!(resolve_private_key(None, &keys).is_err());
        assert!(resolve_public_key(Some("not a key".into()), &keys).is_err());
    }

    #[test]
    fn test_read_path_or_value() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "  contents  ").unwrap();

        let path = file.path().to_string_lossy().to_string();
        assert_eq!(read_path_or_value(&path).unwrap(), "contents");
        assert_eq!(read_path_or_value("inline").unwrap(), "inline");
    }
}
