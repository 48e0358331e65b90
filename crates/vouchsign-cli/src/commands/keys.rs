//! Key management commands.
//!
//! `vouchsign keys generate` - Generate a new signing key pair.
//! `vouchsign keys show` - Describe an existing private key.

use super::resolve_private_key;
use anyhow::Context;
use std::fs;
use std::path::{Path, PathBuf};
use vouchsign_core::{Curve, KeyConfig, VouchsignConfig};
use vouchsign_token::{KeyPair, export_private_key, export_public_key, generate_key_pair};

/// Pick the curve for `keys generate` when `--curve` is absent.
fn default_curve(config: Option<&Path>) -> anyhow::Result<Curve> {
    let Some(path) = config else {
        return Ok(Curve::P256);
    };
    let config = VouchsignConfig::from_file(path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;

    // An explicit key curve wins over the one implied by the algorithm
    Ok(config.keys.curve.unwrap_or_else(|| config.jwt.algorithm.curve()))
}

/// Generate a new key pair on `curve`, or on the configured curve.
pub fn generate(
    curve: Option<&str>,
    config: Option<&Path>,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let keypair = match curve {
        Some(name) => generate_key_pair(name)?,
        None => KeyPair::generate(default_curve(config)?),
    };
    let fingerprint = keypair.public_key().fingerprint()?;

    if let Some(output_dir) = output {
        fs::create_dir_all(&output_dir)
            .with_context(|| format!("Failed to create {}", output_dir.display()))?;

        let private_path = output_dir.join("private.pem");
        let public_path = output_dir.join("public.pem");
        keypair.save_to_files(&private_path, &public_path)?;

        tracing::info!(curve = %keypair.curve(), fingerprint = %fingerprint, "Generated key pair");

        println!("✔ Generated {} key pair:", keypair.curve());
        println!("  Private key: {}", private_path.display());
        println!("  Public key:  {}", public_path.display());
        println!("  Algorithm:   {}", keypair.curve().algorithm());
        println!("  Fingerprint: {}", fingerprint);
        println!();
        println!("⚠️  Keep your private key secure! Never commit it to version control.");
        println!();
        println!("Set as environment variables:");
        println!(
            "  export VOUCHSIGN_PRIVATE_KEY=\"$(cat {})\"",
            private_path.display()
        );
        println!(
            "  export VOUCHSIGN_PUBLIC_KEY=\"$(cat {})\"",
            public_path.display()
        );
    } else {
        println!("{}", export_private_key(keypair.private_key())?);
        println!("{}", export_public_key(keypair.public_key())?);
        println!("Fingerprint: {}", fingerprint);
        println!();
        println!("Use --output <dir> to save keys to files.");
    }

    Ok(())
}

/// Print what can be derived from a private key.
pub fn show(private_key: &str) -> anyhow::Result<()> {
    let private = resolve_private_key(Some(private_key.to_string()), &KeyConfig::default())?;
    let keypair = KeyPair::from_private_key(private);

    println!("Curve:       {}", keypair.curve());
    println!("Algorithm:   {}", keypair.curve().algorithm());
    println!("Fingerprint: {}", keypair.public_key().fingerprint()?);
    println!();
    print!("{}", export_public_key(keypair.public_key())?);

    Ok(())
}
