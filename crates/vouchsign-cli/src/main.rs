use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "vouchsign", version, about = "Voucher redemption token CLI")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate and inspect signing keys.
    Keys {
        #[command(subcommand)]
        cmd: KeysCommand,
    },

    /// Mint, verify and inspect redemption tokens.
    Token {
        #[command(subcommand)]
        cmd: TokenCommand,
    },
}

#[derive(Subcommand, Debug)]
enum KeysCommand {
    /// Generate a new key pair.
    Generate {
        /// Curve: P-256, P-384, P-521 or secp256k1. Defaults to the config
        /// file's key curve, then its algorithm's curve, then P-256.
        #[arg(long)]
        curve: Option<String>,

        /// Path to vouchsign.yaml.
        #[arg(long, short, env = "VOUCHSIGN_CONFIG")]
        config: Option<PathBuf>,

        /// Directory to write private.pem and public.pem into.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Show the curve, fingerprint and public key of a private key.
    Show {
        /// Private key: path to a PEM file or the PEM text itself.
        #[arg(env = "VOUCHSIGN_PRIVATE_KEY")]
        private_key: String,
    },
}

/// Issuer/audience/algorithm settings, from a config file and/or flags.
#[derive(Args, Debug, Clone, Default)]
pub struct JwtArgs {
    /// Path to vouchsign.yaml.
    #[arg(long, short, env = "VOUCHSIGN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Token issuer (`iss`).
    #[arg(long, env = "VOUCHSIGN_ISSUER")]
    pub issuer: Option<String>,

    /// Token audience (`aud`).
    #[arg(long, env = "VOUCHSIGN_AUDIENCE")]
    pub audience: Option<String>,

    /// ES256, ES384, ES512 or ES256K. Defaults to the key's algorithm.
    #[arg(long, env = "VOUCHSIGN_ALGORITHM")]
    pub algorithm: Option<String>,

    /// Key identifier written to the token header.
    #[arg(long, env = "VOUCHSIGN_KEY_ID")]
    pub kid: Option<String>,
}

#[derive(Subcommand, Debug)]
enum TokenCommand {
    /// Mint a user or print-batch redemption token.
    Mint {
        #[command(flatten)]
        jwt: JwtArgs,

        /// Private key: path to a PEM file or the PEM text itself.
        #[arg(long, env = "VOUCHSIGN_PRIVATE_KEY")]
        private_key: Option<String>,

        /// Voucher ID.
        #[arg(long)]
        vid: String,

        /// Claim type; inferred from --uid when omitted.
        #[arg(long, value_parser = ["user", "print"])]
        typ: Option<String>,

        /// User ID (user tokens).
        #[arg(long, conflicts_with_all = ["batch", "limit"])]
        uid: Option<String>,

        /// Print batch code (print tokens).
        #[arg(long)]
        batch: Option<String>,

        /// Redemption limit for the batch (print tokens).
        #[arg(long)]
        limit: Option<u32>,

        /// Lifetime, e.g. 300, 90s, 5m, 24h, 30d.
        #[arg(long)]
        ttl: Option<String>,

        /// Write the token to this file instead of stdout.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Verify a token and print its payload.
    Verify {
        #[command(flatten)]
        jwt: JwtArgs,

        /// Public key: path to a PEM file or the PEM text itself.
        #[arg(long, env = "VOUCHSIGN_PUBLIC_KEY")]
        public_key: Option<String>,

        /// Token string or path to a file containing it.
        token: String,
    },

    /// Decode a token without verifying it.
    Inspect {
        /// Token string or path to a file containing it.
        token: String,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.cmd {
        Command::Keys { cmd } => match cmd {
            KeysCommand::Generate {
                curve,
                config,
                output,
            } => commands::keys::generate(curve.as_deref(), config.as_deref(), output)?,
            KeysCommand::Show { private_key } => commands::keys::show(&private_key)?,
        },

        Command::Token { cmd } => match cmd {
            TokenCommand::Mint {
                jwt,
                private_key,
                vid,
                typ,
                uid,
                batch,
                limit,
                ttl,
                output,
            } => commands::token::mint(
                &jwt,
                private_key,
                commands::token::MintClaims {
                    vid,
                    typ,
                    uid,
                    batch,
                    limit,
                },
                ttl,
                output,
            )?,
            TokenCommand::Verify {
                jwt,
                public_key,
                token,
            } => commands::token::verify(&jwt, public_key, token)?,
            TokenCommand::Inspect { token } => commands::token::inspect(token)?,
        },
    }

    Ok(())
}
