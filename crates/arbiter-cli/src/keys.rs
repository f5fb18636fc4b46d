//! # Key Generation Subcommand
//!
//! Creates the ElGamal key pair of one arbitration instance. The secret key
//! is written as hex to a file created with owner-only permissions; the
//! public key document is printed and optionally written next to it, in the
//! format the key service serves.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use arbiter_crypto::{SchemePublicKey, SecretKey};
use clap::Args;
use rand_core::OsRng;
use zeroize::Zeroizing;

/// Arguments for `arbiter keygen`.
#[derive(Args, Debug)]
pub struct KeygenArgs {
    /// File to write the secret key to (hex).
    #[arg(long)]
    pub secret_out: PathBuf,

    /// File to write the public key document to (JSON).
    #[arg(long)]
    pub public_out: Option<PathBuf>,

    /// Identifier recorded in the key document.
    #[arg(long)]
    pub key_id: Option<String>,

    /// Overwrite existing files.
    #[arg(long)]
    pub force: bool,
}

/// Execute `arbiter keygen`.
pub fn run_keygen(args: &KeygenArgs) -> Result<u8> {
    let secret = SecretKey::generate(&mut OsRng);
    let document = SchemePublicKey::elgamal(&secret.public_key(), args.key_id.clone());

    let secret_hex = Zeroizing::new(hex::encode(secret.to_bytes()));
    write_new(&args.secret_out, secret_hex.as_bytes(), args.force, true)?;

    let json = serde_json::to_string_pretty(&document)?;
    if let Some(path) = &args.public_out {
        write_new(path, json.as_bytes(), args.force, false)?;
    }
    tracing::info!(
        secret = %args.secret_out.display(),
        key_id = args.key_id.as_deref().unwrap_or("-"),
        "generated ElGamal key pair"
    );
    println!("{json}");
    Ok(0)
}

/// Read a hex secret key file.
pub fn read_secret_key(path: &Path) -> Result<SecretKey> {
    let text = Zeroizing::new(
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read secret key {}", path.display()))?,
    );
    let bytes = Zeroizing::new(hex::decode(text.trim()).context("secret key file is not hex")?);
    SecretKey::from_bytes(&bytes).context("invalid secret key")
}

fn write_new(path: &Path, contents: &[u8], force: bool, private: bool) -> Result<()> {
    let mut options = std::fs::OpenOptions::new();
    options.write(true);
    if force {
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    }
    #[cfg(unix)]
    if private {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    #[cfg(not(unix))]
    let _ = private;

    let mut file = options
        .open(path)
        .with_context(|| format!("failed to create {} (use --force to overwrite)", path.display()))?;
    file.write_all(contents)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
