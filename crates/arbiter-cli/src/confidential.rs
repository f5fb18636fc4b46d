//! # Confidential Value Subcommands
//!
//! `encrypt`, `verify`, `decrypt`, and `hash`. Payloads travel as the same
//! JSON documents the client produces, so anything `encrypt` writes can be
//! checked by `verify` with nothing but the public key and the binding.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use arbiter_crypto::{
    hash_sensitive_data, scheme_for, Ciphertext, EncryptedValue, RangeBits, SchemeId,
    VerifyError, MAX_DECRYPT_BITS,
};
use clap::Args;

use crate::keys::read_secret_key;
use crate::{read_key_document, read_payload, BindingArgs};

// ── encrypt ──────────────────────────────────────────────────────────

/// Arguments for `arbiter encrypt`.
#[derive(Args, Debug)]
pub struct EncryptArgs {
    /// Public key document (JSON).
    #[arg(long)]
    pub key: PathBuf,

    /// Plaintext value.
    #[arg(long)]
    pub value: u64,

    /// Declared range in bits.
    #[arg(long, default_value_t = 32)]
    pub bits: u32,

    #[command(flatten)]
    pub binding: BindingArgs,
}

/// Encrypt and prove one value.
pub fn encrypt_value(args: &EncryptArgs) -> Result<EncryptedValue> {
    let key = read_key_document(&args.key)?;
    let bits = RangeBits::new(args.bits)?;
    let scheme = scheme_for(key.scheme)?;
    if !scheme.is_confidential() {
        tracing::warn!(scheme = %key.scheme, "this scheme does not hide the plaintext");
    }
    Ok(scheme.encrypt(&key, args.value, bits, &args.binding.proof_context())?)
}

/// Execute `arbiter encrypt`.
pub fn run_encrypt(args: &EncryptArgs) -> Result<u8> {
    let payload = encrypt_value(args)?;
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(0)
}

// ── verify ───────────────────────────────────────────────────────────

/// Arguments for `arbiter verify`.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Public key document (JSON).
    #[arg(long)]
    pub key: PathBuf,

    /// Encrypted payload (JSON).
    #[arg(long)]
    pub payload: PathBuf,

    /// Expected range in bits. Defaults to the range the payload declares.
    #[arg(long)]
    pub bits: Option<u32>,

    #[command(flatten)]
    pub binding: BindingArgs,
}

/// Check a payload against its key and binding.
pub fn verify_payload(args: &VerifyArgs) -> Result<std::result::Result<(), VerifyError>> {
    let key = read_key_document(&args.key)?;
    let payload = read_payload(&args.payload)?;
    let bits = match args.bits {
        Some(b) => RangeBits::new(b)?,
        None => payload.bits,
    };
    let scheme = scheme_for(payload.scheme)?;
    Ok(scheme.verify(&key, &payload, bits, &args.binding.proof_context()))
}

/// Execute `arbiter verify`. Exits 1 when the proof does not check.
pub fn run_verify(args: &VerifyArgs) -> Result<u8> {
    match verify_payload(args)? {
        Ok(()) => {
            println!("valid");
            Ok(0)
        }
        Err(e) => {
            println!("invalid: {e}");
            Ok(1)
        }
    }
}

// ── decrypt ──────────────────────────────────────────────────────────

/// Arguments for `arbiter decrypt`.
#[derive(Args, Debug)]
pub struct DecryptArgs {
    /// Secret key file (hex).
    #[arg(long)]
    pub secret_key: PathBuf,

    /// Encrypted payloads (JSON). Several are summed before decryption.
    #[arg(long, required = true, num_args = 1..)]
    pub payload: Vec<PathBuf>,

    /// Search range in bits. Defaults to what the payloads can sum to.
    #[arg(long)]
    pub bits: Option<u8>,
}

/// Decrypt one payload, or the homomorphic sum of several.
pub fn decrypt_payloads(args: &DecryptArgs) -> Result<u64> {
    let secret = read_secret_key(&args.secret_key)?;

    let mut ciphertexts = Vec::with_capacity(args.payload.len());
    let mut widest = 0u8;
    for path in &args.payload {
        let payload = read_payload(path)?;
        if payload.scheme != SchemeId::Ristretto255ElGamal {
            bail!("{} is a {} payload; only ElGamal payloads decrypt", path.display(), payload.scheme);
        }
        widest = widest.max(payload.bits.get());
        ciphertexts.push(
            Ciphertext::from_bytes(&payload.ciphertext)
                .with_context(|| format!("malformed ciphertext in {}", path.display()))?,
        );
    }

    let bits = args
        .bits
        .unwrap_or_else(|| summed_width(widest, ciphertexts.len()));
    let total: Ciphertext = ciphertexts.into_iter().sum();
    Ok(secret.decrypt(&total, bits)?)
}

/// Bits needed for the sum of `count` values of `bits` each, capped at the
/// decryption limit.
fn summed_width(bits: u8, count: usize) -> u8 {
    let carry = usize::BITS - count.saturating_sub(1).leading_zeros();
    let carry = u8::try_from(carry).unwrap_or(MAX_DECRYPT_BITS);
    bits.saturating_add(carry).clamp(1, MAX_DECRYPT_BITS)
}

/// Execute `arbiter decrypt`.
pub fn run_decrypt(args: &DecryptArgs) -> Result<u8> {
    println!("{}", decrypt_payloads(args)?);
    Ok(0)
}

// ── hash ─────────────────────────────────────────────────────────────

/// Arguments for `arbiter hash`.
#[derive(Args, Debug)]
pub struct HashArgs {
    /// Text to digest. Reads stdin when neither this nor `--file` is given.
    #[arg(conflicts_with = "file")]
    pub text: Option<String>,

    /// Digest the contents of a file.
    #[arg(long)]
    pub file: Option<PathBuf>,
}

/// Execute `arbiter hash`.
pub fn run_hash(args: &HashArgs) -> Result<u8> {
    let text = match (&args.text, &args.file) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        (None, None) => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            buf
        }
    };
    println!("{}", hash_sensitive_data(&text));
    Ok(0)
}
