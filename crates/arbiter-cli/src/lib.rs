//! # arbiter-cli — Operator CLI for Secret Arbiter
//!
//! Provides the `arbiter` command-line interface.
//!
//! ## Subcommands
//!
//! - `arbiter keygen` — ElGamal key pair for a contract instance.
//! - `arbiter encrypt` / `verify` / `decrypt` — confidential values bound to
//!   a contract call.
//! - `arbiter hash` — SHA-256 digest of sensitive text.
//! - `arbiter calldata` — offline `createDispute` transaction assembly.
//! - `arbiter submit` — the full submission flow through a JSON-RPC wallet.
//! - `arbiter cases` — the sample case listing.
//!
//! ```bash
//! arbiter keygen --secret-out arbiter.sk --public-out key.json
//! arbiter encrypt --key key.json --value 2500 --contract 0x… --caller 0x… > amount.json
//! arbiter verify --key key.json --payload amount.json --contract 0x… --caller 0x…
//! arbiter --config arbiter.yaml submit --respondent 0x… --amount 2.5 --description "…"
//! ```

pub mod cases;
pub mod confidential;
pub mod dispute;
pub mod keys;

use std::path::Path;

use anyhow::{Context, Result};
use arbiter_client::ClientConfig;
use arbiter_contract::create_dispute_selector;
use arbiter_core::Address;
use arbiter_crypto::{EncryptedValue, ProofContext, SchemePublicKey};
use clap::Args;

/// The call a confidential value is bound to.
#[derive(Args, Debug, Clone)]
pub struct BindingArgs {
    /// EIP-155 chain id.
    #[arg(long, default_value_t = arbiter_client::SEPOLIA_CHAIN_ID)]
    pub chain_id: u64,

    /// Target contract address.
    #[arg(long)]
    pub contract: Address,

    /// Account that submits the call.
    #[arg(long)]
    pub caller: Address,

    /// 4-byte function selector as hex. Defaults to `createDispute`.
    #[arg(long, value_parser = parse_selector)]
    pub selector: Option<[u8; 4]>,

    /// Argument the value fills.
    #[arg(long, default_value = "amount")]
    pub label: String,
}

impl BindingArgs {
    /// The proof binding described by these flags.
    pub fn proof_context(&self) -> ProofContext {
        ProofContext {
            chain_id: self.chain_id,
            contract: self.contract,
            caller: self.caller,
            selector: self.selector.unwrap_or_else(create_dispute_selector),
            label: self.label.clone(),
        }
    }
}

/// Parse a 4-byte selector, with or without `0x`.
pub fn parse_selector(s: &str) -> std::result::Result<[u8; 4], String> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    let bytes = hex::decode(digits).map_err(|e| format!("invalid selector hex: {e}"))?;
    <[u8; 4]>::try_from(bytes.as_slice())
        .map_err(|_| format!("selector must be 4 bytes, got {}", bytes.len()))
}

/// Load the client configuration; `--config` is required.
pub fn load_config(path: Option<&Path>) -> Result<ClientConfig> {
    let path = path.context("--config is required for this command")?;
    ClientConfig::load(path).with_context(|| format!("failed to load config {}", path.display()))
}

/// Read a public key document (JSON).
pub fn read_key_document(path: &Path) -> Result<SchemePublicKey> {
    read_json(path).context("invalid public key document")
}

/// Read an encrypted value (JSON).
pub fn read_payload(path: &Path) -> Result<EncryptedValue> {
    read_json(path).context("invalid encrypted payload")
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
}

/// A single-threaded runtime for one async command.
pub fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_parsing() {
        assert_eq!(parse_selector("0x9aba2276").unwrap(), [0x9a, 0xba, 0x22, 0x76]);
        assert_eq!(parse_selector("deadbeef").unwrap(), [0xde, 0xad, 0xbe, 0xef]);
        assert!(parse_selector("0x9aba22").is_err());
        assert!(parse_selector("0xzz").is_err());
    }

    #[test]
    fn binding_defaults_to_create_dispute() {
        let binding = BindingArgs {
            chain_id: 1,
            contract: Address::from_bytes([1; 20]),
            caller: Address::from_bytes([2; 20]),
            selector: None,
            label: "amount".into(),
        };
        assert_eq!(binding.proof_context().selector, create_dispute_selector());
    }

    #[test]
    fn config_flag_required() {
        let err = load_config(None).unwrap_err();
        assert!(err.to_string().contains("--config"));
    }

    #[test]
    fn key_document_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("key.json");
        std::fs::write(
            &path,
            r#"{"scheme":"simulated-xor","key_id":null,"public_key":""}"#,
        )
        .unwrap();
        assert_eq!(read_key_document(&path).unwrap(), SchemePublicKey::simulated());

        std::fs::write(&path, "{}").unwrap();
        assert!(read_key_document(&path).is_err());
        assert!(read_key_document(&dir.path().join("missing.json")).is_err());
    }
}
