//! # Client Configuration
//!
//! Loaded from a YAML file, then overridden field by field from `ARBITER_*`
//! environment variables, then validated. Validation refuses the zero
//! contract address and any endpoint that is not an absolute http(s) URL.
//!
//! ## Environment Overrides
//!
//! | Variable | Field |
//! |---|---|
//! | `ARBITER_CHAIN_ID` | `chain_id` |
//! | `ARBITER_CONTRACT_ADDRESS` | `contract_address` |
//! | `ARBITER_RPC_URL` | `rpc_url` |
//! | `ARBITER_KEY_SERVICE_URL` | `key_service_url` |
//! | `ARBITER_SCHEME` | `scheme` |
//! | `ARBITER_WALLETCONNECT_PROJECT_ID` | `walletconnect_project_id` |
//! | `ARBITER_PUBLISH_PLAINTEXT_DESCRIPTION` | `publish_plaintext_description` |
//!
//! The wallet-connect project id has no built-in fallback: when neither the
//! file nor the environment sets it, it stays unset.

use std::path::Path;
use std::time::Duration;

use arbiter_core::{Address, DEFAULT_DISPUTE_WINDOW_SECS};
use arbiter_crypto::{RangeBits, SchemeId};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ConfigError;

/// Ethereum mainnet.
pub const MAINNET_CHAIN_ID: u64 = 1;

/// Sepolia testnet.
pub const SEPOLIA_CHAIN_ID: u64 = 11_155_111;

fn default_scheme() -> SchemeId {
    SchemeId::Ristretto255ElGamal
}

fn default_amount_bits() -> u8 {
    32
}

fn default_dispute_window() -> u64 {
    DEFAULT_DISPUTE_WINDOW_SECS
}

fn default_poll_interval_ms() -> u64 {
    1_000
}

fn default_receipt_timeout_secs() -> u64 {
    120
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// Everything the client needs to reach a dispute contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// EIP-155 chain id.
    pub chain_id: u64,
    /// Display name for chains other than mainnet and Sepolia.
    #[serde(default)]
    pub chain_name: Option<String>,
    /// Dispute contract address.
    pub contract_address: Address,
    /// Wallet provider JSON-RPC endpoint.
    pub rpc_url: String,
    /// Key service base URL. Required unless keys are supplied directly.
    #[serde(default)]
    pub key_service_url: Option<String>,
    /// Encryption scheme for confidential fields.
    #[serde(default = "default_scheme")]
    pub scheme: SchemeId,
    /// Declared range of the encrypted milli-ether amount.
    #[serde(default = "default_amount_bits")]
    pub amount_bits: u8,
    /// Seconds from submission to the dispute deadline.
    #[serde(default = "default_dispute_window")]
    pub dispute_window_secs: u64,
    /// Publish the description text instead of its SHA-256 digest.
    #[serde(default)]
    pub publish_plaintext_description: bool,
    /// Wallet-connect project id, if the deployment has one.
    #[serde(default)]
    pub walletconnect_project_id: Option<String>,
    /// Receipt polling interval.
    #[serde(default = "default_poll_interval_ms")]
    pub receipt_poll_interval_ms: u64,
    /// How long to wait for a receipt.
    #[serde(default = "default_receipt_timeout_secs")]
    pub receipt_timeout_secs: u64,
    /// Per-request HTTP timeout.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl ClientConfig {
    /// A config with defaults for everything but the required fields.
    pub fn new(chain_id: u64, contract_address: Address, rpc_url: impl Into<String>) -> Self {
        Self {
            chain_id,
            chain_name: None,
            contract_address,
            rpc_url: rpc_url.into(),
            key_service_url: None,
            scheme: default_scheme(),
            amount_bits: default_amount_bits(),
            dispute_window_secs: default_dispute_window(),
            publish_plaintext_description: false,
            walletconnect_project_id: None,
            receipt_poll_interval_ms: default_poll_interval_ms(),
            receipt_timeout_secs: default_receipt_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }

    /// Read a YAML file, apply environment overrides, and validate.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let mut config = Self::from_yaml(&text)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse YAML without overrides or validation.
    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Apply `ARBITER_*` overrides from `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("ARBITER_CHAIN_ID") {
            self.chain_id = v.trim().parse().map_err(|_| ConfigError::InvalidValue {
                field: "chain_id",
                value: v.clone(),
            })?;
        }
        if let Some(v) = lookup("ARBITER_CONTRACT_ADDRESS") {
            self.contract_address = Address::parse(v.trim()).map_err(|e| {
                ConfigError::InvalidValue {
                    field: "contract_address",
                    value: e.to_string(),
                }
            })?;
        }
        if let Some(v) = lookup("ARBITER_RPC_URL") {
            self.rpc_url = v;
        }
        if let Some(v) = lookup("ARBITER_KEY_SERVICE_URL") {
            self.key_service_url = Some(v);
        }
        if let Some(v) = lookup("ARBITER_SCHEME") {
            self.scheme = SchemeId::parse(v.trim()).ok_or_else(|| ConfigError::InvalidValue {
                field: "scheme",
                value: v.clone(),
            })?;
        }
        if let Some(v) = lookup("ARBITER_WALLETCONNECT_PROJECT_ID") {
            self.walletconnect_project_id = Some(v).filter(|s| !s.trim().is_empty());
        }
        if let Some(v) = lookup("ARBITER_PUBLISH_PLAINTEXT_DESCRIPTION") {
            self.publish_plaintext_description = match v.trim() {
                "1" | "true" => true,
                "0" | "false" => false,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        field: "publish_plaintext_description",
                        value: v.clone(),
                    })
                }
            };
        }
        Ok(())
    }

    /// Check invariants the rest of the client relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.contract_address.is_zero() {
            return Err(ConfigError::ZeroContract);
        }
        if self.chain_id == 0 {
            return Err(ConfigError::InvalidValue {
                field: "chain_id",
                value: "0".into(),
            });
        }
        validate_url("rpc_url", &self.rpc_url)?;
        if let Some(url) = &self.key_service_url {
            validate_url("key_service_url", url)?;
        }
        self.amount_range()?;
        if self.receipt_poll_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "receipt_poll_interval_ms",
                value: "0".into(),
            });
        }
        if self.walletconnect_project_id.is_none() {
            tracing::warn!("walletconnect_project_id is not set; wallet-connect pairing is unavailable");
        }
        Ok(())
    }

    /// The declared amount range.
    pub fn amount_range(&self) -> Result<RangeBits, ConfigError> {
        RangeBits::new(u32::from(self.amount_bits)).map_err(|_| ConfigError::InvalidValue {
            field: "amount_bits",
            value: self.amount_bits.to_string(),
        })
    }

    /// Human-readable chain name.
    pub fn chain_display_name(&self) -> String {
        match (self.chain_id, &self.chain_name) {
            (_, Some(name)) => name.clone(),
            (MAINNET_CHAIN_ID, None) => "Ethereum".into(),
            (SEPOLIA_CHAIN_ID, None) => "Sepolia".into(),
            (id, None) => format!("chain {id}"),
        }
    }

    /// Receipt polling interval.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.receipt_poll_interval_ms)
    }

    /// Receipt wait limit.
    pub fn receipt_timeout(&self) -> Duration {
        Duration::from_secs(self.receipt_timeout_secs)
    }

    /// Per-request HTTP timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn validate_url(field: &'static str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidUrl {
        field,
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::InvalidUrl {
            field,
            reason: format!("unsupported scheme {other}"),
        }),
    }
}
