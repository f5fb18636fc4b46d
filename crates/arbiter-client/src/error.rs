//! Error types for the submission client.
//!
//! Each collaborator has its own enum; [`SubmitError`] is what the flow
//! returns and wraps the others.

use arbiter_core::ValidationError;
use arbiter_crypto::{CryptoError, SchemeId};
use arbiter_state::StateError;

/// Errors loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    /// The config file is not valid YAML for [`ClientConfig`](crate::ClientConfig).
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
    /// The contract address is the zero address.
    #[error("contract address must not be the zero address")]
    ZeroContract,
    /// An endpoint is not an absolute http(s) URL.
    #[error("invalid URL for {field}: {reason}")]
    InvalidUrl { field: &'static str, reason: String },
    /// A field value is out of bounds or unparseable.
    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: String },
}

/// Errors fetching a public key.
#[derive(Debug, thiserror::Error)]
pub enum KeySourceError {
    /// Transport failure after all retries.
    #[error("key service request to {url} failed: {source}")]
    Transport { url: String, source: reqwest::Error },
    /// The key service answered with a non-success status.
    #[error("key service {url} returned {status}: {body}")]
    Status { url: String, status: u16, body: String },
    /// The response body is not a key document.
    #[error("invalid key document from {url}: {reason}")]
    Decode { url: String, reason: String },
    /// The key service URL is unusable.
    #[error("invalid key service URL: {0}")]
    InvalidUrl(String),
    /// No key is published for the requested instance.
    #[error("no public key for chain {chain_id} contract {contract}")]
    NotFound { chain_id: u64, contract: String },
}

/// Errors preparing confidential inputs.
#[derive(Debug, thiserror::Error)]
pub enum EncryptionError {
    /// The configured scheme is not compiled into this build.
    #[error("encryption scheme unavailable: {0}")]
    SchemeUnavailable(String),
    /// The public key could not be fetched.
    #[error("public key fetch failed: {0}")]
    KeyFetch(#[from] KeySourceError),
    /// The value does not fit its declared range.
    #[error("value {value} outside declared range of {bits} bits")]
    OutOfRange { value: u128, bits: u8 },
    /// The fetched key belongs to another scheme.
    #[error("key is for {key}, backend is {backend}")]
    SchemeMismatch { key: SchemeId, backend: SchemeId },
    /// The fetched key is malformed.
    #[error("invalid public key: {0}")]
    InvalidKey(String),
    /// The context settings in the client config are invalid.
    #[error("invalid encryption settings: {0}")]
    Config(#[from] ConfigError),
    /// Any other cryptographic failure.
    #[error(transparent)]
    Crypto(CryptoError),
}

impl From<CryptoError> for EncryptionError {
    fn from(err: CryptoError) -> Self {
        match err {
            CryptoError::SchemeUnavailable(s) => Self::SchemeUnavailable(s),
            CryptoError::OutOfRange { value, bits } => Self::OutOfRange {
                value: u128::from(value),
                bits,
            },
            CryptoError::SchemeMismatch { key, backend } => Self::SchemeMismatch { key, backend },
            CryptoError::InvalidKey(s) => Self::InvalidKey(s),
            other => Self::Crypto(other),
        }
    }
}

/// Errors from the wallet bridge.
#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    /// No account is connected.
    #[error("no wallet account connected")]
    NotConnected,
    /// The provider could not be reached.
    #[error("wallet provider unreachable: {0}")]
    Transport(String),
    /// The provider returned a JSON-RPC error.
    #[error("wallet RPC error {code}: {message}")]
    Rpc { code: i64, message: String },
    /// The provider returned something unexpected.
    #[error("invalid wallet response: {0}")]
    InvalidResponse(String),
    /// No receipt arrived in time.
    #[error("no receipt for {tx_hash} after {waited_secs}s")]
    ReceiptTimeout { tx_hash: String, waited_secs: u64 },
}

impl WalletError {
    /// EIP-1193 "user rejected request".
    pub const USER_REJECTED: i64 = 4001;

    /// Whether the user declined the request in their wallet.
    pub fn is_user_rejection(&self) -> bool {
        matches!(self, Self::Rpc { code, .. } if *code == Self::USER_REJECTED)
    }
}

/// Errors from the dispute submission flow.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    /// No wallet account is connected; nothing was attempted.
    #[error("wallet not connected")]
    WalletNotConnected,
    /// The form did not validate.
    #[error("invalid dispute: {0}")]
    Validation(#[from] ValidationError),
    /// Confidential inputs could not be prepared; nothing was sent.
    #[error("encryption failed: {0}")]
    Encryption(#[from] EncryptionError),
    /// The transaction could not be sent or confirmed.
    #[error("submission failed: {0}")]
    Wallet(#[from] WalletError),
    /// The transaction was mined but reverted.
    #[error("transaction {tx_hash} reverted")]
    Reverted { tx_hash: String },
    /// The submitter is already handling a submission.
    #[error(transparent)]
    State(#[from] StateError),
    /// The deadline could not be computed.
    #[error("invalid deadline: {0}")]
    Deadline(String),
}
