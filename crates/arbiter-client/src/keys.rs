//! # Public Key Sources
//!
//! The client never invents an encryption key: it obtains the public key of
//! the target arbitration instance from a [`PublicKeySource`].
//!
//! - [`HttpKeySource`]: `GET {base}/v1/keys/{chain_id}/{contract}` returning
//!   `{"scheme": "...", "key_id": "...", "public_key": "<hex>"}`. Transport
//!   failures are retried with backoff; HTTP status errors are not.
//! - [`StaticKeySource`]: a key supplied up front (CLI flag, tests).

use std::time::Duration;

use arbiter_core::Address;
use arbiter_crypto::SchemePublicKey;
use async_trait::async_trait;
use url::Url;

use crate::error::KeySourceError;
use crate::retry::Backoff;

/// Where encryption public keys come from.
#[async_trait]
pub trait PublicKeySource: Send + Sync {
    /// Fetch the public key for the contract instance on `chain_id`.
    async fn fetch(&self, chain_id: u64, contract: &Address)
        -> Result<SchemePublicKey, KeySourceError>;

    /// Name for diagnostics.
    fn source_name(&self) -> &str;
}

// ── Static ─────────────────────────────────────────────────────────────

/// Returns the same key for every request.
#[derive(Debug, Clone)]
pub struct StaticKeySource {
    key: SchemePublicKey,
}

impl StaticKeySource {
    /// Serve `key`.
    pub fn new(key: SchemePublicKey) -> Self {
        Self { key }
    }
}

#[async_trait]
impl PublicKeySource for StaticKeySource {
    async fn fetch(
        &self,
        _chain_id: u64,
        _contract: &Address,
    ) -> Result<SchemePublicKey, KeySourceError> {
        Ok(self.key.clone())
    }

    fn source_name(&self) -> &str {
        "static"
    }
}

// ── HTTP ───────────────────────────────────────────────────────────────

/// Fetches keys from the key service.
#[derive(Debug, Clone)]
pub struct HttpKeySource {
    client: reqwest::Client,
    base: Url,
    backoff: Backoff,
}

impl HttpKeySource {
    /// A source rooted at `base_url`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, KeySourceError> {
        let mut base =
            Url::parse(base_url).map_err(|e| KeySourceError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(KeySourceError::InvalidUrl(base_url.to_string()));
        }
        // Url::join replaces the last segment unless the path ends in '/'.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| KeySourceError::InvalidUrl(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base,
            backoff: Backoff::KEY_SERVICE,
        })
    }

    /// The key document URL for one contract instance.
    pub fn key_url(&self, chain_id: u64, contract: &Address) -> Result<Url, KeySourceError> {
        self.base
            .join(&format!("v1/keys/{chain_id}/{}", contract.to_lower_hex()))
            .map_err(|e| KeySourceError::InvalidUrl(e.to_string()))
    }
}

#[async_trait]
impl PublicKeySource for HttpKeySource {
    async fn fetch(
        &self,
        chain_id: u64,
        contract: &Address,
    ) -> Result<SchemePublicKey, KeySourceError> {
        let url = self.key_url(chain_id, contract)?;
        tracing::debug!(%url, "fetching encryption public key");

        let resp = self
            .backoff
            .send(&url, || self.client.get(url.clone()).send())
            .await
            .map_err(|source| KeySourceError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(KeySourceError::NotFound {
                chain_id,
                contract: contract.to_checksum(),
            });
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(KeySourceError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let key: SchemePublicKey = resp.json().await.map_err(|e| KeySourceError::Decode {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        tracing::info!(
            scheme = %key.scheme,
            key_id = key.key_id.as_deref().unwrap_or("-"),
            chain_id,
            "fetched encryption public key"
        );
        Ok(key)
    }

    fn source_name(&self) -> &str {
        "http"
    }
}
