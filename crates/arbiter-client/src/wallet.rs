//! # Wallet Bridge
//!
//! The submitter never holds a signing key. It asks a [`WalletBridge`] for
//! the connected account, hands it an unsigned [`TransactionRequest`], and
//! waits for the receipt.
//!
//! [`JsonRpcWallet`] speaks to an EIP-1193 provider over JSON-RPC:
//! `eth_accounts`, `eth_sendTransaction` (the provider signs), and
//! `eth_getTransactionReceipt` polling. None of these calls are retried: a
//! resent `eth_sendTransaction` could broadcast the dispute twice.

use std::time::Duration;

use arbiter_contract::TransactionRequest;
use arbiter_core::Address;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::ClientConfig;
use crate::error::WalletError;

// ── Types ──────────────────────────────────────────────────────────────

/// A transaction hash: `0x` followed by 64 hex digits, stored lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TxHash(String);

impl TxHash {
    /// Parse and normalize a transaction hash.
    pub fn parse(s: &str) -> Result<Self, WalletError> {
        let digits = s
            .strip_prefix("0x")
            .ok_or_else(|| WalletError::InvalidResponse(format!("tx hash without 0x: {s}")))?;
        if digits.len() != 64 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(WalletError::InvalidResponse(format!("malformed tx hash: {s}")));
        }
        Ok(Self(format!("0x{}", digits.to_ascii_lowercase())))
    }

    /// The hash as `0x`-prefixed lowercase hex.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TxHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for TxHash {
    type Error = WalletError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<TxHash> for String {
    fn from(h: TxHash) -> Self {
        h.0
    }
}

/// The outcome of a mined transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    /// Hash of the mined transaction.
    pub transaction_hash: TxHash,
    /// Block the transaction was included in.
    pub block_number: Option<u64>,
    /// `false` when the transaction reverted.
    pub success: bool,
}

// ── Trait ──────────────────────────────────────────────────────────────

/// An external signer that can submit transactions.
#[async_trait]
pub trait WalletBridge: Send + Sync {
    /// The connected account, or `None` if the user has not connected.
    async fn connected_account(&self) -> Result<Option<Address>, WalletError>;

    /// Sign and broadcast `tx`; returns its hash.
    async fn send_transaction(&self, tx: &TransactionRequest) -> Result<TxHash, WalletError>;

    /// Block until `tx_hash` is mined or the bridge gives up.
    async fn wait_for_receipt(&self, tx_hash: &TxHash) -> Result<TxReceipt, WalletError>;
}

// ── JSON-RPC ───────────────────────────────────────────────────────────

/// A wallet bridge backed by a JSON-RPC provider endpoint.
#[derive(Debug, Clone)]
pub struct JsonRpcWallet {
    client: reqwest::Client,
    rpc_url: Url,
    poll_interval: Duration,
    receipt_timeout: Duration,
}

impl JsonRpcWallet {
    /// A bridge to the provider at `rpc_url`.
    pub fn new(
        rpc_url: &str,
        request_timeout: Duration,
        poll_interval: Duration,
        receipt_timeout: Duration,
    ) -> Result<Self, WalletError> {
        let rpc_url = Url::parse(rpc_url)
            .map_err(|e| WalletError::Transport(format!("invalid RPC URL {rpc_url}: {e}")))?;
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| WalletError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            rpc_url,
            poll_interval,
            receipt_timeout,
        })
    }

    /// A bridge to the configured provider.
    pub fn from_config(config: &ClientConfig) -> Result<Self, WalletError> {
        Self::new(
            &config.rpc_url,
            config.request_timeout(),
            config.poll_interval(),
            config.receipt_timeout(),
        )
    }

    async fn rpc_call(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, WalletError> {
        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1
        });

        let resp = self
            .client
            .post(self.rpc_url.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    WalletError::Transport(format!("{method}: request timed out"))
                } else {
                    WalletError::Transport(format!("{method}: {e}"))
                }
            })?;

        if !resp.status().is_success() {
            return Err(WalletError::Transport(format!(
                "{method}: HTTP {}",
                resp.status()
            )));
        }

        let json: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| WalletError::InvalidResponse(format!("{method}: invalid JSON: {e}")))?;

        if let Some(error) = json.get("error") {
            let code = error.get("code").and_then(|c| c.as_i64()).unwrap_or(0);
            let message = error
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("unknown error")
                .to_string();
            return Err(WalletError::Rpc { code, message });
        }

        json.get("result")
            .cloned()
            .ok_or_else(|| WalletError::InvalidResponse(format!("{method}: missing result")))
    }

    async fn fetch_receipt(&self, tx_hash: &TxHash) -> Result<Option<TxReceipt>, WalletError> {
        let receipt = self
            .rpc_call("eth_getTransactionReceipt", serde_json::json!([tx_hash.as_str()]))
            .await?;

        // Null receipt means the transaction is still pending.
        if receipt.is_null() {
            return Ok(None);
        }

        let status = receipt
            .get("status")
            .and_then(|s| s.as_str())
            .unwrap_or("0x0");
        let block_number = receipt
            .get("blockNumber")
            .and_then(|b| b.as_str())
            .and_then(parse_quantity);

        Ok(Some(TxReceipt {
            transaction_hash: tx_hash.clone(),
            block_number,
            success: status != "0x0",
        }))
    }
}

fn parse_quantity(s: &str) -> Option<u64> {
    u64::from_str_radix(s.trim_start_matches("0x"), 16).ok()
}

#[async_trait]
impl WalletBridge for JsonRpcWallet {
    async fn connected_account(&self) -> Result<Option<Address>, WalletError> {
        let result = self.rpc_call("eth_accounts", serde_json::json!([])).await?;
        let accounts = result
            .as_array()
            .ok_or_else(|| WalletError::InvalidResponse("eth_accounts: expected array".into()))?;
        match accounts.first().and_then(|a| a.as_str()) {
            None => Ok(None),
            Some(account) => Address::parse(account)
                .map(Some)
                .map_err(|e| WalletError::InvalidResponse(format!("eth_accounts: {e}"))),
        }
    }

    async fn send_transaction(&self, tx: &TransactionRequest) -> Result<TxHash, WalletError> {
        tracing::info!(
            from = %tx.from,
            to = %tx.to,
            value_wei = %tx.value,
            calldata_len = tx.data.len(),
            "sending transaction"
        );
        let result = self
            .rpc_call("eth_sendTransaction", serde_json::json!([tx.to_rpc_json()]))
            .await?;
        let hash = result.as_str().ok_or_else(|| {
            WalletError::InvalidResponse("eth_sendTransaction returned non-string result".into())
        })?;
        TxHash::parse(hash)
    }

    async fn wait_for_receipt(&self, tx_hash: &TxHash) -> Result<TxReceipt, WalletError> {
        let deadline = tokio::time::Instant::now() + self.receipt_timeout;
        loop {
            if let Some(receipt) = self.fetch_receipt(tx_hash).await? {
                tracing::info!(
                    tx_hash = %tx_hash,
                    block = ?receipt.block_number,
                    success = receipt.success,
                    "transaction mined"
                );
                return Ok(receipt);
            }
            if tokio::time::Instant::now() + self.poll_interval > deadline {
                return Err(WalletError::ReceiptTimeout {
                    tx_hash: tx_hash.to_string(),
                    waited_secs: self.receipt_timeout.as_secs(),
                });
            }
            tracing::debug!(tx_hash = %tx_hash, "receipt pending");
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}
