//! # arbiter-client — Dispute Submission Client
//!
//! Composes the lower crates into the submission pipeline:
//!
//! ```text
//! ClientConfig ──▶ PublicKeySource ──▶ EncryptionContext ──┐
//!                                                          ▼
//!          DisputeForm ──────────────────────────▶ DisputeSubmitter ──▶ WalletBridge
//!                                                          │
//!                                                          ▼
//!                                                       Notifier
//! ```
//!
//! Every collaborator sits behind a trait ([`PublicKeySource`],
//! [`WalletBridge`], [`Notifier`]) so the flow runs unchanged against a
//! JSON-RPC provider, an HTTP key service, or in-memory fakes.
//!
//! ## Crate Policy
//!
//! - No global state: the encryption context is constructed explicitly and
//!   injected into the submitter.
//! - Key service requests retry transport failures; wallet calls never
//!   retry.
//! - No `.unwrap()` outside tests.

pub mod config;
pub mod context;
pub mod error;
pub mod flow;
pub mod keys;
pub mod notify;
mod retry;
pub mod wallet;

pub use config::{ClientConfig, MAINNET_CHAIN_ID, SEPOLIA_CHAIN_ID};
pub use context::{EncryptedDisputeData, EncryptedReputation, EncryptedVote, EncryptionContext};
pub use error::{ConfigError, EncryptionError, KeySourceError, SubmitError, WalletError};
pub use flow::{assemble_call, DisputeSubmitter, SubmissionOutcome};
pub use keys::{HttpKeySource, PublicKeySource, StaticKeySource};
pub use notify::{MemoryNotifier, NoticeCode, Notification, Notifier, Severity, TracingNotifier};
pub use wallet::{JsonRpcWallet, TxHash, TxReceipt, WalletBridge};
