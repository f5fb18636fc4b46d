//! # Dispute Subcommands
//!
//! - `arbiter calldata`: encrypt a dispute under a given key and print the
//!   `createDispute` transaction without sending it.
//! - `arbiter submit`: run the submission flow against the configured
//!   JSON-RPC provider and key service.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arbiter_client::{
    assemble_call, ClientConfig, DisputeSubmitter, EncryptionContext, HttpKeySource,
    JsonRpcWallet, PublicKeySource, StaticKeySource, TracingNotifier,
};
use arbiter_core::{Address, DisputeForm, Timestamp, DEFAULT_DISPUTE_WINDOW_SECS};
use arbiter_crypto::{scheme_for, RangeBits, SchemeId, SchemePublicKey};
use clap::Args;

use crate::read_key_document;

/// Dispute form fields, exactly as entered.
#[derive(Args, Debug, Clone)]
pub struct FormArgs {
    /// Address the dispute is raised against.
    #[arg(long)]
    pub respondent: String,

    /// Disputed amount in ether ("2.5").
    #[arg(long)]
    pub amount: String,

    /// Detailed description.
    #[arg(long)]
    pub description: String,

    /// Short title.
    #[arg(long, default_value = "")]
    pub title: String,

    /// Evidence references, whitespace separated.
    #[arg(long, default_value = "")]
    pub evidence: String,

    /// contract, payment, governance, or intellectual.
    #[arg(long, default_value = "")]
    pub dispute_type: String,
}

impl FormArgs {
    fn to_form(&self) -> DisputeForm {
        DisputeForm {
            dispute_type: self.dispute_type.clone(),
            amount: self.amount.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            evidence: self.evidence.clone(),
            respondent: self.respondent.clone(),
        }
    }
}

// ── calldata ─────────────────────────────────────────────────────────

/// Arguments for `arbiter calldata`.
#[derive(Args, Debug)]
pub struct CalldataArgs {
    #[command(flatten)]
    pub form: FormArgs,

    /// Public key document (JSON).
    #[arg(long)]
    pub key: PathBuf,

    /// EIP-155 chain id.
    #[arg(long, default_value_t = arbiter_client::SEPOLIA_CHAIN_ID)]
    pub chain_id: u64,

    /// Dispute contract address.
    #[arg(long)]
    pub contract: Address,

    /// Account that will send the transaction.
    #[arg(long)]
    pub caller: Address,

    /// Response deadline as unix seconds. Defaults to now plus `--window`.
    #[arg(long)]
    pub deadline: Option<i64>,

    /// Seconds until the response deadline.
    #[arg(long, default_value_t = DEFAULT_DISPUTE_WINDOW_SECS)]
    pub window: u64,

    /// Amount range in bits.
    #[arg(long, default_value_t = 32)]
    pub amount_bits: u32,

    /// Publish the description text instead of its digest.
    #[arg(long)]
    pub plaintext_description: bool,
}

/// Build the unsigned `createDispute` transaction as JSON.
pub fn build_calldata(args: &CalldataArgs) -> Result<serde_json::Value> {
    let key = read_key_document(&args.key)?;
    let scheme = scheme_for(key.scheme)?;
    let deadline = match args.deadline {
        Some(secs) => Timestamp::from_epoch_secs(secs)?,
        None => Timestamp::now().plus_secs(args.window)?,
    };
    let submission = args.form.to_form().validate(deadline)?;

    let context = EncryptionContext::new(
        Arc::from(scheme),
        Arc::new(StaticKeySource::new(key)),
        args.chain_id,
        args.contract,
    )
    .with_amount_range(RangeBits::new(args.amount_bits)?);
    let encrypted = crate::runtime()?.block_on(context.encrypt_dispute(&submission, args.caller))?;

    let call = assemble_call(&submission, &encrypted, args.plaintext_description);
    let tx = call.into_transaction(args.caller, args.contract, submission.amount);

    let mut json = tx.to_rpc_json();
    json["chainId"] = serde_json::json!(args.chain_id);
    json["deadline"] = serde_json::json!(call.deadline);
    json["description"] = serde_json::json!(call.description);
    json["encryptedAmount"] = serde_json::to_value(&encrypted.amount)?;
    json["evidenceHash"] = serde_json::json!(encrypted.evidence_hash);
    Ok(json)
}

/// Execute `arbiter calldata`.
pub fn run_calldata(args: &CalldataArgs) -> Result<u8> {
    let json = build_calldata(args)?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(0)
}

// ── submit ───────────────────────────────────────────────────────────

/// Arguments for `arbiter submit`.
#[derive(Args, Debug)]
pub struct SubmitArgs {
    #[command(flatten)]
    pub form: FormArgs,

    /// Use this public key document instead of the key service.
    #[arg(long)]
    pub key: Option<PathBuf>,
}

fn key_source(config: &ClientConfig, key: Option<&Path>) -> Result<Arc<dyn PublicKeySource>> {
    if let Some(path) = key {
        return Ok(Arc::new(StaticKeySource::new(read_key_document(path)?)));
    }
    if let Some(url) = &config.key_service_url {
        return Ok(Arc::new(HttpKeySource::new(url, config.request_timeout())?));
    }
    if config.scheme == SchemeId::SimulatedXor {
        return Ok(Arc::new(StaticKeySource::new(SchemePublicKey::simulated())));
    }
    bail!("no key_service_url configured; pass --key with a public key document")
}

/// Execute `arbiter submit`.
pub fn run_submit(args: &SubmitArgs, config_path: Option<&Path>) -> Result<u8> {
    let config = crate::load_config(config_path)?;
    tracing::info!(
        chain = %config.chain_display_name(),
        contract = %config.contract_address,
        scheme = %config.scheme,
        "submitting dispute"
    );

    let keys = key_source(&config, args.key.as_deref())?;
    let context = Arc::new(EncryptionContext::from_config(&config, keys)?);
    let wallet = Arc::new(JsonRpcWallet::from_config(&config)?);
    let mut submitter =
        DisputeSubmitter::from_config(&config, context, wallet, Arc::new(TracingNotifier));

    let form = args.form.to_form();
    let outcome = crate::runtime()?
        .block_on(submitter.submit(&form))
        .context("dispute submission failed")?;

    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "submissionId": outcome.submission.id.to_string(),
            "transactionHash": outcome.tx_hash,
            "blockNumber": outcome.receipt.block_number,
            "deadline": outcome.call.deadline,
            "description": outcome.call.description,
        }))?
    );
    Ok(0)
}
