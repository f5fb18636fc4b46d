//! # Dispute Submission Flow
//!
//! [`DisputeSubmitter`] drives one form from validation to a mined
//! `createDispute` transaction, recording each step in a
//! [`SubmissionTracker`] and reporting each outcome through a [`Notifier`].
//!
//! ## Ordering
//!
//! 1. Wallet check. Without a connected account nothing else happens.
//! 2. Form validation, with `deadline = now + dispute window`.
//! 3. Encryption of the amount and digests of the free-text fields.
//! 4. Call assembly. The description argument is its SHA-256 digest unless
//!    plaintext publication is enabled.
//! 5. Transaction send, carrying the amount in wei as `msg.value`.
//! 6. Receipt wait.
//!
//! The transaction is only built after encryption succeeded, so a failure
//! before step 5 leaves nothing on chain. No step is retried.
//!
//! ## Cancellation
//!
//! Dropping a `submit` future leaves its attempt busy. The next `submit`
//! records it as abandoned (`Error` before the send, `Failed` after) and
//! starts from `Idle`. An abandoned send may still be mined.
//!
//! ## Security Notice
//!
//! The encrypted amount sits next to a plaintext `msg.value` of the same
//! amount. Calldata confidentiality does not hide the transferred value.

use std::sync::Arc;

use arbiter_contract::{CreateDisputeCall, TransactionRequest};
use arbiter_core::{Address, DisputeForm, DisputeSubmission, Timestamp, DEFAULT_DISPUTE_WINDOW_SECS};
use arbiter_state::{SubmissionState, SubmissionTracker};

use crate::config::ClientConfig;
use crate::context::{EncryptedDisputeData, EncryptionContext};
use crate::error::SubmitError;
use crate::notify::{Notification, Notifier};
use crate::wallet::{TxHash, TxReceipt, WalletBridge};

/// Everything produced by a confirmed submission.
#[derive(Debug, Clone)]
pub struct SubmissionOutcome {
    /// The validated form.
    pub submission: DisputeSubmission,
    /// Encrypted and digested fields.
    pub encrypted: EncryptedDisputeData,
    /// The `createDispute` arguments that were sent.
    pub call: CreateDisputeCall,
    /// The transaction handed to the wallet.
    pub transaction: TransactionRequest,
    /// Hash returned by the wallet.
    pub tx_hash: TxHash,
    /// The successful receipt.
    pub receipt: TxReceipt,
}

/// Submits disputes through one wallet to one contract.
pub struct DisputeSubmitter {
    context: Arc<EncryptionContext>,
    wallet: Arc<dyn WalletBridge>,
    notifier: Arc<dyn Notifier>,
    dispute_window_secs: u64,
    publish_plaintext_description: bool,
    tracker: SubmissionTracker,
}

impl std::fmt::Debug for DisputeSubmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DisputeSubmitter")
            .field("context", &self.context)
            .field("dispute_window_secs", &self.dispute_window_secs)
            .field("publish_plaintext_description", &self.publish_plaintext_description)
            .field("state", &self.tracker.state())
            .finish()
    }
}

impl DisputeSubmitter {
    /// A submitter with the default seven-day window and hashed descriptions.
    pub fn new(
        context: Arc<EncryptionContext>,
        wallet: Arc<dyn WalletBridge>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            context,
            wallet,
            notifier,
            dispute_window_secs: DEFAULT_DISPUTE_WINDOW_SECS,
            publish_plaintext_description: false,
            tracker: SubmissionTracker::new(),
        }
    }

    /// A submitter using the window and description policy of `config`.
    pub fn from_config(
        config: &ClientConfig,
        context: Arc<EncryptionContext>,
        wallet: Arc<dyn WalletBridge>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self::new(context, wallet, notifier)
            .with_dispute_window(config.dispute_window_secs)
            .with_plaintext_description(config.publish_plaintext_description)
    }

    /// Seconds between submission and the response deadline.
    pub fn with_dispute_window(mut self, secs: u64) -> Self {
        self.dispute_window_secs = secs;
        self
    }

    /// Publish the description text instead of its digest.
    pub fn with_plaintext_description(mut self, publish: bool) -> Self {
        self.publish_plaintext_description = publish;
        self
    }

    /// Current submission state.
    pub fn state(&self) -> SubmissionState {
        self.tracker.state()
    }

    /// The tracker with the full transition history.
    pub fn tracker(&self) -> &SubmissionTracker {
        &self.tracker
    }

    /// Submit `form` with the deadline counted from now.
    pub async fn submit(&mut self, form: &DisputeForm) -> Result<SubmissionOutcome, SubmitError> {
        self.submit_at(form, Timestamp::now()).await
    }

    /// Submit `form` with the deadline counted from `now`.
    pub async fn submit_at(
        &mut self,
        form: &DisputeForm,
        now: Timestamp,
    ) -> Result<SubmissionOutcome, SubmitError> {
        if self.tracker.is_busy() {
            tracing::warn!(state = %self.tracker.state(), "previous submission was abandoned");
            self.tracker.abandon("abandoned")?;
        }
        if self.tracker.state().is_outcome() {
            self.tracker.reset()?;
        }

        let account = self.require_account().await?;

        let deadline = now.plus_secs(self.dispute_window_secs).map_err(|e| {
            self.notifier.notify(Notification::invalid_input(e.to_string()));
            SubmitError::Deadline(e.to_string())
        })?;
        let submission = form.validate(deadline).map_err(|e| {
            if e.is_missing_field() {
                self.notifier.notify(Notification::missing_information());
            } else {
                self.notifier.notify(Notification::invalid_input(e.to_string()));
            }
            SubmitError::Validation(e)
        })?;

        self.tracker.begin_encryption()?;
        let encrypted = match self.context.encrypt_dispute(&submission, account).await {
            Ok(encrypted) => encrypted,
            Err(e) => {
                tracing::warn!(submission_id = %submission.id, error = %e, "dispute encryption failed");
                self.tracker.fail_encryption(e.to_string())?;
                self.notifier.notify(Notification::encryption_failed());
                return Err(SubmitError::Encryption(e));
            }
        };

        let call = assemble_call(&submission, &encrypted, self.publish_plaintext_description);
        let transaction = call.into_transaction(account, self.context.contract(), submission.amount);
        self.tracker.encryption_succeeded()?;

        self.tracker.begin_submission()?;
        let tx_hash = match self.wallet.send_transaction(&transaction).await {
            Ok(hash) => hash,
            Err(e) => {
                if e.is_user_rejection() {
                    tracing::info!(submission_id = %submission.id, "transaction rejected in wallet");
                } else {
                    tracing::warn!(submission_id = %submission.id, error = %e, "transaction send failed");
                }
                self.tracker.fail_submission(e.to_string())?;
                self.notifier.notify(Notification::submission_failed());
                return Err(SubmitError::Wallet(e));
            }
        };

        let receipt = match self.wallet.wait_for_receipt(&tx_hash).await {
            Ok(receipt) => receipt,
            Err(e) => {
                tracing::warn!(%tx_hash, error = %e, "no receipt for dispute transaction");
                self.tracker.fail_submission(e.to_string())?;
                self.notifier.notify(Notification::submission_failed());
                return Err(SubmitError::Wallet(e));
            }
        };
        if !receipt.success {
            tracing::warn!(%tx_hash, block = ?receipt.block_number, "dispute transaction reverted");
            self.tracker.fail_submission(format!("{tx_hash} reverted"))?;
            self.notifier.notify(Notification::submission_failed());
            return Err(SubmitError::Reverted {
                tx_hash: tx_hash.to_string(),
            });
        }

        self.tracker.confirm(tx_hash.as_str())?;
        tracing::info!(
            submission_id = %submission.id,
            %tx_hash,
            block = ?receipt.block_number,
            deadline = %submission.deadline,
            "dispute confirmed"
        );
        self.notifier.notify(Notification::dispute_confirmed());

        Ok(SubmissionOutcome {
            submission,
            encrypted,
            call,
            transaction,
            tx_hash,
            receipt,
        })
    }

    async fn require_account(&self) -> Result<Address, SubmitError> {
        match self.wallet.connected_account().await {
            Ok(Some(account)) => Ok(account),
            Ok(None) => {
                self.notifier.notify(Notification::wallet_not_connected());
                Err(SubmitError::WalletNotConnected)
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not query wallet account");
                self.notifier.notify(Notification::wallet_not_connected());
                Err(SubmitError::Wallet(e))
            }
        }
    }
}

/// The `createDispute` arguments for an encrypted submission.
///
/// The description argument is the SHA-256 digest unless
/// `publish_plaintext_description` is set.
pub fn assemble_call(
    submission: &DisputeSubmission,
    encrypted: &EncryptedDisputeData,
    publish_plaintext_description: bool,
) -> CreateDisputeCall {
    let description = if publish_plaintext_description {
        submission.description.clone()
    } else {
        encrypted.description_hash.clone()
    };
    CreateDisputeCall {
        respondent: submission.respondent,
        description,
        deadline: submission.deadline.to_unix_u64(),
        encrypted_amount: encrypted.amount.ciphertext.clone(),
        input_proof: encrypted.amount.proof.clone(),
    }
}
