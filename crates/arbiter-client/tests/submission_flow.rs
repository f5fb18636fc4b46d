//! # Integration Tests for the Dispute Submission Flow
//!
//! Drives [`DisputeSubmitter`] end to end against in-memory key sources
//! and wallets: the confirmed path, each failure branch, and the
//! difference between the ElGamal and simulated backends.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use arbiter_client::{
    DisputeSubmitter, EncryptionContext, EncryptionError, KeySourceError, MemoryNotifier,
    NoticeCode, PublicKeySource, StaticKeySource, SubmitError, TxHash, TxReceipt, WalletBridge,
    WalletError,
};
use arbiter_contract::{create_dispute_selector, CreateDisputeCall, TransactionRequest};
use arbiter_core::{parse_ether, Address, DisputeForm, Timestamp};
use arbiter_crypto::{
    hash_sensitive_data, Ciphertext, ConfidentialScheme, ElGamalScheme, ProofContext, RangeBits,
    SchemePublicKey, SecretKey, SimulatedScheme,
};
use arbiter_state::SubmissionState;
use async_trait::async_trait;
use parking_lot::Mutex;
use rand_core::OsRng;
use tokio::sync::Notify;

const CHAIN_ID: u64 = 11_155_111;
const CONTRACT: Address = Address::from_bytes([0x11; 20]);
const ACCOUNT: Address = Address::from_bytes([0x22; 20]);
const RESPONDENT: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";

// ── Fakes ────────────────────────────────────────────────────────────

#[derive(Default)]
struct FakeWallet {
    account: Option<Address>,
    reject_send: bool,
    revert: bool,
    receipt_error: bool,
    /// While set, `wait_for_receipt` never resolves.
    stall_receipt: AtomicBool,
    sent: Mutex<Vec<TransactionRequest>>,
    /// Signalled after every accepted send.
    sent_signal: Notify,
}

impl FakeWallet {
    fn connected() -> Self {
        Self {
            account: Some(ACCOUNT),
            ..Default::default()
        }
    }

    fn sent(&self) -> Vec<TransactionRequest> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl WalletBridge for FakeWallet {
    async fn connected_account(&self) -> Result<Option<Address>, WalletError> {
        Ok(self.account)
    }

    async fn send_transaction(&self, tx: &TransactionRequest) -> Result<TxHash, WalletError> {
        if self.reject_send {
            return Err(WalletError::Rpc {
                code: WalletError::USER_REJECTED,
                message: "User rejected the request.".into(),
            });
        }
        let count = {
            let mut sent = self.sent.lock();
            sent.push(tx.clone());
            sent.len()
        };
        self.sent_signal.notify_one();
        TxHash::parse(&format!("0x{count:064x}"))
    }

    async fn wait_for_receipt(&self, tx_hash: &TxHash) -> Result<TxReceipt, WalletError> {
        if self.stall_receipt.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        if self.receipt_error {
            return Err(WalletError::ReceiptTimeout {
                tx_hash: tx_hash.to_string(),
                waited_secs: 120,
            });
        }
        Ok(TxReceipt {
            transaction_hash: tx_hash.clone(),
            block_number: Some(7_000_000),
            success: !self.revert,
        })
    }
}

struct CountingKeys {
    inner: StaticKeySource,
    fetches: AtomicU32,
}

#[async_trait]
impl PublicKeySource for CountingKeys {
    async fn fetch(
        &self,
        chain_id: u64,
        contract: &Address,
    ) -> Result<SchemePublicKey, KeySourceError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.inner.fetch(chain_id, contract).await
    }

    fn source_name(&self) -> &str {
        "counting"
    }
}

struct Harness {
    secret: SecretKey,
    keys: Arc<CountingKeys>,
    wallet: Arc<FakeWallet>,
    notifier: Arc<MemoryNotifier>,
    submitter: DisputeSubmitter,
}

fn harness(wallet: FakeWallet) -> Harness {
    let secret = SecretKey::generate(&mut OsRng);
    let keys = Arc::new(CountingKeys {
        inner: StaticKeySource::new(SchemePublicKey::elgamal(&secret.public_key(), None)),
        fetches: AtomicU32::new(0),
    });
    let context = Arc::new(EncryptionContext::new(
        Arc::new(ElGamalScheme),
        keys.clone(),
        CHAIN_ID,
        CONTRACT,
    ));
    let wallet = Arc::new(wallet);
    let notifier = Arc::new(MemoryNotifier::new());
    let submitter = DisputeSubmitter::new(context, wallet.clone(), notifier.clone());
    Harness {
        secret,
        keys,
        wallet,
        notifier,
        submitter,
    }
}

fn form(amount: &str, description: &str, evidence: &str) -> DisputeForm {
    DisputeForm {
        amount: amount.into(),
        description: description.into(),
        evidence: evidence.into(),
        respondent: RESPONDENT.into(),
        ..Default::default()
    }
}

// ── Confirmed path ───────────────────────────────────────────────────

#[tokio::test]
async fn confirmed_submission_carries_value_and_deadline() {
    let mut h = harness(FakeWallet::connected());
    let before = Timestamp::now().to_unix_u64();
    let outcome = h.submitter.submit(&form("2.5", "X", "")).await.expect("submit");
    let after = Timestamp::now().to_unix_u64();

    assert_eq!(outcome.transaction.value.get(), 2_500_000_000_000_000_000);
    assert!(outcome.call.deadline >= before + 604_800);
    assert!(outcome.call.deadline <= after + 604_800);

    assert_eq!(outcome.call.description, hash_sensitive_data("X"));
    assert_eq!(outcome.encrypted.evidence_hash, hash_sensitive_data(""));
    assert_eq!(outcome.call.respondent.to_checksum(), RESPONDENT);
    assert_eq!(outcome.transaction.to, CONTRACT);
    assert_eq!(outcome.transaction.from, ACCOUNT);

    let sent = h.wallet.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(CreateDisputeCall::decode(&sent[0].data).unwrap(), outcome.call);

    assert_eq!(h.submitter.state(), SubmissionState::Confirmed);
    assert_eq!(h.notifier.codes(), [NoticeCode::DisputeConfirmed]);
}

#[tokio::test]
async fn deadline_counts_from_given_instant() {
    let mut h = harness(FakeWallet::connected());
    let now = Timestamp::from_epoch_secs(1_790_000_000).unwrap();
    let outcome = h.submitter.submit_at(&form("1", "X", ""), now).await.unwrap();
    assert_eq!(outcome.call.deadline, 1_790_604_800);

    let mut h = harness(FakeWallet::connected());
    h.submitter = h.submitter.with_dispute_window(3_600);
    let outcome = h.submitter.submit_at(&form("1", "X", ""), now).await.unwrap();
    assert_eq!(outcome.call.deadline, 1_790_003_600);
}

#[tokio::test]
async fn encrypted_amount_decrypts_and_verifies() {
    let mut h = harness(FakeWallet::connected());
    let outcome = h.submitter.submit(&form("2.5", "X", "")).await.unwrap();

    let ct = Ciphertext::from_bytes(&outcome.call.encrypted_amount).unwrap();
    assert_eq!(h.secret.decrypt(&ct, 32).unwrap(), 2500);

    let key = SchemePublicKey::elgamal(&h.secret.public_key(), None);
    let mut binding = ProofContext {
        chain_id: CHAIN_ID,
        contract: CONTRACT,
        caller: ACCOUNT,
        selector: create_dispute_selector(),
        label: "amount".into(),
    };
    ElGamalScheme
        .verify(&key, &outcome.encrypted.amount, RangeBits::U32, &binding)
        .expect("proof verifies for the submitting account");

    binding.caller = Address::from_bytes([0x33; 20]);
    assert!(ElGamalScheme
        .verify(&key, &outcome.encrypted.amount, RangeBits::U32, &binding)
        .is_err());
}

#[tokio::test]
async fn plaintext_description_is_opt_in() {
    let mut h = harness(FakeWallet::connected());
    h.submitter = h.submitter.with_plaintext_description(true);
    let outcome = h.submitter.submit(&form("1", "Milestone 3 not delivered", "")).await.unwrap();
    assert_eq!(outcome.call.description, "Milestone 3 not delivered");
}

#[tokio::test]
async fn second_submission_starts_from_idle() {
    let mut h = harness(FakeWallet::connected());
    h.submitter.submit(&form("1", "first", "")).await.unwrap();
    let outcome = h.submitter.submit(&form("2", "second", "ipfs://a ipfs://b")).await.unwrap();

    assert_eq!(outcome.tx_hash.as_str(), format!("0x{:064x}", 2));
    assert_eq!(outcome.encrypted.evidence_hash, hash_sensitive_data("ipfs://a\nipfs://b"));
    // key fetched once for both
    assert_eq!(h.keys.fetches.load(Ordering::SeqCst), 1);
    // 4 transitions, reset, 4 transitions
    assert_eq!(h.submitter.tracker().history().len(), 9);
}

// ── Failure paths ────────────────────────────────────────────────────

#[tokio::test]
async fn no_wallet_short_circuits() {
    let mut h = harness(FakeWallet::default());
    let err = h.submitter.submit(&form("2.5", "X", "")).await.unwrap_err();

    assert!(matches!(err, SubmitError::WalletNotConnected));
    assert_eq!(h.keys.fetches.load(Ordering::SeqCst), 0);
    assert!(h.wallet.sent().is_empty());
    assert_eq!(h.submitter.state(), SubmissionState::Idle);
    assert_eq!(h.notifier.codes(), [NoticeCode::WalletNotConnected]);
    assert_eq!(h.notifier.notifications()[0].title, "Wallet Not Connected");
}

#[tokio::test]
async fn missing_fields_are_reported() {
    let mut h = harness(FakeWallet::connected());
    let err = h.submitter.submit(&form("2.5", "   ", "")).await.unwrap_err();

    assert!(matches!(err, SubmitError::Validation(_)));
    assert_eq!(h.notifier.codes(), [NoticeCode::MissingRequiredField]);
    assert_eq!(h.notifier.notifications()[0].title, "Missing Information");
    assert_eq!(h.submitter.state(), SubmissionState::Idle);
    assert!(h.wallet.sent().is_empty());
}

#[tokio::test]
async fn unparseable_amount_is_invalid_input() {
    let mut h = harness(FakeWallet::connected());
    let err = h.submitter.submit(&form("two", "X", "")).await.unwrap_err();

    assert!(matches!(err, SubmitError::Validation(_)));
    assert_eq!(h.notifier.codes(), [NoticeCode::InvalidInput]);
    assert_eq!(h.keys.fetches.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn encryption_failure_sends_nothing() {
    let mut h = harness(FakeWallet::connected());
    // 5 million ETH does not fit 32 bits of milli-ether
    let err = h.submitter.submit(&form("5000000", "X", "")).await.unwrap_err();

    assert!(matches!(
        err,
        SubmitError::Encryption(EncryptionError::OutOfRange { bits: 32, .. })
    ));
    assert_eq!(h.submitter.state(), SubmissionState::Error);
    assert_eq!(h.notifier.codes(), [NoticeCode::EncryptionFailed]);
    assert!(h.wallet.sent().is_empty());
}

#[tokio::test]
async fn rejected_transaction_fails_submission() {
    let mut h = harness(FakeWallet {
        reject_send: true,
        ..FakeWallet::connected()
    });
    let err = h.submitter.submit(&form("1", "X", "")).await.unwrap_err();

    match err {
        SubmitError::Wallet(e) => assert!(e.is_user_rejection()),
        other => panic!("expected wallet error, got {other:?}"),
    }
    assert_eq!(h.submitter.state(), SubmissionState::Failed);
    assert_eq!(h.notifier.codes(), [NoticeCode::SubmissionFailed]);
    assert_eq!(
        h.notifier.notifications()[0].description,
        "There was an error submitting your dispute. Please try again."
    );
}

#[tokio::test]
async fn reverted_transaction_fails_submission() {
    let mut h = harness(FakeWallet {
        revert: true,
        ..FakeWallet::connected()
    });
    let err = h.submitter.submit(&form("1", "X", "")).await.unwrap_err();

    assert!(matches!(err, SubmitError::Reverted { .. }));
    assert_eq!(h.submitter.state(), SubmissionState::Failed);
    assert_eq!(h.wallet.sent().len(), 1);
    assert_eq!(h.notifier.codes(), [NoticeCode::SubmissionFailed]);
}

#[tokio::test]
async fn receipt_wait_failure_fails_submission() {
    let mut h = harness(FakeWallet {
        receipt_error: true,
        ..FakeWallet::connected()
    });
    let err = h.submitter.submit(&form("1", "X", "")).await.unwrap_err();

    assert!(matches!(
        err,
        SubmitError::Wallet(WalletError::ReceiptTimeout { waited_secs: 120, .. })
    ));
    assert_eq!(h.submitter.state(), SubmissionState::Failed);
    assert_eq!(h.wallet.sent().len(), 1);
    assert_eq!(h.notifier.codes(), [NoticeCode::SubmissionFailed]);
}

#[tokio::test]
async fn unrepresentable_deadline_is_invalid_input() {
    let mut h = harness(FakeWallet::connected());
    h.submitter = h.submitter.with_dispute_window(u64::MAX);
    let err = h.submitter.submit(&form("1", "X", "")).await.unwrap_err();

    assert!(matches!(err, SubmitError::Deadline(_)));
    assert_eq!(h.notifier.codes(), [NoticeCode::InvalidInput]);
    assert_eq!(h.submitter.state(), SubmissionState::Idle);
    assert_eq!(h.keys.fetches.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn dropped_submission_does_not_block_the_next() {
    let mut h = harness(FakeWallet {
        stall_receipt: AtomicBool::new(true),
        ..FakeWallet::connected()
    });
    let wallet = h.wallet.clone();
    let first = form("1", "X", "");
    tokio::select! {
        _ = h.submitter.submit(&first) => panic!("receipt should never arrive"),
        _ = wallet.sent_signal.notified() => {}
    }
    assert_eq!(h.submitter.state(), SubmissionState::Submitting);

    wallet.stall_receipt.store(false, Ordering::SeqCst);
    let outcome = h.submitter.submit(&form("2", "X", "")).await.expect("second submit");

    assert_eq!(outcome.tx_hash.as_str(), format!("0x{:064x}", 2));
    assert_eq!(h.submitter.state(), SubmissionState::Confirmed);
    assert!(h.submitter.tracker().history().iter().any(|r| {
        r.from == SubmissionState::Submitting
            && r.to == SubmissionState::Failed
            && r.detail.as_deref() == Some("abandoned")
    }));
    assert_eq!(h.notifier.codes(), [NoticeCode::DisputeConfirmed]);
}

// ── Backends ─────────────────────────────────────────────────────────

#[tokio::test]
async fn elgamal_ciphertexts_are_fresh_per_submission() {
    let mut h = harness(FakeWallet::connected());
    let a = h.submitter.submit(&form("1", "X", "")).await.unwrap();
    let b = h.submitter.submit(&form("1", "X", "")).await.unwrap();
    assert_ne!(a.call.encrypted_amount, b.call.encrypted_amount);
}

#[tokio::test]
async fn simulated_ciphertexts_repeat_within_a_session() {
    let context = Arc::new(EncryptionContext::new(
        Arc::new(SimulatedScheme::new()),
        Arc::new(StaticKeySource::new(SchemePublicKey::simulated())),
        CHAIN_ID,
        CONTRACT,
    ));
    assert!(!context.is_confidential());
    let mut submitter = DisputeSubmitter::new(
        context,
        Arc::new(FakeWallet::connected()),
        Arc::new(MemoryNotifier::new()),
    );
    let a = submitter.submit(&form("1", "X", "")).await.unwrap();
    let b = submitter.submit(&form("1", "X", "")).await.unwrap();
    assert_eq!(a.call.encrypted_amount, b.call.encrypted_amount);
    assert_eq!(a.call.input_proof, b.call.input_proof);
}

#[tokio::test]
async fn parse_ether_matches_transaction_value() {
    let mut h = harness(FakeWallet::connected());
    let outcome = h.submitter.submit(&form("0.000000000000000001", "X", "")).await.unwrap();
    assert_eq!(outcome.transaction.value, parse_ether("0.000000000000000001").unwrap());
    assert_eq!(outcome.transaction.value.get(), 1);
}
