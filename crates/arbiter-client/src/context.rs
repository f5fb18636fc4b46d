//! # Encryption Context
//!
//! An explicitly constructed, per-session holder of the encryption backend
//! and the public key of one contract instance. The key is fetched on
//! first use and cached until [`EncryptionContext::invalidate_key`].
//!
//! ## Confidential Amount Encoding
//!
//! Amounts are encrypted in milli-ether, `floor(wei / 10^15)`, within the
//! configured range (32 bits by default). Sub-milli-ether precision is not
//! carried in the ciphertext.
//!
//! ## Concurrency
//!
//! The context is `Send + Sync`. The cache lock is never held across an
//! await; two concurrent first uses may both fetch, and the later result
//! wins.

use std::sync::Arc;

use arbiter_contract::create_dispute_selector;
use arbiter_core::{Address, DisputeSubmission, Wei};
use arbiter_crypto::{
    hash_sensitive_data, scheme_for, ConfidentialScheme, EncryptedValue, ProofContext, RangeBits,
    SchemeId, SchemePublicKey,
};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::config::ClientConfig;
use crate::error::EncryptionError;
use crate::keys::PublicKeySource;

// ── Payloads ───────────────────────────────────────────────────────────

/// Confidential and digested fields of one dispute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedDisputeData {
    /// The encrypted milli-ether amount.
    pub amount: EncryptedValue,
    /// SHA-256 hex of the description.
    pub description_hash: String,
    /// SHA-256 hex of the newline-joined evidence references.
    pub evidence_hash: String,
}

/// A confidential yes/no vote on a dispute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedVote {
    /// On-chain dispute id.
    pub dispute_id: u64,
    /// Encryption of 1 (in favour) or 0.
    pub vote: EncryptedValue,
}

/// A confidential reputation score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedReputation {
    /// Whose score this is.
    pub user: Address,
    /// The encrypted 32-bit score.
    pub score: EncryptedValue,
}

// ── Context ────────────────────────────────────────────────────────────

/// Encryption backend plus cached public key for one contract instance.
pub struct EncryptionContext {
    scheme: Arc<dyn ConfidentialScheme>,
    keys: Arc<dyn PublicKeySource>,
    chain_id: u64,
    contract: Address,
    amount_range: RangeBits,
    cached_key: Mutex<Option<SchemePublicKey>>,
}

impl std::fmt::Debug for EncryptionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptionContext")
            .field("scheme", &self.scheme.id())
            .field("key_source", &self.keys.source_name())
            .field("chain_id", &self.chain_id)
            .field("contract", &self.contract)
            .field("amount_range", &self.amount_range)
            .field("key_cached", &self.cached_key.lock().is_some())
            .finish()
    }
}

impl EncryptionContext {
    /// A context for `contract` on `chain_id` with a 32-bit amount range.
    pub fn new(
        scheme: Arc<dyn ConfidentialScheme>,
        keys: Arc<dyn PublicKeySource>,
        chain_id: u64,
        contract: Address,
    ) -> Self {
        Self {
            scheme,
            keys,
            chain_id,
            contract,
            amount_range: RangeBits::U32,
            cached_key: Mutex::new(None),
        }
    }

    /// A context for the configured scheme and contract.
    pub fn from_config(
        config: &ClientConfig,
        keys: Arc<dyn PublicKeySource>,
    ) -> Result<Self, EncryptionError> {
        let scheme: Arc<dyn ConfidentialScheme> = Arc::from(scheme_for(config.scheme)?);
        let amount_range = config.amount_range()?;
        Ok(Self::new(scheme, keys, config.chain_id, config.contract_address)
            .with_amount_range(amount_range))
    }

    /// Override the declared amount range.
    pub fn with_amount_range(mut self, bits: RangeBits) -> Self {
        self.amount_range = bits;
        self
    }

    /// The backend's scheme.
    pub fn scheme_id(&self) -> SchemeId {
        self.scheme.id()
    }

    /// Whether ciphertexts from this context hide their plaintext.
    pub fn is_confidential(&self) -> bool {
        self.scheme.is_confidential()
    }

    /// Target chain.
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Target contract.
    pub fn contract(&self) -> Address {
        self.contract
    }

    /// The declared amount range.
    pub fn amount_range(&self) -> RangeBits {
        self.amount_range
    }

    /// The contract's public key, fetched on first use.
    pub async fn public_key(&self) -> Result<SchemePublicKey, EncryptionError> {
        let cached = self.cached_key.lock().clone();
        if let Some(key) = cached {
            return Ok(key);
        }

        let key = self.keys.fetch(self.chain_id, &self.contract).await?;
        key.require_scheme(self.scheme.id())?;
        *self.cached_key.lock() = Some(key.clone());
        Ok(key)
    }

    /// Drop the cached key; the next encryption fetches again.
    pub fn invalidate_key(&self) {
        if self.cached_key.lock().take().is_some() {
            tracing::debug!(chain_id = self.chain_id, "encryption key cache invalidated");
        }
    }

    /// Encrypt one value bound to a specific call argument.
    pub async fn encrypt_value(
        &self,
        value: u64,
        bits: RangeBits,
        caller: Address,
        selector: [u8; 4],
        label: &str,
    ) -> Result<EncryptedValue, EncryptionError> {
        bits.check(value)?;
        let key = self.public_key().await?;
        let ctx = ProofContext {
            chain_id: self.chain_id,
            contract: self.contract,
            caller,
            selector,
            label: label.to_string(),
        };
        if !self.scheme.is_confidential() {
            tracing::warn!(
                scheme = %self.scheme.id(),
                label,
                "encrypting with a non-confidential scheme"
            );
        }
        let payload = self.scheme.encrypt(&key, value, bits, &ctx)?;
        tracing::debug!(
            scheme = %payload.scheme,
            label,
            bits = bits.get(),
            ciphertext_len = payload.ciphertext.len(),
            proof_len = payload.proof.len(),
            "encrypted confidential value"
        );
        Ok(payload)
    }

    /// Encrypt a dispute amount as milli-ether for `createDispute`.
    pub async fn encrypt_amount(
        &self,
        amount: Wei,
        caller: Address,
    ) -> Result<EncryptedValue, EncryptionError> {
        let milli = amount.milli_ether();
        let out_of_range = || EncryptionError::OutOfRange {
            value: milli,
            bits: self.amount_range.get(),
        };
        let value = u64::try_from(milli).map_err(|_| out_of_range())?;
        if !self.amount_range.contains(value) {
            return Err(out_of_range());
        }
        self.encrypt_value(value, self.amount_range, caller, create_dispute_selector(), "amount")
            .await
    }

    /// Encrypt the amount and digest the free-text fields of a dispute.
    pub async fn encrypt_dispute(
        &self,
        submission: &DisputeSubmission,
        caller: Address,
    ) -> Result<EncryptedDisputeData, EncryptionError> {
        let amount = self.encrypt_amount(submission.amount, caller).await?;
        Ok(EncryptedDisputeData {
            amount,
            description_hash: hash_sensitive_data(&submission.description),
            evidence_hash: hash_sensitive_data(&submission.evidence_text()),
        })
    }

    /// Encrypt a vote as a single bit bound to `selector`.
    pub async fn encrypt_vote(
        &self,
        dispute_id: u64,
        in_favour: bool,
        caller: Address,
        selector: [u8; 4],
    ) -> Result<EncryptedVote, EncryptionError> {
        let vote = self
            .encrypt_value(u64::from(in_favour), RangeBits::BOOL, caller, selector, "vote")
            .await?;
        Ok(EncryptedVote { dispute_id, vote })
    }

    /// Encrypt a 32-bit reputation score bound to `selector`.
    pub async fn encrypt_reputation(
        &self,
        user: Address,
        score: u32,
        caller: Address,
        selector: [u8; 4],
    ) -> Result<EncryptedReputation, EncryptionError> {
        let score = self
            .encrypt_value(u64::from(score), RangeBits::U32, caller, selector, "reputation")
            .await?;
        Ok(EncryptedReputation { user, score })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    use arbiter_core::{parse_ether, DisputeForm, Timestamp};
    use arbiter_crypto::{Ciphertext, ElGamalScheme, SecretKey, SimulatedScheme};
    use async_trait::async_trait;
    use rand_core::OsRng;

    use crate::error::KeySourceError;

    /// Serves one key and counts fetches.
    struct CountingSource {
        key: SchemePublicKey,
        fetches: AtomicU32,
    }

    #[async_trait]
    impl PublicKeySource for CountingSource {
        async fn fetch(
            &self,
            _chain_id: u64,
            _contract: &Address,
        ) -> Result<SchemePublicKey, KeySourceError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok(self.key.clone())
        }

        fn source_name(&self) -> &str {
            "counting"
        }
    }

    struct FailingSource;

    #[async_trait]
    impl PublicKeySource for FailingSource {
        async fn fetch(
            &self,
            chain_id: u64,
            contract: &Address,
        ) -> Result<SchemePublicKey, KeySourceError> {
            Err(KeySourceError::NotFound {
                chain_id,
                contract: contract.to_checksum(),
            })
        }

        fn source_name(&self) -> &str {
            "failing"
        }
    }

    const CONTRACT: Address = Address::from_bytes([0x11; 20]);
    const CALLER: Address = Address::from_bytes([0x22; 20]);

    fn elgamal() -> (SecretKey, EncryptionContext, Arc<CountingSource>) {
        let sk = SecretKey::generate(&mut OsRng);
        let source = Arc::new(CountingSource {
            key: SchemePublicKey::elgamal(&sk.public_key(), Some("k1".into())),
            fetches: AtomicU32::new(0),
        });
        let ctx = EncryptionContext::new(Arc::new(ElGamalScheme), source.clone(), 11_155_111, CONTRACT);
        (sk, ctx, source)
    }

    #[tokio::test]
    async fn amount_encrypted_as_milli_ether() {
        let (sk, ctx, _) = elgamal();
        let payload = ctx.encrypt_amount(parse_ether("2.5").unwrap(), CALLER).await.unwrap();
        let ct = Ciphertext::from_bytes(&payload.ciphertext).unwrap();
        assert_eq!(sk.decrypt(&ct, 32).unwrap(), 2500);

        let key = ctx.public_key().await.unwrap();
        let binding = ProofContext {
            chain_id: 11_155_111,
            contract: CONTRACT,
            caller: CALLER,
            selector: create_dispute_selector(),
            label: "amount".into(),
        };
        ElGamalScheme.verify(&key, &payload, RangeBits::U32, &binding).unwrap();
    }

    #[tokio::test]
    async fn key_fetched_once_then_cached() {
        let (_, ctx, source) = elgamal();
        ctx.encrypt_amount(parse_ether("1").unwrap(), CALLER).await.unwrap();
        ctx.encrypt_amount(parse_ether("2").unwrap(), CALLER).await.unwrap();
        assert_eq!(source.fetches.load(Ordering::SeqCst), 1);

        ctx.invalidate_key();
        ctx.encrypt_amount(parse_ether("3").unwrap(), CALLER).await.unwrap();
        assert_eq!(source.fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn out_of_range_amount() {
        let (_, ctx, _) = elgamal();
        // 2^32 milli-ether is about 4.29 million ETH
        let err = ctx
            .encrypt_amount(parse_ether("4294968").unwrap(), CALLER)
            .await
            .unwrap_err();
        assert!(matches!(err, EncryptionError::OutOfRange { value: 4_294_968_000, bits: 32 }));

        let narrow = elgamal().1.with_amount_range(RangeBits::new(8).unwrap());
        let err = narrow.encrypt_amount(parse_ether("0.256").unwrap(), CALLER).await.unwrap_err();
        assert!(matches!(err, EncryptionError::OutOfRange { value: 256, bits: 8 }));
    }

    #[tokio::test]
    async fn key_fetch_failure_is_distinct() {
        let ctx = EncryptionContext::new(Arc::new(ElGamalScheme), Arc::new(FailingSource), 1, CONTRACT);
        let err = ctx.encrypt_amount(Wei::new(1), CALLER).await.unwrap_err();
        assert!(matches!(err, EncryptionError::KeyFetch(KeySourceError::NotFound { .. })));
    }

    #[tokio::test]
    async fn scheme_mismatch_is_distinct_and_not_cached() {
        let source = Arc::new(CountingSource {
            key: SchemePublicKey::simulated(),
            fetches: AtomicU32::new(0),
        });
        let ctx = EncryptionContext::new(Arc::new(ElGamalScheme), source.clone(), 1, CONTRACT);
        for _ in 0..2 {
            let err = ctx.encrypt_amount(Wei::new(1), CALLER).await.unwrap_err();
            assert!(matches!(err, EncryptionError::SchemeMismatch { .. }));
        }
        assert_eq!(source.fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn invalid_key_is_distinct() {
        let source = Arc::new(CountingSource {
            key: SchemePublicKey {
                scheme: SchemeId::Ristretto255ElGamal,
                key_id: None,
                public_key: vec![0xff; 32],
            },
            fetches: AtomicU32::new(0),
        });
        let ctx = EncryptionContext::new(Arc::new(ElGamalScheme), source, 1, CONTRACT);
        let err = ctx.encrypt_amount(Wei::new(1), CALLER).await.unwrap_err();
        assert!(matches!(err, EncryptionError::InvalidKey(_)));
    }

    #[tokio::test]
    async fn dispute_fields_hashed() {
        let (_, ctx, _) = elgamal();
        let form = DisputeForm {
            amount: "0.5".into(),
            description: "X".into(),
            respondent: "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed".into(),
            ..Default::default()
        };
        let sub = form.validate(Timestamp::now()).unwrap();
        let data = ctx.encrypt_dispute(&sub, CALLER).await.unwrap();
        assert_eq!(data.description_hash, hash_sensitive_data("X"));
        assert_eq!(data.evidence_hash, hash_sensitive_data(""));
        assert_eq!(data.amount.scheme, SchemeId::Ristretto255ElGamal);
    }

    #[tokio::test]
    async fn votes_tally_homomorphically() {
        let (sk, ctx, _) = elgamal();
        let selector = [0xde, 0xad, 0xbe, 0xef];
        let mut tally = Ciphertext::zero();
        for v in [true, false, true, true] {
            let vote = ctx.encrypt_vote(7, v, CALLER, selector).await.unwrap();
            assert_eq!(vote.dispute_id, 7);
            assert_eq!(vote.vote.bits, RangeBits::BOOL);
            tally = tally + Ciphertext::from_bytes(&vote.vote.ciphertext).unwrap();
        }
        assert_eq!(sk.decrypt(&tally, 8).unwrap(), 3);
    }

    #[tokio::test]
    async fn reputation_is_thirty_two_bits() {
        let (sk, ctx, _) = elgamal();
        let rep = ctx
            .encrypt_reputation(CALLER, 9_000, CALLER, [1, 2, 3, 4])
            .await
            .unwrap();
        assert_eq!(rep.score.bits, RangeBits::U32);
        let ct = Ciphertext::from_bytes(&rep.score.ciphertext).unwrap();
        assert_eq!(sk.decrypt(&ct, 16).unwrap(), 9_000);
    }

    #[tokio::test]
    async fn simulated_context_is_flagged() {
        let ctx = EncryptionContext::new(
            Arc::new(SimulatedScheme::new()),
            Arc::new(crate::keys::StaticKeySource::new(SchemePublicKey::simulated())),
            1,
            CONTRACT,
        );
        assert!(!ctx.is_confidential());
        let a = ctx.encrypt_amount(Wei::new(10u128.pow(18)), CALLER).await.unwrap();
        let b = ctx.encrypt_amount(Wei::new(10u128.pow(18)), CALLER).await.unwrap();
        assert_eq!(a.ciphertext, b.ciphertext);
    }

    #[test]
    fn from_config_reports_bad_amount_bits_as_config() {
        let mut config = ClientConfig::new(1, CONTRACT, "http://127.0.0.1:8545");
        config.amount_bits = 65;
        let keys = Arc::new(crate::keys::StaticKeySource::new(SchemePublicKey::simulated()));
        let err = EncryptionContext::from_config(&config, keys).unwrap_err();
        assert!(matches!(
            err,
            EncryptionError::Config(crate::error::ConfigError::InvalidValue {
                field: "amount_bits",
                ..
            })
        ));
    }

    #[test]
    fn debug_omits_key_material() {
        let (_, ctx, _) = elgamal();
        let debug = format!("{ctx:?}");
        assert!(debug.contains("key_cached: false"));
        assert!(debug.contains("counting"));
    }
}
