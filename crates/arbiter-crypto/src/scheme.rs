//! # Confidential Scheme Interface
//!
//! The [`ConfidentialScheme`] trait is the seam between the submission
//! pipeline and a concrete encryption backend. Keys and payloads carry
//! their [`SchemeId`] so a payload can never be checked or produced under
//! the wrong scheme.
//!
//! ## Implementations
//!
//! - [`ElGamalScheme`]: exponential ElGamal on ristretto255 with a
//!   call-bound range proof. Confidential and third-party verifiable.
//! - `SimulatedScheme` (feature `simulation`): the historical XOR
//!   backend. Not confidential.

use arbiter_core::Address;
use rand_core::OsRng;
use serde::{Deserialize, Serialize};

use crate::elgamal::{Ciphertext, PublicKey};
use crate::error::{CryptoError, VerifyError};
use crate::range_proof::{RangeBits, RangeProof};
use crate::transcript::Transcript;

/// Domain separator for range-proof transcripts.
const RANGE_PROOF_DOMAIN: &[u8] = b"secret-arbiter/range-proof/v1";

// ── Identifiers ────────────────────────────────────────────────────────

/// Which scheme a key or payload belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SchemeId {
    /// Exponential ElGamal over ristretto255.
    #[serde(rename = "ristretto255-elgamal")]
    Ristretto255ElGamal,
    /// The XOR simulation. Not confidential.
    #[serde(rename = "simulated-xor")]
    SimulatedXor,
}

impl SchemeId {
    /// The wire identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ristretto255ElGamal => "ristretto255-elgamal",
            Self::SimulatedXor => "simulated-xor",
        }
    }

    /// Parse a wire identifier.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ristretto255-elgamal" => Some(Self::Ristretto255ElGamal),
            "simulated-xor" => Some(Self::SimulatedXor),
            _ => None,
        }
    }
}

impl std::fmt::Display for SchemeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Keys and payloads ──────────────────────────────────────────────────

/// A public key as issued by the key service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemePublicKey {
    /// Scheme the key belongs to.
    pub scheme: SchemeId,
    /// Service-assigned key identifier, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_id: Option<String>,
    /// Encoded key bytes.
    #[serde(with = "hex")]
    pub public_key: Vec<u8>,
}

impl SchemePublicKey {
    /// Wrap an ElGamal public key.
    pub fn elgamal(pk: &PublicKey, key_id: Option<String>) -> Self {
        Self {
            scheme: SchemeId::Ristretto255ElGamal,
            key_id,
            public_key: pk.to_bytes().to_vec(),
        }
    }

    /// The placeholder key used with the simulated backend. It has no
    /// key material: the simulation keeps its own session key.
    pub fn simulated() -> Self {
        Self {
            scheme: SchemeId::SimulatedXor,
            key_id: None,
            public_key: Vec::new(),
        }
    }

    /// Reject the key unless it belongs to `backend`.
    pub fn require_scheme(&self, backend: SchemeId) -> Result<(), CryptoError> {
        if self.scheme == backend {
            Ok(())
        } else {
            Err(CryptoError::SchemeMismatch {
                key: self.scheme,
                backend,
            })
        }
    }
}

/// An encrypted value and its proof.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedValue {
    /// Scheme that produced the payload.
    pub scheme: SchemeId,
    /// Declared range of the plaintext.
    pub bits: RangeBits,
    /// Ciphertext bytes.
    #[serde(with = "hex")]
    pub ciphertext: Vec<u8>,
    /// Proof bytes.
    #[serde(with = "hex")]
    pub proof: Vec<u8>,
}

/// The contract call a proof is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofContext {
    /// EIP-155 chain id.
    pub chain_id: u64,
    /// Target contract.
    pub contract: Address,
    /// Account submitting the transaction.
    pub caller: Address,
    /// 4-byte function selector.
    pub selector: [u8; 4],
    /// Which argument the value fills ("amount", "vote", ...).
    pub label: String,
}

impl ProofContext {
    fn transcript(&self, key: &[u8], ciphertext: &[u8]) -> Transcript {
        let mut t = Transcript::new(RANGE_PROOF_DOMAIN);
        t.append_message(b"public-key", key);
        t.append_u64(b"chain-id", self.chain_id);
        t.append_message(b"contract", self.contract.as_bytes());
        t.append_message(b"caller", self.caller.as_bytes());
        t.append_message(b"selector", &self.selector);
        t.append_message(b"label", self.label.as_bytes());
        t.append_message(b"ciphertext", ciphertext);
        t
    }
}

// ── Trait ──────────────────────────────────────────────────────────────

/// An encryption backend for confidential contract inputs.
pub trait ConfidentialScheme: Send + Sync + std::fmt::Debug {
    /// The scheme this backend implements.
    fn id(&self) -> SchemeId;

    /// Whether ciphertexts actually hide the plaintext.
    fn is_confidential(&self) -> bool;

    /// Encrypt `value`, proving it lies in `bits`, bound to `ctx`.
    fn encrypt(
        &self,
        key: &SchemePublicKey,
        value: u64,
        bits: RangeBits,
        ctx: &ProofContext,
    ) -> Result<EncryptedValue, CryptoError>;

    /// Check a payload from the public key and binding alone.
    fn verify(
        &self,
        key: &SchemePublicKey,
        payload: &EncryptedValue,
        bits: RangeBits,
        ctx: &ProofContext,
    ) -> Result<(), VerifyError>;
}

/// Construct the backend for `id`.
pub fn scheme_for(id: SchemeId) -> Result<Box<dyn ConfidentialScheme>, CryptoError> {
    match id {
        SchemeId::Ristretto255ElGamal => Ok(Box::new(ElGamalScheme)),
        #[cfg(feature = "simulation")]
        SchemeId::SimulatedXor => Ok(Box::new(crate::simulated::SimulatedScheme::new())),
        #[cfg(not(feature = "simulation"))]
        SchemeId::SimulatedXor => Err(CryptoError::SchemeUnavailable(format!(
            "{id} requires the `simulation` feature"
        ))),
    }
}

// ── ElGamal ────────────────────────────────────────────────────────────

/// Exponential ElGamal with a bit-decomposition range proof.
#[derive(Debug, Clone, Copy, Default)]
pub struct ElGamalScheme;

impl ConfidentialScheme for ElGamalScheme {
    fn id(&self) -> SchemeId {
        SchemeId::Ristretto255ElGamal
    }

    fn is_confidential(&self) -> bool {
        true
    }

    fn encrypt(
        &self,
        key: &SchemePublicKey,
        value: u64,
        bits: RangeBits,
        ctx: &ProofContext,
    ) -> Result<EncryptedValue, CryptoError> {
        key.require_scheme(self.id())?;
        let pk = PublicKey::from_bytes(&key.public_key)?;
        bits.check(value)?;

        let mut rng = OsRng;
        let (ct, r) = pk.encrypt(value, &mut rng);
        let ciphertext = ct.to_bytes();
        let mut transcript = ctx.transcript(&key.public_key, &ciphertext);
        let proof = RangeProof::prove(&mut transcript, &pk, value, &r, bits, &mut rng)?;

        Ok(EncryptedValue {
            scheme: self.id(),
            bits,
            ciphertext: ciphertext.to_vec(),
            proof: proof.to_bytes(),
        })
    }

    fn verify(
        &self,
        key: &SchemePublicKey,
        payload: &EncryptedValue,
        bits: RangeBits,
        ctx: &ProofContext,
    ) -> Result<(), VerifyError> {
        key.require_scheme(self.id())?;
        if payload.scheme != self.id() {
            return Err(VerifyError::KeyMismatch(format!(
                "payload scheme {} does not match {}",
                payload.scheme,
                self.id()
            )));
        }
        if payload.bits != bits {
            return Err(VerifyError::RangeMismatch {
                expected: bits.get(),
                found: payload.bits.get(),
            });
        }
        let pk = PublicKey::from_bytes(&key.public_key)?;
        let ct = Ciphertext::from_bytes(&payload.ciphertext)?;
        let proof = RangeProof::from_bytes(&payload.proof)?;
        if proof.bits() != bits {
            return Err(VerifyError::RangeMismatch {
                expected: bits.get(),
                found: proof.bits().get(),
            });
        }
        let mut transcript = ctx.transcript(&key.public_key, &payload.ciphertext);
        proof.verify(&mut transcript, &pk, &ct)
    }
}
