//! # Simulated XOR Backend
//!
//! The historical client-side "FHE" helper, kept so that demos and
//! regression tests can still exercise it. Each byte of the plaintext is
//! XORed with `key[i % 32]` of a random per-session key, and the "proof"
//! is `SHA-256(original) || SHA-256(ciphertext)`.
//!
//! ## Security Notice
//!
//! This backend provides NO confidentiality. The same plaintext always
//! produces the same ciphertext within a session, the key never leaves the
//! process, and the proof can only be checked by someone who already holds
//! the plaintext. It reports `is_confidential() == false` and its
//! third-party `verify` always fails with `NotThirdPartyVerifiable`.
//! Only ever construct it by explicit choice.

use rand_core::{OsRng, RngCore};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{CryptoError, VerifyError};
use crate::range_proof::RangeBits;
use crate::scheme::{ConfidentialScheme, EncryptedValue, ProofContext, SchemeId, SchemePublicKey};

/// Session key length.
pub const SESSION_KEY_LEN: usize = 32;

/// Simulated proof length: two SHA-256 digests.
pub const SIMULATED_PROOF_LEN: usize = 64;

/// Generate a random session key.
pub fn generate_session_key() -> [u8; SESSION_KEY_LEN] {
    let mut key = [0u8; SESSION_KEY_LEN];
    OsRng.fill_bytes(&mut key);
    key
}

/// XOR `data` with the repeating key. Applying it twice restores `data`.
pub fn xor_with_key(data: &[u8], key: &[u8; SESSION_KEY_LEN]) -> Vec<u8> {
    data.iter()
        .enumerate()
        .map(|(i, b)| b ^ key[i % SESSION_KEY_LEN])
        .collect()
}

/// `SHA-256(original) || SHA-256(ciphertext)`.
pub fn simulated_proof(original: &[u8], ciphertext: &[u8]) -> Vec<u8> {
    let mut proof = Vec::with_capacity(SIMULATED_PROOF_LEN);
    proof.extend_from_slice(&Sha256::digest(original));
    proof.extend_from_slice(&Sha256::digest(ciphertext));
    proof
}

/// Recompute the simulated proof and compare it in constant time.
pub fn verify_encrypted_data(original: &[u8], ciphertext: &[u8], proof: &[u8]) -> bool {
    let expected = simulated_proof(original, ciphertext);
    expected.len() == proof.len() && bool::from(expected.as_slice().ct_eq(proof))
}

/// Plaintext bytes for a value of the given range: one byte for a single
/// bit, big-endian `u32` up to 32 bits, big-endian `u64` beyond.
pub fn plaintext_layout(value: u64, bits: RangeBits) -> Result<Vec<u8>, CryptoError> {
    bits.check(value)?;
    Ok(match bits.get() {
        1 => vec![value as u8],
        2..=32 => (value as u32).to_be_bytes().to_vec(),
        _ => value.to_be_bytes().to_vec(),
    })
}

/// The simulated backend, holding one session key.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SimulatedScheme {
    key: [u8; SESSION_KEY_LEN],
}

impl SimulatedScheme {
    /// A backend with a fresh random session key.
    pub fn new() -> Self {
        Self::with_key(generate_session_key())
    }

    /// A backend with a fixed session key.
    pub fn with_key(key: [u8; SESSION_KEY_LEN]) -> Self {
        Self { key }
    }

    /// XOR-"encrypt" raw bytes with the session key.
    pub fn simulate_encryption(&self, data: &[u8]) -> Vec<u8> {
        xor_with_key(data, &self.key)
    }

    /// Undo [`simulate_encryption`](Self::simulate_encryption).
    pub fn simulate_decryption(&self, ciphertext: &[u8]) -> Vec<u8> {
        xor_with_key(ciphertext, &self.key)
    }
}

impl Default for SimulatedScheme {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SimulatedScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SimulatedScheme { key: <redacted> }")
    }
}

impl ConfidentialScheme for SimulatedScheme {
    fn id(&self) -> SchemeId {
        SchemeId::SimulatedXor
    }

    fn is_confidential(&self) -> bool {
        false
    }

    fn encrypt(
        &self,
        key: &SchemePublicKey,
        value: u64,
        bits: RangeBits,
        _ctx: &ProofContext,
    ) -> Result<EncryptedValue, CryptoError> {
        key.require_scheme(self.id())?;
        let plaintext = plaintext_layout(value, bits)?;
        let ciphertext = self.simulate_encryption(&plaintext);
        let proof = simulated_proof(&plaintext, &ciphertext);
        Ok(EncryptedValue {
            scheme: self.id(),
            bits,
            ciphertext,
            proof,
        })
    }

    fn verify(
        &self,
        _key: &SchemePublicKey,
        _payload: &EncryptedValue,
        _bits: RangeBits,
        _ctx: &ProofContext,
    ) -> Result<(), VerifyError> {
        Err(VerifyError::NotThirdPartyVerifiable(self.id()))
    }
}
