//! # Cryptographic Error Types
//!
//! Encryption failures and verification failures are separate enums:
//! a caller preparing a payload and a verifier checking one handle
//! disjoint sets of conditions.

use thiserror::Error;

use crate::scheme::SchemeId;

/// Error preparing, decoding, or decrypting confidential values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// The key belongs to a different scheme than the one asked to use it.
    #[error("scheme mismatch: key is for {key}, backend is {backend}")]
    SchemeMismatch {
        /// Scheme the key was issued for.
        key: SchemeId,
        /// Scheme of the backend.
        backend: SchemeId,
    },

    /// Public key bytes are malformed or degenerate.
    #[error("invalid public key: {0}")]
    InvalidKey(String),

    /// Secret key bytes are malformed.
    #[error("invalid secret key: {0}")]
    InvalidSecretKey(String),

    /// The plaintext does not fit the declared range.
    #[error("value {value} outside declared range [0, 2^{bits})")]
    OutOfRange {
        /// The rejected plaintext.
        value: u64,
        /// Declared range width in bits.
        bits: u8,
    },

    /// A range width outside 1..=64 bits.
    #[error("range width must be between 1 and 64 bits, got {0}")]
    InvalidRange(u32),

    /// Ciphertext or proof bytes could not be decoded.
    #[error("malformed encoding: {0}")]
    Encoding(String),

    /// Decryption did not recover a value in range.
    #[error("decryption failed: {0}")]
    DecryptionFailed(String),

    /// The requested scheme is not compiled into this build.
    #[error("encryption scheme unavailable: {0}")]
    SchemeUnavailable(String),
}

/// Error verifying a confidential payload.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerifyError {
    /// The proof does not verify.
    #[error("invalid proof: {0}")]
    InvalidProof(String),

    /// The proof covers a different range than the verifier expects.
    #[error("range mismatch: expected {expected} bits, proof covers {found}")]
    RangeMismatch {
        /// Range the verifier expects.
        expected: u8,
        /// Range encoded in the proof.
        found: u8,
    },

    /// Payload bytes could not be decoded.
    #[error("malformed payload: {0}")]
    Malformed(String),

    /// The payload or key belongs to another scheme.
    #[error("key mismatch: {0}")]
    KeyMismatch(String),

    /// The scheme has no proof a third party can check.
    #[error("{0} proofs are not third-party verifiable")]
    NotThirdPartyVerifiable(SchemeId),
}

impl From<CryptoError> for VerifyError {
    fn from(err: CryptoError) -> Self {
        match err {
            CryptoError::SchemeMismatch { .. } | CryptoError::InvalidKey(_) => {
                Self::KeyMismatch(err.to_string())
            }
            other => Self::Malformed(other.to_string()),
        }
    }
}
