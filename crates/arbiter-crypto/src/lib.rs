//! # arbiter-crypto — Confidential Inputs for Secret Arbiter
//!
//! Prepares confidential contract arguments on the client: the plaintext is
//! encrypted under a public key the client did not generate, and a proof
//! bound to the exact contract call shows the ciphertext lies in its
//! declared range.
//!
//! ## Backends
//!
//! - [`ElGamalScheme`]: exponential ElGamal over ristretto255. Ciphertexts
//!   are additively homomorphic and [`RangeProof`]s are checkable by anyone
//!   holding the public key.
//! - `SimulatedScheme` (feature `simulation`, on by default): the legacy
//!   XOR construction. Not confidential; see its module notice.
//!
//! ## Crate Policy
//!
//! - Secret material is zeroized on drop and redacted from `Debug`.
//! - Randomness comes from `OsRng` only.
//! - No `unsafe` code.

pub mod elgamal;
pub mod error;
pub mod range_proof;
pub mod scheme;
pub mod sensitive;
#[cfg(feature = "simulation")]
pub mod simulated;
pub mod transcript;

pub use elgamal::{Ciphertext, PublicKey, SecretKey, CIPHERTEXT_LEN, MAX_DECRYPT_BITS};
pub use error::{CryptoError, VerifyError};
pub use range_proof::{RangeBits, RangeProof, BIT_PROOF_LEN, PROOF_VERSION};
pub use scheme::{
    scheme_for, ConfidentialScheme, ElGamalScheme, EncryptedValue, ProofContext, SchemeId,
    SchemePublicKey,
};
pub use sensitive::hash_sensitive_data;
#[cfg(feature = "simulation")]
pub use simulated::{verify_encrypted_data, SimulatedScheme};
pub use transcript::Transcript;
