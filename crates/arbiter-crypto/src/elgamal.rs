//! # Exponential ElGamal over ristretto255
//!
//! `pk = sk·G`, `Enc(v; r) = (r·G, v·G + r·pk)`. Ciphertexts add
//! component-wise, so `Enc(a) + Enc(b)` decrypts to `a + b` without either
//! plaintext being revealed. Decryption recovers `v·G` and solves the
//! bounded discrete log with baby-step/giant-step.
//!
//! ## Security Invariant
//!
//! Every encryption draws fresh randomness: two ciphertexts of the same
//! value are unlinkable. Secret keys are zeroized on drop and never
//! printed.

use std::collections::HashMap;
use std::ops::{Add, Sub};

use curve25519_dalek::constants::RISTRETTO_BASEPOINT_POINT;
use curve25519_dalek::ristretto::{CompressedRistretto, RistrettoPoint};
use curve25519_dalek::scalar::Scalar;
use curve25519_dalek::traits::Identity;
use rand_core::CryptoRngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::CryptoError;

/// Largest range decryption will search.
pub const MAX_DECRYPT_BITS: u8 = 40;

/// Compressed ristretto point length.
pub const POINT_LEN: usize = 32;

/// Encoded ciphertext length (`R || C`).
pub const CIPHERTEXT_LEN: usize = 2 * POINT_LEN;

pub(crate) fn decode_point(bytes: &[u8]) -> Option<RistrettoPoint> {
    let arr: [u8; POINT_LEN] = bytes.try_into().ok()?;
    CompressedRistretto(arr).decompress()
}

pub(crate) fn decode_scalar(bytes: &[u8]) -> Option<Scalar> {
    let arr: [u8; 32] = bytes.try_into().ok()?;
    Option::from(Scalar::from_canonical_bytes(arr))
}

// ── Keys ───────────────────────────────────────────────────────────────

/// An ElGamal secret key.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretKey(Scalar);

impl SecretKey {
    /// Generate a fresh secret key.
    pub fn generate<R: CryptoRngCore + ?Sized>(rng: &mut R) -> Self {
        loop {
            let s = Scalar::random(rng);
            if s != Scalar::ZERO {
                return Self(s);
            }
        }
    }

    /// Decode a canonical, non-zero 32-byte scalar.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let s = decode_scalar(bytes)
            .ok_or_else(|| CryptoError::InvalidSecretKey("not a canonical 32-byte scalar".into()))?;
        if s == Scalar::ZERO {
            return Err(CryptoError::InvalidSecretKey("zero scalar".into()));
        }
        Ok(Self(s))
    }

    /// The scalar bytes. Handle with care.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0.to_bytes()
    }

    /// The matching public key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.0 * RISTRETTO_BASEPOINT_POINT)
    }

    /// Decrypt a ciphertext known to encode a value below `2^bits`.
    pub fn decrypt(&self, ct: &Ciphertext, bits: u8) -> Result<u64, CryptoError> {
        if bits == 0 || bits > MAX_DECRYPT_BITS {
            return Err(CryptoError::DecryptionFailed(format!(
                "search range must be 1..={MAX_DECRYPT_BITS} bits, got {bits}"
            )));
        }
        let target = ct.c - self.0 * ct.r;
        discrete_log(&target, bits).ok_or_else(|| {
            CryptoError::DecryptionFailed(format!("plaintext not within {bits} bits"))
        })
    }
}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretKey(<redacted>)")
    }
}

/// An ElGamal public key. Never the identity point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicKey(RistrettoPoint);

impl PublicKey {
    /// Decode a 32-byte compressed point, rejecting the identity.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != POINT_LEN {
            return Err(CryptoError::InvalidKey(format!(
                "expected {POINT_LEN} bytes, got {}",
                bytes.len()
            )));
        }
        let point = decode_point(bytes)
            .ok_or_else(|| CryptoError::InvalidKey("not a valid ristretto255 point".into()))?;
        if point == RistrettoPoint::identity() {
            return Err(CryptoError::InvalidKey("identity point".into()));
        }
        Ok(Self(point))
    }

    /// The compressed point.
    pub fn to_bytes(&self) -> [u8; POINT_LEN] {
        self.0.compress().to_bytes()
    }

    pub(crate) fn point(&self) -> &RistrettoPoint {
        &self.0
    }

    /// Encrypt `value` with fresh randomness, returning the randomness for
    /// use by a range proof.
    pub fn encrypt<R: CryptoRngCore + ?Sized>(&self, value: u64, rng: &mut R) -> (Ciphertext, Scalar) {
        let r = Scalar::random(rng);
        (self.encrypt_with_randomness(value, &r), r)
    }

    /// Encrypt `value` with caller-chosen randomness.
    pub fn encrypt_with_randomness(&self, value: u64, r: &Scalar) -> Ciphertext {
        Ciphertext {
            r: r * RISTRETTO_BASEPOINT_POINT,
            c: Scalar::from(value) * RISTRETTO_BASEPOINT_POINT + r * self.0,
        }
    }
}

// ── Ciphertexts ────────────────────────────────────────────────────────

/// An ElGamal ciphertext `(r·G, v·G + r·pk)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ciphertext {
    pub(crate) r: RistrettoPoint,
    pub(crate) c: RistrettoPoint,
}

impl Ciphertext {
    /// The encryption of zero with zero randomness; the additive identity.
    pub fn zero() -> Self {
        Self {
            r: RistrettoPoint::identity(),
            c: RistrettoPoint::identity(),
        }
    }

    /// Encode as `R || C`.
    pub fn to_bytes(&self) -> [u8; CIPHERTEXT_LEN] {
        let mut out = [0u8; CIPHERTEXT_LEN];
        out[..POINT_LEN].copy_from_slice(self.r.compress().as_bytes());
        out[POINT_LEN..].copy_from_slice(self.c.compress().as_bytes());
        out
    }

    /// Decode `R || C`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != CIPHERTEXT_LEN {
            return Err(CryptoError::Encoding(format!(
                "ciphertext must be {CIPHERTEXT_LEN} bytes, got {}",
                bytes.len()
            )));
        }
        let r = decode_point(&bytes[..POINT_LEN])
            .ok_or_else(|| CryptoError::Encoding("ciphertext R is not a valid point".into()))?;
        let c = decode_point(&bytes[POINT_LEN..])
            .ok_or_else(|| CryptoError::Encoding("ciphertext C is not a valid point".into()))?;
        Ok(Self { r, c })
    }
}

impl Add for Ciphertext {
    type Output = Ciphertext;

    fn add(self, rhs: Ciphertext) -> Ciphertext {
        Ciphertext {
            r: self.r + rhs.r,
            c: self.c + rhs.c,
        }
    }
}

impl Sub for Ciphertext {
    type Output = Ciphertext;

    fn sub(self, rhs: Ciphertext) -> Ciphertext {
        Ciphertext {
            r: self.r - rhs.r,
            c: self.c - rhs.c,
        }
    }
}

impl std::iter::Sum for Ciphertext {
    fn sum<I: Iterator<Item = Ciphertext>>(iter: I) -> Self {
        iter.fold(Ciphertext::zero(), Add::add)
    }
}

// ── Discrete log ───────────────────────────────────────────────────────

/// Solve `target = v·G` for `v < 2^bits` by baby-step/giant-step.
fn discrete_log(target: &RistrettoPoint, bits: u8) -> Option<u64> {
    let g = RISTRETTO_BASEPOINT_POINT;
    let m: u64 = 1u64 << bits.div_ceil(2);
    let bound: u64 = 1u64 << bits;

    let mut baby: HashMap<[u8; 32], u64> = HashMap::with_capacity(m as usize);
    let mut step = RistrettoPoint::identity();
    for j in 0..m {
        baby.entry(step.compress().to_bytes()).or_insert(j);
        step += g;
    }

    let giant = Scalar::from(m) * g;
    let mut gamma = *target;
    for i in 0..m {
        if let Some(j) = baby.get(gamma.compress().as_bytes()) {
            let v = i * m + j;
            return (v < bound).then_some(v);
        }
        gamma -= giant;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_core::OsRng;

    fn keypair() -> (SecretKey, PublicKey) {
        let sk = SecretKey::generate(&mut OsRng);
        let pk = sk.public_key();
        (sk, pk)
    }

    #[test]
    fn decrypt_inverts_encrypt() {
        let (sk, pk) = keypair();
        for v in [0u64, 1, 2, 255, 2500, 65_535] {
            let (ct, _) = pk.encrypt(v, &mut OsRng);
            assert_eq!(sk.decrypt(&ct, 16).unwrap(), v);
        }
    }

    #[test]
    fn homomorphic_addition_and_subtraction() {
        let (sk, pk) = keypair();
        let (a, _) = pk.encrypt(1200, &mut OsRng);
        let (b, _) = pk.encrypt(34, &mut OsRng);
        assert_eq!(sk.decrypt(&(a + b), 16).unwrap(), 1234);
        assert_eq!(sk.decrypt(&(a - b), 16).unwrap(), 1166);
    }

    #[test]
    fn sum_tallies_votes() {
        let (sk, pk) = keypair();
        let votes = [1u64, 0, 1, 1, 0, 1, 1];
        let tally: Ciphertext = votes.iter().map(|v| pk.encrypt(*v, &mut OsRng).0).sum();
        assert_eq!(sk.decrypt(&tally, 8).unwrap(), 5);
        assert_eq!(sk.decrypt(&Ciphertext::zero(), 8).unwrap(), 0);
    }

    #[test]
    fn fresh_randomness_per_encryption() {
        let (_, pk) = keypair();
        let (a, _) = pk.encrypt(42, &mut OsRng);
        let (b, _) = pk.encrypt(42, &mut OsRng);
        assert_ne!(a, b);
    }

    #[test]
    fn decrypt_fails_outside_search_range() {
        let (sk, pk) = keypair();
        let (ct, _) = pk.encrypt(300, &mut OsRng);
        assert!(matches!(sk.decrypt(&ct, 8), Err(CryptoError::DecryptionFailed(_))));
        assert!(matches!(sk.decrypt(&ct, 0), Err(CryptoError::DecryptionFailed(_))));
        assert!(matches!(sk.decrypt(&ct, 41), Err(CryptoError::DecryptionFailed(_))));
    }

    #[test]
    fn wrong_key_does_not_decrypt() {
        let (_, pk) = keypair();
        let (other, _) = keypair();
        let (ct, _) = pk.encrypt(7, &mut OsRng);
        assert_ne!(other.decrypt(&ct, 12).ok(), Some(7));
    }

    #[test]
    fn ciphertext_bytes_roundtrip() {
        let (_, pk) = keypair();
        let (ct, _) = pk.encrypt(99, &mut OsRng);
        let bytes = ct.to_bytes();
        assert_eq!(Ciphertext::from_bytes(&bytes).unwrap(), ct);
        assert!(Ciphertext::from_bytes(&bytes[..63]).is_err());
    }

    #[test]
    fn public_key_rejects_identity_and_garbage() {
        let identity = RistrettoPoint::identity().compress().to_bytes();
        assert!(matches!(
            PublicKey::from_bytes(&identity),
            Err(CryptoError::InvalidKey(_))
        ));
        assert!(PublicKey::from_bytes(&[0xff; 32]).is_err());
        assert!(PublicKey::from_bytes(&[1u8; 16]).is_err());
    }

    #[test]
    fn secret_key_bytes() {
        let (sk, pk) = keypair();
        let restored = SecretKey::from_bytes(&sk.to_bytes()).unwrap();
        assert_eq!(restored.public_key(), pk);
        assert!(SecretKey::from_bytes(&[0u8; 32]).is_err());
        assert_eq!(format!("{sk:?}"), "SecretKey(<redacted>)");
    }
}
