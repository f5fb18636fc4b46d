//! # Bit-Decomposition Range Proofs
//!
//! Proves that an ElGamal ciphertext encrypts a value in `[0, 2^bits)`
//! without revealing it. The prover publishes one bit ciphertext
//! `(r_i·G, b_i·G + r_i·Y)` per bit, each with a Chaum–Pedersen OR-proof
//! that `b_i ∈ {0, 1}`, and chooses the bit randomness so that
//! `Σ 2^i · bit_i` equals the submitted ciphertext exactly.
//!
//! ## Wire Format
//!
//! `version (1) || bits (1) || bits × (R_i || C_i || e0 || e1 || z0 || z1)`,
//! 192 bytes per bit. All points are compressed ristretto255, all scalars
//! canonical little-endian.
//!
//! ## Security Invariant
//!
//! The transcript handed to [`RangeProof::prove`] and
//! [`RangeProof::verify`] must already hold the public key, call binding,
//! and ciphertext. A proof produced under one binding never verifies
//! under another.

use curve25519_dalek::constants::RISTRETTO_BASEPOINT_POINT;
use curve25519_dalek::ristretto::RistrettoPoint;
use curve25519_dalek::scalar::Scalar;
use rand_core::CryptoRngCore;
use serde::{Deserialize, Serialize};

use crate::elgamal::{decode_point, decode_scalar, Ciphertext, PublicKey, POINT_LEN};
use crate::error::{CryptoError, VerifyError};
use crate::transcript::Transcript;

/// Current proof encoding version.
pub const PROOF_VERSION: u8 = 1;

/// Encoded length of one bit entry.
pub const BIT_PROOF_LEN: usize = 2 * POINT_LEN + 4 * 32;

const HEADER_LEN: usize = 2;

// ── Range width ────────────────────────────────────────────────────────

/// A declared range width, `1..=64` bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct RangeBits(u8);

impl RangeBits {
    /// One bit; votes.
    pub const BOOL: RangeBits = RangeBits(1);

    /// Thirty-two bits; amounts and reputation scores.
    pub const U32: RangeBits = RangeBits(32);

    /// Sixty-four bits; the widest supported range.
    pub const U64: RangeBits = RangeBits(64);

    /// Validate a range width.
    pub fn new(bits: u32) -> Result<Self, CryptoError> {
        match u8::try_from(bits) {
            Ok(b @ 1..=64) => Ok(Self(b)),
            _ => Err(CryptoError::InvalidRange(bits)),
        }
    }

    /// The width in bits.
    pub fn get(&self) -> u8 {
        self.0
    }

    /// Whether `value` fits in the range.
    pub fn contains(&self, value: u64) -> bool {
        self.0 == 64 || value >> self.0 == 0
    }

    /// Reject `value` if it does not fit.
    pub fn check(&self, value: u64) -> Result<(), CryptoError> {
        if self.contains(value) {
            Ok(())
        } else {
            Err(CryptoError::OutOfRange {
                value,
                bits: self.0,
            })
        }
    }
}

impl TryFrom<u8> for RangeBits {
    type Error = CryptoError;

    fn try_from(bits: u8) -> Result<Self, Self::Error> {
        Self::new(u32::from(bits))
    }
}

impl From<RangeBits> for u8 {
    fn from(bits: RangeBits) -> u8 {
        bits.0
    }
}

impl std::fmt::Display for RangeBits {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} bits", self.0)
    }
}

// ── Proof ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
struct BitProof {
    commitment: Ciphertext,
    e0: Scalar,
    e1: Scalar,
    z0: Scalar,
    z1: Scalar,
}

/// A non-interactive proof that a ciphertext encodes a value in range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeProof {
    bits: RangeBits,
    entries: Vec<BitProof>,
}

fn pow2(i: usize) -> Scalar {
    Scalar::from(1u64 << i)
}

/// The OR-proof commitments `(A, B)` for branch `bit` reconstructed from
/// the challenge and response.
fn branch_commitments(
    y: &RistrettoPoint,
    commitment: &Ciphertext,
    bit: u64,
    e: &Scalar,
    z: &Scalar,
) -> (RistrettoPoint, RistrettoPoint) {
    let g = RISTRETTO_BASEPOINT_POINT;
    let shifted = commitment.c - Scalar::from(bit) * g;
    (z * g - e * commitment.r, z * y - e * shifted)
}

fn absorb_bit(
    transcript: &mut Transcript,
    commitment: &Ciphertext,
    a0: &RistrettoPoint,
    b0: &RistrettoPoint,
    a1: &RistrettoPoint,
    b1: &RistrettoPoint,
) -> Scalar {
    transcript.append_point(b"bit-R", &commitment.r);
    transcript.append_point(b"bit-C", &commitment.c);
    transcript.append_point(b"A0", a0);
    transcript.append_point(b"B0", b0);
    transcript.append_point(b"A1", a1);
    transcript.append_point(b"B1", b1);
    transcript.challenge_scalar(b"bit-challenge")
}

impl RangeProof {
    /// Prove that `ct = pk.encrypt_with_randomness(value, randomness)` lies
    /// in `bits`.
    pub fn prove<R: CryptoRngCore + ?Sized>(
        transcript: &mut Transcript,
        pk: &PublicKey,
        value: u64,
        randomness: &Scalar,
        bits: RangeBits,
        rng: &mut R,
    ) -> Result<Self, CryptoError> {
        bits.check(value)?;
        let n = usize::from(bits.get());
        let g = RISTRETTO_BASEPOINT_POINT;
        let y = pk.point();

        // r_0 absorbs the remainder so the weighted sum of bit randomness is r.
        let mut bit_randomness: Vec<Scalar> = (0..n).map(|_| Scalar::ZERO).collect();
        let mut tail = Scalar::ZERO;
        for (i, r_i) in bit_randomness.iter_mut().enumerate().skip(1) {
            *r_i = Scalar::random(rng);
            tail += pow2(i) * *r_i;
        }
        bit_randomness[0] = randomness - tail;

        transcript.append_u64(b"range-bits", u64::from(bits.get()));

        let mut entries = Vec::with_capacity(n);
        for (i, r_i) in bit_randomness.iter().enumerate() {
            let b = (value >> i) & 1;
            let commitment = pk.encrypt_with_randomness(b, r_i);

            let e_sim = Scalar::random(rng);
            let z_sim = Scalar::random(rng);
            let (a_sim, b_sim) = branch_commitments(y, &commitment, 1 - b, &e_sim, &z_sim);

            let w = Scalar::random(rng);
            let (a_real, b_real) = (w * g, w * y);

            let ((a0, b0), (a1, b1)) = if b == 0 {
                ((a_real, b_real), (a_sim, b_sim))
            } else {
                ((a_sim, b_sim), (a_real, b_real))
            };
            let e = absorb_bit(transcript, &commitment, &a0, &b0, &a1, &b1);

            let e_real = e - e_sim;
            let z_real = w + e_real * r_i;

            let (e0, e1, z0, z1) = if b == 0 {
                (e_real, e_sim, z_real, z_sim)
            } else {
                (e_sim, e_real, z_sim, z_real)
            };
            entries.push(BitProof {
                commitment,
                e0,
                e1,
                z0,
                z1,
            });
        }

        Ok(Self { bits, entries })
    }

    /// Verify the proof against `ct` under `pk`.
    pub fn verify(
        &self,
        transcript: &mut Transcript,
        pk: &PublicKey,
        ct: &Ciphertext,
    ) -> Result<(), VerifyError> {
        let n = usize::from(self.bits.get());
        if self.entries.len() != n {
            return Err(VerifyError::Malformed(format!(
                "proof declares {n} bits but carries {} entries",
                self.entries.len()
            )));
        }
        let y = pk.point();

        transcript.append_u64(b"range-bits", u64::from(self.bits.get()));

        let mut recombined = Ciphertext::zero();
        for (i, entry) in self.entries.iter().enumerate() {
            let (a0, b0) = branch_commitments(y, &entry.commitment, 0, &entry.e0, &entry.z0);
            let (a1, b1) = branch_commitments(y, &entry.commitment, 1, &entry.e1, &entry.z1);
            let e = absorb_bit(transcript, &entry.commitment, &a0, &b0, &a1, &b1);
            if entry.e0 + entry.e1 != e {
                return Err(VerifyError::InvalidProof(format!("bit {i} OR-proof rejected")));
            }
            let weight = pow2(i);
            recombined = recombined
                + Ciphertext {
                    r: weight * entry.commitment.r,
                    c: weight * entry.commitment.c,
                };
        }

        if recombined != *ct {
            return Err(VerifyError::InvalidProof(
                "bit commitments do not recombine to the ciphertext".into(),
            ));
        }
        Ok(())
    }

    /// The range this proof covers.
    pub fn bits(&self) -> RangeBits {
        self.bits
    }

    /// Encode to the wire format.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_LEN + self.entries.len() * BIT_PROOF_LEN);
        out.push(PROOF_VERSION);
        out.push(self.bits.get());
        for entry in &self.entries {
            out.extend_from_slice(&entry.commitment.to_bytes());
            out.extend_from_slice(entry.e0.as_bytes());
            out.extend_from_slice(entry.e1.as_bytes());
            out.extend_from_slice(entry.z0.as_bytes());
            out.extend_from_slice(entry.z1.as_bytes());
        }
        out
    }

    /// Decode the wire format.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let (header, body) = match bytes {
            [version, bits, body @ ..] => ((*version, *bits), body),
            _ => return Err(CryptoError::Encoding("proof shorter than header".into())),
        };
        if header.0 != PROOF_VERSION {
            return Err(CryptoError::Encoding(format!(
                "unsupported proof version {}",
                header.0
            )));
        }
        let bits = RangeBits::try_from(header.1)?;
        let n = usize::from(bits.get());
        if body.len() != n * BIT_PROOF_LEN {
            return Err(CryptoError::Encoding(format!(
                "proof for {n} bits must carry {} bytes, got {}",
                n * BIT_PROOF_LEN,
                body.len()
            )));
        }

        let scalar = |chunk: &[u8]| {
            decode_scalar(chunk).ok_or_else(|| CryptoError::Encoding("non-canonical scalar".into()))
        };
        let mut entries = Vec::with_capacity(n);
        for chunk in body.chunks_exact(BIT_PROOF_LEN) {
            let r = decode_point(&chunk[..32])
                .ok_or_else(|| CryptoError::Encoding("invalid bit commitment R".into()))?;
            let c = decode_point(&chunk[32..64])
                .ok_or_else(|| CryptoError::Encoding("invalid bit commitment C".into()))?;
            entries.push(BitProof {
                commitment: Ciphertext { r, c },
                e0: scalar(&chunk[64..96])?,
                e1: scalar(&chunk[96..128])?,
                z0: scalar(&chunk[128..160])?,
                z1: scalar(&chunk[160..192])?,
            });
        }
        Ok(Self { bits, entries })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elgamal::SecretKey;
    use rand_core::OsRng;

    fn transcript() -> Transcript {
        let mut t = Transcript::new(b"range-proof-test");
        t.append_message(b"binding", b"call-1");
        t
    }

    fn setup(value: u64, bits: RangeBits) -> (PublicKey, Ciphertext, RangeProof) {
        let pk = SecretKey::generate(&mut OsRng).public_key();
        let (ct, r) = pk.encrypt(value, &mut OsRng);
        let proof = RangeProof::prove(&mut transcript(), &pk, value, &r, bits, &mut OsRng).unwrap();
        (pk, ct, proof)
    }

    #[test]
    fn valid_proof_verifies() {
        for (value, bits) in [(0u64, 8u32), (1, 1), (0, 1), (255, 8), (2500, 32)] {
            let bits = RangeBits::new(bits).unwrap();
            let (pk, ct, proof) = setup(value, bits);
            proof.verify(&mut transcript(), &pk, &ct).unwrap();
        }
    }

    #[test]
    fn full_width_range() {
        let (pk, ct, proof) = setup(u64::MAX, RangeBits::U64);
        proof.verify(&mut transcript(), &pk, &ct).unwrap();
    }

    #[test]
    fn out_of_range_value_cannot_be_proved() {
        let pk = SecretKey::generate(&mut OsRng).public_key();
        let (_, r) = pk.encrypt(256, &mut OsRng);
        let err = RangeProof::prove(
            &mut transcript(),
            &pk,
            256,
            &r,
            RangeBits::new(8).unwrap(),
            &mut OsRng,
        )
        .unwrap_err();
        assert_eq!(err, CryptoError::OutOfRange { value: 256, bits: 8 });
    }

    #[test]
    fn different_ciphertext_rejected() {
        let (pk, _, proof) = setup(10, RangeBits::new(8).unwrap());
        let (other, _) = pk.encrypt(10, &mut OsRng);
        assert!(matches!(
            proof.verify(&mut transcript(), &pk, &other),
            Err(VerifyError::InvalidProof(_))
        ));
    }

    #[test]
    fn different_binding_rejected() {
        let (pk, ct, proof) = setup(10, RangeBits::new(8).unwrap());
        let mut t = Transcript::new(b"range-proof-test");
        t.append_message(b"binding", b"call-2");
        assert!(proof.verify(&mut t, &pk, &ct).is_err());
    }

    #[test]
    fn different_key_rejected() {
        let (_, ct, proof) = setup(10, RangeBits::new(8).unwrap());
        let other = SecretKey::generate(&mut OsRng).public_key();
        assert!(proof.verify(&mut transcript(), &other, &ct).is_err());
    }

    #[test]
    fn tampered_proof_bytes_rejected() {
        let (pk, ct, proof) = setup(77, RangeBits::new(8).unwrap());
        let bytes = proof.to_bytes();
        assert_eq!(bytes.len(), 2 + 8 * BIT_PROOF_LEN);
        assert_eq!(RangeProof::from_bytes(&bytes).unwrap(), proof);

        for pos in [2usize, 40, 70, 100, 130, 170, bytes.len() - 1] {
            let mut tampered = bytes.clone();
            tampered[pos] ^= 0x01;
            let rejected = match RangeProof::from_bytes(&tampered) {
                Ok(p) => p.verify(&mut transcript(), &pk, &ct).is_err(),
                Err(_) => true,
            };
            assert!(rejected, "tamper at byte {pos} accepted");
        }
    }

    #[test]
    fn malformed_encodings_rejected() {
        let (_, _, proof) = setup(3, RangeBits::new(2).unwrap());
        let bytes = proof.to_bytes();
        assert!(RangeProof::from_bytes(&[]).is_err());
        assert!(RangeProof::from_bytes(&bytes[..bytes.len() - 1]).is_err());

        let mut wrong_version = bytes.clone();
        wrong_version[0] = 2;
        assert!(RangeProof::from_bytes(&wrong_version).is_err());

        let mut wrong_bits = bytes;
        wrong_bits[1] = 0;
        assert!(matches!(
            RangeProof::from_bytes(&wrong_bits),
            Err(CryptoError::InvalidRange(0))
        ));
    }

    #[test]
    fn range_bits_bounds() {
        assert!(RangeBits::new(0).is_err());
        assert!(RangeBits::new(65).is_err());
        assert!(RangeBits::new(300).is_err());
        assert!(RangeBits::BOOL.contains(1));
        assert!(!RangeBits::BOOL.contains(2));
        assert!(RangeBits::U32.contains(u64::from(u32::MAX)));
        assert!(!RangeBits::U32.contains(1 << 32));
        assert!(RangeBits::U64.contains(u64::MAX));
    }
}
