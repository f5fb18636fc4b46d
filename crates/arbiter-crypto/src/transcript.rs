//! # Fiat–Shamir Transcript
//!
//! A SHA-512 running hash with length-prefixed, labelled messages.
//! Challenges are derived from a clone of the running state and then fed
//! back into it, so every later challenge depends on every earlier one.

use curve25519_dalek::ristretto::RistrettoPoint;
use curve25519_dalek::scalar::Scalar;
use sha2::{Digest, Sha512};

/// Transcript protocol version, absorbed before the domain separator.
const TRANSCRIPT_VERSION: &[u8] = b"arbiter-transcript-v1";

/// Running Fiat–Shamir transcript.
#[derive(Clone)]
pub struct Transcript {
    state: Sha512,
}

impl Transcript {
    /// Start a transcript under a domain separator.
    pub fn new(domain_sep: &[u8]) -> Self {
        let mut state = Sha512::new();
        state.update(TRANSCRIPT_VERSION);
        state.update((domain_sep.len() as u64).to_le_bytes());
        state.update(domain_sep);
        Self { state }
    }

    /// Absorb a labelled message.
    pub fn append_message(&mut self, label: &[u8], message: &[u8]) {
        self.state.update((label.len() as u64).to_le_bytes());
        self.state.update(label);
        self.state.update((message.len() as u64).to_le_bytes());
        self.state.update(message);
    }

    /// Absorb a labelled u64.
    pub fn append_u64(&mut self, label: &[u8], value: u64) {
        self.append_message(label, &value.to_le_bytes());
    }

    /// Absorb a labelled point in compressed form.
    pub fn append_point(&mut self, label: &[u8], point: &RistrettoPoint) {
        self.append_message(label, point.compress().as_bytes());
    }

    /// Derive a challenge scalar and chain it into the state.
    pub fn challenge_scalar(&mut self, label: &[u8]) -> Scalar {
        self.append_message(b"challenge", label);
        let mut wide = [0u8; 64];
        wide.copy_from_slice(&self.state.clone().finalize());
        self.state.update(wide);
        Scalar::from_bytes_mod_order_wide(&wide)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_inputs_same_challenge() {
        let mut a = Transcript::new(b"test");
        let mut b = Transcript::new(b"test");
        a.append_u64(b"x", 7);
        b.append_u64(b"x", 7);
        assert_eq!(a.challenge_scalar(b"c"), b.challenge_scalar(b"c"));
    }

    #[test]
    fn domain_separation() {
        let mut a = Transcript::new(b"one");
        let mut b = Transcript::new(b"two");
        assert_ne!(a.challenge_scalar(b"c"), b.challenge_scalar(b"c"));
    }

    #[test]
    fn challenges_chain() {
        let mut t = Transcript::new(b"test");
        let first = t.challenge_scalar(b"c");
        let second = t.challenge_scalar(b"c");
        assert_ne!(first, second);
    }

    #[test]
    fn length_prefix_prevents_ambiguity() {
        let mut a = Transcript::new(b"test");
        let mut b = Transcript::new(b"test");
        a.append_message(b"ab", b"c");
        b.append_message(b"a", b"bc");
        assert_ne!(a.challenge_scalar(b"c"), b.challenge_scalar(b"c"));
    }
}
