//! # Content Digests
//!
//! SHA-256 digests of opaque bytes and of free text. Dispute descriptions
//! and evidence links are published on-chain only as the hex digest of
//! their UTF-8 bytes, so the same text always yields the same 64-character
//! lowercase digest.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A 32-byte SHA-256 digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentDigest {
    /// The raw 32-byte digest value.
    pub bytes: [u8; 32],
}

impl ContentDigest {
    /// Wrap raw digest bytes.
    pub fn new(bytes: [u8; 32]) -> Self {
        Self { bytes }
    }

    /// Render the digest as a lowercase hex string (64 characters).
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }
}

impl std::fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sha256:{}", self.to_hex())
    }
}

/// SHA-256 of raw bytes.
pub fn sha256_bytes(data: &[u8]) -> ContentDigest {
    let hash = Sha256::digest(data);
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&hash);
    ContentDigest::new(bytes)
}

/// SHA-256 of the UTF-8 encoding of `text`.
pub fn sha256_text(text: &str) -> ContentDigest {
    sha256_bytes(text.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_vectors() {
        assert_eq!(
            sha256_text("").to_hex(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(
            sha256_text("abc").to_hex(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn text_digest_is_deterministic() {
        assert_eq!(sha256_text("same"), sha256_text("same"));
        assert_ne!(sha256_text("same"), sha256_text("Same"));
    }

    #[test]
    fn hex_and_display() {
        let d = sha256_text("evidence");
        assert_eq!(d.to_hex().len(), 64);
        assert!(d.to_hex().chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')));
        assert_eq!(d.to_string(), format!("sha256:{}", d.to_hex()));
    }
}
