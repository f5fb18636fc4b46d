//! Hashing of free text published only by digest.

use arbiter_core::sha256_text;

/// SHA-256 of the UTF-8 text as 64 lowercase hex characters.
pub fn hash_sensitive_data(data: &str) -> String {
    sha256_text(data).to_hex()
}
