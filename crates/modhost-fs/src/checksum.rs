//! SHA-256 digests
//!
//! Cache entries for downloaded artifacts are keyed by the digest of their
//! URL.

use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 digest of `content`.
pub fn sha256_hex(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("{:x}", hasher.finalize())
}
