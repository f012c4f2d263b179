//! Keccak-256 (the pre-standard SHA-3 variant used by Ethereum).

use sha3::{Digest, Keccak256};

/// Keccak-256 of `data`.
pub fn keccak256(data: impl AsRef<[u8]>) -> [u8; 32] {
    Keccak256::digest(data.as_ref()).into()
}

/// Keccak-256 over the concatenation of `parts`.
pub fn keccak256_concat<'a>(parts: impl IntoIterator<Item = &'a [u8]>) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}
