//! SHA-512Half and the hashes built on it

use localops_types::HashPrefix;
use sha2::{Digest, Sha512};

/// First 32 bytes of SHA-512
pub fn sha512_half(data: &[u8]) -> [u8; 32] {
    let full = Sha512::digest(data);
    let mut out = [0u8; 32];
    out.copy_from_slice(&full[..32]);
    out
}

/// Digest of canonical signing bytes; the prefix is already part of the input
pub fn signing_digest(signing_bytes: &[u8]) -> [u8; 32] {
    sha512_half(signing_bytes)
}

/// Transaction id: SHA-512Half of `TXN\0` followed by the signed blob
pub fn transaction_id(blob: &[u8]) -> [u8; 32] {
    let mut hasher = Sha512::new();
    hasher.update(HashPrefix::TransactionId.bytes());
    hasher.update(blob);
    let full = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&full[..32]);
    out
}
