//! Base-58 check encoding with the ledger's alphabet
//!
//! Payloads carry a version prefix and a 4-byte checksum taken from the
//! double SHA-256 of `version || payload`.

use bs58::Alphabet;
use localops_errors::{Error, Result};
use sha2::{Digest, Sha256};

/// Classic address version byte (`r...`)
pub const ACCOUNT_ID_VERSION: &[u8] = &[0x00];

/// secp256k1 family seed version byte (`s...`)
pub const FAMILY_SEED_VERSION: &[u8] = &[0x21];

/// ed25519 seed version bytes (`sEd...`)
pub const ED25519_SEED_VERSION: &[u8] = &[0x01, 0xE1, 0x4B];

const CHECKSUM_LEN: usize = 4;

fn checksum(data: &[u8]) -> [u8; CHECKSUM_LEN] {
    let hash = Sha256::digest(Sha256::digest(data));
    let mut out = [0u8; CHECKSUM_LEN];
    out.copy_from_slice(&hash[..CHECKSUM_LEN]);
    out
}

/// Encode `version || payload || checksum`
pub fn encode_check(version: &[u8], payload: &[u8]) -> String {
    let mut data = Vec::with_capacity(version.len() + payload.len() + CHECKSUM_LEN);
    data.extend_from_slice(version);
    data.extend_from_slice(payload);
    let sum = checksum(&data);
    data.extend_from_slice(&sum);
    bs58::encode(data).with_alphabet(Alphabet::RIPPLE).into_string()
}

/// Decode a checked string and return `version || payload` with the checksum stripped
pub fn decode_check(encoded: &str) -> Result<Vec<u8>> {
    let mut data = bs58::decode(encoded)
        .with_alphabet(Alphabet::RIPPLE)
        .into_vec()
        .map_err(|e| Error::encoding(format!("invalid base58 string: {e}")))?;

    if data.len() <= CHECKSUM_LEN {
        return Err(Error::encoding("base58 payload too short"));
    }

    let split = data.len() - CHECKSUM_LEN;
    let expected = checksum(&data[..split]);
    if data[split..] != expected {
        return Err(Error::encoding("checksum mismatch"));
    }
    data.truncate(split);
    Ok(data)
}

/// Decode a checked string that must carry `version` and a payload of `payload_len` bytes
pub fn decode_versioned(encoded: &str, version: &[u8], payload_len: usize) -> Result<Vec<u8>> {
    let data = decode_check(encoded)?;
    if data.len() != version.len() + payload_len || !data.starts_with(version) {
        return Err(Error::encoding(format!(
            "unexpected version or length for {encoded}"
        )));
    }
    Ok(data[version.len()..].to_vec())
}
