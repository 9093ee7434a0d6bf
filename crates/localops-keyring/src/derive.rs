//! Key derivation from seeds
//!
//! secp256k1 follows the ledger's family generator: a root scalar found by
//! hashing the seed with a counter, then an account scalar that adds a
//! second hash-derived tweak to it. ed25519 hashes the seed once.

use crate::seed::Seed;
use k256::ecdsa::SigningKey as Secp256k1PrivKey;
use k256::elliptic_curve::PrimeField;
use k256::Scalar;
use localops_crypto::{sha512_half, Algorithm, KeyPair};
use localops_errors::{Error, Result};
use tracing::debug;
use zeroize::Zeroize;

/// Upper bound on hash attempts in each secp256k1 derivation loop
pub const MAX_DERIVATION_ATTEMPTS: u32 = 1 << 16;

/// Derive the key pair a seed controls
pub fn derive_key_pair(seed: &Seed) -> Result<KeyPair> {
    let pair = match seed.algorithm() {
        Algorithm::Secp256k1 => derive_secp256k1(seed.entropy())?,
        Algorithm::Ed25519 => {
            let mut secret = sha512_half(seed.entropy());
            let pair = KeyPair::from_private_key(Algorithm::Ed25519, secret);
            secret.zeroize();
            pair?
        }
    };
    debug!(algorithm = %seed.algorithm(), "derived key pair from seed");
    Ok(pair)
}

fn derive_secp256k1(entropy: &[u8]) -> Result<KeyPair> {
    let root = find_scalar(entropy, None)?;
    let root_key = Secp256k1PrivKey::from_bytes(&root.to_bytes())
        .map_err(|_| Error::CryptoError("root scalar is not a valid key".into()))?;
    let root_public = root_key.verifying_key().to_encoded_point(true);

    let tweak = find_scalar(root_public.as_bytes(), Some(0))?;
    let account = root + tweak;
    if bool::from(account.is_zero()) {
        return Err(Error::CryptoError("derived account scalar is zero".into()));
    }

    let mut secret: [u8; 32] = account.to_bytes().into();
    let pair = KeyPair::from_private_key(Algorithm::Secp256k1, secret);
    secret.zeroize();
    pair
}

/// First `sha512_half(prefix || [family] || counter)` that is a valid
/// non-zero scalar below the curve order
fn find_scalar(prefix: &[u8], family: Option<u32>) -> Result<Scalar> {
    find_scalar_with_cap(prefix, family, MAX_DERIVATION_ATTEMPTS)
}

fn find_scalar_with_cap(prefix: &[u8], family: Option<u32>, cap: u32) -> Result<Scalar> {
    let mut buf = Vec::with_capacity(prefix.len() + 8);
    for counter in 0..cap {
        buf.clear();
        buf.extend_from_slice(prefix);
        if let Some(family) = family {
            buf.extend_from_slice(&family.to_be_bytes());
        }
        buf.extend_from_slice(&counter.to_be_bytes());

        let mut candidate = sha512_half(&buf);
        let scalar: Option<Scalar> = Scalar::from_repr(candidate.into()).into();
        candidate.zeroize();
        if let Some(scalar) = scalar {
            if !bool::from(scalar.is_zero()) {
                buf.zeroize();
                return Ok(scalar);
            }
        }
    }
    buf.zeroize();
    Err(Error::CryptoError(format!(
        "no valid scalar after {cap} attempts"
    )))
}
