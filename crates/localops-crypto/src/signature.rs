//! Signature operations

use crate::keys::{Algorithm, KeyPair, PrivateKey, PublicKey};
use k256::ecdsa::Signature as Secp256k1Signature;
use localops_errors::{Error, Result};
use signature::hazmat::{PrehashSigner, PrehashVerifier};
use signature::{Signer, Verifier};
use tracing::debug;

/// Sign a 32-byte digest
///
/// secp256k1 signs the digest as a prehash with RFC 6979 nonces and returns a
/// low-S DER signature. ed25519 signs the digest bytes and returns the raw 64
/// byte signature.
pub fn sign(digest: &[u8; 32], key_pair: &KeyPair, algorithm: Algorithm) -> Result<Vec<u8>> {
    if key_pair.algorithm() != algorithm {
        return Err(Error::AlgorithmMismatch {
            expected: algorithm.to_string(),
            actual: key_pair.algorithm().to_string(),
        });
    }

    let signature = match key_pair.private()? {
        PrivateKey::Secp256k1(key) => {
            let sig: Secp256k1Signature = key
                .sign_prehash(digest)
                .map_err(|e| Error::CryptoError(format!("secp256k1 signing failed: {e}")))?;
            let sig = sig.normalize_s().unwrap_or(sig);
            sig.to_der().as_bytes().to_vec()
        }
        PrivateKey::Ed25519(key) => {
            let sig: ed25519_dalek::Signature = key.sign(digest);
            sig.to_bytes().to_vec()
        }
    };

    debug!(%algorithm, sig_len = signature.len(), "signed digest");
    Ok(signature)
}

/// Verify a signature over a 32-byte digest against a 33-byte public key
pub fn verify(digest: &[u8; 32], public_key: &[u8], signature: &[u8]) -> Result<()> {
    let failed = || Error::CryptoError("signature verification failed".into());
    match PublicKey::from_bytes(public_key)? {
        PublicKey::Secp256k1(key) => {
            let sig = Secp256k1Signature::from_der(signature)
                .map_err(|e| Error::CryptoError(format!("invalid DER signature: {e}")))?;
            key.verify_prehash(digest, &sig).map_err(|_| failed())
        }
        PublicKey::Ed25519(key) => {
            let raw: &[u8; 64] = signature.try_into().map_err(|_| {
                Error::CryptoError(format!(
                    "ed25519 signature must be 64 bytes, got {}",
                    signature.len()
                ))
            })?;
            let sig = ed25519_dalek::Signature::from_bytes(raw);
            key.verify(digest, &sig).map_err(|_| failed())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::sha512_half;
    use k256::elliptic_curve::scalar::IsHigh;
    use proptest::prelude::*;

    fn secp_pair(byte: u8) -> KeyPair {
        KeyPair::from_private_key(Algorithm::Secp256k1, [byte; 32]).unwrap()
    }

    #[test]
    fn test_secp256k1_deterministic() {
        let pair = secp_pair(7);
        let digest = sha512_half(b"payment");
        let a = sign(&digest, &pair, Algorithm::Secp256k1).unwrap();
        let b = sign(&digest, &pair, Algorithm::Secp256k1).unwrap();
        assert_eq!(a, b);
        assert_eq!(a[0], 0x30);
        verify(&digest, pair.public_key(), &a).unwrap();
    }

    #[test]
    fn test_ed25519_roundtrip() {
        let pair = KeyPair::from_private_key(Algorithm::Ed25519, [9; 32]).unwrap();
        let digest = sha512_half(b"payment");
        let sig = sign(&digest, &pair, Algorithm::Ed25519).unwrap();
        assert_eq!(sig.len(), 64);
        verify(&digest, pair.public_key(), &sig).unwrap();

        let other = sha512_half(b"other");
        assert!(matches!(
            verify(&other, pair.public_key(), &sig),
            Err(Error::CryptoError(_))
        ));
    }

    #[test]
    fn test_algorithm_mismatch() {
        let pair = secp_pair(3);
        let digest = [0u8; 32];
        assert_eq!(
            sign(&digest, &pair, Algorithm::Ed25519).unwrap_err(),
            Error::AlgorithmMismatch {
                expected: "ed25519".into(),
                actual: "secp256k1".into(),
            }
        );
    }

    #[test]
    fn test_wrong_key_rejected() {
        let digest = sha512_half(b"tx");
        let sig = sign(&digest, &secp_pair(1), Algorithm::Secp256k1).unwrap();
        assert!(verify(&digest, secp_pair(2).public_key(), &sig).is_err());
    }

    proptest! {
        #[test]
        fn signatures_are_low_s(seed in 1u8..=0xF0, msg in prop::collection::vec(any::<u8>(), 0..64)) {
            let pair = secp_pair(seed);
            let digest = sha512_half(&msg);
            let der = sign(&digest, &pair, Algorithm::Secp256k1).unwrap();
            let sig = Secp256k1Signature::from_der(&der).unwrap();
            prop_assert!(!bool::from(sig.s().is_high()));
        }
    }
}
