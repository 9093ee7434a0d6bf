//! Seeds: 16 bytes of entropy tagged with the algorithm they derive keys for

use localops_crypto::{sha512_half, Algorithm};
use localops_errors::{Error, Result};
use localops_types::base58::{decode_check, encode_check, ED25519_SEED_VERSION, FAMILY_SEED_VERSION};
use rand::rngs::OsRng;
use rand::RngCore;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Bytes of entropy in a seed
pub const SEED_LEN: usize = 16;

#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Seed {
    entropy: [u8; SEED_LEN],
    #[zeroize(skip)]
    algorithm: Algorithm,
}

impl Seed {
    pub const LEN: usize = SEED_LEN;

    pub fn new(entropy: [u8; Self::LEN], algorithm: Algorithm) -> Self {
        Self { entropy, algorithm }
    }

    /// Fresh entropy from the operating system
    pub fn random(algorithm: Algorithm) -> Self {
        let mut entropy = [0u8; Self::LEN];
        OsRng.fill_bytes(&mut entropy);
        Self::new(entropy, algorithm)
    }

    /// First 16 bytes of SHA-512Half of the passphrase
    pub fn from_passphrase(passphrase: &str, algorithm: Algorithm) -> Self {
        let mut hash = sha512_half(passphrase.as_bytes());
        let mut entropy = [0u8; Self::LEN];
        entropy.copy_from_slice(&hash[..Self::LEN]);
        hash.zeroize();
        Self::new(entropy, algorithm)
    }

    /// 32 hex characters of raw entropy
    pub fn from_hex(hex_seed: &str, algorithm: Algorithm) -> Result<Self> {
        let mut bytes = hex::decode(hex_seed.trim())
            .map_err(|e| Error::encoding(format!("invalid seed hex: {e}")))?;
        if bytes.len() != Self::LEN {
            let len = bytes.len();
            bytes.zeroize();
            return Err(Error::encoding(format!("seed must be 16 bytes, got {len}")));
        }
        let mut entropy = [0u8; Self::LEN];
        entropy.copy_from_slice(&bytes);
        bytes.zeroize();
        Ok(Self::new(entropy, algorithm))
    }

    /// Parse an encoded `s...` or `sEd...` seed, verifying its checksum
    pub fn decode(encoded: &str) -> Result<Self> {
        let mut data = decode_check(encoded.trim())?;
        let parsed = if data.len() == ED25519_SEED_VERSION.len() + Self::LEN
            && data.starts_with(ED25519_SEED_VERSION)
        {
            Some((Algorithm::Ed25519, ED25519_SEED_VERSION.len()))
        } else if data.len() == FAMILY_SEED_VERSION.len() + Self::LEN
            && data.starts_with(FAMILY_SEED_VERSION)
        {
            Some((Algorithm::Secp256k1, FAMILY_SEED_VERSION.len()))
        } else {
            None
        };

        let result = match parsed {
            Some((algorithm, offset)) => {
                let mut entropy = [0u8; Self::LEN];
                entropy.copy_from_slice(&data[offset..]);
                Ok(Self::new(entropy, algorithm))
            }
            None => Err(Error::encoding("unrecognised seed version")),
        };
        data.zeroize();
        result
    }

    /// Base-58 check form; the version follows the algorithm
    pub fn encode(&self) -> String {
        let version = match self.algorithm {
            Algorithm::Secp256k1 => FAMILY_SEED_VERSION,
            Algorithm::Ed25519 => ED25519_SEED_VERSION,
        };
        encode_check(version, &self.entropy)
    }

    pub fn to_hex(&self) -> String {
        hex::encode_upper(self.entropy)
    }

    pub fn entropy(&self) -> &[u8; Self::LEN] {
        &self.entropy
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// The same entropy bound to another algorithm
    pub fn with_algorithm(&self, algorithm: Algorithm) -> Self {
        Self::new(self.entropy, algorithm)
    }

    /// Apply an explicitly requested algorithm to a decoded seed
    ///
    /// `sEd` seeds only derive ed25519 keys. Family seeds default to
    /// secp256k1 and may be reused for ed25519 on request.
    pub fn bind(self, requested: Option<Algorithm>) -> Result<Self> {
        match (self.algorithm, requested) {
            (_, None) => Ok(self),
            (current, Some(wanted)) if current == wanted => Ok(self),
            (Algorithm::Secp256k1, Some(Algorithm::Ed25519)) => {
                Ok(self.with_algorithm(Algorithm::Ed25519))
            }
            (current, Some(wanted)) => Err(Error::AlgorithmMismatch {
                expected: wanted.to_string(),
                actual: current.to_string(),
            }),
        }
    }
}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Seed")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MASTER_SEED: &str = "snoPBrXtMeMyMHUVTgbuqAfg1SUTb";
    const ED_SEED: &str = "sEdSKaCy2JT7JaM7v95H9SxkhP9wS2r";

    #[test]
    fn test_passphrase_matches_master_seed() {
        let seed = Seed::from_passphrase("masterpassphrase", Algorithm::Secp256k1);
        assert_eq!(seed.encode(), MASTER_SEED);
        assert_eq!(seed.to_hex(), "DEDCE9CE67B451D852FD4E846FCDE31C");
    }

    #[test]
    fn test_decode_roundtrip() {
        let seed = Seed::decode(MASTER_SEED).unwrap();
        assert_eq!(seed.algorithm(), Algorithm::Secp256k1);
        assert_eq!(seed.encode(), MASTER_SEED);

        let ed = Seed::decode(ED_SEED).unwrap();
        assert_eq!(ed.algorithm(), Algorithm::Ed25519);
        assert_eq!(ed.encode(), ED_SEED);
    }

    #[test]
    fn test_corrupted_checksum() {
        let mut corrupted = MASTER_SEED.to_string();
        corrupted.pop();
        corrupted.push('c');
        assert!(matches!(
            Seed::decode(&corrupted),
            Err(Error::EncodingError(_))
        ));
    }

    #[test]
    fn test_address_is_not_a_seed() {
        assert!(matches!(
            Seed::decode("rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh"),
            Err(Error::EncodingError(_))
        ));
    }

    #[test]
    fn test_hex_seed() {
        let seed = Seed::from_hex("DEDCE9CE67B451D852FD4E846FCDE31C", Algorithm::Secp256k1).unwrap();
        assert_eq!(seed.encode(), MASTER_SEED);
        assert!(Seed::from_hex("DEDC", Algorithm::Secp256k1).is_err());
    }

    #[test]
    fn test_bind_algorithm() {
        let family = Seed::decode(MASTER_SEED).unwrap();
        let rebound = family.bind(Some(Algorithm::Ed25519)).unwrap();
        assert_eq!(rebound.algorithm(), Algorithm::Ed25519);

        let ed = Seed::decode(ED_SEED).unwrap();
        assert!(matches!(
            ed.bind(Some(Algorithm::Secp256k1)),
            Err(Error::AlgorithmMismatch { .. })
        ));
    }

    #[test]
    fn test_random_seeds_differ() {
        let a = Seed::random(Algorithm::Ed25519);
        let b = Seed::random(Algorithm::Ed25519);
        assert_ne!(a.entropy(), b.entropy());
        assert!(a.encode().starts_with("sEd"));
    }
}
