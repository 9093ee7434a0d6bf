//! Key representations using static enum dispatch

use ed25519_dalek::{SigningKey as Ed25519PrivKey, VerifyingKey as Ed25519PubKey};
use k256::ecdsa::{SigningKey as Secp256k1PrivKey, VerifyingKey as Secp256k1PubKey};
use localops_errors::{Error, Result};
use localops_types::AccountId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Leading byte marking an ed25519 public or private key
pub const ED25519_PREFIX: u8 = 0xED;
/// Leading byte of a secp256k1 private key in its 33-byte hex form
pub const SECP256K1_PRIVATE_PREFIX: u8 = 0x00;

/// Signature algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    #[default]
    Secp256k1,
    Ed25519,
}

impl Algorithm {
    pub fn as_str(self) -> &'static str {
        match self {
            Algorithm::Secp256k1 => "secp256k1",
            Algorithm::Ed25519 => "ed25519",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "secp256k1" => Ok(Algorithm::Secp256k1),
            "ed25519" => Ok(Algorithm::Ed25519),
            other => Err(Error::encoding(format!("unknown key type: {other}"))),
        }
    }
}

/// All supported public key types
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PublicKey {
    Secp256k1(Secp256k1PubKey),
    Ed25519(Ed25519PubKey),
}

impl PublicKey {
    /// Parse the 33-byte ledger form: compressed SEC1, or `0xED` + 32 bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        match bytes {
            [ED25519_PREFIX, rest @ ..] => {
                let raw: &[u8; 32] = rest.try_into().map_err(|_| {
                    Error::encoding(format!("ed25519 public key must be 33 bytes, got {}", bytes.len()))
                })?;
                let key = Ed25519PubKey::from_bytes(raw)
                    .map_err(|e| Error::encoding(format!("invalid ed25519 public key: {e}")))?;
                Ok(PublicKey::Ed25519(key))
            }
            _ => {
                if bytes.len() != 33 {
                    return Err(Error::encoding(format!(
                        "secp256k1 public key must be 33 bytes, got {}",
                        bytes.len()
                    )));
                }
                let key = Secp256k1PubKey::from_sec1_bytes(bytes)
                    .map_err(|e| Error::encoding(format!("invalid secp256k1 public key: {e}")))?;
                Ok(PublicKey::Secp256k1(key))
            }
        }
    }

    pub fn algorithm(&self) -> Algorithm {
        match self {
            PublicKey::Secp256k1(_) => Algorithm::Secp256k1,
            PublicKey::Ed25519(_) => Algorithm::Ed25519,
        }
    }

    /// Convert to the 33-byte ledger form
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            PublicKey::Secp256k1(key) => key.to_encoded_point(true).as_bytes().to_vec(),
            PublicKey::Ed25519(key) => {
                let mut out = Vec::with_capacity(33);
                out.push(ED25519_PREFIX);
                out.extend_from_slice(key.as_bytes());
                out
            }
        }
    }

    /// Derive the account id
    pub fn account_id(&self) -> AccountId {
        AccountId::from_public_key(&self.to_bytes())
    }
}

/// All supported private key types
pub(crate) enum PrivateKey {
    Secp256k1(Secp256k1PrivKey),
    Ed25519(Ed25519PrivKey),
}

impl PrivateKey {
    pub(crate) fn from_bytes(algorithm: Algorithm, secret: &[u8; 32]) -> Result<Self> {
        match algorithm {
            Algorithm::Secp256k1 => Secp256k1PrivKey::from_slice(secret)
                .map(PrivateKey::Secp256k1)
                .map_err(|_| {
                    Error::InvalidPrivateKey("scalar is zero or not below the curve order".into())
                }),
            Algorithm::Ed25519 => Ok(PrivateKey::Ed25519(Ed25519PrivKey::from_bytes(secret))),
        }
    }

    /// Get the corresponding public key
    pub(crate) fn public_key(&self) -> PublicKey {
        match self {
            PrivateKey::Secp256k1(key) => PublicKey::Secp256k1(*key.verifying_key()),
            PrivateKey::Ed25519(key) => PublicKey::Ed25519(key.verifying_key()),
        }
    }
}

/// Algorithm tagged key pair
///
/// The private half is wiped when the pair is dropped. `Debug` never prints it.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct KeyPair {
    #[zeroize(skip)]
    algorithm: Algorithm,
    public_key: Vec<u8>,
    private_key: [u8; 32],
}

impl KeyPair {
    /// Build a key pair from a 32-byte secret, deriving the public key
    pub fn from_private_key(algorithm: Algorithm, private_key: [u8; 32]) -> Result<Self> {
        let public_key = PrivateKey::from_bytes(algorithm, &private_key)?
            .public_key()
            .to_bytes();
        Ok(Self {
            algorithm,
            public_key,
            private_key,
        })
    }

    /// Parse a hex private key
    ///
    /// Accepts 64 hex characters, or 66 with a `00`/`ED` prefix. A prefix
    /// decides the algorithm; without one `algorithm` is used, defaulting to
    /// secp256k1.
    pub fn from_private_key_hex(hex_key: &str, algorithm: Option<Algorithm>) -> Result<Self> {
        let mut bytes = hex::decode(hex_key.trim())
            .map_err(|e| Error::InvalidPrivateKey(format!("invalid hex: {e}")))?;
        let (detected, secret) = match bytes.len() {
            32 => (algorithm.unwrap_or_default(), &bytes[..]),
            33 if bytes[0] == ED25519_PREFIX => (Algorithm::Ed25519, &bytes[1..]),
            33 if bytes[0] == SECP256K1_PRIVATE_PREFIX => (Algorithm::Secp256k1, &bytes[1..]),
            n => {
                bytes.zeroize();
                return Err(Error::InvalidPrivateKey(format!(
                    "private key must be 32 or 33 bytes, got {n}"
                )));
            }
        };
        if let Some(requested) = algorithm {
            if requested != detected {
                bytes.zeroize();
                return Err(Error::AlgorithmMismatch {
                    expected: requested.to_string(),
                    actual: detected.to_string(),
                });
            }
        }
        let mut secret_arr = [0u8; 32];
        secret_arr.copy_from_slice(secret);
        bytes.zeroize();
        let pair = Self::from_private_key(detected, secret_arr);
        secret_arr.zeroize();
        pair
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// 33-byte public key
    pub fn public_key(&self) -> &[u8] {
        &self.public_key
    }

    pub fn private_key(&self) -> &[u8; 32] {
        &self.private_key
    }

    pub fn public_key_hex(&self) -> String {
        hex::encode_upper(&self.public_key)
    }

    /// Private key as 66 hex characters with the algorithm prefix
    pub fn private_key_hex(&self) -> String {
        let prefix = match self.algorithm {
            Algorithm::Secp256k1 => SECP256K1_PRIVATE_PREFIX,
            Algorithm::Ed25519 => ED25519_PREFIX,
        };
        format!("{prefix:02X}{}", hex::encode_upper(self.private_key))
    }

    pub fn account_id(&self) -> AccountId {
        AccountId::from_public_key(&self.public_key)
    }

    pub(crate) fn private(&self) -> Result<PrivateKey> {
        PrivateKey::from_bytes(self.algorithm, &self.private_key)
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("algorithm", &self.algorithm)
            .field("public_key", &self.public_key_hex())
            .finish_non_exhaustive()
    }
}
