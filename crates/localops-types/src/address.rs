//! Account identifiers and classic addresses

use crate::base58::{decode_versioned, encode_check, ACCOUNT_ID_VERSION};
use localops_errors::{Error, Result};
use ripemd::Ripemd160;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// Account identifier - 20 bytes
///
/// Ordering compares the raw bytes, which equals the numeric order of the
/// big-endian 160-bit value.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct AccountId([u8; 20]);

impl AccountId {
    pub const LEN: usize = 20;

    pub fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Derive the account id from a public key: ripemd160(sha256(pubkey_bytes))
    pub fn from_public_key(pubkey_bytes: &[u8]) -> Self {
        let sha256_hash = Sha256::digest(pubkey_bytes);
        let ripemd160_hash = Ripemd160::digest(sha256_hash);
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&ripemd160_hash);
        Self(bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let bytes: [u8; 20] = bytes.try_into().map_err(|_| {
            Error::encoding(format!("account id must be 20 bytes, got {}", bytes.len()))
        })?;
        Ok(Self(bytes))
    }

    /// Parse a classic `r...` address
    pub fn from_classic_address(address: &str) -> Result<Self> {
        let payload = decode_versioned(address, ACCOUNT_ID_VERSION, Self::LEN)
            .map_err(|e| Error::encoding(format!("invalid classic address {address}: {e}")))?;
        Self::from_slice(&payload)
    }

    /// Encode as a classic `r...` address
    pub fn to_classic_address(&self) -> String {
        encode_check(ACCOUNT_ID_VERSION, &self.0)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_classic_address())
    }
}

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountId({})", self.to_classic_address())
    }
}

impl FromStr for AccountId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_classic_address(s)
    }
}

impl Serialize for AccountId {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_classic_address())
    }
}

impl<'de> Deserialize<'de> for AccountId {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let address = String::deserialize(deserializer)?;
        Self::from_classic_address(&address).map_err(serde::de::Error::custom)
    }
}
