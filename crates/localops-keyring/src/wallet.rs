//! Wallet proposals: a seed together with everything derived from it

use crate::derive::derive_key_pair;
use crate::seed::Seed;
use localops_crypto::{Algorithm, KeyPair};
use localops_errors::Result;
use localops_types::AccountId;
use serde::ser::{Serialize, SerializeStruct, Serializer};
use tracing::debug;

/// Where the seed of a proposal comes from
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SeedInput {
    /// Fresh random entropy
    #[default]
    Random,
    /// Encoded `s...` or `sEd...` seed
    Encoded(String),
    /// 32 hex characters of entropy
    Hex(String),
    /// Passphrase hashed into entropy
    Passphrase(String),
}

impl SeedInput {
    /// Resolve to a seed bound to the requested algorithm
    pub fn to_seed(&self, algorithm: Option<Algorithm>) -> Result<Seed> {
        match self {
            SeedInput::Random => Ok(Seed::random(algorithm.unwrap_or_default())),
            SeedInput::Encoded(encoded) => Seed::decode(encoded)?.bind(algorithm),
            SeedInput::Hex(hex_seed) => Seed::from_hex(hex_seed, algorithm.unwrap_or_default()),
            SeedInput::Passphrase(passphrase) => Ok(Seed::from_passphrase(
                passphrase,
                algorithm.unwrap_or_default(),
            )),
        }
    }
}

/// A seed with its key pair and account
#[derive(Debug, Clone)]
pub struct WalletProposal {
    pub seed: Seed,
    pub key_pair: KeyPair,
    pub account_id: AccountId,
    pub classic_address: String,
}

impl WalletProposal {
    pub fn from_seed(seed: Seed) -> Result<Self> {
        let key_pair = derive_key_pair(&seed)?;
        let account_id = key_pair.account_id();
        Ok(Self {
            classic_address: account_id.to_classic_address(),
            seed,
            key_pair,
            account_id,
        })
    }

    pub fn key_type(&self) -> Algorithm {
        self.key_pair.algorithm()
    }
}

impl Serialize for WalletProposal {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("WalletProposal", 7)?;
        state.serialize_field("account_id", &self.classic_address)?;
        state.serialize_field("account_id_hex", &hex::encode_upper(self.account_id.as_bytes()))?;
        state.serialize_field("key_type", &self.key_type())?;
        state.serialize_field("master_seed", &self.seed.encode())?;
        state.serialize_field("master_seed_hex", &self.seed.to_hex())?;
        state.serialize_field("public_key_hex", &self.key_pair.public_key_hex())?;
        state.serialize_field("private_key_hex", &self.key_pair.private_key_hex())?;
        state.end()
    }
}

/// Generate a wallet proposal
pub fn propose(input: &SeedInput, algorithm: Option<Algorithm>) -> Result<WalletProposal> {
    let seed = input.to_seed(algorithm)?;
    let proposal = WalletProposal::from_seed(seed)?;
    debug!(
        key_type = %proposal.key_type(),
        address = %proposal.classic_address,
        "proposed wallet"
    );
    Ok(proposal)
}
