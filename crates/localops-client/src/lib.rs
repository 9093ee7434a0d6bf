//! Offline signing operations for localops
//!
//! [`LocalSigner`] bundles the client configuration with the public
//! operations: single signing, signing for a multi-signed transaction,
//! combining signer entries and proposing wallets. Nothing here touches the
//! network.

pub mod config;
pub mod multisig;
pub mod response;
pub mod sign;

pub use config::{ClientConfig, ConfigError};
pub use multisig::{MultiSigned, SignerEntry};
pub use sign::{KeyMaterial, SignedTransaction};

use localops_crypto::Algorithm;
use localops_errors::Result;
use localops_keyring::{SeedInput, WalletProposal};
use localops_types::{AccountId, Transaction};

/// Result of a signing operation
pub type SigningResult = Result<SignedTransaction>;

/// Signing front end configured by a [`ClientConfig`]
#[derive(Debug, Clone, Default)]
pub struct LocalSigner {
    config: ClientConfig,
}

impl LocalSigner {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Single-sign `tx`
    pub fn sign(&self, tx: &Transaction, key: &KeyMaterial) -> SigningResult {
        let key_pair = key.key_pair(self.config.default_key_type)?;
        sign::sign_transaction(tx, &key_pair, self.config.verify_signatures)
    }

    /// Sign `tx` on behalf of `account` and merge the entry into it
    pub fn sign_for(
        &self,
        tx: &Transaction,
        key: &KeyMaterial,
        account: AccountId,
    ) -> Result<MultiSigned> {
        let key_pair = key.key_pair(self.config.default_key_type)?;
        let entry = multisig::sign_for(tx, &key_pair, account, self.config.verify_signatures)?;
        let signed = multisig::combine(tx, std::slice::from_ref(&entry))?;
        Ok(MultiSigned { entry, signed })
    }

    /// Merge signer entries into `tx`
    ///
    /// With signature verification enabled every entry, old and new, is
    /// checked against the transaction first.
    pub fn combine(&self, tx: &Transaction, entries: &[SignerEntry]) -> SigningResult {
        if self.config.verify_signatures {
            for entry in multisig::existing_signers(tx)?.iter().chain(entries) {
                multisig::verify_entry(tx, entry)?;
            }
        }
        multisig::combine(tx, entries)
    }

    /// Propose a wallet; without an explicit algorithm, non-seed inputs use
    /// the configured default
    pub fn wallet_propose(
        &self,
        input: &SeedInput,
        algorithm: Option<Algorithm>,
    ) -> Result<WalletProposal> {
        let algorithm = match input {
            SeedInput::Encoded(_) => algorithm,
            _ => Some(algorithm.unwrap_or(self.config.default_key_type)),
        };
        localops_keyring::propose(input, algorithm)
    }
}

/// Sign with the default configuration
pub fn sign(tx: &Transaction, key: &KeyMaterial) -> SigningResult {
    LocalSigner::default().sign(tx, key)
}

/// Sign for `account` with the default configuration
pub fn sign_for(tx: &Transaction, key: &KeyMaterial, account: AccountId) -> Result<MultiSigned> {
    LocalSigner::default().sign_for(tx, key, account)
}

/// Combine signer entries with the default configuration
pub fn combine(tx: &Transaction, entries: &[SignerEntry]) -> SigningResult {
    LocalSigner::default().combine(tx, entries)
}

/// Propose a wallet with the default configuration
pub fn wallet_propose(input: &SeedInput, algorithm: Option<Algorithm>) -> Result<WalletProposal> {
    LocalSigner::default().wallet_propose(input, algorithm)
}
