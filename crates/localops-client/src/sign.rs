//! Single-signature signing

use localops_codec::{serialize, SigningContext};
use localops_crypto::{sign, signing_digest, transaction_id, verify, Algorithm, KeyPair};
use localops_errors::Result;
use localops_keyring::{derive_key_pair, SeedInput};
use localops_types::{FieldValue, Transaction};
use std::fmt;
use tracing::debug;

/// Secret a signing operation is given
#[derive(Clone)]
pub enum KeyMaterial {
    /// Encoded `s...` or `sEd...` seed
    Seed {
        seed: String,
        algorithm: Option<Algorithm>,
    },
    /// 32 hex characters of seed entropy
    SeedHex {
        hex: String,
        algorithm: Option<Algorithm>,
    },
    /// Passphrase hashed into a seed
    Passphrase {
        passphrase: String,
        algorithm: Option<Algorithm>,
    },
    /// Ready key pair
    KeyPair(KeyPair),
}

impl KeyMaterial {
    pub fn seed(seed: impl Into<String>, algorithm: Option<Algorithm>) -> Self {
        KeyMaterial::Seed {
            seed: seed.into(),
            algorithm,
        }
    }

    pub fn seed_hex(hex: impl Into<String>, algorithm: Option<Algorithm>) -> Self {
        KeyMaterial::SeedHex {
            hex: hex.into(),
            algorithm,
        }
    }

    pub fn passphrase(passphrase: impl Into<String>, algorithm: Option<Algorithm>) -> Self {
        KeyMaterial::Passphrase {
            passphrase: passphrase.into(),
            algorithm,
        }
    }

    /// Resolve to a key pair
    ///
    /// Encoded seeds keep their own algorithm unless one is named; hex seeds
    /// and passphrases fall back to `default_algorithm`.
    pub fn key_pair(&self, default_algorithm: Algorithm) -> Result<KeyPair> {
        let seed = match self {
            KeyMaterial::KeyPair(pair) => return Ok(pair.clone()),
            KeyMaterial::Seed { seed, algorithm } => {
                SeedInput::Encoded(seed.clone()).to_seed(*algorithm)?
            }
            KeyMaterial::SeedHex { hex, algorithm } => {
                SeedInput::Hex(hex.clone()).to_seed(Some(algorithm.unwrap_or(default_algorithm)))?
            }
            KeyMaterial::Passphrase {
                passphrase,
                algorithm,
            } => SeedInput::Passphrase(passphrase.clone())
                .to_seed(Some(algorithm.unwrap_or(default_algorithm)))?,
        };
        derive_key_pair(&seed)
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            KeyMaterial::Seed { .. } => "Seed",
            KeyMaterial::SeedHex { .. } => "SeedHex",
            KeyMaterial::Passphrase { .. } => "Passphrase",
            KeyMaterial::KeyPair(_) => "KeyPair",
        };
        write!(f, "KeyMaterial::{kind}(..)")
    }
}

/// A signed transaction with its canonical blob and hashes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    pub transaction: Transaction,
    pub tx_blob: Vec<u8>,
    /// Digest that was signed; absent for multi-signed transactions, where
    /// every signer signs its own digest
    pub signing_digest: Option<[u8; 32]>,
    /// Transaction id
    pub hash: [u8; 32],
}

impl SignedTransaction {
    /// Serialize `transaction` as a blob and compute its id
    pub fn from_transaction(
        transaction: Transaction,
        signing_digest: Option<[u8; 32]>,
    ) -> Result<Self> {
        let tx_blob = serialize(&transaction, &SigningContext::Blob)?;
        let hash = transaction_id(&tx_blob);
        Ok(Self {
            transaction,
            tx_blob,
            signing_digest,
            hash,
        })
    }

    pub fn blob_hex(&self) -> String {
        hex::encode_upper(&self.tx_blob)
    }

    pub fn hash_hex(&self) -> String {
        hex::encode_upper(self.hash)
    }
}

/// Sign `tx` with `key_pair`
///
/// Sets `SigningPubKey`, signs the single-signature digest and stores the
/// result in `TxnSignature`. With `verify_after` the fresh signature is checked
/// against the public key before it is returned.
pub fn sign_transaction(
    tx: &Transaction,
    key_pair: &KeyPair,
    verify_after: bool,
) -> Result<SignedTransaction> {
    let mut tx = tx.clone();
    tx.remove("TxnSignature");
    tx.set(
        "SigningPubKey",
        FieldValue::Blob(key_pair.public_key().to_vec()),
    )?;

    let signing_bytes = serialize(&tx, &SigningContext::Single)?;
    let digest = signing_digest(&signing_bytes);
    let signature = sign(&digest, key_pair, key_pair.algorithm())?;
    if verify_after {
        verify(&digest, key_pair.public_key(), &signature)?;
    }

    tx.set("TxnSignature", FieldValue::Blob(signature))?;
    let signed = SignedTransaction::from_transaction(tx, Some(digest))?;
    debug!(
        tx_type = ?signed.transaction.transaction_type().ok(),
        algorithm = %key_pair.algorithm(),
        blob_len = signed.tx_blob.len(),
        "signed transaction"
    );
    Ok(signed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use localops_codec::decode;
    use localops_errors::Error;
    use localops_types::{AccountId, Amount, TransactionType};

    const GENESIS: &str = "rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh";

    fn payment() -> Transaction {
        Transaction::new(TransactionType::Payment)
            .with(
                "Account",
                FieldValue::Account(AccountId::from_classic_address(GENESIS).unwrap()),
            )
            .unwrap()
            .with("Destination", FieldValue::Account(AccountId::new([0x42; 20])))
            .unwrap()
            .with("Amount", FieldValue::Amount(Amount::Native(1_000_000)))
            .unwrap()
            .with("Fee", FieldValue::Amount(Amount::Native(10)))
            .unwrap()
            .with("Sequence", FieldValue::UInt32(1))
            .unwrap()
    }

    fn master_key() -> KeyPair {
        KeyMaterial::passphrase("masterpassphrase", None)
            .key_pair(Algorithm::Secp256k1)
            .unwrap()
    }

    #[test]
    fn test_sign_sets_fields() {
        let pair = master_key();
        let signed = sign_transaction(&payment(), &pair, true).unwrap();
        let tx = &signed.transaction;
        assert_eq!(
            tx.get("SigningPubKey"),
            Some(&FieldValue::Blob(pair.public_key().to_vec()))
        );
        assert!(matches!(tx.get("TxnSignature"), Some(FieldValue::Blob(sig)) if sig[0] == 0x30));
        assert_eq!(signed.hash, transaction_id(&signed.tx_blob));

        let digest = signed.signing_digest.unwrap();
        let Some(FieldValue::Blob(sig)) = tx.get("TxnSignature") else {
            panic!("signature missing");
        };
        verify(&digest, pair.public_key(), sig).unwrap();
    }

    #[test]
    fn test_sign_is_deterministic() {
        let pair = master_key();
        let a = sign_transaction(&payment(), &pair, false).unwrap();
        let b = sign_transaction(&payment(), &pair, false).unwrap();
        assert_eq!(a.tx_blob, b.tx_blob);
        assert_eq!(a.hash, b.hash);
    }

    #[test]
    fn test_resigning_replaces_signature() {
        let pair = master_key();
        let first = sign_transaction(&payment(), &pair, false).unwrap();
        let again = sign_transaction(&first.transaction, &pair, false).unwrap();
        assert_eq!(first.tx_blob, again.tx_blob);
    }

    #[test]
    fn test_blob_decodes() {
        let ed = KeyMaterial::seed("sEdSKaCy2JT7JaM7v95H9SxkhP9wS2r", None)
            .key_pair(Algorithm::Secp256k1)
            .unwrap();
        let signed = sign_transaction(&payment(), &ed, true).unwrap();
        let decoded = decode(&signed.tx_blob).unwrap();
        assert_eq!(serialize(&decoded, &SigningContext::Blob).unwrap(), signed.tx_blob);
        assert!(matches!(decoded.get("TxnSignature"), Some(FieldValue::Blob(sig)) if sig.len() == 64));
    }

    #[test]
    fn test_missing_field_fails() {
        let mut tx = payment();
        tx.remove("Sequence");
        assert_eq!(
            sign_transaction(&tx, &master_key(), true).unwrap_err(),
            Error::MissingRequiredField("Sequence".to_string())
        );
    }

    #[test]
    fn test_seed_with_conflicting_algorithm() {
        let material = KeyMaterial::seed("sEdSKaCy2JT7JaM7v95H9SxkhP9wS2r", Some(Algorithm::Secp256k1));
        assert!(matches!(
            material.key_pair(Algorithm::Secp256k1),
            Err(Error::AlgorithmMismatch { .. })
        ));
    }

    #[test]
    fn test_debug_hides_material() {
        let material = KeyMaterial::passphrase("hunter2", None);
        assert!(!format!("{material:?}").contains("hunter2"));
    }
}
