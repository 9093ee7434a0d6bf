//! Multi-signature aggregation
//!
//! Each signer signs the `SMT\0` digest of the transaction with its own
//! account appended. `combine` gathers those signatures into the `Signers`
//! array, ordered by account id.

use crate::sign::SignedTransaction;
use localops_codec::{serialize, SigningContext};
use localops_crypto::{sign, signing_digest, verify, KeyPair};
use localops_errors::{Error, Result};
use localops_types::{AccountId, Field, FieldValue, STObject, Transaction};
use std::collections::BTreeMap;
use tracing::debug;

/// One signer's contribution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignerEntry {
    pub account: AccountId,
    pub signing_pub_key: Vec<u8>,
    pub txn_signature: Vec<u8>,
}

impl SignerEntry {
    /// `Signer` object field as it appears inside `Signers`
    pub fn to_field(&self) -> Result<Field> {
        let object = STObject::new()
            .with("Account", FieldValue::Account(self.account))?
            .with("SigningPubKey", FieldValue::Blob(self.signing_pub_key.clone()))?
            .with("TxnSignature", FieldValue::Blob(self.txn_signature.clone()))?;
        Field::named("Signer", FieldValue::Object(object))
    }

    /// Read an entry back from a `Signer` object
    pub fn from_object(object: &STObject) -> Result<Self> {
        let account = match object.get("Account") {
            Some(FieldValue::Account(account)) => *account,
            _ => return Err(Error::MissingRequiredField("Signer.Account".into())),
        };
        let blob = |name: &str| match object.get(name) {
            Some(FieldValue::Blob(bytes)) => Ok(bytes.clone()),
            _ => Err(Error::MissingRequiredField(format!("Signer.{name}"))),
        };
        Ok(Self {
            account,
            signing_pub_key: blob("SigningPubKey")?,
            txn_signature: blob("TxnSignature")?,
        })
    }
}

/// Result of signing for one account: the entry and the transaction with it merged
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiSigned {
    pub entry: SignerEntry,
    pub signed: SignedTransaction,
}

/// Unsigned form every multi-signer signs: empty `SigningPubKey`, no
/// single signature
fn multisign_base(tx: &Transaction) -> Result<Transaction> {
    let mut tx = tx.clone();
    tx.remove("TxnSignature");
    tx.set("SigningPubKey", FieldValue::Blob(Vec::new()))?;
    Ok(tx)
}

/// Digest `account` signs when multi-signing `tx`
pub fn multisign_digest(tx: &Transaction, account: AccountId) -> Result<[u8; 32]> {
    let base = multisign_base(tx)?;
    let bytes = serialize(&base, &SigningContext::Multi(account))?;
    Ok(signing_digest(&bytes))
}

/// Produce `account`'s signature over `tx`
pub fn sign_for(
    tx: &Transaction,
    key_pair: &KeyPair,
    account: AccountId,
    verify_after: bool,
) -> Result<SignerEntry> {
    let digest = multisign_digest(tx, account)?;
    let signature = sign(&digest, key_pair, key_pair.algorithm())?;
    if verify_after {
        verify(&digest, key_pair.public_key(), &signature)?;
    }
    debug!(signer = %account, algorithm = %key_pair.algorithm(), "signed for account");
    Ok(SignerEntry {
        account,
        signing_pub_key: key_pair.public_key().to_vec(),
        txn_signature: signature,
    })
}

/// Check an entry's signature against `tx`
pub fn verify_entry(tx: &Transaction, entry: &SignerEntry) -> Result<()> {
    let digest = multisign_digest(tx, entry.account)?;
    verify(&digest, &entry.signing_pub_key, &entry.txn_signature)
}

/// Signer entries already attached to `tx`
pub fn existing_signers(tx: &Transaction) -> Result<Vec<SignerEntry>> {
    match tx.get("Signers") {
        None => Ok(Vec::new()),
        Some(FieldValue::Array(elements)) => elements
            .iter()
            .map(|element| match element.value() {
                FieldValue::Object(object) if element.name() == "Signer" => {
                    SignerEntry::from_object(object)
                }
                other => Err(Error::type_mismatch(
                    "Signers",
                    "array of Signer",
                    other.field_type().name(),
                )),
            })
            .collect(),
        Some(other) => Err(Error::type_mismatch(
            "Signers",
            "STArray",
            other.field_type().name(),
        )),
    }
}

/// Merge signer entries into `tx`
///
/// Entries already present in `Signers` are kept. The same account appearing
/// twice fails with `DuplicateSigner`. The result is sorted by account id, so
/// the order of `entries` does not matter.
pub fn combine(tx: &Transaction, entries: &[SignerEntry]) -> Result<SignedTransaction> {
    let mut by_account = BTreeMap::new();
    for entry in existing_signers(tx)?.into_iter().chain(entries.iter().cloned()) {
        let account = entry.account;
        if by_account.insert(account, entry).is_some() {
            return Err(Error::DuplicateSigner(account.to_classic_address()));
        }
    }
    if by_account.is_empty() {
        return Err(Error::MissingRequiredField("Signers".into()));
    }

    let signers = by_account
        .values()
        .map(SignerEntry::to_field)
        .collect::<Result<Vec<_>>>()?;
    let count = signers.len();

    let mut combined = multisign_base(tx)?;
    combined.set("Signers", FieldValue::Array(signers))?;
    let signed = SignedTransaction::from_transaction(combined, None)?;
    debug!(signers = count, blob_len = signed.tx_blob.len(), "combined signatures");
    Ok(signed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use localops_crypto::Algorithm;
    use localops_keyring::{propose, SeedInput};
    use localops_types::{Amount, TransactionType};
    use proptest::prelude::*;

    fn account_set(account: AccountId) -> Transaction {
        Transaction::new(TransactionType::AccountSet)
            .with("Account", FieldValue::Account(account))
            .unwrap()
            .with("Fee", FieldValue::Amount(Amount::Native(30)))
            .unwrap()
            .with("Sequence", FieldValue::UInt32(5))
            .unwrap()
    }

    fn wallet(passphrase: &str, algorithm: Algorithm) -> (KeyPair, AccountId) {
        let proposal = propose(&SeedInput::Passphrase(passphrase.into()), Some(algorithm)).unwrap();
        (proposal.key_pair.clone(), proposal.account_id)
    }

    fn entries(tx: &Transaction) -> Vec<SignerEntry> {
        [
            ("alice", Algorithm::Secp256k1),
            ("bob", Algorithm::Ed25519),
            ("carol", Algorithm::Secp256k1),
        ]
        .iter()
        .map(|(name, algorithm)| {
            let (pair, account) = wallet(name, *algorithm);
            sign_for(tx, &pair, account, true).unwrap()
        })
        .collect()
    }

    fn signer_accounts(tx: &Transaction) -> Vec<AccountId> {
        existing_signers(tx)
            .unwrap()
            .into_iter()
            .map(|entry| entry.account)
            .collect()
    }

    #[test]
    fn test_combine_sorts_and_clears_pubkey() {
        let tx = account_set(AccountId::new([0x77; 20]));
        let combined = combine(&tx, &entries(&tx)).unwrap();

        let accounts = signer_accounts(&combined.transaction);
        assert_eq!(accounts.len(), 3);
        assert!(accounts.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(
            combined.transaction.get("SigningPubKey"),
            Some(&FieldValue::Blob(Vec::new()))
        );
        assert!(combined.signing_digest.is_none());
        for entry in existing_signers(&combined.transaction).unwrap() {
            verify_entry(&tx, &entry).unwrap();
        }
    }

    #[test]
    fn test_signatures_survive_combination() {
        // signing data excludes Signers, so combined output still verifies
        let tx = account_set(AccountId::new([0x77; 20]));
        let all = entries(&tx);
        let first = combine(&tx, &all[..1]).unwrap();
        let rest = combine(&first.transaction, &all[1..]).unwrap();
        assert_eq!(rest.tx_blob, combine(&tx, &all).unwrap().tx_blob);
        for entry in existing_signers(&rest.transaction).unwrap() {
            verify_entry(&rest.transaction, &entry).unwrap();
        }
    }

    #[test]
    fn test_duplicate_signer() {
        let tx = account_set(AccountId::new([0x77; 20]));
        let mut all = entries(&tx);
        all.push(all[0].clone());
        assert!(matches!(
            combine(&tx, &all),
            Err(Error::DuplicateSigner(_))
        ));

        let first = combine(&tx, &all[..1]).unwrap();
        assert!(matches!(
            combine(&first.transaction, &all[..1]),
            Err(Error::DuplicateSigner(_))
        ));
    }

    #[test]
    fn test_empty_combine_rejected() {
        let tx = account_set(AccountId::new([0x77; 20]));
        assert!(matches!(
            combine(&tx, &[]),
            Err(Error::MissingRequiredField(_))
        ));
    }

    #[test]
    fn test_entry_for_other_account_fails_verification() {
        let tx = account_set(AccountId::new([0x77; 20]));
        let (pair, account) = wallet("alice", Algorithm::Secp256k1);
        let mut entry = sign_for(&tx, &pair, account, true).unwrap();
        entry.account = AccountId::new([0x01; 20]);
        assert!(verify_entry(&tx, &entry).is_err());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn combine_ignores_input_order(order in Just(vec![0usize, 1, 2]).prop_shuffle()) {
            let tx = account_set(AccountId::new([0x77; 20]));
            let base = entries(&tx);
            let shuffled: Vec<SignerEntry> = order.iter().map(|i| base[*i].clone()).collect();
            prop_assert_eq!(
                combine(&tx, &shuffled).unwrap().tx_blob,
                combine(&tx, &base).unwrap().tx_blob
            );
        }
    }
}
