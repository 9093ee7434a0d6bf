//! JSON responses in the ledger's `{"result": {...}}` envelope

use crate::multisig::{MultiSigned, SignerEntry};
use crate::sign::SignedTransaction;
use localops_codec::transaction_to_json;
use localops_crypto::transaction_id;
use localops_errors::Error;
use localops_keyring::WalletProposal;
use localops_types::Transaction;
use serde_json::{json, Map, Value};

const STATUS_SUCCESS: &str = "success";
const STATUS_ERROR: &str = "error";

fn envelope(fields: Map<String, Value>, status: &str) -> Value {
    let mut result = Map::new();
    result.insert("status".into(), Value::String(status.into()));
    result.extend(fields);
    json!({ "result": result })
}

fn tx_json(signed: &SignedTransaction) -> Value {
    let mut tx = transaction_to_json(&signed.transaction);
    if let Value::Object(map) = &mut tx {
        map.insert("hash".into(), Value::String(signed.hash_hex()));
    }
    tx
}

fn signed_fields(signed: &SignedTransaction) -> Map<String, Value> {
    let mut result = Map::new();
    result.insert("tx_blob".into(), Value::String(signed.blob_hex()));
    result.insert("tx_json".into(), tx_json(signed));
    if let Some(digest) = &signed.signing_digest {
        result.insert(
            "signing_digest".into(),
            Value::String(hex::encode_upper(digest)),
        );
    }
    result
}

/// Response for `sign` and `combine`
pub fn signed(signed: &SignedTransaction) -> Value {
    envelope(signed_fields(signed), STATUS_SUCCESS)
}

fn signer_json(entry: &SignerEntry) -> Value {
    json!({
        "Account": entry.account.to_classic_address(),
        "SigningPubKey": hex::encode_upper(&entry.signing_pub_key),
        "TxnSignature": hex::encode_upper(&entry.txn_signature),
    })
}

/// Response for `sign_for`: the merged transaction plus the new signer
pub fn multi_signed(result: &MultiSigned) -> Value {
    let mut fields = signed_fields(&result.signed);
    fields.insert("signer".into(), json!({ "Signer": signer_json(&result.entry) }));
    envelope(fields, STATUS_SUCCESS)
}

/// Response for `wallet_propose`
pub fn wallet(proposal: &WalletProposal) -> serde_json::Result<Value> {
    let fields = match serde_json::to_value(proposal)? {
        Value::Object(map) => map,
        other => {
            let mut map = Map::new();
            map.insert("wallet".into(), other);
            map
        }
    };
    Ok(envelope(fields, STATUS_SUCCESS))
}

/// Response for a decoded blob
pub fn decoded(tx: &Transaction, blob: &[u8]) -> Value {
    let mut tx_json = transaction_to_json(tx);
    if let Value::Object(map) = &mut tx_json {
        map.insert(
            "hash".into(),
            Value::String(hex::encode_upper(transaction_id(blob))),
        );
    }
    let mut fields = Map::new();
    fields.insert("tx_json".into(), tx_json);
    envelope(fields, STATUS_SUCCESS)
}

/// Error response carrying the stable kind and the message
pub fn error(err: &Error) -> Value {
    let mut fields = Map::new();
    fields.insert("error".into(), Value::String(err.kind().into()));
    fields.insert("error_message".into(), Value::String(err.to_string()));
    envelope(fields, STATUS_ERROR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use localops_keyring::{propose, SeedInput};

    #[test]
    fn test_error_shape() {
        let value = error(&Error::UnknownField("Bogus".into()));
        assert_eq!(value["result"]["status"], "error");
        assert_eq!(value["result"]["error"], "unknownField");
        assert_eq!(value["result"]["error_message"], "unknown field:: Bogus");
    }

    #[test]
    fn test_wallet_shape() {
        let proposal = propose(&SeedInput::Passphrase("masterpassphrase".into()), None).unwrap();
        let value = wallet(&proposal).unwrap();
        assert_eq!(value["result"]["status"], "success");
        assert_eq!(
            value["result"]["account_id"],
            "rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh"
        );
    }
}
