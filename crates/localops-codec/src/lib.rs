//! Encoding and decoding of localops transactions.
//!
//! [`binary`] produces the canonical byte stream that is hashed and signed,
//! [`parser`] reads it back, and [`json`] maps transactions to and from the
//! JSON form used on the command line.

pub mod binary;
pub mod json;
pub mod parser;

pub use binary::{
    encode_field_id, encode_length_prefix, serialize, serialize_object, BinarySink,
    CanonicalEncode, SigningContext, MAX_VL_LENGTH,
};
pub use json::{transaction_from_json, transaction_to_json};
pub use parser::{decode, decode_hex, BinaryParser};

/// Hex encoded transaction blob
pub fn encode_blob(tx: &localops_types::Transaction) -> localops_errors::Result<String> {
    Ok(hex::encode_upper(serialize(tx, &SigningContext::Blob)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use localops_errors::Error;
    use serde_json::json;

    fn sample() -> serde_json::Value {
        json!({
            "TransactionType": "Payment",
            "Account": "rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh",
            "Destination": "rPT1Sjq2YGrBMTttX4GZHjKu9dyfzbpAYe",
            "Amount": {"currency": "USD", "issuer": "rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh", "value": "-0.001"},
            "SendMax": "5000000",
            "Fee": "12",
            "Sequence": 42,
            "SigningPubKey": "0330E7FC9D56BB25D6893BA3F317AE5BCF33B3291BD63DB32654A313222F7FD020",
            "Paths": [[{"currency": "USD", "issuer": "rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh"}],
                      [{"account": "rPT1Sjq2YGrBMTttX4GZHjKu9dyfzbpAYe"}]],
            "Memos": [{"Memo": {"MemoType": "74657874", "MemoData": "6869"}}],
        })
    }

    #[test]
    fn test_blob_roundtrip() {
        let tx = transaction_from_json(&sample()).unwrap();
        let blob = encode_blob(&tx).unwrap();
        let decoded = decode_hex(&blob).unwrap();
        assert_eq!(encode_blob(&decoded).unwrap(), blob);
        assert_eq!(transaction_to_json(&decoded), transaction_to_json(&tx));
    }

    #[test]
    fn test_decode_truncated() {
        let tx = transaction_from_json(&sample()).unwrap();
        let blob = serialize(&tx, &SigningContext::Blob).unwrap();
        assert!(matches!(
            decode(&blob[..blob.len() - 3]),
            Err(Error::EncodingError(_))
        ));
    }

    #[test]
    fn test_decode_unknown_field() {
        // type 2, field 15 is not registered
        assert!(matches!(decode(&[0x2F, 0, 0, 0, 0]), Err(Error::UnknownField(_))));
    }

    #[test]
    fn test_decode_rejects_unsorted_fields() {
        // Sequence before Flags
        let bytes = hex::decode("24000000012200000000").unwrap();
        assert!(matches!(decode(&bytes), Err(Error::EncodingError(_))));
    }

    #[test]
    fn test_decode_rejects_non_canonical_amounts() {
        // native zero must carry the positive bit
        assert!(decode_hex("120000684000000000000000").is_ok());
        assert!(matches!(
            decode_hex("120000680000000000000000"),
            Err(Error::EncodingError(_))
        ));

        let issued = |value: &str| format!("12000061{value}{}{}", "00".repeat(20), "11".repeat(20));
        let zero = issued("8000000000000000");
        let decoded = decode_hex(&zero).unwrap();
        assert!(matches!(
            decoded.get("Amount"),
            Some(localops_types::FieldValue::Amount(localops_types::Amount::Issued(a))) if a.value.is_zero()
        ));
        for stray in ["C000000000000000", "8040000000000000"] {
            assert!(matches!(
                decode_hex(&issued(stray)),
                Err(Error::EncodingError(_))
            ));
        }
    }

    #[test]
    fn test_length_prefix_decoding() {
        for len in [0usize, 191, 192, 193, 12480, 12481, MAX_VL_LENGTH] {
            let prefix = encode_length_prefix(len).unwrap();
            let mut parser = BinaryParser::new(&prefix);
            assert_eq!(parser.read_length_prefix().unwrap(), len);
            assert!(parser.is_end());
        }
    }
}
