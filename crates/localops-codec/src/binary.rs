//! Canonical binary serializer
//!
//! Fields are written sorted by `(type code, field code)`; the order in
//! which the caller set them never reaches the byte stream.

use localops_errors::{Error, Result};
use localops_types::amount::MAX_DROPS;
use localops_types::{AccountId, Amount, FieldValue, HashPrefix, PathSet, STObject, Transaction};
use tracing::debug;

/// Largest payload a length prefix can describe
pub const MAX_VL_LENGTH: usize = 918_744;

/// Field header closing an `STObject`
pub const OBJECT_END_MARKER: u8 = 0xE1;
/// Field header closing an `STArray`
pub const ARRAY_END_MARKER: u8 = 0xF1;

pub(crate) const NATIVE_POSITIVE_BIT: u64 = 0x4000_0000_0000_0000;
pub(crate) const PATH_SEPARATOR: u8 = 0xFF;
pub(crate) const PATHSET_END: u8 = 0x00;

/// What the produced bytes are used for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigningContext {
    /// Single-signature signing data: `STX\0` prefix, signing fields only
    Single,
    /// Multi-signature signing data for one signer: `SMT\0` prefix, signing
    /// fields only, signer account id appended
    Multi(AccountId),
    /// The transaction blob: no prefix, every serialized field
    Blob,
}

impl SigningContext {
    fn prefix(&self) -> Option<HashPrefix> {
        match self {
            SigningContext::Single => Some(HashPrefix::TransactionSign),
            SigningContext::Multi(_) => Some(HashPrefix::TransactionMultiSign),
            SigningContext::Blob => None,
        }
    }

    fn signing_fields_only(&self) -> bool {
        !matches!(self, SigningContext::Blob)
    }
}

/// Serialize `tx` for `context`
pub fn serialize(tx: &Transaction, context: &SigningContext) -> Result<Vec<u8>> {
    tx.validate_required()?;

    let mut out = Vec::with_capacity(256);
    if let Some(prefix) = context.prefix() {
        out.extend_from_slice(&prefix.bytes());
    }

    let mut sink = BinarySink {
        out: &mut out,
        signing_fields_only: context.signing_fields_only(),
    };
    sink.write_fields(tx.as_object())?;

    if let SigningContext::Multi(account) = context {
        out.extend_from_slice(account.as_bytes());
    }

    debug!(context = ?context, len = out.len(), "serialized transaction");
    Ok(out)
}

/// Length prefix for a variable-length payload of `len` bytes
///
/// `len <= 191` uses one byte, `192..=12480` two bytes and
/// `12481..=918744` three bytes.
pub fn encode_length_prefix(len: usize) -> Result<Vec<u8>> {
    match len {
        0..=191 => Ok(vec![len as u8]),
        192..=12480 => {
            // 192 encodes as (192, 255) under floor division
            let v = len as i64 - 193;
            let high = 193 + v.div_euclid(256);
            let low = v.rem_euclid(256);
            Ok(vec![high as u8, low as u8])
        }
        12481..=MAX_VL_LENGTH => {
            let v = len - 12481;
            Ok(vec![
                (241 + (v >> 16)) as u8,
                ((v >> 8) & 0xFF) as u8,
                (v & 0xFF) as u8,
            ])
        }
        _ => Err(Error::VariableLengthTooLong(len)),
    }
}

/// Field header for `(type_code, field_code)`
pub fn encode_field_id(type_code: u8, field_code: u8) -> Vec<u8> {
    match (type_code < 16, field_code < 16) {
        (true, true) => vec![(type_code << 4) | field_code],
        (true, false) => vec![type_code << 4, field_code],
        (false, true) => vec![field_code, type_code],
        (false, false) => vec![0, type_code, field_code],
    }
}

/// Encoding of a value into canonical bytes
pub trait CanonicalEncode {
    fn encode(&self, sink: &mut BinarySink<'_>) -> Result<()>;
}

/// Output buffer shared by the encoders
pub struct BinarySink<'a> {
    out: &'a mut Vec<u8>,
    signing_fields_only: bool,
}

impl<'a> BinarySink<'a> {
    /// Sink writing every serialized field into `out`
    pub fn new(out: &'a mut Vec<u8>) -> Self {
        Self {
            out,
            signing_fields_only: false,
        }
    }

    pub fn write(&mut self, bytes: &[u8]) {
        self.out.extend_from_slice(bytes);
    }

    pub fn write_vl(&mut self, bytes: &[u8]) -> Result<()> {
        let prefix = encode_length_prefix(bytes.len())?;
        self.write(&prefix);
        self.write(bytes);
        Ok(())
    }

    /// Write the fields of `object` in canonical order, without an end marker
    pub fn write_fields(&mut self, object: &STObject) -> Result<()> {
        for field in object.canonical_fields() {
            let def = field.definition();
            if self.signing_fields_only && !def.is_signing_field {
                continue;
            }
            self.write(&encode_field_id(def.type_code(), def.field_code));
            field.value().encode(self)?;
        }
        Ok(())
    }
}

impl CanonicalEncode for FieldValue {
    fn encode(&self, sink: &mut BinarySink<'_>) -> Result<()> {
        match self {
            FieldValue::UInt8(v) => sink.write(&[*v]),
            FieldValue::UInt16(v) => sink.write(&v.to_be_bytes()),
            FieldValue::UInt32(v) => sink.write(&v.to_be_bytes()),
            FieldValue::UInt64(v) => sink.write(&v.to_be_bytes()),
            FieldValue::Hash128(h) => sink.write(h),
            FieldValue::Hash160(h) => sink.write(h),
            FieldValue::Hash256(h) => sink.write(h),
            FieldValue::Amount(amount) => amount.encode(sink)?,
            FieldValue::Blob(bytes) => sink.write_vl(bytes)?,
            FieldValue::Account(account) => sink.write_vl(account.as_bytes())?,
            FieldValue::Object(object) => {
                sink.write_fields(object)?;
                sink.write(&[OBJECT_END_MARKER]);
            }
            FieldValue::Array(elements) => {
                for element in elements {
                    let def = element.definition();
                    sink.write(&encode_field_id(def.type_code(), def.field_code));
                    element.value().encode(sink)?;
                }
                sink.write(&[ARRAY_END_MARKER]);
            }
            FieldValue::PathSet(paths) => paths.encode(sink)?,
            FieldValue::Vector256(hashes) => {
                let flat: Vec<u8> = hashes.iter().flatten().copied().collect();
                sink.write_vl(&flat)?;
            }
        }
        Ok(())
    }
}

impl CanonicalEncode for Amount {
    fn encode(&self, sink: &mut BinarySink<'_>) -> Result<()> {
        match self {
            Amount::Native(drops) => {
                if *drops > MAX_DROPS {
                    return Err(Error::encoding(format!(
                        "native amount {drops} exceeds maximum"
                    )));
                }
                sink.write(&(drops | NATIVE_POSITIVE_BIT).to_be_bytes());
            }
            Amount::Issued(issued) => {
                sink.write(&issued.value.to_bits().to_be_bytes());
                sink.write(issued.currency.as_bytes());
                sink.write(issued.issuer.as_bytes());
            }
        }
        Ok(())
    }
}

impl CanonicalEncode for PathSet {
    fn encode(&self, sink: &mut BinarySink<'_>) -> Result<()> {
        for (i, path) in self.0.iter().enumerate() {
            if i > 0 {
                sink.write(&[PATH_SEPARATOR]);
            }
            for step in path {
                sink.write(&[step.type_flags()]);
                if let Some(account) = &step.account {
                    sink.write(account.as_bytes());
                }
                if let Some(currency) = &step.currency {
                    sink.write(currency.as_bytes());
                }
                if let Some(issuer) = &step.issuer {
                    sink.write(issuer.as_bytes());
                }
            }
        }
        sink.write(&[PATHSET_END]);
        Ok(())
    }
}

/// Canonical bytes of a bare object: every field, no prefix, no end marker
pub fn serialize_object(object: &STObject) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    BinarySink::new(&mut out).write_fields(object)?;
    Ok(out)
}
