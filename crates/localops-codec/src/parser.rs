//! Binary decoder, the inverse of [`crate::binary::serialize`] for blobs

use crate::binary::{
    ARRAY_END_MARKER, NATIVE_POSITIVE_BIT, OBJECT_END_MARKER, PATHSET_END, PATH_SEPARATOR,
};
use localops_errors::{Error, Result};
use localops_types::amount::IssuedAmount;
use localops_types::{
    registry, AccountId, Amount, Currency, Field, FieldDefinition, FieldType, FieldValue,
    IssuedValue, PathSet, PathStep, STObject, Transaction,
};

/// Cursor over canonical bytes
pub struct BinaryParser<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> BinaryParser<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn is_end(&self) -> bool {
        self.pos >= self.data.len()
    }

    fn peek(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        let byte = self
            .peek()
            .ok_or_else(|| Error::encoding("unexpected end of data"))?;
        self.pos += 1;
        Ok(byte)
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|end| *end <= self.data.len())
            .ok_or_else(|| {
                Error::encoding(format!("need {n} bytes at offset {}", self.pos))
            })?;
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    /// Read a field header, returning `(type_code, field_code)`
    pub fn read_field_id(&mut self) -> Result<(u8, u8)> {
        let first = self.read_u8()?;
        let mut type_code = first >> 4;
        let mut field_code = first & 0x0F;
        if type_code == 0 {
            type_code = self.read_u8()?;
            if type_code < 16 {
                return Err(Error::encoding("non-canonical field header"));
            }
        }
        if field_code == 0 {
            field_code = self.read_u8()?;
            if field_code < 16 {
                return Err(Error::encoding("non-canonical field header"));
            }
        }
        Ok((type_code, field_code))
    }

    /// Read a length prefix
    pub fn read_length_prefix(&mut self) -> Result<usize> {
        let b1 = self.read_u8()? as usize;
        match b1 {
            0..=191 => Ok(b1),
            192..=240 => {
                let b2 = self.read_u8()? as i64;
                // (192, 255) is the one valid pair with a high byte below 193
                let len = 193 + (b1 as i64 - 193) * 256 + b2;
                if len < 192 {
                    return Err(Error::encoding("invalid length prefix"));
                }
                Ok(len as usize)
            }
            241..=254 => {
                let b2 = self.read_u8()? as usize;
                let b3 = self.read_u8()? as usize;
                let len = 12481 + (b1 - 241) * 65536 + b2 * 256 + b3;
                if len > crate::binary::MAX_VL_LENGTH {
                    return Err(Error::VariableLengthTooLong(len));
                }
                Ok(len)
            }
            _ => Err(Error::encoding("invalid length prefix")),
        }
    }

    pub fn read_vl(&mut self) -> Result<&'a [u8]> {
        let len = self.read_length_prefix()?;
        self.read_bytes(len)
    }

    /// Read the value of a field described by `def`
    pub fn read_value(&mut self, def: &'static FieldDefinition) -> Result<FieldValue> {
        let value = match def.field_type {
            FieldType::UInt8 => FieldValue::UInt8(self.read_u8()?),
            FieldType::UInt16 => FieldValue::UInt16(u16::from_be_bytes(self.read_array()?)),
            FieldType::UInt32 => FieldValue::UInt32(u32::from_be_bytes(self.read_array()?)),
            FieldType::UInt64 => FieldValue::UInt64(u64::from_be_bytes(self.read_array()?)),
            FieldType::Hash128 => FieldValue::Hash128(self.read_array()?),
            FieldType::Hash160 => FieldValue::Hash160(self.read_array()?),
            FieldType::Hash256 => FieldValue::Hash256(self.read_array()?),
            FieldType::Amount => FieldValue::Amount(self.read_amount()?),
            FieldType::Blob => FieldValue::Blob(self.read_vl()?.to_vec()),
            FieldType::AccountId => FieldValue::Account(AccountId::from_slice(self.read_vl()?)?),
            FieldType::Object => FieldValue::Object(self.read_object(true)?),
            FieldType::Array => FieldValue::Array(self.read_array_elements()?),
            FieldType::PathSet => FieldValue::PathSet(self.read_path_set()?),
            FieldType::Vector256 => {
                let flat = self.read_vl()?;
                if flat.len() % 32 != 0 {
                    return Err(Error::encoding("Vector256 length is not a multiple of 32"));
                }
                let hashes = flat
                    .chunks_exact(32)
                    .map(|chunk| {
                        let mut hash = [0u8; 32];
                        hash.copy_from_slice(chunk);
                        hash
                    })
                    .collect();
                FieldValue::Vector256(hashes)
            }
        };
        Ok(value)
    }

    fn read_amount(&mut self) -> Result<Amount> {
        let head = self
            .peek()
            .ok_or_else(|| Error::encoding("unexpected end of data"))?;
        if head & 0x80 == 0 {
            let bits = u64::from_be_bytes(self.read_array()?);
            if bits & NATIVE_POSITIVE_BIT == 0 {
                return Err(Error::encoding("native amount without the positive bit"));
            }
            let drops = bits & !NATIVE_POSITIVE_BIT;
            return Amount::native(drops);
        }

        let value = IssuedValue::from_bits(u64::from_be_bytes(self.read_array()?))?;
        let currency = Currency::new(self.read_array()?);
        let issuer = AccountId::new(self.read_array()?);
        Ok(Amount::Issued(IssuedAmount {
            value,
            currency,
            issuer,
        }))
    }

    /// Read fields until an object end marker (nested) or the end of data (top level)
    fn read_object(&mut self, nested: bool) -> Result<STObject> {
        let mut object = STObject::new();
        let mut last_key = None;
        loop {
            if self.is_end() {
                if nested {
                    return Err(Error::encoding("unterminated object"));
                }
                return Ok(object);
            }
            if nested && self.peek() == Some(OBJECT_END_MARKER) {
                self.pos += 1;
                return Ok(object);
            }

            let (type_code, field_code) = self.read_field_id()?;
            let def = registry().lookup_by_id(type_code, field_code)?;
            if last_key.is_some_and(|key| key >= def.sort_key()) {
                return Err(Error::encoding(format!(
                    "field {} is out of canonical order",
                    def.name
                )));
            }
            last_key = Some(def.sort_key());

            let value = self.read_value(def)?;
            object.insert(Field::new(def, value)?);
        }
    }

    fn read_array_elements(&mut self) -> Result<Vec<Field>> {
        let mut elements = Vec::new();
        loop {
            if self.peek() == Some(ARRAY_END_MARKER) {
                self.pos += 1;
                return Ok(elements);
            }
            let (type_code, field_code) = self.read_field_id()?;
            let def = registry().lookup_by_id(type_code, field_code)?;
            if def.field_type != FieldType::Object {
                return Err(Error::type_mismatch(def.name, "STObject", def.field_type.name()));
            }
            let value = self.read_value(def)?;
            elements.push(Field::new(def, value)?);
        }
    }

    fn read_path_set(&mut self) -> Result<PathSet> {
        let mut paths = Vec::new();
        let mut current = Vec::new();
        loop {
            match self.read_u8()? {
                PATHSET_END => {
                    paths.push(current);
                    return Ok(PathSet(paths));
                }
                PATH_SEPARATOR => paths.push(std::mem::take(&mut current)),
                flags => {
                    let known = PathStep::ACCOUNT_FLAG | PathStep::CURRENCY_FLAG | PathStep::ISSUER_FLAG;
                    if flags & !known != 0 {
                        return Err(Error::encoding(format!("invalid path step type {flags:#04x}")));
                    }
                    let mut step = PathStep::default();
                    if flags & PathStep::ACCOUNT_FLAG != 0 {
                        step.account = Some(AccountId::new(self.read_array()?));
                    }
                    if flags & PathStep::CURRENCY_FLAG != 0 {
                        step.currency = Some(Currency::new(self.read_array()?));
                    }
                    if flags & PathStep::ISSUER_FLAG != 0 {
                        step.issuer = Some(AccountId::new(self.read_array()?));
                    }
                    current.push(step);
                }
            }
        }
    }
}

/// Decode a transaction blob
pub fn decode(bytes: &[u8]) -> Result<Transaction> {
    let mut parser = BinaryParser::new(bytes);
    let object = parser.read_object(false)?;
    Ok(Transaction::from_object(object))
}

/// Decode a hex encoded transaction blob
pub fn decode_hex(blob: &str) -> Result<Transaction> {
    let bytes = hex::decode(blob.trim()).map_err(|e| Error::encoding(format!("invalid hex: {e}")))?;
    decode(&bytes)
}
