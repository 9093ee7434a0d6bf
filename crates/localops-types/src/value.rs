//! Typed field values and serialized objects

use crate::address::AccountId;
use crate::amount::{Amount, Currency};
use crate::definitions::{lookup, FieldDefinition, FieldType};
use localops_errors::{Error, Result};

/// A field value, tagged by its serialized type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    Hash128([u8; 16]),
    Hash160([u8; 20]),
    Hash256([u8; 32]),
    Amount(Amount),
    Blob(Vec<u8>),
    Account(AccountId),
    Object(STObject),
    /// Elements are object-typed fields, e.g. `Signer` inside `Signers`
    Array(Vec<Field>),
    PathSet(PathSet),
    Vector256(Vec<[u8; 32]>),
}

impl FieldValue {
    /// Serialized type this value encodes as
    pub fn field_type(&self) -> FieldType {
        match self {
            FieldValue::UInt8(_) => FieldType::UInt8,
            FieldValue::UInt16(_) => FieldType::UInt16,
            FieldValue::UInt32(_) => FieldType::UInt32,
            FieldValue::UInt64(_) => FieldType::UInt64,
            FieldValue::Hash128(_) => FieldType::Hash128,
            FieldValue::Hash160(_) => FieldType::Hash160,
            FieldValue::Hash256(_) => FieldType::Hash256,
            FieldValue::Amount(_) => FieldType::Amount,
            FieldValue::Blob(_) => FieldType::Blob,
            FieldValue::Account(_) => FieldType::AccountId,
            FieldValue::Object(_) => FieldType::Object,
            FieldValue::Array(_) => FieldType::Array,
            FieldValue::PathSet(_) => FieldType::PathSet,
            FieldValue::Vector256(_) => FieldType::Vector256,
        }
    }
}

/// A value bound to its registry definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    definition: &'static FieldDefinition,
    value: FieldValue,
}

impl Field {
    /// Bind a `UInt16` value to a `UInt16` definition
    pub(crate) fn uint16(definition: &'static FieldDefinition, value: u16) -> Self {
        Self {
            definition,
            value: FieldValue::UInt16(value),
        }
    }

    /// Bind `value` to `definition`, checking that the types agree
    pub fn new(definition: &'static FieldDefinition, value: FieldValue) -> Result<Self> {
        if value.field_type() != definition.field_type {
            return Err(Error::type_mismatch(
                definition.name,
                definition.field_type.name(),
                value.field_type().name(),
            ));
        }
        if let FieldValue::Array(elements) = &value {
            if let Some(bad) = elements
                .iter()
                .find(|e| e.definition.field_type != FieldType::Object)
            {
                return Err(Error::type_mismatch(
                    definition.name,
                    "array of STObject",
                    bad.definition.field_type.name(),
                ));
            }
        }
        Ok(Self { definition, value })
    }

    /// Look the field up by name and bind `value`
    pub fn named(name: &str, value: FieldValue) -> Result<Self> {
        Self::new(lookup(name)?, value)
    }

    pub fn definition(&self) -> &'static FieldDefinition {
        self.definition
    }

    pub fn name(&self) -> &'static str {
        self.definition.name
    }

    pub fn value(&self) -> &FieldValue {
        &self.value
    }

    pub fn into_value(self) -> FieldValue {
        self.value
    }
}

/// A set of fields, kept in insertion order
///
/// Insertion order has no effect on serialization; see
/// [`STObject::canonical_fields`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct STObject {
    fields: Vec<Field>,
}

impl STObject {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field by name, replacing any previous value
    pub fn set(&mut self, name: &str, value: FieldValue) -> Result<()> {
        self.insert(Field::named(name, value)?);
        Ok(())
    }

    /// Builder form of [`STObject::set`]
    pub fn with(mut self, name: &str, value: FieldValue) -> Result<Self> {
        self.set(name, value)?;
        Ok(self)
    }

    pub fn insert(&mut self, field: Field) {
        match self
            .fields
            .iter_mut()
            .find(|f| f.definition.name == field.definition.name)
        {
            Some(existing) => *existing = field,
            None => self.fields.push(field),
        }
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|f| f.definition.name == name)
            .map(|f| &f.value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        let idx = self.fields.iter().position(|f| f.definition.name == name)?;
        Some(self.fields.remove(idx).value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Serialized fields sorted by (type code, field code)
    pub fn canonical_fields(&self) -> Vec<&Field> {
        let mut fields: Vec<&Field> = self
            .fields
            .iter()
            .filter(|f| f.definition.is_serialized)
            .collect();
        fields.sort_by_key(|f| f.definition.sort_key());
        fields
    }
}

/// One hop of a payment path
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathStep {
    pub account: Option<AccountId>,
    pub currency: Option<Currency>,
    pub issuer: Option<AccountId>,
}

impl PathStep {
    pub const ACCOUNT_FLAG: u8 = 0x01;
    pub const CURRENCY_FLAG: u8 = 0x10;
    pub const ISSUER_FLAG: u8 = 0x20;

    /// Type byte announcing which members follow on the wire
    pub fn type_flags(&self) -> u8 {
        let mut flags = 0;
        if self.account.is_some() {
            flags |= Self::ACCOUNT_FLAG;
        }
        if self.currency.is_some() {
            flags |= Self::CURRENCY_FLAG;
        }
        if self.issuer.is_some() {
            flags |= Self::ISSUER_FLAG;
        }
        flags
    }
}

/// Alternative payment paths
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathSet(pub Vec<Vec<PathStep>>);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_mismatch() {
        let err = Field::named("Fee", FieldValue::UInt32(10)).unwrap_err();
        assert_eq!(err, Error::type_mismatch("Fee", "Amount", "UInt32"));
    }

    #[test]
    fn test_array_elements_must_be_objects() {
        let bad = Field::named("Flags", FieldValue::UInt32(0)).unwrap();
        let err = Field::named("Memos", FieldValue::Array(vec![bad])).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));
    }

    #[test]
    fn test_set_replaces_and_sorts() {
        let mut obj = STObject::new();
        obj.set("Sequence", FieldValue::UInt32(1)).unwrap();
        obj.set("TransactionType", FieldValue::UInt16(0)).unwrap();
        obj.set("Sequence", FieldValue::UInt32(2)).unwrap();

        assert_eq!(obj.len(), 2);
        assert_eq!(obj.get("Sequence"), Some(&FieldValue::UInt32(2)));

        let names: Vec<_> = obj.canonical_fields().iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["TransactionType", "Sequence"]);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let mut obj = STObject::new();
        assert_eq!(
            obj.set("Bogus", FieldValue::UInt32(1)).unwrap_err(),
            Error::UnknownField("Bogus".to_string())
        );
    }

    #[test]
    fn test_path_step_flags() {
        let step = PathStep {
            account: None,
            currency: Some("USD".parse().unwrap()),
            issuer: Some(AccountId::default()),
        };
        assert_eq!(step.type_flags(), 0x30);
    }
}
