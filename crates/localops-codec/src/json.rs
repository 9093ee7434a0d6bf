//! JSON representation of transactions
//!
//! Field names follow the registry; values use the conventional JSON forms:
//! numbers for `UInt8`..`UInt32`, hex strings for `UInt64`, hashes and blobs,
//! classic addresses for accounts, drop strings or `{currency, issuer, value}`
//! objects for amounts.

use localops_errors::{Error, Result};
use localops_types::amount::IssuedAmount;
use localops_types::{
    lookup, AccountId, Amount, Currency, Field, FieldDefinition, FieldType, FieldValue,
    IssuedValue, PathSet, PathStep, STObject, Transaction, TransactionType,
};
use serde_json::{Map, Value};

/// Keys accepted on input that are not transaction fields
const IGNORED_KEYS: &[&str] = &["hash"];

/// Render a transaction as JSON, fields in canonical order
pub fn transaction_to_json(tx: &Transaction) -> Value {
    Value::Object(object_to_map(tx.as_object()))
}

/// Render an object as a JSON map, fields in canonical order
pub fn object_to_map(object: &STObject) -> Map<String, Value> {
    object
        .canonical_fields()
        .into_iter()
        .map(|field| (field.name().to_string(), field_to_json(field)))
        .collect()
}

fn field_to_json(field: &Field) -> Value {
    if field.name() == "TransactionType" {
        if let FieldValue::UInt16(code) = field.value() {
            if let Ok(tx_type) = TransactionType::from_code(*code) {
                return Value::String(tx_type.name().to_string());
            }
        }
    }
    value_to_json(field.value())
}

/// Render a single value
pub fn value_to_json(value: &FieldValue) -> Value {
    match value {
        FieldValue::UInt8(v) => Value::from(*v),
        FieldValue::UInt16(v) => Value::from(*v),
        FieldValue::UInt32(v) => Value::from(*v),
        FieldValue::UInt64(v) => Value::String(format!("{v:016X}")),
        FieldValue::Hash128(h) => Value::String(hex::encode_upper(h)),
        FieldValue::Hash160(h) => Value::String(hex::encode_upper(h)),
        FieldValue::Hash256(h) => Value::String(hex::encode_upper(h)),
        FieldValue::Amount(amount) => amount_to_json(amount),
        FieldValue::Blob(bytes) => Value::String(hex::encode_upper(bytes)),
        FieldValue::Account(account) => Value::String(account.to_classic_address()),
        FieldValue::Object(object) => Value::Object(object_to_map(object)),
        FieldValue::Array(elements) => Value::Array(
            elements
                .iter()
                .map(|element| {
                    let mut wrapper = Map::new();
                    wrapper.insert(element.name().to_string(), value_to_json(element.value()));
                    Value::Object(wrapper)
                })
                .collect(),
        ),
        FieldValue::PathSet(paths) => path_set_to_json(paths),
        FieldValue::Vector256(hashes) => Value::Array(
            hashes
                .iter()
                .map(|h| Value::String(hex::encode_upper(h)))
                .collect(),
        ),
    }
}

fn amount_to_json(amount: &Amount) -> Value {
    match amount {
        Amount::Native(drops) => Value::String(drops.to_string()),
        Amount::Issued(issued) => {
            let mut map = Map::new();
            map.insert("currency".into(), Value::String(issued.currency.to_string()));
            map.insert(
                "issuer".into(),
                Value::String(issued.issuer.to_classic_address()),
            );
            map.insert("value".into(), Value::String(issued.value.to_string()));
            Value::Object(map)
        }
    }
}

fn path_set_to_json(paths: &PathSet) -> Value {
    Value::Array(
        paths
            .0
            .iter()
            .map(|path| {
                Value::Array(
                    path.iter()
                        .map(|step| {
                            let mut map = Map::new();
                            if let Some(account) = &step.account {
                                map.insert("account".into(), account.to_classic_address().into());
                            }
                            if let Some(currency) = &step.currency {
                                map.insert("currency".into(), currency.to_string().into());
                            }
                            if let Some(issuer) = &step.issuer {
                                map.insert("issuer".into(), issuer.to_classic_address().into());
                            }
                            Value::Object(map)
                        })
                        .collect(),
                )
            })
            .collect(),
    )
}

/// Build a transaction from its JSON form
pub fn transaction_from_json(json: &Value) -> Result<Transaction> {
    let map = json
        .as_object()
        .ok_or_else(|| Error::encoding("transaction JSON must be an object"))?;
    let object = object_from_map(map, IGNORED_KEYS)?;
    let tx = Transaction::from_object(object);
    // surfaces an unknown type name or code early
    tx.transaction_type()?;
    Ok(tx)
}

/// Build an object from a JSON map, skipping `ignored` keys
pub fn object_from_map(map: &Map<String, Value>, ignored: &[&str]) -> Result<STObject> {
    let mut object = STObject::new();
    for (name, json) in map {
        if ignored.contains(&name.as_str()) {
            continue;
        }
        let def = lookup(name)?;
        object.insert(Field::new(def, field_from_json(def, json)?)?);
    }
    Ok(object)
}

fn field_from_json(def: &'static FieldDefinition, json: &Value) -> Result<FieldValue> {
    if def.name == "TransactionType" {
        if let Value::String(name) = json {
            let tx_type: TransactionType = name.parse()?;
            return Ok(FieldValue::UInt16(tx_type.code()));
        }
    }
    value_from_json(def, json)
}

fn mismatch(def: &FieldDefinition, json: &Value) -> Error {
    let actual = match json {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    };
    Error::type_mismatch(def.name, def.field_type.name(), actual)
}

fn expect_str<'a>(def: &FieldDefinition, json: &'a Value) -> Result<&'a str> {
    json.as_str().ok_or_else(|| mismatch(def, json))
}

fn expect_uint(def: &FieldDefinition, json: &Value, max: u64) -> Result<u64> {
    let n = json.as_u64().ok_or_else(|| mismatch(def, json))?;
    if n > max {
        return Err(Error::encoding(format!("{} value {n} out of range", def.name)));
    }
    Ok(n)
}

fn hex_bytes(def: &FieldDefinition, s: &str) -> Result<Vec<u8>> {
    hex::decode(s).map_err(|e| Error::encoding(format!("{}: invalid hex: {e}", def.name)))
}

fn hex_array<const N: usize>(def: &FieldDefinition, s: &str) -> Result<[u8; N]> {
    let bytes = hex_bytes(def, s)?;
    bytes.as_slice().try_into().map_err(|_| {
        Error::encoding(format!("{}: expected {N} bytes, got {}", def.name, bytes.len()))
    })
}

/// Parse the JSON form of a value for `def`
pub fn value_from_json(def: &'static FieldDefinition, json: &Value) -> Result<FieldValue> {
    let value = match def.field_type {
        FieldType::UInt8 => FieldValue::UInt8(expect_uint(def, json, u8::MAX.into())? as u8),
        FieldType::UInt16 => FieldValue::UInt16(expect_uint(def, json, u16::MAX.into())? as u16),
        FieldType::UInt32 => FieldValue::UInt32(expect_uint(def, json, u32::MAX.into())? as u32),
        FieldType::UInt64 => {
            let s = expect_str(def, json)?;
            let v = u64::from_str_radix(s, 16)
                .map_err(|e| Error::encoding(format!("{}: invalid UInt64 hex: {e}", def.name)))?;
            FieldValue::UInt64(v)
        }
        FieldType::Hash128 => FieldValue::Hash128(hex_array(def, expect_str(def, json)?)?),
        FieldType::Hash160 => FieldValue::Hash160(hex_array(def, expect_str(def, json)?)?),
        FieldType::Hash256 => FieldValue::Hash256(hex_array(def, expect_str(def, json)?)?),
        FieldType::Amount => FieldValue::Amount(amount_from_json(def, json)?),
        FieldType::Blob => FieldValue::Blob(hex_bytes(def, expect_str(def, json)?)?),
        FieldType::AccountId => {
            FieldValue::Account(AccountId::from_classic_address(expect_str(def, json)?)?)
        }
        FieldType::Object => {
            let map = json.as_object().ok_or_else(|| mismatch(def, json))?;
            FieldValue::Object(object_from_map(map, &[])?)
        }
        FieldType::Array => {
            let items = json.as_array().ok_or_else(|| mismatch(def, json))?;
            let mut elements = Vec::with_capacity(items.len());
            for item in items {
                elements.push(array_element_from_json(def, item)?);
            }
            FieldValue::Array(elements)
        }
        FieldType::PathSet => FieldValue::PathSet(path_set_from_json(def, json)?),
        FieldType::Vector256 => {
            let items = json.as_array().ok_or_else(|| mismatch(def, json))?;
            let mut hashes = Vec::with_capacity(items.len());
            for item in items {
                hashes.push(hex_array(def, expect_str(def, item)?)?);
            }
            FieldValue::Vector256(hashes)
        }
    };
    Ok(value)
}

/// Array elements are written as single-key objects, e.g. `{"Memo": {...}}`
fn array_element_from_json(array: &'static FieldDefinition, item: &Value) -> Result<Field> {
    let wrapper = item.as_object().ok_or_else(|| mismatch(array, item))?;
    let mut entries = wrapper.iter();
    let (name, inner) = match (entries.next(), entries.next()) {
        (Some(entry), None) => entry,
        _ => {
            return Err(Error::encoding(format!(
                "{} elements must be objects with a single key",
                array.name
            )))
        }
    };
    let def = lookup(name)?;
    if def.field_type != FieldType::Object {
        return Err(Error::type_mismatch(
            array.name,
            "array of STObject",
            def.field_type.name(),
        ));
    }
    Field::new(def, value_from_json(def, inner)?)
}

fn amount_from_json(def: &FieldDefinition, json: &Value) -> Result<Amount> {
    match json {
        Value::String(drops) => {
            let drops: u64 = drops.parse().map_err(|_| {
                Error::encoding(format!("{}: invalid drops amount {drops:?}", def.name))
            })?;
            Amount::native(drops)
        }
        Value::Object(map) => {
            let field = |key: &str| {
                map.get(key).and_then(Value::as_str).ok_or_else(|| {
                    Error::encoding(format!("{}: issued amount is missing {key}", def.name))
                })
            };
            let value: IssuedValue = field("value")?.parse()?;
            let currency: Currency = field("currency")?.parse()?;
            let issuer = AccountId::from_classic_address(field("issuer")?)?;
            Ok(Amount::Issued(IssuedAmount {
                value,
                currency,
                issuer,
            }))
        }
        other => Err(mismatch(def, other)),
    }
}

fn path_set_from_json(def: &FieldDefinition, json: &Value) -> Result<PathSet> {
    let paths = json.as_array().ok_or_else(|| mismatch(def, json))?;
    let mut out = Vec::with_capacity(paths.len());
    for path in paths {
        let steps = path.as_array().ok_or_else(|| mismatch(def, path))?;
        let mut parsed = Vec::with_capacity(steps.len());
        for step in steps {
            let map = step.as_object().ok_or_else(|| mismatch(def, step))?;
            let text = |key: &str| map.get(key).and_then(Value::as_str);
            parsed.push(PathStep {
                account: text("account").map(AccountId::from_classic_address).transpose()?,
                currency: text("currency").map(str::parse).transpose()?,
                issuer: text("issuer").map(AccountId::from_classic_address).transpose()?,
            });
        }
        out.push(parsed);
    }
    Ok(PathSet(out))
}
