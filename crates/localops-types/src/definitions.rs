//! Field registry
//!
//! Static table of the transaction fields known to the serializer. The table
//! is indexed once into [`FieldRegistry`] and never mutated afterwards, so it
//! is read from any thread without locking.

use localops_errors::{Error, Result};
use std::collections::HashMap;
use std::fmt;

/// Serialized type of a field, with its protocol type code as discriminant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum FieldType {
    UInt16 = 1,
    UInt32 = 2,
    UInt64 = 3,
    Hash128 = 4,
    Hash256 = 5,
    Amount = 6,
    Blob = 7,
    AccountId = 8,
    Object = 14,
    Array = 15,
    UInt8 = 16,
    Hash160 = 17,
    PathSet = 18,
    Vector256 = 19,
}

impl FieldType {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        let ty = match code {
            1 => FieldType::UInt16,
            2 => FieldType::UInt32,
            3 => FieldType::UInt64,
            4 => FieldType::Hash128,
            5 => FieldType::Hash256,
            6 => FieldType::Amount,
            7 => FieldType::Blob,
            8 => FieldType::AccountId,
            14 => FieldType::Object,
            15 => FieldType::Array,
            16 => FieldType::UInt8,
            17 => FieldType::Hash160,
            18 => FieldType::PathSet,
            19 => FieldType::Vector256,
            _ => return None,
        };
        Some(ty)
    }

    /// Whether values of this type carry a length prefix
    pub fn is_vl_encoded(self) -> bool {
        matches!(
            self,
            FieldType::Blob | FieldType::AccountId | FieldType::Vector256
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            FieldType::UInt16 => "UInt16",
            FieldType::UInt32 => "UInt32",
            FieldType::UInt64 => "UInt64",
            FieldType::Hash128 => "Hash128",
            FieldType::Hash256 => "Hash256",
            FieldType::Amount => "Amount",
            FieldType::Blob => "Blob",
            FieldType::AccountId => "AccountID",
            FieldType::Object => "STObject",
            FieldType::Array => "STArray",
            FieldType::UInt8 => "UInt8",
            FieldType::Hash160 => "Hash160",
            FieldType::PathSet => "PathSet",
            FieldType::Vector256 => "Vector256",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Definition of a single transaction field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDefinition {
    pub name: &'static str,
    pub field_type: FieldType,
    pub field_code: u8,
    /// Required on every transaction regardless of its type
    pub required: bool,
    pub is_serialized: bool,
    /// Included in the bytes that get signed
    pub is_signing_field: bool,
}

impl FieldDefinition {
    const fn new(name: &'static str, field_type: FieldType, field_code: u8) -> Self {
        Self {
            name,
            field_type,
            field_code,
            required: false,
            is_serialized: true,
            is_signing_field: true,
        }
    }

    const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    const fn not_signed(mut self) -> Self {
        self.is_signing_field = false;
        self
    }

    pub fn type_code(&self) -> u8 {
        self.field_type.code()
    }

    /// Canonical ordering key
    pub fn sort_key(&self) -> (u8, u8) {
        (self.type_code(), self.field_code)
    }

    pub fn is_vl_encoded(&self) -> bool {
        self.field_type.is_vl_encoded()
    }
}

use FieldType::*;

const TRANSACTION_TYPE: FieldDefinition = FieldDefinition::new("TransactionType", UInt16, 2).required();

/// Definition of the `TransactionType` field, available without a lookup
pub(crate) fn transaction_type_field() -> &'static FieldDefinition {
    &TRANSACTION_TYPE
}

const FIELDS: &[FieldDefinition] = &[
    // UInt16
    FieldDefinition::new("LedgerEntryType", UInt16, 1),
    TRANSACTION_TYPE,
    FieldDefinition::new("SignerWeight", UInt16, 3),
    FieldDefinition::new("TransferFee", UInt16, 4),
    // UInt32
    FieldDefinition::new("Flags", UInt32, 2),
    FieldDefinition::new("SourceTag", UInt32, 3),
    FieldDefinition::new("Sequence", UInt32, 4).required(),
    FieldDefinition::new("Expiration", UInt32, 10),
    FieldDefinition::new("TransferRate", UInt32, 11),
    FieldDefinition::new("WalletSize", UInt32, 12),
    FieldDefinition::new("DestinationTag", UInt32, 14),
    FieldDefinition::new("QualityIn", UInt32, 20),
    FieldDefinition::new("QualityOut", UInt32, 21),
    FieldDefinition::new("OfferSequence", UInt32, 25),
    FieldDefinition::new("LastLedgerSequence", UInt32, 27),
    FieldDefinition::new("SetFlag", UInt32, 33),
    FieldDefinition::new("ClearFlag", UInt32, 34),
    FieldDefinition::new("SignerQuorum", UInt32, 35),
    FieldDefinition::new("CancelAfter", UInt32, 36),
    FieldDefinition::new("FinishAfter", UInt32, 37),
    FieldDefinition::new("SettleDelay", UInt32, 39),
    FieldDefinition::new("TicketCount", UInt32, 40),
    FieldDefinition::new("TicketSequence", UInt32, 41),
    // UInt64
    FieldDefinition::new("OwnerNode", UInt64, 4),
    FieldDefinition::new("DestinationNode", UInt64, 9),
    // Hash128
    FieldDefinition::new("EmailHash", Hash128, 1),
    // Hash256
    FieldDefinition::new("PreviousTxnID", Hash256, 5),
    FieldDefinition::new("WalletLocator", Hash256, 7),
    FieldDefinition::new("AccountTxnID", Hash256, 9),
    FieldDefinition::new("InvoiceID", Hash256, 17),
    FieldDefinition::new("Channel", Hash256, 22),
    FieldDefinition::new("CheckID", Hash256, 24),
    // Amount
    FieldDefinition::new("Amount", Amount, 1),
    FieldDefinition::new("Balance", Amount, 2),
    FieldDefinition::new("LimitAmount", Amount, 3),
    FieldDefinition::new("TakerPays", Amount, 4),
    FieldDefinition::new("TakerGets", Amount, 5),
    FieldDefinition::new("Fee", Amount, 8).required(),
    FieldDefinition::new("SendMax", Amount, 9),
    FieldDefinition::new("DeliverMin", Amount, 10),
    // Blob
    FieldDefinition::new("PublicKey", Blob, 1),
    FieldDefinition::new("MessageKey", Blob, 2),
    FieldDefinition::new("SigningPubKey", Blob, 3),
    FieldDefinition::new("TxnSignature", Blob, 4).not_signed(),
    FieldDefinition::new("Signature", Blob, 6),
    FieldDefinition::new("Domain", Blob, 7),
    FieldDefinition::new("MemoType", Blob, 12),
    FieldDefinition::new("MemoData", Blob, 13),
    FieldDefinition::new("MemoFormat", Blob, 14),
    FieldDefinition::new("Fulfillment", Blob, 16),
    FieldDefinition::new("Condition", Blob, 17),
    // AccountID
    FieldDefinition::new("Account", AccountId, 1).required(),
    FieldDefinition::new("Owner", AccountId, 2),
    FieldDefinition::new("Destination", AccountId, 3),
    FieldDefinition::new("Issuer", AccountId, 4),
    FieldDefinition::new("Authorize", AccountId, 5),
    FieldDefinition::new("Unauthorize", AccountId, 6),
    FieldDefinition::new("RegularKey", AccountId, 8),
    // STObject
    FieldDefinition::new("Memo", Object, 10),
    FieldDefinition::new("SignerEntry", Object, 11),
    FieldDefinition::new("Signer", Object, 16),
    // STArray
    FieldDefinition::new("Signers", Array, 3).not_signed(),
    FieldDefinition::new("SignerEntries", Array, 4),
    FieldDefinition::new("Memos", Array, 9),
    // UInt8
    FieldDefinition::new("TickSize", UInt8, 16),
    // Hash160
    FieldDefinition::new("TakerPaysCurrency", Hash160, 1),
    FieldDefinition::new("TakerPaysIssuer", Hash160, 2),
    FieldDefinition::new("TakerGetsCurrency", Hash160, 3),
    FieldDefinition::new("TakerGetsIssuer", Hash160, 4),
    // PathSet
    FieldDefinition::new("Paths", PathSet, 1),
    // Vector256
    FieldDefinition::new("Amendments", Vector256, 3),
];

/// Indexed, read-only view over the field table
pub struct FieldRegistry {
    by_name: HashMap<&'static str, &'static FieldDefinition>,
    by_id: HashMap<(u8, u8), &'static FieldDefinition>,
}

impl FieldRegistry {
    fn build() -> Self {
        let mut by_name = HashMap::with_capacity(FIELDS.len());
        let mut by_id = HashMap::with_capacity(FIELDS.len());
        for def in FIELDS {
            by_name.insert(def.name, def);
            by_id.insert(def.sort_key(), def);
        }
        Self { by_name, by_id }
    }

    /// Look a field up by name
    pub fn lookup(&self, name: &str) -> Result<&'static FieldDefinition> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| Error::UnknownField(name.to_string()))
    }

    /// Look a field up by its (type code, field code) pair
    pub fn lookup_by_id(&self, type_code: u8, field_code: u8) -> Result<&'static FieldDefinition> {
        self.by_id
            .get(&(type_code, field_code))
            .copied()
            .ok_or_else(|| Error::UnknownField(format!("type {type_code} field {field_code}")))
    }

    /// Fields that must be present on every transaction
    pub fn required_fields(&self) -> impl Iterator<Item = &'static FieldDefinition> {
        FIELDS.iter().filter(|def| def.required)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

lazy_static::lazy_static! {
    static ref REGISTRY: FieldRegistry = FieldRegistry::build();
}

/// The process-wide registry
pub fn registry() -> &'static FieldRegistry {
    &REGISTRY
}

/// Look a field up by name in the process-wide registry
pub fn lookup(name: &str) -> Result<&'static FieldDefinition> {
    registry().lookup(name)
}
