//! Core types for localops
//!
//! The field registry, the typed value model, transactions, amounts and
//! account identifiers shared by the serializer and the signers.

pub mod address;
pub mod amount;
pub mod base58;
pub mod definitions;
pub mod hash_prefix;
pub mod transaction;
pub mod value;

pub use address::AccountId;
pub use amount::{Amount, Currency, IssuedAmount, IssuedValue};
pub use definitions::{lookup, registry, FieldDefinition, FieldRegistry, FieldType};
pub use hash_prefix::HashPrefix;
pub use transaction::{Transaction, TransactionType};
pub use value::{Field, FieldValue, PathSet, PathStep, STObject};
