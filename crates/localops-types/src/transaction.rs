//! Transaction model

use crate::definitions::{registry, transaction_type_field};
use crate::value::{Field, FieldValue, STObject};
use localops_errors::{Error, Result};
use std::fmt;
use std::str::FromStr;

macro_rules! transaction_types {
    ($($name:ident = $code:literal => [$($field:literal),*]),* $(,)?) => {
        /// Transaction types understood by the signer
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum TransactionType {
            $($name),*
        }

        impl TransactionType {
            pub const ALL: &'static [TransactionType] = &[$(TransactionType::$name),*];

            pub fn code(self) -> u16 {
                match self {
                    $(TransactionType::$name => $code),*
                }
            }

            pub fn name(self) -> &'static str {
                match self {
                    $(TransactionType::$name => stringify!($name)),*
                }
            }

            /// Fields this type requires in addition to the common ones
            pub fn required_fields(self) -> &'static [&'static str] {
                match self {
                    $(TransactionType::$name => &[$($field),*]),*
                }
            }
        }
    };
}

transaction_types! {
    Payment = 0 => ["Destination", "Amount"],
    EscrowCreate = 1 => ["Amount", "Destination"],
    EscrowFinish = 2 => ["Owner", "OfferSequence"],
    AccountSet = 3 => [],
    EscrowCancel = 4 => ["Owner", "OfferSequence"],
    SetRegularKey = 5 => [],
    OfferCreate = 7 => ["TakerPays", "TakerGets"],
    OfferCancel = 8 => ["OfferSequence"],
    TicketCreate = 10 => ["TicketCount"],
    SignerListSet = 12 => ["SignerQuorum"],
    PaymentChannelCreate = 13 => ["Amount", "Destination", "SettleDelay", "PublicKey"],
    PaymentChannelFund = 14 => ["Channel", "Amount"],
    PaymentChannelClaim = 15 => ["Channel"],
    CheckCreate = 16 => ["Destination", "SendMax"],
    CheckCash = 17 => ["CheckID"],
    CheckCancel = 18 => ["CheckID"],
    DepositPreauth = 19 => [],
    TrustSet = 20 => ["LimitAmount"],
    AccountDelete = 21 => ["Destination"],
}

impl TransactionType {
    pub fn from_code(code: u16) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.code() == code)
            .ok_or_else(|| Error::encoding(format!("unknown transaction type code {code}")))
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.name() == s)
            .ok_or_else(|| Error::encoding(format!("unknown transaction type {s}")))
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A transaction: a top-level object carrying a `TransactionType`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transaction {
    object: STObject,
}

impl Transaction {
    /// Start a transaction of the given type
    pub fn new(tx_type: TransactionType) -> Self {
        let mut object = STObject::new();
        object.insert(Field::uint16(transaction_type_field(), tx_type.code()));
        Self { object }
    }

    pub fn from_object(object: STObject) -> Self {
        Self { object }
    }

    pub fn set(&mut self, name: &str, value: FieldValue) -> Result<()> {
        self.object.set(name, value)
    }

    /// Builder form of [`Transaction::set`]
    pub fn with(mut self, name: &str, value: FieldValue) -> Result<Self> {
        self.set(name, value)?;
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.object.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        self.object.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.object.contains(name)
    }

    pub fn as_object(&self) -> &STObject {
        &self.object
    }

    pub fn into_object(self) -> STObject {
        self.object
    }

    /// Declared transaction type
    pub fn transaction_type(&self) -> Result<TransactionType> {
        match self.object.get("TransactionType") {
            Some(FieldValue::UInt16(code)) => TransactionType::from_code(*code),
            Some(other) => Err(Error::type_mismatch(
                "TransactionType",
                "UInt16",
                other.field_type().name(),
            )),
            None => Err(Error::MissingRequiredField("TransactionType".to_string())),
        }
    }

    /// Check that every common and type-specific required field is present
    pub fn validate_required(&self) -> Result<()> {
        let tx_type = self.transaction_type()?;
        let common = registry().required_fields().map(|def| def.name);
        let specific = tx_type.required_fields().iter().copied();
        for name in common.chain(specific) {
            if !self.object.contains(name) {
                return Err(Error::MissingRequiredField(name.to_string()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::AccountId;
    use crate::amount::Amount;

    fn payment() -> Transaction {
        Transaction::new(TransactionType::Payment)
            .with("Account", FieldValue::Account(AccountId::new([1; 20])))
            .unwrap()
            .with("Destination", FieldValue::Account(AccountId::new([2; 20])))
            .unwrap()
            .with("Amount", FieldValue::Amount(Amount::Native(1_000)))
            .unwrap()
            .with("Fee", FieldValue::Amount(Amount::Native(12)))
            .unwrap()
            .with("Sequence", FieldValue::UInt32(1))
            .unwrap()
    }

    #[test]
    fn test_type_codes() {
        assert_eq!(TransactionType::TrustSet.code(), 20);
        assert_eq!(
            TransactionType::from_code(7).unwrap(),
            TransactionType::OfferCreate
        );
        assert_eq!(
            "SignerListSet".parse::<TransactionType>().unwrap(),
            TransactionType::SignerListSet
        );
        assert!(TransactionType::from_code(999).is_err());
    }

    #[test]
    fn test_new_sets_registered_type_field() {
        let tx = Transaction::new(TransactionType::TrustSet);
        let expected = Field::named("TransactionType", FieldValue::UInt16(20)).unwrap();
        assert_eq!(tx.get("TransactionType"), Some(expected.value()));
        assert_eq!(tx.transaction_type().unwrap(), TransactionType::TrustSet);
    }

    #[test]
    fn test_valid_payment() {
        let tx = payment();
        assert_eq!(tx.transaction_type().unwrap(), TransactionType::Payment);
        tx.validate_required().unwrap();
    }

    #[test]
    fn test_missing_type_specific_field() {
        let mut tx = payment();
        tx.remove("Destination");
        assert_eq!(
            tx.validate_required().unwrap_err(),
            Error::MissingRequiredField("Destination".to_string())
        );
    }

    #[test]
    fn test_missing_common_field() {
        let mut tx = payment();
        tx.remove("Fee");
        assert_eq!(
            tx.validate_required().unwrap_err(),
            Error::MissingRequiredField("Fee".to_string())
        );
    }

    #[test]
    fn test_missing_transaction_type() {
        let tx = Transaction::default();
        assert!(matches!(
            tx.validate_required(),
            Err(Error::MissingRequiredField(_))
        ));
    }
}
