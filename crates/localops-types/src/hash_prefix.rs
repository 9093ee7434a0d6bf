//! Four-byte prefixes prepended to data before hashing

/// Domain separators for the hashes computed by the signer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashPrefix {
    /// `TXN\0`, transaction id over the full signed blob
    TransactionId,
    /// `STX\0`, single-signature signing data
    TransactionSign,
    /// `SMT\0`, multi-signature signing data
    TransactionMultiSign,
}

impl HashPrefix {
    pub const fn bytes(self) -> [u8; 4] {
        match self {
            HashPrefix::TransactionId => *b"TXN\0",
            HashPrefix::TransactionSign => *b"STX\0",
            HashPrefix::TransactionMultiSign => *b"SMT\0",
        }
    }
}
