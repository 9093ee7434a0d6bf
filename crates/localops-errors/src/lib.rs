//! Error handling types for the localops signing engine.
//!
//! Every core operation returns [`Result`]; nothing in the core panics or
//! raises across its own boundary. The adaptation layer turns an [`Error`]
//! into a response carrying [`Error::kind`] and the display message.

use thiserror::Error;

/// Core error type shared by every localops crate
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Field name is not present in the field registry
    #[error("unknown field:: {0}")]
    UnknownField(String),

    /// A field required by the transaction type is absent
    #[error("missing required field:: {0}")]
    MissingRequiredField(String),

    /// Value variant does not match the registered field type
    #[error("type mismatch for {field}: expected {expected}, got {actual}")]
    TypeMismatch {
        field: String,
        expected: String,
        actual: String,
    },

    /// Variable-length payload exceeds the largest encodable length
    #[error("variable length too long:: {0} bytes")]
    VariableLengthTooLong(usize),

    /// Private key is zero, out of range or malformed
    #[error("invalid private key:: {0}")]
    InvalidPrivateKey(String),

    /// Key pair algorithm disagrees with the requested signing path
    #[error("algorithm mismatch: expected {expected}, got {actual}")]
    AlgorithmMismatch { expected: String, actual: String },

    /// Malformed seed, address, hex or binary input
    #[error("encoding error:: {0}")]
    EncodingError(String),

    /// The same account appears twice in a signer list
    #[error("duplicate signer:: {0}")]
    DuplicateSigner(String),

    /// Cryptographic failure, including exhausted derivation attempts
    #[error("crypto error:: {0}")]
    CryptoError(String),
}

impl Error {
    /// Stable error kind string used in responses
    pub fn kind(&self) -> &'static str {
        match self {
            Error::UnknownField(_) => codes::UNKNOWN_FIELD,
            Error::MissingRequiredField(_) => codes::MISSING_REQUIRED_FIELD,
            Error::TypeMismatch { .. } => codes::TYPE_MISMATCH,
            Error::VariableLengthTooLong(_) => codes::VARIABLE_LENGTH_TOO_LONG,
            Error::InvalidPrivateKey(_) => codes::INVALID_PRIVATE_KEY,
            Error::AlgorithmMismatch { .. } => codes::ALGORITHM_MISMATCH,
            Error::EncodingError(_) => codes::ENCODING_ERROR,
            Error::DuplicateSigner(_) => codes::DUPLICATE_SIGNER,
            Error::CryptoError(_) => codes::CRYPTO_ERROR,
        }
    }

    /// Shorthand for [`Error::EncodingError`]
    pub fn encoding(msg: impl Into<String>) -> Self {
        Error::EncodingError(msg.into())
    }

    /// Shorthand for [`Error::TypeMismatch`]
    pub fn type_mismatch(
        field: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Error::TypeMismatch {
            field: field.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

/// Result type alias for localops operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error kind strings reported to callers
pub mod codes {
    pub const UNKNOWN_FIELD: &str = "unknownField";
    pub const MISSING_REQUIRED_FIELD: &str = "missingRequiredField";
    pub const TYPE_MISMATCH: &str = "typeMismatch";
    pub const VARIABLE_LENGTH_TOO_LONG: &str = "variableLengthTooLong";
    pub const INVALID_PRIVATE_KEY: &str = "invalidPrivateKey";
    pub const ALGORITHM_MISMATCH: &str = "algorithmMismatch";
    pub const ENCODING_ERROR: &str = "encodingError";
    pub const DUPLICATE_SIGNER: &str = "duplicateSigner";
    pub const CRYPTO_ERROR: &str = "cryptoError";
}
