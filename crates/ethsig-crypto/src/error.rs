//! # Cryptographic Error Types
//!
//! Structured errors for typed-data hashing, signing and signer recovery.

use thiserror::Error;

use ethsig_schema::SchemaError;

/// Errors from EIP-712 encoding and secp256k1 operations.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// A referenced struct type is not defined in the schema.
    #[error("type {0:?} is not defined in the schema")]
    UnknownType(String),

    /// A field type string is malformed.
    #[error("invalid type reference: {0}")]
    InvalidTypeReference(#[from] SchemaError),

    /// A field declared by the type is absent from the value.
    #[error("missing field {field:?} of type {type_name:?}")]
    MissingField {
        /// Struct type being encoded.
        type_name: String,
        /// Declared field that was not found.
        field: String,
    },

    /// The value carries a field its type does not declare.
    #[error("field {field:?} is not declared by type {type_name:?}")]
    UnexpectedField {
        /// Struct type being encoded.
        type_name: String,
        /// Undeclared field present in the value.
        field: String,
    },

    /// A value cannot be encoded as its declared type.
    #[error("cannot encode {value} as {type_name}: {reason}")]
    InvalidValue {
        /// Declared field type.
        type_name: String,
        /// Compact rendering of the rejected value.
        value: String,
        /// Why encoding failed.
        reason: String,
    },

    /// Signature bytes are malformed.
    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    /// Private key material is malformed.
    #[error("invalid private key: {0}")]
    InvalidKey(String),

    /// Public key recovery failed.
    #[error("signer recovery failed: {0}")]
    Recovery(String),

    /// Hex decoding error.
    #[error("hex decode error: {0}")]
    HexDecode(String),
}

impl From<hex::FromHexError> for CryptoError {
    fn from(err: hex::FromHexError) -> Self {
        CryptoError::HexDecode(err.to_string())
    }
}
