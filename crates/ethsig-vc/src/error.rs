//! # Proof Suite Error Types
//!
//! Creation-path errors abort the call. Verification-path errors are
//! captured into [`ProofVerification`](crate::ProofVerification) and never
//! escape `verify_proof`.

use thiserror::Error;

use ethsig_core::{CanonicalizationError, ValidationError};
use ethsig_crypto::CryptoError;
use ethsig_schema::SchemaError;

/// Errors from proof creation and verification.
#[derive(Error, Debug)]
pub enum SuiteError {
    /// A caller-supplied argument is malformed.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The document could not be mapped to a type schema.
    #[error("schema derivation failed: {0}")]
    Schema(#[from] SchemaError),

    /// Proof creation was attempted without a signer.
    #[error("A Web3 Signer API has not been specified")]
    MissingSigner,

    /// The proof names no verification method.
    #[error("proof has no verificationMethod")]
    MissingVerificationMethod,

    /// The proof carries no signature value.
    #[error("proof has no proofValue")]
    MissingProofValue,

    /// The proof was produced by a different suite.
    #[error("unsupported proof type: {0}")]
    UnsupportedProofType(String),

    /// The recovered signer is not the verification method's address.
    #[error("signature mismatch: expected signer {expected}, recovered {recovered}")]
    SignatureMismatch {
        /// Bare address from `verificationMethod`.
        expected: String,
        /// Address recovered from the signature.
        recovered: String,
    },

    /// The proof does not satisfy the expected proof purpose.
    #[error("proof purpose mismatch: {0}")]
    PurposeMismatch(String),

    /// A remote schema reference could not be resolved.
    #[error("document loader error: {0}")]
    Loader(#[from] LoaderError),

    /// A remote schema is referenced but no loader was supplied.
    #[error("no document loader available to resolve {0}")]
    MissingDocumentLoader(String),

    /// Canonicalization of the proof or envelope failed.
    #[error("canonicalization failed: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// Typed-data hashing, signing or recovery failed.
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<ValidationError> for SuiteError {
    fn from(err: ValidationError) -> Self {
        SuiteError::InvalidArgument(err.to_string())
    }
}

/// Errors from resolving a URI through a document loader.
#[derive(Error, Debug)]
pub enum LoaderError {
    /// The loader does not know this URI.
    #[error("document not found: {0}")]
    NotFound(String),

    /// The URI cannot be parsed or is not handled by this loader.
    #[error("invalid document URI {uri}: {reason}")]
    InvalidUri {
        /// The rejected URI.
        uri: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Reading the backing file failed.
    #[error("failed to read {uri}: {source}")]
    Io {
        /// The URI being loaded.
        uri: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The loaded content is not valid JSON of the expected shape.
    #[error("invalid document at {uri}: {source}")]
    InvalidDocument {
        /// The URI being loaded.
        uri: String,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },
}
