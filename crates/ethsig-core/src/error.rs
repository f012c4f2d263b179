//! # Error Hierarchy
//!
//! Structured error types shared by the workspace, built with `thiserror`.
//! No `Box<dyn Error>`, no `.unwrap()` outside tests.

use thiserror::Error;

/// Errors during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values have no stable canonical form and no EIP-712 encoding.
    #[error("float values are not permitted in canonical representations; use string or integer: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed during canonicalization.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// Errors from validating domain primitives.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The verification method is empty or contains whitespace.
    #[error("invalid verification method: {0:?}")]
    InvalidVerificationMethod(String),

    /// The timestamp could not be parsed or is out of range.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
}
