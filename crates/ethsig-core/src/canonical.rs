//! # Canonical Serialization — JCS Byte Production
//!
//! `CanonicalBytes` is the sole construction path for bytes that stand in
//! for a JSON value when two independently produced copies must compare
//! equal: the canonical proof (signature removed) and the canonical
//! typed-data envelope.
//!
//! ## Invariant
//!
//! Identical logical content always produces identical bytes, independent
//! of the key insertion order of the source value. The inner `Vec<u8>` is
//! private, so the only way to obtain `CanonicalBytes` is through the
//! coercion pipeline below followed by RFC 8785 (JCS) serialization.
//!
//! ## Coercion Rules
//!
//! 1. **Reject floats.** A non-integer number has no `uint256` encoding and
//!    JCS number formatting is the classic source of cross-implementation
//!    drift.
//! 2. **Objects** recurse into their values; keys are already strings.
//! 3. **Arrays** recurse element-wise, order preserved.

use serde::Serialize;
use serde_json::Value;

use crate::error::CanonicalizationError;

/// Bytes produced exclusively by JCS canonicalization.
///
/// # Invariants
///
/// - The only constructors are [`CanonicalBytes::new()`] and
///   [`CanonicalBytes::from_value()`].
/// - Object keys are sorted, separators are compact (RFC 8785).
/// - No float values appear anywhere in the tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Construct canonical bytes from any serializable value.
    ///
    /// # Errors
    ///
    /// Returns `CanonicalizationError::FloatRejected` if the value contains a
    /// float, or `CanonicalizationError::SerializationFailed` if the value
    /// cannot be represented as JSON.
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let value = serde_json::to_value(obj)?;
        Self::from_value(value)
    }

    /// Construct canonical bytes from an owned JSON value.
    pub fn from_value(value: Value) -> Result<Self, CanonicalizationError> {
        let coerced = coerce_json_value(value)?;
        let bytes = serialize_canonical(&coerced)?;
        Ok(Self(bytes))
    }

    /// Canonicalize an object with one top-level field removed.
    ///
    /// Used to exclude the signature field from the proof before it is
    /// canonicalized: the signature cannot be part of the data it signs.
    /// Non-object values are canonicalized unchanged.
    pub fn without_field(
        obj: &impl Serialize,
        field: &str,
    ) -> Result<Self, CanonicalizationError> {
        let mut value = serde_json::to_value(obj)?;
        if let Some(map) = value.as_object_mut() {
            map.remove(field);
        }
        Self::from_value(value)
    }

    /// Access the canonical bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// The canonical form as a string slice. JCS output is always UTF-8.
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.0).unwrap_or_default()
    }

    /// Returns the length of the canonical byte sequence.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the canonical byte sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

fn coerce_json_value(value: Value) -> Result<Value, CanonicalizationError> {
    match value {
        Value::Null | Value::Bool(_) | Value::String(_) => Ok(value),
        Value::Number(ref n) => {
            if n.is_f64() {
                if let Some(f) = n.as_f64() {
                    return Err(CanonicalizationError::FloatRejected(f));
                }
            }
            Ok(value)
        }
        Value::Object(map) => {
            let mut coerced = serde_json::Map::new();
            for (k, v) in map {
                coerced.insert(k, coerce_json_value(v)?);
            }
            Ok(Value::Object(coerced))
        }
        Value::Array(arr) => {
            let coerced: Result<Vec<_>, _> = arr.into_iter().map(coerce_json_value).collect();
            Ok(Value::Array(coerced?))
        }
    }
}

fn serialize_canonical(value: &Value) -> Result<Vec<u8>, CanonicalizationError> {
    let s = serde_jcs::to_string(value)?;
    Ok(s.into_bytes())
}
