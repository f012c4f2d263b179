//! # Schema Derivation Errors

use thiserror::Error;

use crate::field::TypedDataField;

/// Errors from deriving or parsing a type schema.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// The document root is not a JSON object.
    #[error("document must be a JSON object, got {0}")]
    NotAnObject(&'static str),

    /// A value's runtime kind has no typed-data field type.
    #[error("unsupported type at {path}: {kind} values cannot be typed")]
    UnsupportedValue {
        /// Dotted key path of the offending value.
        path: String,
        /// The JSON kind that was found.
        kind: &'static str,
    },

    /// An array mixes primitive kinds, or holds objects/arrays/nulls.
    #[error("unsupported array at {path}: {reason}")]
    UnsupportedArray {
        /// Dotted key path of the offending array.
        path: String,
        /// What made the array untypeable.
        reason: String,
    },

    /// The same type name is required by two structurally different shapes.
    #[error("schema collision on type {type_name:?}: {existing:?} vs {incoming:?}")]
    SchemaCollision {
        /// The capitalized type name both shapes claim.
        type_name: String,
        /// The field list registered first.
        existing: Vec<TypedDataField>,
        /// The conflicting field list.
        incoming: Vec<TypedDataField>,
    },

    /// A nested object's key cannot become a type name.
    #[error("invalid type name derived from key at {path}: {name:?}")]
    InvalidTypeName {
        /// Dotted key path of the nested object.
        path: String,
        /// The rejected name.
        name: String,
    },

    /// A key cannot be used as a field name: it contains a character
    /// that delimits members in `encodeType`.
    #[error("invalid field name at {path}: {name:?}")]
    InvalidFieldName {
        /// Dotted key path of the field.
        path: String,
        /// The rejected key.
        name: String,
    },

    /// A field type string does not follow the typed-data grammar.
    #[error("invalid field type {0:?}")]
    InvalidFieldType(String),
}
