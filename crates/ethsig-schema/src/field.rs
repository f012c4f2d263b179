//! # Typed-Data Fields
//!
//! A struct type is an ordered list of [`TypedDataField`]s. The wire form is
//! `{"name": ..., "type": ...}`, identical to the `types` member of an
//! `eth_signTypedData_v4` request, so caller-supplied schemas deserialize
//! directly.
//!
//! The `type` string follows the typed-data grammar, parsed by
//! [`FieldType::from_str`](std::str::FromStr):
//!
//! | Grammar | Variant |
//! |---------|---------|
//! | `bool`, `string`, `bytes`, `address` | atomic / dynamic |
//! | `uint8` … `uint256`, `int8` … `int256` | [`FieldType::Uint`] / [`FieldType::Int`] |
//! | `bytes1` … `bytes32` | [`FieldType::FixedBytes`] |
//! | `T[]`, `T[n]` | [`FieldType::Array`] |
//! | anything else | [`FieldType::Struct`] reference |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;

/// One member of a struct type.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TypedDataField {
    /// Member name, equal to the document key it describes.
    pub name: String,

    /// Member type in typed-data grammar.
    #[serde(rename = "type")]
    pub type_name: String,
}

impl TypedDataField {
    /// Build a field from a name and a type string.
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }

    /// Parse this field's type string.
    pub fn field_type(&self) -> Result<FieldType, SchemaError> {
        self.type_name.parse()
    }
}

/// The primitive kinds a derived document leaf can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    /// JSON string.
    String,
    /// JSON number.
    Uint256,
    /// JSON boolean.
    Bool,
}

impl PrimitiveKind {
    /// The field type a leaf of this kind derives to.
    pub fn field_type(self) -> FieldType {
        match self {
            PrimitiveKind::String => FieldType::String,
            PrimitiveKind::Uint256 => FieldType::Uint(256),
            PrimitiveKind::Bool => FieldType::Bool,
        }
    }
}

/// A parsed typed-data field type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// `bool`
    Bool,
    /// `string`
    String,
    /// `bytes` (dynamic)
    Bytes,
    /// `address`
    Address,
    /// `uint<bits>`
    Uint(u16),
    /// `int<bits>`
    Int(u16),
    /// `bytes<len>`, 1 to 32
    FixedBytes(u8),
    /// `T[]` (`None`) or `T[n]`
    Array(Box<FieldType>, Option<usize>),
    /// Reference to another type in the same schema.
    Struct(String),
}

impl FieldType {
    /// `T[]` for a primitive element kind.
    pub fn array_of(kind: PrimitiveKind) -> Self {
        FieldType::Array(Box::new(kind.field_type()), None)
    }

    /// The struct name at the bottom of any array nesting, if any.
    pub fn struct_name(&self) -> Option<&str> {
        match self {
            FieldType::Struct(name) => Some(name),
            FieldType::Array(inner, _) => inner.struct_name(),
            _ => None,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Bool => f.write_str("bool"),
            FieldType::String => f.write_str("string"),
            FieldType::Bytes => f.write_str("bytes"),
            FieldType::Address => f.write_str("address"),
            FieldType::Uint(bits) => write!(f, "uint{bits}"),
            FieldType::Int(bits) => write!(f, "int{bits}"),
            FieldType::FixedBytes(len) => write!(f, "bytes{len}"),
            FieldType::Array(inner, None) => write!(f, "{inner}[]"),
            FieldType::Array(inner, Some(n)) => write!(f, "{inner}[{n}]"),
            FieldType::Struct(name) => f.write_str(name),
        }
    }
}

impl FromStr for FieldType {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SchemaError::InvalidFieldType(s.to_string());

        if let Some(head) = s.strip_suffix(']') {
            let open = head.rfind('[').ok_or_else(invalid)?;
            let inner: FieldType = head[..open].parse().map_err(|_| invalid())?;
            let len = &head[open + 1..];
            let len = if len.is_empty() {
                None
            } else {
                Some(len.parse::<usize>().map_err(|_| invalid())?)
            };
            return Ok(FieldType::Array(Box::new(inner), len));
        }

        match s {
            "bool" => return Ok(FieldType::Bool),
            "string" => return Ok(FieldType::String),
            "bytes" => return Ok(FieldType::Bytes),
            "address" => return Ok(FieldType::Address),
            _ => {}
        }

        if let Some(bits) = numeric_suffix(s, "uint") {
            return valid_int_bits(bits).map(FieldType::Uint).ok_or_else(invalid);
        }
        if let Some(bits) = numeric_suffix(s, "int") {
            return valid_int_bits(bits).map(FieldType::Int).ok_or_else(invalid);
        }
        if let Some(len) = numeric_suffix(s, "bytes") {
            return match u8::try_from(len) {
                Ok(len) if (1..=32).contains(&len) => Ok(FieldType::FixedBytes(len)),
                _ => Err(invalid()),
            };
        }

        if s.is_empty() || s.contains(['[', ']', '(', ')', ',']) || s.chars().any(char::is_whitespace) {
            return Err(invalid());
        }
        Ok(FieldType::Struct(s.to_string()))
    }
}

/// `uint256` → `Some(256)`; `uint` or `uintx` → `None`.
fn numeric_suffix(s: &str, prefix: &str) -> Option<u32> {
    let digits = s.strip_prefix(prefix)?;
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

fn valid_int_bits(bits: u32) -> Option<u16> {
    if bits % 8 == 0 && (8..=256).contains(&bits) {
        u16::try_from(bits).ok()
    } else {
        None
    }
}
