//! # Schema Derivation
//!
//! [`derive_types`] walks a JSON document depth-first over sorted keys and
//! classifies every value:
//!
//! | Value | Field type |
//! |-------|------------|
//! | boolean | `bool` |
//! | number | `uint256` |
//! | string | `string` |
//! | homogeneous primitive array | `bool[]` / `uint256[]` / `string[]` |
//! | empty array | `string[]` |
//! | object | struct named after the capitalized key |
//! | null, mixed or nested arrays | error |
//!
//! Nested struct types are hoisted into a single [`TypeSchema`] through a
//! [`TypeRegistry`]: the same capitalized name reached from two subtrees
//! must carry the identical field list. The root type is [`ROOT_TYPE`].

use serde_json::{Map, Value};

use crate::error::SchemaError;
use crate::field::{FieldType, PrimitiveKind, TypedDataField};
use crate::registry::TypeRegistry;
use crate::schema::TypeSchema;

/// Name of the root struct type describing the whole document.
pub const ROOT_TYPE: &str = "Document";

/// Derive the type schema of `document`.
///
/// # Errors
///
/// - [`SchemaError::NotAnObject`] if the root is not an object.
/// - [`SchemaError::UnsupportedValue`] for `null` leaves.
/// - [`SchemaError::UnsupportedArray`] for mixed-kind arrays and arrays of
///   objects, arrays or nulls.
/// - [`SchemaError::InvalidTypeName`] for a nested object whose key does not
///   capitalize to a plain struct name (empty, or containing `[`, `]`, `(`,
///   `)`, `,` or whitespace).
/// - [`SchemaError::InvalidFieldName`] for any key containing `(`, `)`, `,`
///   or whitespace.
/// - [`SchemaError::SchemaCollision`] when one type name is claimed by two
///   different shapes.
pub fn derive_types(document: &Value) -> Result<TypeSchema, SchemaError> {
    let Value::Object(root) = document else {
        return Err(SchemaError::NotAnObject(kind_name(document)));
    };

    let mut registry = TypeRegistry::new();
    let fields = derive_struct(root, "", &mut registry)?;
    registry.register(ROOT_TYPE, fields)?;

    let schema = registry.into_schema();
    tracing::debug!(types = schema.len(), "derived type schema");
    Ok(schema)
}

/// Uppercase the first character of `key`.
///
/// Returns `None` for an empty key.
pub fn capitalize(key: &str) -> Option<String> {
    let mut chars = key.chars();
    let first = chars.next()?;
    Some(first.to_uppercase().chain(chars).collect())
}

fn derive_struct(
    node: &Map<String, Value>,
    path: &str,
    registry: &mut TypeRegistry,
) -> Result<Vec<TypedDataField>, SchemaError> {
    let mut keys: Vec<&String> = node.keys().collect();
    keys.sort();

    let mut fields = Vec::with_capacity(keys.len());
    for key in keys {
        let value = &node[key.as_str()];
        let child_path = join_path(path, key);
        if key.contains(['(', ')', ',']) || key.chars().any(char::is_whitespace) {
            return Err(SchemaError::InvalidFieldName {
                path: child_path,
                name: key.clone(),
            });
        }
        let field_type = match value {
            Value::Bool(_) => PrimitiveKind::Bool.field_type(),
            Value::Number(_) => PrimitiveKind::Uint256.field_type(),
            Value::String(_) => PrimitiveKind::String.field_type(),
            Value::Array(items) => FieldType::array_of(array_kind(items, &child_path)?),
            Value::Object(child) => {
                let type_name = struct_type_name(key, &child_path)?;
                let nested = derive_struct(child, &child_path, registry)?;
                registry.register(&type_name, nested)?;
                FieldType::Struct(type_name)
            }
            Value::Null => {
                return Err(SchemaError::UnsupportedValue {
                    path: child_path,
                    kind: "null",
                })
            }
        };
        fields.push(TypedDataField::new(key.as_str(), field_type.to_string()));
    }
    Ok(fields)
}

fn array_kind(items: &[Value], path: &str) -> Result<PrimitiveKind, SchemaError> {
    let mut kind = None;
    for item in items {
        let item_kind = match item {
            Value::Bool(_) => PrimitiveKind::Bool,
            Value::Number(_) => PrimitiveKind::Uint256,
            Value::String(_) => PrimitiveKind::String,
            other => {
                return Err(SchemaError::UnsupportedArray {
                    path: path.to_string(),
                    reason: format!("arrays of {} are not supported", plural_kind(other)),
                })
            }
        };
        match kind {
            None => kind = Some(item_kind),
            Some(k) if k == item_kind => {}
            Some(_) => {
                return Err(SchemaError::UnsupportedArray {
                    path: path.to_string(),
                    reason: "Array of mixed types are not supported".to_string(),
                })
            }
        }
    }
    Ok(kind.unwrap_or(PrimitiveKind::String))
}

/// The struct type name for a nested object under `key`. It must parse
/// back as that same struct reference, never as an array or atomic type.
fn struct_type_name(key: &str, path: &str) -> Result<String, SchemaError> {
    let name = capitalize(key).ok_or_else(|| SchemaError::InvalidTypeName {
        path: path.to_string(),
        name: key.to_string(),
    })?;
    match name.parse::<FieldType>() {
        Ok(FieldType::Struct(parsed)) if parsed == name => Ok(name),
        _ => Err(SchemaError::InvalidTypeName {
            path: path.to_string(),
            name,
        }),
    }
}

fn join_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn plural_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "nulls",
        Value::Array(_) => "arrays",
        Value::Object(_) => "objects",
        _ => "primitives",
    }
}
