//! # Type Registry
//!
//! Accumulates struct types during derivation. Registering a name twice with
//! the identical field list is a no-op, so documents that repeat a nested
//! shape under the same key (`a.Foo` and `b.Foo`) share one type. Any
//! difference, including a subset of fields, is a [`SchemaCollision`].
//!
//! [`SchemaCollision`]: SchemaError::SchemaCollision

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use crate::error::SchemaError;
use crate::field::TypedDataField;
use crate::schema::TypeSchema;

/// Name → fields, with structural deduplication.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: BTreeMap<String, Vec<TypedDataField>>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `fields` under `type_name`.
    ///
    /// # Errors
    ///
    /// [`SchemaError::SchemaCollision`] when the name is already bound to a
    /// different field list.
    pub fn register(
        &mut self,
        type_name: &str,
        fields: Vec<TypedDataField>,
    ) -> Result<(), SchemaError> {
        match self.types.entry(type_name.to_string()) {
            Entry::Vacant(slot) => {
                tracing::trace!(type_name, fields = fields.len(), "registered struct type");
                slot.insert(fields);
                Ok(())
            }
            Entry::Occupied(slot) if *slot.get() == fields => {
                tracing::trace!(type_name, "reused identical struct type");
                Ok(())
            }
            Entry::Occupied(slot) => Err(SchemaError::SchemaCollision {
                type_name: type_name.to_string(),
                existing: slot.get().clone(),
                incoming: fields,
            }),
        }
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.types.contains_key(type_name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Finish registration.
    pub fn into_schema(self) -> TypeSchema {
        TypeSchema::from(self.types)
    }
}
