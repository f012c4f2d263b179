//! # Type Schema
//!
//! [`TypeSchema`] maps type names to ordered field lists. It serializes as a
//! plain JSON object, the shape of the `types` member of typed data.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::field::TypedDataField;

/// Type name → ordered fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeSchema(BTreeMap<String, Vec<TypedDataField>>);

impl TypeSchema {
    /// An empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fields of `type_name`, if defined.
    pub fn get(&self, type_name: &str) -> Option<&[TypedDataField]> {
        self.0.get(type_name).map(Vec::as_slice)
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.0.contains_key(type_name)
    }

    /// Define or replace a type, returning the previous definition.
    pub fn insert(
        &mut self,
        type_name: impl Into<String>,
        fields: Vec<TypedDataField>,
    ) -> Option<Vec<TypedDataField>> {
        self.0.insert(type_name.into(), fields)
    }

    pub fn remove(&mut self, type_name: &str) -> Option<Vec<TypedDataField>> {
        self.0.remove(type_name)
    }

    /// Iterate over definitions in type-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[TypedDataField])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Vec<TypedDataField>)> for TypeSchema {
    fn from_iter<I: IntoIterator<Item = (String, Vec<TypedDataField>)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<BTreeMap<String, Vec<TypedDataField>>> for TypeSchema {
    fn from(map: BTreeMap<String, Vec<TypedDataField>>) -> Self {
        Self(map)
    }
}
