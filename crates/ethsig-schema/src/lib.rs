//! # ethsig-schema — Structured-Data Type Inference
//!
//! Maps an arbitrary JSON document onto a named set of EIP-712 struct
//! types. The mapping is a pure function: no I/O, no randomness.
//!
//! - **Fields** ([`field`]): `TypedDataField { name, type }` and the parsed
//!   [`FieldType`] grammar (`string`, `uint256`, `bool`, `T[]`, struct refs…).
//! - **Schema** ([`schema`]): [`TypeSchema`], type name → ordered fields.
//! - **Registry** ([`registry`]): hash-consing of structurally identical
//!   nested types under one capitalized name; differing shapes collide.
//! - **Derivation** ([`derive`]): [`derive_types()`], depth-first over
//!   lexicographically sorted keys, root type named `Document`.
//!
//! ## Determinism Contract
//!
//! Two documents with the same key sets and values derive the same schema
//! regardless of key insertion order. Field lists are sorted by name, so a
//! signer and a verifier that derive independently reproduce the same
//! `encodeType` string bit for bit.

pub mod derive;
pub mod error;
pub mod field;
pub mod registry;
pub mod schema;

pub use derive::{capitalize, derive_types, ROOT_TYPE};
pub use error::SchemaError;
pub use field::{FieldType, PrimitiveKind, TypedDataField};
pub use registry::TypeRegistry;
pub use schema::TypeSchema;
