//! # ethsig-core — Foundational Types
//!
//! Leaf crate of the ethsig workspace. Every other crate depends on it; it
//! depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **`CanonicalBytes` newtype.** All bytes that are compared, hashed, or
//!    logged as a proof digest flow through `CanonicalBytes::new()`. Two
//!    logically identical JSON values always canonicalize to identical bytes,
//!    independent of key insertion order.
//!
//! 2. **UTC-only timestamps.** `Timestamp` renders `YYYY-MM-DDTHH:MM:SSZ`:
//!    seconds precision, `Z` suffix, no milliseconds. This is the format of
//!    the proof `created` field.
//!
//! 3. **Validated identifiers.** `VerificationMethodId` validates at
//!    construction. Identity comparison always goes through
//!    [`VerificationMethodId::bare_address()`].
//!
//! ## Crate Policy
//!
//! - No dependencies on other `ethsig-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod error;
pub mod identity;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use canonical::CanonicalBytes;
pub use error::{CanonicalizationError, ValidationError};
pub use identity::{addresses_match, VerificationMethodId};
pub use temporal::{w3c_date, DateInput, Timestamp};
