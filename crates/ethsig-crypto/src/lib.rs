//! # ethsig-crypto — Typed-Data Cryptography
//!
//! - **Keccak-256** ([`keccak`]).
//! - **EIP-712 hashing** ([`eip712`]): `encodeType`, `hashStruct`, the
//!   domain separator, and the `0x19 0x01` signing digest over a
//!   [`TypedData`] envelope.
//! - **Signing and recovery** ([`signer`]): the [`TypedDataSigner`] and
//!   [`TypedDataVerifier`] capabilities consumed by the proof engine, with a
//!   secp256k1 [`LocalWallet`] and the stateless [`Eip712Recovery`].
//!
//! ## Security Invariant
//!
//! The signed digest always commits to the domain separator. Two envelopes
//! that differ only in `domain` produce unrelated signatures.

pub mod eip712;
pub mod error;
pub mod keccak;
pub mod signer;

pub use eip712::{
    encode_data, encode_type, hash_struct, signing_hash, type_hash, Eip712Domain, TypedData,
    DOMAIN_TYPE,
};
pub use error::CryptoError;
pub use keccak::keccak256;
pub use signer::{Eip712Recovery, LocalWallet, TypedDataSigner, TypedDataVerifier};
