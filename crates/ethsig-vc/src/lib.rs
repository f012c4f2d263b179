//! # ethsig-vc — EthereumEip712Signature2021 Proofs
//!
//! A linked-data proof suite whose signature is an EIP-712 typed-data
//! signature over the document. The document's type schema is derived by
//! `ethsig-schema` unless the caller supplies one, and can be embedded in
//! the proof (`eip712Domain`) so a verifier reconstructs the exact signing
//! context.
//!
//! - **Suite** ([`Eip712Signature2021`]): `create_proof`, `verify_proof`,
//!   and the lower-level `create_verify_data`, `sign`, `verify_signature`.
//! - **Proof model** ([`Proof`], [`EmbeddedDomain`], [`SchemaSource`]).
//! - **Purposes** ([`ProofPurpose`]): `assertionMethod`, `authentication`.
//! - **Loaders** ([`DocumentLoader`]): resolve schemas referenced by URI.
//!
//! ## Security Invariants
//!
//! - The signer identity is never taken from the proof. It is recovered
//!   from the signature and compared with the bare address of
//!   `verificationMethod`.
//! - Message encoding is strict: a document with a field the schema does
//!   not declare, or missing one it does, fails verification.

pub mod error;
pub mod loader;
pub mod proof;
pub mod purpose;
pub mod suite;

pub use error::{LoaderError, SuiteError};
pub use loader::{DocumentLoader, FileDocumentLoader, RemoteDocument, StaticDocumentLoader};
pub use proof::{
    EmbeddedDomain, Proof, SchemaSource, VerificationMethod, VerificationMethodObject,
    PROOF_TYPE, PROOF_VALUE_KEY,
};
pub use purpose::{AssertionMethodPurpose, AuthenticationPurpose, ProofPurpose};
pub use suite::{
    CreateProofOptions, Eip712Signature2021, ProofVerification, SuiteOptions, VerifyData,
    VerifyProofOptions,
};
