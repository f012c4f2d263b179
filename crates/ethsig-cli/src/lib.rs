//! # ethsig-cli — Command-Line Interface
//!
//! Provides the `ethsig` binary over the proof suite in `ethsig-vc`.
//!
//! ## Subcommands
//!
//! - `ethsig types` — Print the EIP-712 schema derived from a document.
//! - `ethsig keygen` — Generate a secp256k1 key and address pair.
//! - `ethsig sign` — Create a proof and attach it to the document.
//! - `ethsig verify` — Verify the proof attached to a document.
//!
//! ```bash
//! ethsig keygen --output keys --prefix issuer
//! ethsig sign --key keys/issuer.key credential.json > signed.json
//! ethsig --config ethsig.yaml verify signed.json
//! ```

pub mod config;
pub mod keygen;
pub mod sign;
pub mod types;
pub mod verify;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde_json::Value;

/// Document member that carries the proof.
pub const PROOF_MEMBER: &str = "proof";

/// Resolve a path that may be relative to `base_dir`.
///
/// Absolute paths are returned as-is. A relative path is joined onto
/// `base_dir` when the result exists, and left relative to the current
/// directory otherwise.
pub fn resolve_path(path: &Path, base_dir: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    let relative = base_dir.join(path);
    if relative.exists() {
        relative
    } else {
        path.to_path_buf()
    }
}

/// Read a JSON object from disk.
pub fn read_document(path: &Path) -> Result<Value> {
    if !path.exists() {
        bail!("document file not found: {}", path.display());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read document: {}", path.display()))?;
    let value: Value = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse JSON: {}", path.display()))?;
    if !value.is_object() {
        bail!("document must be a JSON object: {}", path.display());
    }
    Ok(value)
}

/// Split the `proof` member off a document.
pub fn detach_proof(mut document: Value) -> (Value, Option<Value>) {
    let proof = document
        .as_object_mut()
        .and_then(|object| object.remove(PROOF_MEMBER));
    (document, proof)
}
