//! # Types Subcommand
//!
//! Prints the EIP-712 type schema derived from a JSON document. A `proof`
//! member, if present, is not part of the signed document and is ignored.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use ethsig_schema::{derive_types, TypeSchema};

/// Arguments for `ethsig types`.
#[derive(Args, Debug)]
pub struct TypesArgs {
    /// Path to the JSON document.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

/// Execute the types subcommand.
pub fn run_types(args: &TypesArgs) -> Result<u8> {
    let schema = document_types(&args.file)?;
    let rendered = serde_json::to_string_pretty(&schema).context("failed to render schema")?;
    println!("{rendered}");
    Ok(0)
}

fn document_types(path: &std::path::Path) -> Result<TypeSchema> {
    let (document, _) = crate::detach_proof(crate::read_document(path)?);
    derive_types(&document).with_context(|| format!("cannot derive types for {}", path.display()))
}
