//! # Verify Subcommand
//!
//! Verifies the `proof` attached to a JSON document. Prints `OK` and exits
//! 0 when the proof holds, or `FAIL: <reason>` and exits 1.
//!
//! Remote `messageSchema` references are resolved through the documents
//! listed in the configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;

use ethsig_vc::{
    Eip712Signature2021, Proof, ProofVerification, SuiteError, SuiteOptions, VerifyProofOptions,
};

use crate::config::SuiteConfig;

/// Arguments for `ethsig verify`.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Path to the JSON document carrying a `proof` member.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

/// Execute the verify subcommand.
pub fn run_verify(args: &VerifyArgs, config: &SuiteConfig, base_dir: &Path) -> Result<u8> {
    let document = crate::read_document(&args.file)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    let result = runtime.block_on(verify_document(document, config, base_dir))?;

    if result.verified {
        println!(
            "OK: proof verified (signer {})",
            result.recovered_address.as_deref().unwrap_or_default()
        );
        Ok(0)
    } else {
        let reason = result
            .error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "unknown error".to_string());
        println!("FAIL: {reason}");
        Ok(1)
    }
}

/// Verify the proof attached to `document`.
///
/// A configured (non-empty) domain always overrides the domain embedded in
/// the proof, so a proof signed for another application fails here.
///
/// # Errors
///
/// Only for configuration problems. A missing, malformed or failing proof is
/// reported in the returned [`ProofVerification`].
pub async fn verify_document(
    document: Value,
    config: &SuiteConfig,
    base_dir: &Path,
) -> Result<ProofVerification> {
    let purpose = config.purpose.build()?;
    let loader = config.document_loader(base_dir)?;
    let suite = Eip712Signature2021::new(SuiteOptions::default())?;

    let (document, proof) = crate::detach_proof(document);
    let proof: Proof = match proof.map(serde_json::from_value) {
        Some(Ok(proof)) => proof,
        Some(Err(e)) => return Ok(rejected(SuiteError::Json(e))),
        None => {
            return Ok(rejected(SuiteError::InvalidArgument(
                "document has no proof".into(),
            )))
        }
    };

    let mut options = VerifyProofOptions::new(purpose.as_ref()).document_loader(&loader);
    if !config.domain.is_empty() {
        options = options.domain(config.domain.clone());
    }

    Ok(suite.verify_proof(&proof, &document, options).await)
}

fn rejected(error: SuiteError) -> ProofVerification {
    tracing::warn!(error = %error, "proof rejected before verification");
    ProofVerification {
        verified: false,
        verification_method: None,
        recovered_address: None,
        error: Some(error),
    }
}
