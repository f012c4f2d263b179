//! # Sign Subcommand
//!
//! Creates an `EthereumEip712Signature2021` proof over a JSON document and
//! prints the document with the proof attached under `proof`.
//!
//! The signing key comes from `--key` or, failing that, the
//! `ETHSIG_PRIVATE_KEY` environment variable. Without
//! `--verification-method` the proof names the signer as
//! `did:pkh:eip155:<chainId>:<address>#blockchainAccountId`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Args;
use serde_json::Value;
use zeroize::Zeroizing;

use ethsig_crypto::{LocalWallet, TypedDataSigner};
use ethsig_vc::{CreateProofOptions, Eip712Signature2021, SuiteOptions};

use crate::config::{SuiteConfig, PRIVATE_KEY_ENV};

/// Arguments for `ethsig sign`.
#[derive(Args, Debug)]
pub struct SignArgs {
    /// Path to the private key file (hex-encoded 32-byte key).
    #[arg(long)]
    pub key: Option<PathBuf>,
    /// Verification method URI placed in the proof.
    #[arg(long)]
    pub verification_method: Option<String>,
    /// Do not embed the EIP-712 domain and schema in the proof.
    #[arg(long)]
    pub no_embed: bool,
    /// Path to the JSON document to sign.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

/// Execute the sign subcommand.
pub fn run_sign(args: &SignArgs, config: &SuiteConfig) -> Result<u8> {
    let wallet = load_wallet(args.key.as_deref(), |key| std::env::var(key).ok())?;
    let document = crate::read_document(&args.file)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    let signed = runtime.block_on(sign_document(
        document,
        Arc::new(wallet),
        args.verification_method.clone(),
        !args.no_embed,
        config,
    ))?;

    let rendered = serde_json::to_string_pretty(&signed).context("failed to render document")?;
    println!("{rendered}");
    Ok(0)
}

/// Load the signing key from `key_path`, or from the environment when no
/// path is given.
pub fn load_wallet(
    key_path: Option<&Path>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<LocalWallet> {
    let hex = match key_path {
        Some(path) => {
            if !path.exists() {
                bail!("private key file not found: {}", path.display());
            }
            Zeroizing::new(
                std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read private key: {}", path.display()))?,
            )
        }
        None => match lookup(PRIVATE_KEY_ENV) {
            Some(hex) => Zeroizing::new(hex),
            None => bail!("no signing key: pass --key or set {PRIVATE_KEY_ENV}"),
        },
    };
    LocalWallet::from_hex(&hex).context("invalid private key")
}

/// The `did:pkh` verification method for `address` on `chain_id`.
pub fn default_verification_method(chain_id: u64, address: &str) -> String {
    format!("did:pkh:eip155:{chain_id}:{address}#blockchainAccountId")
}

/// Sign `document` and return it with the proof attached. Any existing
/// `proof` member is replaced.
pub async fn sign_document(
    document: Value,
    wallet: Arc<LocalWallet>,
    verification_method: Option<String>,
    embed: bool,
    config: &SuiteConfig,
) -> Result<Value> {
    let (mut document, previous) = crate::detach_proof(document);
    if previous.is_some() {
        tracing::warn!("replacing existing proof");
    }

    let verification_method = verification_method.unwrap_or_else(|| {
        default_verification_method(config.domain.chain_id.unwrap_or(1), &wallet.address())
    });
    let purpose = config.purpose.build()?;

    let suite = Eip712Signature2021::new(SuiteOptions {
        signer: Some(wallet),
        verification_method: Some(verification_method),
        date: None,
    })?;

    let options = CreateProofOptions::new(purpose.as_ref())
        .domain(config.domain.clone())
        .embed(embed && config.embed);
    let proof = suite
        .create_proof(&document, options)
        .await
        .context("failed to create proof")?;

    let proof = serde_json::to_value(&proof).context("failed to serialize proof")?;
    if let Some(object) = document.as_object_mut() {
        object.insert(crate::PROOF_MEMBER.to_string(), proof);
    }
    Ok(document)
}
