//! # Keygen Subcommand
//!
//! Generates a secp256k1 key and writes two files: `<prefix>.key` holding
//! the `0x` hex private key, and `<prefix>.addr` holding the EIP-55
//! checksummed address.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use ethsig_crypto::{LocalWallet, TypedDataSigner};

/// Arguments for `ethsig keygen`.
#[derive(Args, Debug)]
pub struct KeygenArgs {
    /// Output directory for the key files.
    #[arg(long, short, default_value = ".")]
    pub output: PathBuf,
    /// Prefix for the key filenames.
    #[arg(long, default_value = "ethsig")]
    pub prefix: String,
}

/// Execute the keygen subcommand.
pub fn run_keygen(args: &KeygenArgs) -> Result<u8> {
    let (key_path, addr_path, address) = write_keypair(&args.output, &args.prefix)?;

    println!("OK: generated secp256k1 key");
    println!("  Private key: {}", key_path.display());
    println!("  Address:     {}", addr_path.display());
    println!("  Address (EIP-55): {address}");
    Ok(0)
}

fn write_keypair(output_dir: &Path, prefix: &str) -> Result<(PathBuf, PathBuf, String)> {
    std::fs::create_dir_all(output_dir).with_context(|| {
        format!(
            "failed to create output directory: {}",
            output_dir.display()
        )
    })?;

    let wallet = LocalWallet::random();
    let address = wallet.address();

    let key_path = output_dir.join(format!("{prefix}.key"));
    let addr_path = output_dir.join(format!("{prefix}.addr"));

    std::fs::write(&key_path, wallet.private_key_hex().as_bytes())
        .with_context(|| format!("failed to write private key: {}", key_path.display()))?;
    std::fs::write(&addr_path, &address)
        .with_context(|| format!("failed to write address: {}", addr_path.display()))?;

    tracing::info!(address = %address, "generated key");
    Ok((key_path, addr_path, address))
}
