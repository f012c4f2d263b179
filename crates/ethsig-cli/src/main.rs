//! # ethsig CLI entry point
//!
//! Parses command-line arguments, loads the optional YAML configuration and
//! dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use ethsig_cli::config::SuiteConfig;
use ethsig_cli::keygen::{run_keygen, KeygenArgs};
use ethsig_cli::sign::{run_sign, SignArgs};
use ethsig_cli::types::{run_types, TypesArgs};
use ethsig_cli::verify::{run_verify, VerifyArgs};

/// ethsig: EthereumEip712Signature2021 proofs from the command line.
///
/// Derives EIP-712 type schemas from JSON documents, generates secp256k1
/// keys, and creates or verifies typed-data linked-data proofs.
#[derive(Parser, Debug)]
#[command(name = "ethsig", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a YAML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the EIP-712 type schema derived from a JSON document.
    Types(TypesArgs),

    /// Generate a secp256k1 private key and its address.
    Keygen(KeygenArgs),

    /// Attach an EthereumEip712Signature2021 proof to a JSON document.
    Sign(SignArgs),

    /// Verify the proof attached to a JSON document.
    Verify(VerifyArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    tracing::debug!("ethsig CLI v{} starting", env!("CARGO_PKG_VERSION"));

    let config = match SuiteConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{e:#}");
            return ExitCode::from(2);
        }
    };

    // Relative paths in the configuration are resolved against its directory.
    let base_dir = cli
        .config
        .as_deref()
        .and_then(|path| path.parent())
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    tracing::debug!(base_dir = %base_dir.display(), "resolved configuration directory");

    let result = match cli.command {
        Commands::Types(args) => run_types(&args),
        Commands::Keygen(args) => run_keygen(&args),
        Commands::Sign(args) => run_sign(&args, &config),
        Commands::Verify(args) => run_verify(&args, &config, &base_dir),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
