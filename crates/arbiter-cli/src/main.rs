//! # arbiter CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use arbiter_cli::cases::{run_cases, CasesArgs};
use arbiter_cli::confidential::{
    run_decrypt, run_encrypt, run_hash, run_verify, DecryptArgs, EncryptArgs, HashArgs, VerifyArgs,
};
use arbiter_cli::dispute::{run_calldata, run_submit, CalldataArgs, SubmitArgs};
use arbiter_cli::keys::{run_keygen, KeygenArgs};

/// Secret Arbiter CLI
///
/// Confidential dispute submission: key generation, encrypted contract
/// inputs with range proofs bound to the call, createDispute assembly, and
/// submission through a JSON-RPC wallet provider.
#[derive(Parser, Debug)]
#[command(name = "arbiter", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to the client configuration file (YAML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate an ElGamal key pair for a contract instance.
    Keygen(KeygenArgs),

    /// Encrypt a value and prove its range, bound to a contract call.
    Encrypt(EncryptArgs),

    /// Verify an encrypted value's proof from the public key alone.
    Verify(VerifyArgs),

    /// Decrypt one encrypted value, or the sum of several.
    Decrypt(DecryptArgs),

    /// SHA-256 digest of sensitive text.
    Hash(HashArgs),

    /// Build an unsigned createDispute transaction.
    Calldata(CalldataArgs),

    /// Submit a dispute through the configured wallet provider.
    Submit(SubmitArgs),

    /// List the sample cases.
    Cases(CasesArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity level.
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "arbiter CLI starting");

    let result = match &cli.command {
        Commands::Keygen(args) => run_keygen(args),
        Commands::Encrypt(args) => run_encrypt(args),
        Commands::Verify(args) => run_verify(args),
        Commands::Decrypt(args) => run_decrypt(args),
        Commands::Hash(args) => run_hash(args),
        Commands::Calldata(args) => run_calldata(args),
        Commands::Submit(args) => run_submit(args, cli.config.as_deref()),
        Commands::Cases(args) => run_cases(args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
