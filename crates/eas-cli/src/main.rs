//! # eas CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use eas_cli::attestation::{run_attestation, AttestationArgs};
use eas_cli::codec::{run_decode, run_encode, DecodeArgs, EncodeArgs};
use eas_cli::network::NetworkOpts;
use eas_cli::schema::{run_schema, SchemaArgs};
use eas_cli::timestamp::{run_timestamp, TimestampArgs};

/// Ethereum Attestation Service CLI
///
/// Derives schema UIDs, encodes and decodes attestation data, and talks to
/// the SchemaRegistry and EAS contracts over JSON-RPC.
#[derive(Parser, Debug)]
#[command(name = "eas", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to the YAML client configuration.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// JSON-RPC endpoint, overriding the configuration.
    #[arg(long, global = true)]
    rpc_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Normalize, identify, register and fetch schemas.
    Schema(SchemaArgs),

    /// ABI-encode a JSON array of values against a schema.
    Encode(EncodeArgs),

    /// Decode ABI data against a schema into JSON.
    Decode(DecodeArgs),

    /// Create, read, check and revoke attestations.
    Attestation(AttestationArgs),

    /// Timestamp 32-byte values on chain.
    Timestamp(TimestampArgs),
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
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("eas CLI v{} starting", env!("CARGO_PKG_VERSION"));

    let network = NetworkOpts {
        config: cli.config,
        rpc_url: cli.rpc_url,
    };

    let result = match cli.command {
        Commands::Schema(args) => run_schema(&args, &network),
        Commands::Encode(args) => run_encode(&args),
        Commands::Decode(args) => run_decode(&args),
        Commands::Attestation(args) => run_attestation(&args, &network),
        Commands::Timestamp(args) => run_timestamp(&args, &network),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
