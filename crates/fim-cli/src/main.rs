//! # fim CLI entry point
//!
//! Parses command-line arguments, initialises tracing from the wallet
//! configuration and dispatches to the subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use fim_cli::demo::{run_issue_demo, run_present_demo, IssueDemoArgs, PresentDemoArgs};
use fim_cli::hash::{run_hash, HashArgs};
use fim_cli::keys::{run_keygen, KeygenArgs};
use fim_cli::verify::{run_verify_credential, VerifyCredentialArgs};
use fim_wallet::WalletConfig;

/// Flexibility wallet CLI.
///
/// Generates BabyJubJub keys, computes Poseidon digests, issues and
/// verifies flexibility credentials and demonstrates aggregated
/// presentations. Settings come from `FIM_*` environment variables.
#[derive(Parser, Debug)]
#[command(name = "fim", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a BabyJubJub key pair.
    Keygen(KeygenArgs),

    /// Poseidon digest of decimal field elements or a string.
    Hash(HashArgs),

    /// Issue the three credentials of one device.
    IssueDemo(IssueDemoArgs),

    /// Verify the issuer signature of credentials in a JSON file.
    VerifyCredential(VerifyCredentialArgs),

    /// Aggregate a device pool into a verified presentation.
    PresentDemo(PresentDemoArgs),
}

fn init_tracing(verbose: u8, json: bool, config: &WalletConfig) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.with_target(false).init();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match WalletConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(2);
        }
    };
    init_tracing(cli.verbose, cli.json_logs || config.json_logs, &config);
    tracing::debug!(?config, "fim CLI starting");

    let result = match cli.command {
        Commands::Keygen(args) => run_keygen(&args).await,
        Commands::Hash(args) => run_hash(&args),
        Commands::IssueDemo(args) => run_issue_demo(&args, &config).await,
        Commands::VerifyCredential(args) => run_verify_credential(&args).await,
        Commands::PresentDemo(args) => run_present_demo(&args, &config).await,
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
