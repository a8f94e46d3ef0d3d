//! # dealctl Entry Point
//!
//! Assembles subcommands and dispatches to handler modules.

use clap::Parser;

/// Deal Stack CLI — private-placement tokenization toolchain.
///
/// Administers investor and deal registries over a JSON state file,
/// evaluates transfer compliance, and simulates escrow disbursements.
#[derive(Parser, Debug)]
#[command(name = "dealctl", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Investor account administration.
    Account(deal_cli::account::AccountArgs),
    /// Deal issuance administration.
    Deal(deal_cli::deal::DealArgs),
    /// Evaluate a prospective transfer.
    Check(deal_cli::check::CheckArgs),
    /// Escrow disbursement simulation.
    Escrow(deal_cli::escrow::EscrowArgs),
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Account(args) => deal_cli::account::run(args),
        Commands::Deal(args) => deal_cli::deal::run(args),
        Commands::Check(args) => deal_cli::check::run(args),
        Commands::Escrow(args) => deal_cli::escrow::run(args),
    }
}
