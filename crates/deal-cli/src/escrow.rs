//! # `escrow` Subcommand
//!
//! Disbursement simulator: builds a fresh payment ledger, escrow, and
//! crowdfunding oracle in memory, walks the escrow through its full
//! lifecycle, and prints where the money went. Useful for checking a
//! split before committing to a real disbursement.

use std::sync::Arc;

use clap::{Args, Subcommand};

use deal_core::Address;
use deal_escrow::{CrowdFiStub, DepositEscrow};
use deal_ledger::PaymentLedger;

/// Escrow disbursement tooling.
#[derive(Args, Debug)]
pub struct EscrowArgs {
    #[command(subcommand)]
    pub command: EscrowCommand,
}

#[derive(Subcommand, Debug)]
pub enum EscrowCommand {
    /// Simulate a disbursement for a given escrow balance.
    Simulate {
        /// Total payment balance held by the escrow.
        #[arg(long)]
        total: u128,
        /// Portion the aggregator recorded against the escrow's own
        /// address (routed straight to the project).
        #[arg(long, default_value_t = 0)]
        direct: u128,
    },
}

/// Execute an `escrow` subcommand.
pub fn run(args: EscrowArgs) -> anyhow::Result<()> {
    match args.command {
        EscrowCommand::Simulate { total, direct } => simulate(total, direct),
    }
}

fn simulate(total: u128, direct: u128) -> anyhow::Result<()> {
    let operator = Address::new("operator")?;
    let escrow_addr = Address::new("escrow")?;
    let project = Address::new("project")?;
    let fee = Address::new("fee")?;
    let pool = Address::new("pool")?;
    let token = Address::new("usdc")?;

    let mut ledger = PaymentLedger::new();
    ledger.mint(&escrow_addr, total)?;

    let oracle = CrowdFiStub::new(pool.clone(), token);
    oracle.credit(&escrow_addr, direct);

    let mut escrow = DepositEscrow::new(escrow_addr, fee.clone(), project.clone(), operator.clone());
    escrow.set_crowdfi(&operator, Arc::new(oracle))?;
    let report = escrow.fund(&operator, &mut ledger)?;

    println!("total:   {}", report.total);
    println!("project: {}  -> {}", report.project, project);
    println!("pool:    {}  -> {}", report.pool, pool);
    println!("fee:     {}  -> {}", report.fee, fee);
    println!("state:   {}", escrow.state());
    Ok(())
}
