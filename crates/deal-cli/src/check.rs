//! # `check` Subcommand
//!
//! Dry-run the compliance decision table: would a transfer of a
//! position in a deal to a recipient be allowed right now (or at a
//! given instant)?

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Args;
use parking_lot::RwLock;
use uuid::Uuid;

use deal_compliance::ComplianceEngine;
use deal_core::{Address, DealId, Timestamp, TransferDecision, TransferGate};

use crate::state::StackState;

/// Evaluate a prospective transfer against the compliance engine.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Path to the JSON state file.
    #[arg(long, default_value = "stack.json")]
    pub state: PathBuf,

    /// Sending address. Defaults to an unresolved placeholder; the
    /// decision only depends on the recipient.
    #[arg(long, default_value = "unknown-sender")]
    pub from: String,

    /// Receiving address.
    #[arg(long)]
    pub to: String,

    /// Deal id (UUID).
    #[arg(long)]
    pub deal_id: Uuid,

    /// Evaluation instant, RFC 3339 UTC. Defaults to now.
    #[arg(long)]
    pub at: Option<String>,
}

/// Execute the `check` subcommand.
pub fn run(args: CheckArgs) -> anyhow::Result<()> {
    let state = StackState::load(&args.state)?;
    let from = Address::new(args.from).context("invalid sender")?;
    let to = Address::new(args.to).context("invalid recipient")?;
    let deal_id = DealId(args.deal_id);
    let at = match args.at {
        Some(raw) => Timestamp::parse(&raw).context("invalid evaluation instant")?,
        None => Timestamp::now(),
    };

    let engine = ComplianceEngine::new(
        Arc::new(RwLock::new(state.accounts)),
        Arc::new(RwLock::new(state.deals)),
    );

    match engine.check(&from, &to, &deal_id, at) {
        TransferDecision::Allow => println!("allow"),
        TransferDecision::Deny(reason) => {
            println!("deny: {reason}");
            std::process::exit(1);
        }
    }
    Ok(())
}
