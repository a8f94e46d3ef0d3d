//! # `deal` Subcommand
//!
//! Deal issuance administration: register issuance records and show
//! them back.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Subcommand};
use uuid::Uuid;

use deal_core::{Address, DealId, Timestamp};
use deal_registry::DealRecord;

use crate::state::StackState;

/// Deal issuance administration.
#[derive(Args, Debug)]
pub struct DealArgs {
    /// Path to the JSON state file.
    #[arg(long, global = true, default_value = "stack.json")]
    pub state: PathBuf,

    /// Admin identity performing the operation.
    #[arg(long, global = true, default_value = "master")]
    pub caller: String,

    #[command(subcommand)]
    pub command: DealCommand,
}

#[derive(Subcommand, Debug)]
pub enum DealCommand {
    /// Register a deal's issuance record.
    Add {
        /// Deal id (UUID). Generated when omitted.
        #[arg(long)]
        deal_id: Option<Uuid>,
        /// Issue date, RFC 3339 UTC (e.g. 2025-01-15T00:00:00Z).
        #[arg(long)]
        issue_date: String,
        /// Payment token address.
        #[arg(long)]
        payment_token: String,
        /// Payment token decimals.
        #[arg(long, default_value_t = 18)]
        decimals: u8,
        /// Address capital contributions are forwarded to.
        #[arg(long)]
        funds_recipient: String,
    },
    /// Show a registered deal record.
    Show {
        /// Deal id (UUID).
        #[arg(long)]
        deal_id: Uuid,
    },
}

/// Execute a `deal` subcommand against the state file.
pub fn run(args: DealArgs) -> anyhow::Result<()> {
    let caller = Address::new(args.caller).context("invalid caller")?;
    let mut state = StackState::load_or_init(&args.state, &caller)?;

    match args.command {
        DealCommand::Add {
            deal_id,
            issue_date,
            payment_token,
            decimals,
            funds_recipient,
        } => {
            let deal_id = DealId(deal_id.unwrap_or_else(Uuid::new_v4));
            let record = DealRecord {
                deal_id,
                issue_date: Timestamp::parse(&issue_date).context("invalid issue date")?,
                payment_token: Address::new(payment_token).context("invalid payment token")?,
                payment_decimals: decimals,
                funds_recipient: Address::new(funds_recipient)
                    .context("invalid funds recipient")?,
            };
            state.deals.register(&caller, record)?;
            state.save(&args.state)?;
            println!("{deal_id}");
        }
        DealCommand::Show { deal_id } => {
            let deal_id = DealId(deal_id);
            match state.deals.deal(&deal_id) {
                Some(record) => println!("{}", serde_json::to_string_pretty(record)?),
                None => anyhow::bail!("no deal with id {deal_id}"),
            }
        }
    }
    Ok(())
}
