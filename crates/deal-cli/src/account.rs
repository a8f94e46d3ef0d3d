//! # `account` Subcommand
//!
//! Investor-record administration: add, update, link and unlink
//! addresses, and show a record by linked address.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Subcommand, ValueEnum};

use deal_core::{AccountId, Address};
use deal_registry::{AccreditationStatus, KycStatus};

use crate::state::StackState;

/// CLI spelling of [`AccreditationStatus`].
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum AccreditationArg {
    /// No accreditation information.
    Unknown,
    /// Known not accredited.
    NotAccredited,
    /// Self-attested accreditation.
    SelfAccredited,
    /// Independently verified accreditation.
    VerifiedAccredited,
}

impl From<AccreditationArg> for AccreditationStatus {
    fn from(arg: AccreditationArg) -> Self {
        match arg {
            AccreditationArg::Unknown => Self::Unknown,
            AccreditationArg::NotAccredited => Self::NotAccredited,
            AccreditationArg::SelfAccredited => Self::SelfAccredited,
            AccreditationArg::VerifiedAccredited => Self::VerifiedAccredited,
        }
    }
}

/// CLI spelling of [`KycStatus`].
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum KycArg {
    /// No KYC information.
    Unknown,
    /// Current and valid.
    Valid,
    /// Previously valid, now lapsed.
    Lapsed,
    /// Reviewed and rejected.
    Rejected,
}

impl From<KycArg> for KycStatus {
    fn from(arg: KycArg) -> Self {
        match arg {
            KycArg::Unknown => Self::Unknown,
            KycArg::Valid => Self::Valid,
            KycArg::Lapsed => Self::Lapsed,
            KycArg::Rejected => Self::Rejected,
        }
    }
}

/// Account administration.
#[derive(Args, Debug)]
pub struct AccountArgs {
    /// Path to the JSON state file.
    #[arg(long, global = true, default_value = "stack.json")]
    pub state: PathBuf,

    /// Admin identity performing the operation.
    #[arg(long, global = true, default_value = "master")]
    pub caller: String,

    #[command(subcommand)]
    pub command: AccountCommand,
}

#[derive(Subcommand, Debug)]
pub enum AccountCommand {
    /// Create an account record with initial linked addresses.
    Add {
        /// Country code (e.g. US, CA).
        #[arg(long)]
        country: String,
        /// Accreditation status.
        #[arg(long, value_enum)]
        accreditation: AccreditationArg,
        /// KYC status.
        #[arg(long, value_enum)]
        kyc: KycArg,
        /// Addresses to link (repeatable).
        #[arg(long = "address", required = true)]
        addresses: Vec<String>,
    },
    /// Update an account's compliance fields.
    Update {
        /// Account id to update.
        #[arg(long)]
        id: u64,
        /// New country code.
        #[arg(long)]
        country: String,
        /// New accreditation status.
        #[arg(long, value_enum)]
        accreditation: AccreditationArg,
        /// New KYC status.
        #[arg(long, value_enum)]
        kyc: KycArg,
    },
    /// Link an address to an existing account.
    Link {
        /// Account id to link to.
        #[arg(long)]
        id: u64,
        /// Address to link.
        #[arg(long)]
        address: String,
    },
    /// Remove an address link.
    Unlink {
        /// Address to unlink.
        #[arg(long)]
        address: String,
    },
    /// Show the record linked to an address.
    Show {
        /// Address to resolve.
        #[arg(long)]
        address: String,
    },
    /// Grant registry-admin rights (master admin only).
    GrantAdmin {
        /// Address to grant admin rights to.
        #[arg(long)]
        address: String,
    },
}

/// Execute an `account` subcommand against the state file.
pub fn run(args: AccountArgs) -> anyhow::Result<()> {
    let caller = Address::new(args.caller).context("invalid caller")?;
    let mut state = StackState::load_or_init(&args.state, &caller)?;

    match args.command {
        AccountCommand::Add {
            country,
            accreditation,
            kyc,
            addresses,
        } => {
            let addresses = parse_addresses(addresses)?;
            let id = state.accounts.add_account(
                &caller,
                country,
                accreditation.into(),
                kyc.into(),
                addresses,
            )?;
            state.save(&args.state)?;
            println!("{id}");
        }
        AccountCommand::Update {
            id,
            country,
            accreditation,
            kyc,
        } => {
            state.accounts.update_account(
                &caller,
                AccountId(id),
                country,
                accreditation.into(),
                kyc.into(),
            )?;
            state.save(&args.state)?;
        }
        AccountCommand::Link { id, address } => {
            let address = Address::new(address).context("invalid address")?;
            state
                .accounts
                .add_addresses(&caller, vec![address], vec![AccountId(id)])?;
            state.save(&args.state)?;
        }
        AccountCommand::Unlink { address } => {
            let address = Address::new(address).context("invalid address")?;
            state.accounts.remove_address(&caller, &address)?;
            state.save(&args.state)?;
        }
        AccountCommand::Show { address } => {
            let address = Address::new(address).context("invalid address")?;
            match state.accounts.account_of(&address) {
                Some(record) => println!("{}", serde_json::to_string_pretty(record)?),
                None => anyhow::bail!("address {address} is not linked to any account"),
            }
        }
        AccountCommand::GrantAdmin { address } => {
            let admin = Address::new(address).context("invalid address")?;
            state.accounts.add_admin(&caller, admin)?;
            state.save(&args.state)?;
        }
    }
    Ok(())
}

fn parse_addresses(raw: Vec<String>) -> anyhow::Result<Vec<Address>> {
    raw.into_iter()
        .map(|s| Address::new(s).context("invalid address"))
        .collect()
}
