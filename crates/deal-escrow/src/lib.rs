//! # deal-escrow — Pooled-Capital Deposit Escrow
//!
//! Collects investor capital in a payment-ledger account and, once the
//! crowdfunding oracle is attached, disburses everything in a single
//! `fund()` call:
//!
//! - capital the oracle credited to the escrow's own address goes to the
//!   project (the funding-target path);
//! - the surplus splits 90/10 between the oracle's crowdfunding pool and
//!   the fee recipient.
//!
//! The escrow is a strictly forward three-state machine
//! (`Deployed → Ready → Funded`); the oracle reference is set exactly
//! once, and after disbursement the escrow's balance is exactly zero.

pub mod escrow;
pub mod oracle;

pub use escrow::{
    DepositEscrow, EscrowError, EscrowState, EscrowTransitionRecord, FundingReport,
    FEE_SPLIT_DENOMINATOR, POOL_SPLIT_NUMERATOR,
};
pub use oracle::{CrowdFiStub, CrowdFundingOracle};
