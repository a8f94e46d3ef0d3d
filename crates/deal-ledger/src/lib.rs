//! # deal-ledger — Fungible Payment-Token Ledger
//!
//! A minimal in-memory fungible-token ledger modeling the payment token
//! that deal positions are bought with and that the deposit escrow
//! disburses. One `PaymentLedger` instance is one token.
//!
//! Every operation validates before mutating: a failed transfer or burn
//! leaves balances untouched. There is no allowance machinery — callers
//! in this stack move only their own balances, and the escrow moves its
//! own collected pool.

pub mod ledger;

pub use ledger::{LedgerError, PaymentLedger};
