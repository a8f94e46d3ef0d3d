//! # deal-cli — Operator Command-Line Interface
//!
//! Administers the registries of the deal stack against a JSON state
//! file and runs read-only evaluations:
//!
//! - `account` — create and update investor records, link addresses.
//! - `deal` — register deal issuance records.
//! - `check` — evaluate the transfer-compliance decision for a
//!   prospective transfer without executing it.
//! - `escrow` — simulate a deposit-escrow funding round and print the
//!   routing report.
//!
//! ## Crate Policy
//!
//! - CLI construction (argument parsing) is separated from business logic.
//! - Handler functions delegate to the domain crates — no business logic here.
//! - `anyhow` only at this boundary; domain errors bubble up with context.

pub mod account;
pub mod check;
pub mod deal;
pub mod escrow;
pub mod state;
