//! # deal-core — Foundational Types for the Deal Tokenization Stack
//!
//! This crate is the leaf of the workspace DAG. It defines the domain
//! primitives shared by every other crate: identifier newtypes, the
//! UTC-only timestamp, and the transfer-gate seam through which the
//! position ledger consults a compliance engine.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** `Address`, `AccountId`,
//!    `DealId` — no bare strings or integers for identifiers. You cannot
//!    pass an `AccountId` where a `DealId` is expected.
//!
//! 2. **UTC-only timestamps.** The `Timestamp` type enforces UTC with
//!    seconds precision. Holding-period arithmetic is integer epoch math
//!    with no timezone ambiguity.
//!
//! 3. **The gate is a trait, not a type.** The position ledger depends on
//!    `TransferGate`, never on a concrete engine. The engine reference can
//!    be absent (unrestricted bootstrap state) or swapped across upgrade
//!    versions without touching the ledger.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `deal-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - All public types derive `Debug`, `Clone`, and implement
//!   `Serialize`/`Deserialize` where they cross a persistence boundary.

pub mod error;
pub mod gate;
pub mod identity;
pub mod temporal;

pub use error::CoreError;
pub use gate::{DenialReason, TransferDecision, TransferGate};
pub use identity::{AccountId, Address, DealId};
pub use temporal::Timestamp;
