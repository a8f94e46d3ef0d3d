//! # deal-compliance — Transfer-Compliance Decision Engine
//!
//! Implements the [`deal_core::TransferGate`] seam over the account and
//! deal registries. The engine is a pure decision function: it takes
//! read locks on the registries, resolves the recipient's compliance
//! record and the deal's issue date, and applies the holding-period
//! decision table. No mutation, no caching, no side effects — invoking
//! it twice for the same inputs yields the same answer.
//!
//! The policy parameters (holding periods, month length, the restricted
//! country) live in [`policy::HoldingPolicy`] so they can be audited and
//! tested independently of the evaluation algorithm.

pub mod engine;
pub mod policy;

pub use engine::ComplianceEngine;
pub use policy::{HoldingPolicy, MONTH_SECONDS};
