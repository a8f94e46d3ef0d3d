//! # deal-token — Multi-Asset Deal Position Ledger
//!
//! Tracks per-`(holder, deal)` positions, minted against investor
//! capital contributions and transferable subject to a pluggable
//! compliance gate.
//!
//! ## Modules
//!
//! - **`version`**: the forward-only schema version gates (V0..V4). The
//!   long-lived deployment history of this system is modeled as explicit
//!   version numbers with a per-version capability table, validated at
//!   call time — not as an inheritance chain.
//!
//! - **`token`**: the `DealToken` ledger. On every true transfer it
//!   consults the configured [`deal_core::TransferGate`]; mint and burn
//!   bypass the gate by construction. With no gate configured, transfers
//!   are unrestricted — the pre-compliance bootstrap state.

pub mod token;
pub mod version;

pub use token::{DealToken, TokenError};
pub use version::{SchemaVersion, VersionError};
