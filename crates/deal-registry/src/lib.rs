//! # deal-registry — Compliance Data Stores
//!
//! Two registries back the transfer-compliance engine:
//!
//! - **`AccountRegistry`** (`account.rs`): investor records — country,
//!   accreditation, KYC — linked to ledger addresses, mutable only under
//!   a capability-scoped admin model ("my accounts only", with a master
//!   admin that may act on any account). Emits an ordered event log for
//!   off-chain indexers.
//!
//! - **`DealRegistry`** (`deal.rs`): per-deal issuance metadata. Issue
//!   dates are immutable once registered — asset age must mean the same
//!   thing for the lifetime of a deal.
//!
//! Both stores are mutated only through their admin surfaces; the
//! compliance engine holds read-only views.

pub mod account;
pub mod deal;

pub use account::{
    AccountRecord, AccountRegistry, AccreditationStatus, KycStatus, RegistryError, RegistryEvent,
};
pub use deal::{DealError, DealRecord, DealRegistry};
